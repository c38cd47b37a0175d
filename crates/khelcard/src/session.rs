//! Shared export state: the one-at-a-time gate, the export buttons and
//! user-facing alerts.

use crate::result::{CardError, CardResult};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serializes exports; a second export while one runs is rejected
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    inner: Arc<AsyncMutex<()>>,
}

/// Held for the duration of one export
#[derive(Debug)]
pub struct ExportPermit {
    _guard: OwnedMutexGuard<()>,
}

impl ExportGate {
    /// Create an open gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate without waiting
    ///
    /// # Errors
    ///
    /// Returns `CardError::Busy` if another export holds it
    pub fn try_acquire(&self) -> CardResult<ExportPermit> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map(|guard| ExportPermit { _guard: guard })
            .map_err(|_| CardError::Busy)
    }

    /// The process-wide gate every exporter takes by default
    #[must_use]
    pub fn global() -> Self {
        static GLOBAL: OnceLock<ExportGate> = OnceLock::new();
        GLOBAL.get_or_init(Self::new).clone()
    }
}

#[derive(Debug, Clone)]
struct ControlState {
    label: String,
    enabled: bool,
}

/// An export button: a label and an enabled flag
#[derive(Debug, Clone)]
pub struct ExportControl {
    idle_label: String,
    state: Arc<Mutex<ControlState>>,
}

impl ExportControl {
    /// Enabled control showing `idle_label`
    #[must_use]
    pub fn new(idle_label: impl Into<String>) -> Self {
        let idle_label = idle_label.into();
        Self {
            state: Arc::new(Mutex::new(ControlState {
                label: idle_label.clone(),
                enabled: true,
            })),
            idle_label,
        }
    }

    /// Current label
    #[must_use]
    pub fn label(&self) -> String {
        self.lock().label.clone()
    }

    /// Whether the control accepts clicks
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Disable the control and show `busy_label` until the guard drops
    #[must_use]
    pub fn begin(&self, busy_label: &str) -> ControlGuard {
        self.set(busy_label, false);
        ControlGuard {
            control: self.clone(),
        }
    }

    fn set(&self, label: &str, enabled: bool) {
        let mut state = self.lock();
        state.label = label.to_string();
        state.enabled = enabled;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores the idle label and re-enables the control on drop
#[derive(Debug)]
pub struct ControlGuard {
    control: ExportControl,
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        let idle = self.control.idle_label.clone();
        self.control.set(&idle, true);
    }
}

/// Blocking, user-facing message channel
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Show a message to the user
    fn alert(&self, message: &str);
}

/// Sends alerts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, message: &str) {
        tracing::info!(target: "khelcard::alert", "{message}");
    }
}

/// Collects alerts in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod gate_tests {
        use super::*;

        #[tokio::test]
        async fn test_second_acquire_is_busy() {
            let gate = ExportGate::new();
            let permit = gate.try_acquire().unwrap();
            assert!(matches!(gate.clone().try_acquire(), Err(CardError::Busy)));
            drop(permit);
            assert!(gate.try_acquire().is_ok());
        }

        #[tokio::test]
        async fn test_global_gate_is_shared() {
            let first = ExportGate::global();
            let second = ExportGate::global();
            assert!(Arc::ptr_eq(&first.inner, &second.inner));
            assert!(!Arc::ptr_eq(&first.inner, &ExportGate::new().inner));
        }
    }

    mod control_tests {
        use super::*;

        #[test]
        fn test_guard_restores_idle_state() {
            let control = ExportControl::new("Generate PNG");
            {
                let _guard = control.begin("Generating PNG...");
                assert_eq!(control.label(), "Generating PNG...");
                assert!(!control.is_enabled());
            }
            assert_eq!(control.label(), "Generate PNG");
            assert!(control.is_enabled());
        }

        #[test]
        fn test_guard_restores_on_early_return() {
            fn failing(control: &ExportControl) -> CardResult<()> {
                let _guard = control.begin("Working...");
                Err(CardError::encoding("boom"))
            }
            let control = ExportControl::new("Generate");
            assert!(failing(&control).is_err());
            assert!(control.is_enabled());
            assert_eq!(control.label(), "Generate");
        }
    }

    mod notifier_tests {
        use super::*;

        #[test]
        fn test_recording_notifier_keeps_order() {
            let notifier = RecordingNotifier::new();
            notifier.alert("first");
            notifier.clone().alert("second");
            assert_eq!(notifier.messages(), vec!["first", "second"]);
        }

        #[test]
        fn test_tracing_notifier_does_not_panic() {
            TracingNotifier.alert("hello");
        }
    }
}
