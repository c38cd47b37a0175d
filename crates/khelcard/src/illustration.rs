//! Illustration choice per game code.

use crate::selection::GameCode;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Variants of the Shri Ganesh image, keyed by their file number
pub const SHRI_GANESH_VARIANTS: [u8; 5] = [1, 2, 3, 4, 8];

/// One illustrative image on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Illustration {
    /// One of the five Shri Ganesh images
    ShriGanesh(u8),
    /// Faridabad moon
    FaridabadMoon,
    /// Delhi Bazar
    DelhiBazar,
    /// Gaziabad
    Gaziabad,
    /// King (Deshawer)
    King,
    /// Gali
    Gali,
    /// New Gali
    NewGali,
    /// Default Ganesh image
    Ganesh,
}

impl Illustration {
    /// Asset file name
    #[must_use]
    pub fn asset_name(self) -> String {
        match self {
            Self::ShriGanesh(n) => format!("img{n}.jpeg"),
            Self::FaridabadMoon => "faridabad_moon.jpg".to_string(),
            Self::DelhiBazar => "DELHI_BAZAR.jpg".to_string(),
            Self::Gaziabad => "gaziabad.jpeg".to_string(),
            Self::King => "king_image.jpeg".to_string(),
            Self::Gali => "gali_image.jpeg".to_string(),
            Self::NewGali => "new_gali_image.jpeg".to_string(),
            Self::Ganesh => "daruseth_image1.jpg".to_string(),
        }
    }

    /// Caption drawn in the placeholder when the asset cannot be loaded
    #[must_use]
    pub const fn fallback_caption(self) -> &'static str {
        match self {
            Self::ShriGanesh(_) => "Random Shri Ganesh Image",
            Self::FaridabadMoon => "Faridabad Moon Image",
            Self::DelhiBazar => "Delhi Bazar Image",
            Self::Gaziabad => "Gaziabad Image",
            Self::King => "King Image",
            Self::Gali => "Gali Image",
            Self::NewGali => "New Gali Image",
            Self::Ganesh => "God Image",
        }
    }
}

impl fmt::Display for Illustration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.asset_name())
    }
}

/// Uniform choice of an index below `len`
pub trait RandomChoice: Send + Sync + fmt::Debug {
    /// Pick an index in `0..len`; `len` is never zero
    fn choose(&self, len: usize) -> usize;
}

/// Thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomChoice for ThreadRandom {
    fn choose(&self, len: usize) -> usize {
        use rand::Rng;
        rand::rng().random_range(0..len)
    }
}

/// Always the same index, for deterministic renders
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub usize);

impl RandomChoice for FixedChoice {
    fn choose(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Maps a game code to its illustration
#[derive(Debug, Clone)]
pub struct IllustrationPicker {
    random: Arc<dyn RandomChoice>,
}

impl Default for IllustrationPicker {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl IllustrationPicker {
    /// Create a picker with the given random source
    #[must_use]
    pub fn new(random: Arc<dyn RandomChoice>) -> Self {
        Self { random }
    }

    /// Illustration for a code; `S` rolls a fresh variant on every call
    #[must_use]
    pub fn pick(&self, code: Option<&GameCode>) -> Illustration {
        match code.map(GameCode::as_str) {
            Some("S") => {
                let len = SHRI_GANESH_VARIANTS.len();
                let index = self.random.choose(len) % len;
                Illustration::ShriGanesh(SHRI_GANESH_VARIANTS[index])
            }
            Some("F") => Illustration::FaridabadMoon,
            Some("H") => Illustration::DelhiBazar,
            Some("G") => Illustration::Gaziabad,
            Some("M") => Illustration::King,
            Some("E") => Illustration::Gali,
            Some("N") => Illustration::NewGali,
            _ => Illustration::Ganesh,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Cycling(AtomicUsize);

    impl RandomChoice for Cycling {
        fn choose(&self, len: usize) -> usize {
            self.0.fetch_add(1, Ordering::Relaxed) % len
        }
    }

    fn code(raw: &str) -> GameCode {
        GameCode::parse(raw).unwrap()
    }

    #[test]
    fn test_deterministic_codes() {
        let picker = IllustrationPicker::new(Arc::new(FixedChoice(0)));
        assert_eq!(picker.pick(Some(&code("F"))), Illustration::FaridabadMoon);
        assert_eq!(picker.pick(Some(&code("H"))), Illustration::DelhiBazar);
        assert_eq!(picker.pick(Some(&code("G"))), Illustration::Gaziabad);
        assert_eq!(picker.pick(Some(&code("M"))), Illustration::King);
        assert_eq!(picker.pick(Some(&code("E"))), Illustration::Gali);
        assert_eq!(picker.pick(Some(&code("N"))), Illustration::NewGali);
    }

    #[test]
    fn test_other_codes_use_default_image() {
        let picker = IllustrationPicker::default();
        for raw in ["T", "L", "K", "Z"] {
            assert_eq!(picker.pick(Some(&code(raw))), Illustration::Ganesh);
        }
        assert_eq!(picker.pick(None), Illustration::Ganesh);
    }

    #[test]
    fn test_shri_ganesh_is_rerolled_each_call() {
        let picker = IllustrationPicker::new(Arc::new(Cycling::default()));
        let s = code("S");
        let picks: Vec<_> = (0..5).map(|_| picker.pick(Some(&s))).collect();
        let distinct: HashSet<_> = picks.iter().collect();
        assert_eq!(distinct.len(), 5);
        assert_eq!(picks[0], Illustration::ShriGanesh(1));
        assert_eq!(picks[4], Illustration::ShriGanesh(8));
    }

    #[derive(Debug)]
    struct Overshooting;

    impl RandomChoice for Overshooting {
        fn choose(&self, len: usize) -> usize {
            len + 2
        }
    }

    #[test]
    fn test_out_of_range_choice_wraps() {
        let picker = IllustrationPicker::new(Arc::new(Overshooting));
        assert_eq!(picker.pick(Some(&code("S"))), Illustration::ShriGanesh(3));
    }

    #[test]
    fn test_thread_random_stays_within_variants() {
        let picker = IllustrationPicker::default();
        let s = code("S");
        for _ in 0..50 {
            let Illustration::ShriGanesh(n) = picker.pick(Some(&s)) else {
                panic!("S must pick a Shri Ganesh variant");
            };
            assert!(SHRI_GANESH_VARIANTS.contains(&n));
        }
    }

    #[test]
    fn test_asset_names_and_captions() {
        assert_eq!(Illustration::ShriGanesh(8).asset_name(), "img8.jpeg");
        assert_eq!(Illustration::King.asset_name(), "king_image.jpeg");
        assert_eq!(Illustration::Ganesh.fallback_caption(), "God Image");
        assert_eq!(
            Illustration::ShriGanesh(2).fallback_caption(),
            "Random Shri Ganesh Image"
        );
    }
}
