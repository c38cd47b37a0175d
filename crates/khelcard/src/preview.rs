//! Live preview of the result card.
//!
//! The preview region is a view-handle with named optional slots. A host
//! binds only the slots it actually shows; the renderer writes the bound
//! slots and skips the rest.

use crate::calendar::CalendarDay;
use crate::catalog::{DisplayIdentity, GameCatalog};
use crate::illustration::{Illustration, IllustrationPicker};
use crate::selection::ResultSelection;
use serde::Serialize;
use std::sync::Arc;

/// Placeholder shown for missing values
pub const EMPTY_TEXT: &str = "--";

/// Text slot names in the preview region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextSlotName {
    /// Big result number
    Number,
    /// English game name
    NameEnglish,
    /// Hindi game name
    NameHindi,
    /// "Weekday, Month D, YYYY"
    ResultDate,
    /// Date banner
    CurrentDate,
    /// Weekday banner
    CurrentDay,
}

/// A bound text element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextSlot {
    /// Current text content
    pub text: String,
}

/// What the preview last showed; the video capture rasterizes this
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewState {
    /// Selection that was rendered
    pub selection: ResultSelection,
    /// Resolved names and accent
    pub identity: DisplayIdentity,
    /// Visible illustration
    pub illustration: Illustration,
    /// Day used for the date banner
    pub day: CalendarDay,
}

/// The on-screen preview region
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreviewView {
    /// Big number element
    pub number: Option<TextSlot>,
    /// English name element
    pub name_english: Option<TextSlot>,
    /// Hindi name element
    pub name_hindi: Option<TextSlot>,
    /// Result date element
    pub result_date: Option<TextSlot>,
    /// Date banner element
    pub current_date: Option<TextSlot>,
    /// Weekday banner element
    pub current_day: Option<TextSlot>,
    /// Colour theme class of the region (`khel-s`, `khel-m`, ...)
    pub theme_class: Option<Option<String>>,
    /// Illustration element; holds the single visible image
    pub illustration: Option<Option<Illustration>>,
    #[serde(skip)]
    state: Option<PreviewState>,
}

impl PreviewView {
    /// View with no slots bound
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// View with every slot bound
    #[must_use]
    pub fn fully_bound() -> Self {
        Self {
            number: Some(TextSlot::default()),
            name_english: Some(TextSlot::default()),
            name_hindi: Some(TextSlot::default()),
            result_date: Some(TextSlot::default()),
            current_date: Some(TextSlot::default()),
            current_day: Some(TextSlot::default()),
            theme_class: Some(None),
            illustration: Some(None),
            state: None,
        }
    }

    /// Text of a bound slot
    #[must_use]
    pub fn text(&self, name: TextSlotName) -> Option<&str> {
        let slot = match name {
            TextSlotName::Number => &self.number,
            TextSlotName::NameEnglish => &self.name_english,
            TextSlotName::NameHindi => &self.name_hindi,
            TextSlotName::ResultDate => &self.result_date,
            TextSlotName::CurrentDate => &self.current_date,
            TextSlotName::CurrentDay => &self.current_day,
        };
        slot.as_ref().map(|slot| slot.text.as_str())
    }

    /// Bound text slots only
    pub fn text_slots_mut(&mut self) -> impl Iterator<Item = (TextSlotName, &mut TextSlot)> {
        [
            (TextSlotName::Number, self.number.as_mut()),
            (TextSlotName::NameEnglish, self.name_english.as_mut()),
            (TextSlotName::NameHindi, self.name_hindi.as_mut()),
            (TextSlotName::ResultDate, self.result_date.as_mut()),
            (TextSlotName::CurrentDate, self.current_date.as_mut()),
            (TextSlotName::CurrentDay, self.current_day.as_mut()),
        ]
        .into_iter()
        .filter_map(|(name, slot)| slot.map(|slot| (name, slot)))
    }

    /// Last rendered state, if any render happened
    #[must_use]
    pub fn snapshot(&self) -> Option<&PreviewState> {
        self.state.as_ref()
    }
}

/// Theme class for a game code
#[must_use]
pub fn theme_class(selection: &ResultSelection) -> Option<String> {
    selection
        .game_code
        .as_ref()
        .map(|code| format!("khel-{}", code.as_str().to_lowercase()))
}

/// Writes selections into a preview view
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    catalog: Arc<GameCatalog>,
    picker: IllustrationPicker,
}

impl PreviewRenderer {
    /// Create a renderer over a shared catalog
    #[must_use]
    pub fn new(catalog: Arc<GameCatalog>, picker: IllustrationPicker) -> Self {
        Self { catalog, picker }
    }

    /// Update every bound slot of `view` from `selection`
    pub fn render(
        &self,
        selection: &ResultSelection,
        day: CalendarDay,
        view: &mut PreviewView,
    ) -> PreviewState {
        let identity = self.catalog.resolve(selection);
        let illustration = self.picker.pick(selection.game_code.as_ref());

        for (name, slot) in view.text_slots_mut() {
            slot.text = match name {
                TextSlotName::Number => selection.number_text(),
                TextSlotName::NameEnglish => or_placeholder(&identity.name_english),
                TextSlotName::NameHindi => or_placeholder(&identity.name_hindi),
                TextSlotName::ResultDate => day.result_date_line(),
                TextSlotName::CurrentDate => day.long_date(),
                TextSlotName::CurrentDay => day.weekday(),
            };
        }
        if let Some(class) = view.theme_class.as_mut() {
            *class = theme_class(selection);
        }
        if let Some(visible) = view.illustration.as_mut() {
            *visible = Some(illustration);
        }

        tracing::debug!(
            number = %selection.number_text(),
            illustration = %illustration,
            "preview rendered"
        );

        let state = PreviewState {
            selection: selection.clone(),
            identity,
            illustration,
            day,
        };
        view.state = Some(state.clone());
        state
    }
}

fn or_placeholder(text: &str) -> String {
    if text.is_empty() {
        EMPTY_TEXT.to_string()
    } else {
        text.to_string()
    }
}
