//! User selections: the raw form input and the validated result selection.

use crate::result::{CardError, CardResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest result number accepted by the form
pub const MIN_NUMBER: u16 = 1;
/// Highest result number accepted by the form
pub const MAX_NUMBER: u16 = 100;

/// Game ("khel") code, normalized to trimmed upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameCode(String);

impl GameCode {
    /// Normalize user input; blank input is no code at all
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    /// Code as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result number, always within `MIN_NUMBER..=MAX_NUMBER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ResultNumber(u16);

impl ResultNumber {
    /// Accept a value inside the allowed range
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value >= MIN_NUMBER && value <= MAX_NUMBER {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Underlying value
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Fixed-width display text: "01".."99", then "100"
    #[must_use]
    pub fn padded(self) -> String {
        format_number(self)
    }
}

impl TryFrom<u16> for ResultNumber {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("{value} is outside {MIN_NUMBER}..={MAX_NUMBER}"))
    }
}

impl From<ResultNumber> for u16 {
    fn from(number: ResultNumber) -> Self {
        number.0
    }
}

impl fmt::Display for ResultNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.padded())
    }
}

/// Zero-pad a result number to two digits; 100 keeps its three digits
#[must_use]
pub fn format_number(number: ResultNumber) -> String {
    format!("{:02}", number.get())
}

/// Current selection driving the preview and the exported card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSelection {
    /// Selected game code
    pub game_code: Option<GameCode>,
    /// Selected result number
    pub number: Option<ResultNumber>,
    /// Free-text label replacing both game names
    pub custom_label: Option<String>,
}

impl ResultSelection {
    /// Create an empty selection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the game code (blank input clears it)
    #[must_use]
    pub fn with_game(mut self, code: &str) -> Self {
        self.game_code = GameCode::parse(code);
        self
    }

    /// Set the result number
    #[must_use]
    pub fn with_number(mut self, number: ResultNumber) -> Self {
        self.number = Some(number);
        self
    }

    /// Set the custom label; blank labels count as absent
    #[must_use]
    pub fn with_custom_label(mut self, label: &str) -> Self {
        self.custom_label = normalize_label(label);
        self
    }

    /// Number text for display, `--` when no number is selected
    #[must_use]
    pub fn number_text(&self) -> String {
        self.number
            .map_or_else(|| "--".to_string(), ResultNumber::padded)
    }
}

fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw form input as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultForm {
    /// Number field
    pub number: String,
    /// Game selector value
    pub game_code: String,
    /// Optional custom game label
    pub custom_label: String,
}

impl ResultForm {
    /// Create a form from its three fields
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        game_code: impl Into<String>,
        custom_label: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            game_code: game_code.into(),
            custom_label: custom_label.into(),
        }
    }

    /// Lenient selection for live previews; invalid numbers show as absent
    #[must_use]
    pub fn selection(&self) -> ResultSelection {
        ResultSelection {
            game_code: GameCode::parse(&self.game_code),
            number: parse_number(&self.number).ok(),
            custom_label: normalize_label(&self.custom_label),
        }
    }

    /// Check every field constraint before an export starts
    ///
    /// # Errors
    ///
    /// Returns `CardError::Validation` naming the first failing field
    pub fn validate(&self) -> CardResult<ResultSelection> {
        let number = parse_number(&self.number)?;
        let game_code = GameCode::parse(&self.game_code).ok_or_else(|| {
            CardError::validation("game_code", "Please select an item in the list.")
        })?;

        Ok(ResultSelection {
            game_code: Some(game_code),
            number: Some(number),
            custom_label: normalize_label(&self.custom_label),
        })
    }
}

fn parse_number(raw: &str) -> CardResult<ResultNumber> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CardError::validation("number", "Please fill out this field."));
    }
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::validation("number", "Please enter a number."));
    }
    // Any integer that does not fit is out of range, not malformed
    trimmed
        .parse::<u16>()
        .ok()
        .and_then(ResultNumber::new)
        .ok_or_else(|| {
            CardError::validation("number", "Please enter a number between 1 and 100")
        })
}
