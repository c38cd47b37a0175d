//! Game catalog: display names and accent colours per game code.
//!
//! The catalog is built once and shared by reference (`Arc<GameCatalog>`);
//! nothing mutates it after construction.

use crate::color::{palette, Rgb};
use crate::selection::{GameCode, ResultSelection};
use serde::Serialize;

/// One game ("khel") entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEntry {
    /// One-letter code
    pub code: char,
    /// English display name
    pub name_english: String,
    /// Hindi display name
    pub name_hindi: String,
    /// Accent colour for titles, rings and the big number
    pub accent: Rgb,
}

impl GameEntry {
    /// Create a catalog entry
    #[must_use]
    pub fn new(code: char, name_english: &str, name_hindi: &str, accent: Rgb) -> Self {
        Self {
            code,
            name_english: name_english.to_string(),
            name_hindi: name_hindi.to_string(),
            accent,
        }
    }

    /// Whether this is the placeholder returned for unknown codes
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.name_english.is_empty() && self.name_hindi.is_empty()
    }
}

/// Immutable lookup table from game code to entry
#[derive(Debug, Clone)]
pub struct GameCatalog {
    entries: Vec<GameEntry>,
    fallback: GameEntry,
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl GameCatalog {
    /// The ten standard games
    #[must_use]
    pub fn standard() -> Self {
        let entries = vec![
            GameEntry::new('S', "SHRI GANESH", "श्री गणेश", Rgb::from_hex(0xff6b35)),
            GameEntry::new('M', "DESHAWER", "देशावर", Rgb::from_hex(0x3498db)),
            GameEntry::new('E', "GALI", "गली", Rgb::from_hex(0x27ae60)),
            GameEntry::new('F', "FARIDABAD", "फरीदाबाद", Rgb::from_hex(0x27ae60)),
            GameEntry::new('H', "DELHI BAZAR", "दिल्ली बाजार", Rgb::from_hex(0xe74c3c)),
            GameEntry::new('N', "NEWGALI", "नई गली", Rgb::from_hex(0x16a085)),
            GameEntry::new('T', "TAJ", "ताज", Rgb::from_hex(0xf39c12)),
            GameEntry::new('G', "GAZIABAD", "गाजियाबाद", Rgb::from_hex(0x6c5ce7)),
            GameEntry::new('L', "PUNJAB DAY", "पंजाब दिवस", Rgb::from_hex(0xe84393)),
            GameEntry::new('K', "KASHIPUR", "काशीपुर", Rgb::from_hex(0x8b4513)),
        ];
        Self::with_entries(entries)
    }

    /// Build a catalog from custom entries
    #[must_use]
    pub fn with_entries(entries: Vec<GameEntry>) -> Self {
        Self {
            entries,
            fallback: GameEntry::new('-', "", "", palette::DEFAULT_ACCENT),
        }
    }

    /// All entries in display order
    #[must_use]
    pub fn entries(&self) -> &[GameEntry] {
        &self.entries
    }

    /// Entry for a code; absent or unknown codes yield the fallback entry
    #[must_use]
    pub fn lookup(&self, code: Option<&GameCode>) -> &GameEntry {
        let Some(code) = code else {
            return &self.fallback;
        };
        let mut chars = code.as_str().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self
                .entries
                .iter()
                .find(|entry| entry.code == c)
                .unwrap_or(&self.fallback),
            _ => &self.fallback,
        }
    }

    /// Names and accent to show for a selection
    #[must_use]
    pub fn resolve(&self, selection: &ResultSelection) -> DisplayIdentity {
        if let Some(label) = &selection.custom_label {
            return DisplayIdentity {
                name_english: label.clone(),
                name_hindi: label.clone(),
                accent: palette::DEFAULT_ACCENT,
            };
        }
        let entry = self.lookup(selection.game_code.as_ref());
        tracing::debug!(code = %entry.code, fallback = entry.is_fallback(), "catalog lookup");
        DisplayIdentity {
            name_english: entry.name_english.clone(),
            name_hindi: entry.name_hindi.clone(),
            accent: entry.accent,
        }
    }
}

/// Names and accent to show for a selection
#[must_use]
pub fn resolve_display(catalog: &GameCatalog, selection: &ResultSelection) -> DisplayIdentity {
    catalog.resolve(selection)
}

/// Resolved names and accent for one render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayIdentity {
    /// English name (may be empty)
    pub name_english: String,
    /// Hindi name (may be empty)
    pub name_hindi: String,
    /// Accent colour
    pub accent: Rgb,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::selection::ResultNumber;

    fn code(raw: &str) -> GameCode {
        GameCode::parse(raw).unwrap()
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_known_codes() {
            let catalog = GameCatalog::standard();
            let m = catalog.lookup(Some(&code("M")));
            assert_eq!(m.name_english, "DESHAWER");
            assert_eq!(m.name_hindi, "देशावर");
            assert_eq!(m.accent, Rgb::from_hex(0x3498db));

            let g = catalog.lookup(Some(&code("G")));
            assert_eq!(g.name_english, "GAZIABAD");
            assert_eq!(g.accent.to_string(), "#6c5ce7");
        }

        #[test]
        fn test_lowercase_input_matches() {
            let catalog = GameCatalog::standard();
            assert_eq!(catalog.lookup(Some(&code("s"))).name_english, "SHRI GANESH");
        }

        #[test]
        fn test_absent_code_is_fallback() {
            let catalog = GameCatalog::standard();
            let entry = catalog.lookup(None);
            assert!(entry.is_fallback());
            assert_eq!(entry.accent, palette::DEFAULT_ACCENT);
        }

        #[test]
        fn test_unknown_and_multi_letter_codes_are_fallback() {
            let catalog = GameCatalog::standard();
            assert!(catalog.lookup(Some(&code("Z"))).is_fallback());
            assert!(catalog.lookup(Some(&code("SM"))).is_fallback());
        }

        #[test]
        fn test_standard_has_ten_entries() {
            assert_eq!(GameCatalog::standard().entries().len(), 10);
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolve_uses_catalog() {
            let catalog = GameCatalog::standard();
            let selection = ResultSelection::new()
                .with_game("M")
                .with_number(ResultNumber::new(100).unwrap());
            let identity = catalog.resolve(&selection);
            assert_eq!(identity.name_english, "DESHAWER");
            assert_eq!(identity.accent, Rgb::from_hex(0x3498db));
        }

        #[test]
        fn test_custom_label_overrides_both_names() {
            let catalog = GameCatalog::standard();
            let selection = ResultSelection::new()
                .with_game("G")
                .with_custom_label("Diwali Special");
            let identity = catalog.resolve(&selection);
            assert_eq!(identity.name_english, "Diwali Special");
            assert_eq!(identity.name_hindi, "Diwali Special");
            assert_eq!(identity.accent, palette::DEFAULT_ACCENT);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_label_overrides_any_code(raw in "[A-Za-z]{0,3}", label in "[A-Za-z][A-Za-z ]{0,20}") {
                let catalog = GameCatalog::standard();
                let selection = ResultSelection::new().with_game(&raw).with_custom_label(&label);
                let identity = catalog.resolve(&selection);
                prop_assert_eq!(&identity.name_english, label.trim());
                prop_assert_eq!(&identity.name_hindi, label.trim());
            }

            #[test]
            fn prop_unknown_codes_fall_back(c in "[A-Z]") {
                let catalog = GameCatalog::standard();
                let entry = catalog.lookup(Some(&code(&c)));
                let known = "SMEFHNTGLK".contains(c.as_str());
                prop_assert_eq!(entry.is_fallback(), !known);
            }
        }
    }
}
