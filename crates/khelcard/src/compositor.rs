//! Full-size result card layout.
//!
//! Every composition starts from a blank 1400x1000 surface. Image assets are
//! awaited together; a missing asset becomes a placeholder block and never
//! aborts the card.

use crate::assets::{AssetOutcome, AssetStore};
use crate::calendar::CalendarDay;
use crate::canvas::{Canvas, CardFont, Point, Rect, RenderedCard, Shadow, TextStyle};
use crate::catalog::GameCatalog;
use crate::color::palette;
use crate::illustration::{Illustration, IllustrationPicker};
use crate::result::CardResult;
use crate::selection::ResultSelection;
use std::sync::Arc;

/// Card width in pixels
pub const CARD_WIDTH: u32 = 1400;
/// Card height in pixels
pub const CARD_HEIGHT: u32 = 1000;
/// Title drawn across the top
pub const DEFAULT_TITLE: &str = "Shri Ganesh Company";
/// Corner logo asset
pub const LOGO_ASSET: &str = "Corner_ganesh_logo.png";
/// Glyphs along the bottom edge
pub const DECORATIONS: [&str; 8] = ["🌸", "💎", "🕉️", "🔔", "🪔", "🌺", "⭐", "🏺"];

const FRAME_RECT: Rect = Rect::new(20, 20, 1360, 960);
const LOGO_RECT: Rect = Rect::new(40, 40, 150, 150);
const ILLUSTRATION_RECT: Rect = Rect::new(50, 350, 300, 200);
const KUNDLI_CENTER: Point = Point::new(1320.0, 80.0);
const COLUMN_X: f32 = 1200.0;

/// Lays out a selection onto a fresh card surface
#[derive(Debug, Clone)]
pub struct CardCompositor {
    catalog: Arc<GameCatalog>,
    assets: Arc<dyn AssetStore>,
    picker: IllustrationPicker,
    font: Option<Arc<CardFont>>,
    title: String,
    logo: String,
}

impl CardCompositor {
    /// Compositor with the default title, logo and bundled font
    #[must_use]
    pub fn new(catalog: Arc<GameCatalog>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            catalog,
            assets,
            picker: IllustrationPicker::default(),
            font: CardFont::bundled().map(Arc::new),
            title: DEFAULT_TITLE.to_string(),
            logo: LOGO_ASSET.to_string(),
        }
    }

    /// Set the illustration picker
    #[must_use]
    pub fn with_picker(mut self, picker: IllustrationPicker) -> Self {
        self.picker = picker;
        self
    }

    /// Replace the font used to rasterize text
    #[must_use]
    pub fn with_font(mut self, font: CardFont) -> Self {
        self.font = Some(Arc::new(font));
        self
    }

    /// Set the title text
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the logo asset name
    #[must_use]
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    /// Catalog used to resolve names
    #[must_use]
    pub fn catalog(&self) -> &Arc<GameCatalog> {
        &self.catalog
    }

    /// Whether text will be rasterized
    #[must_use]
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Compose a card, picking the illustration from the game code
    ///
    /// # Errors
    ///
    /// Returns error if the card surface cannot be allocated
    pub async fn compose(
        &self,
        selection: &ResultSelection,
        day: CalendarDay,
    ) -> CardResult<RenderedCard> {
        let illustration = self.picker.pick(selection.game_code.as_ref());
        self.compose_with(selection, illustration, day).await
    }

    /// Compose a card with a given illustration
    ///
    /// # Errors
    ///
    /// Returns error if the card surface cannot be allocated
    pub async fn compose_with(
        &self,
        selection: &ResultSelection,
        illustration: Illustration,
        day: CalendarDay,
    ) -> CardResult<RenderedCard> {
        let illustration_asset = illustration.asset_name();
        let (logo, picture) = futures::join!(
            self.assets.load_image(&self.logo),
            self.assets.load_image(&illustration_asset),
        );

        let identity = self.catalog.resolve(selection);
        let number = selection.number_text();
        let long_date = day.long_date();
        let accent = identity.accent;

        let mut canvas = Canvas::new(CARD_WIDTH, CARD_HEIGHT, self.font.clone())?;
        canvas.fill_rect(Rect::new(0, 0, CARD_WIDTH, CARD_HEIGHT), palette::WHITE);
        canvas.stroke_rect(FRAME_RECT, palette::FRAME, 4.0);

        match &logo {
            AssetOutcome::Loaded(img) => canvas.draw_image(&self.logo, img, LOGO_RECT),
            AssetOutcome::Unavailable { .. } => {
                canvas.placeholder(LOGO_RECT, palette::GOLD, "🕉️");
                canvas.fill_text(
                    "🕉️",
                    Point::new(115.0, 130.0),
                    TextStyle::new(90.0, palette::BROWN),
                );
            }
        }

        canvas.fill_text(&self.title, Point::new(700.0, 120.0), TextStyle::new(48.0, accent));

        canvas.stroke_ring(KUNDLI_CENTER, 66.0, palette::BROWN, 2.0);
        canvas.stroke_ring(KUNDLI_CENTER, 63.0, palette::GOLD, 3.0);
        canvas.stroke_ring(KUNDLI_CENTER, 60.0, accent, 4.0);
        canvas.fill_disc(KUNDLI_CENTER, 58.0, palette::BLUSH);
        canvas.fill_text(
            &number,
            Point::new(1320.0, 75.0),
            TextStyle::new(28.0, palette::KUNDLI_NUMBER),
        );
        canvas.fill_text(
            &long_date,
            Point::new(1320.0, 95.0),
            TextStyle::new(10.0, palette::INK),
        );

        match &picture {
            AssetOutcome::Loaded(img) => {
                canvas.draw_image(&illustration_asset, img, ILLUSTRATION_RECT);
            }
            AssetOutcome::Unavailable { .. } => {
                let caption = illustration.fallback_caption();
                canvas.placeholder(ILLUSTRATION_RECT, palette::PLACEHOLDER, caption);
                canvas.fill_text(
                    caption,
                    Point::new(200.0, 450.0),
                    TextStyle::new(20.0, palette::CAPTION),
                );
            }
        }

        canvas.fill_text(
            &format!("Result Date: {long_date}"),
            Point::new(COLUMN_X, 400.0),
            TextStyle::new(20.0, palette::INK),
        );
        canvas.fill_text(
            &identity.name_english,
            Point::new(COLUMN_X, 450.0),
            TextStyle::new(28.0, palette::INK),
        );
        canvas.fill_text(
            &identity.name_hindi,
            Point::new(COLUMN_X, 490.0),
            TextStyle::new(36.0, accent),
        );
        canvas.fill_text(
            &number,
            Point::new(COLUMN_X, 550.0),
            TextStyle::new(120.0, accent).with_shadow(Shadow {
                color: accent,
                blur: 25.0,
                offset_x: 8,
                offset_y: 8,
            }),
        );

        for (i, glyph) in DECORATIONS.iter().enumerate() {
            let x = 100.0 + 150.0 * i as f32;
            canvas.fill_text(glyph, Point::new(x, 900.0), TextStyle::new(40.0, accent));
        }

        tracing::debug!(
            number = %number,
            illustration = %illustration,
            logo = logo.is_loaded(),
            picture = picture.is_loaded(),
            "card composed"
        );
        Ok(canvas.into_card())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;
    use crate::canvas::DrawOp;
    use crate::color::Rgb;
    use crate::illustration::FixedChoice;
    use crate::selection::ResultForm;
    use image::{Rgba, RgbaImage};

    fn day() -> CalendarDay {
        CalendarDay::from_ymd(2026, 10, 19).unwrap()
    }

    fn compositor(store: MemoryAssetStore) -> CardCompositor {
        CardCompositor::new(Arc::new(GameCatalog::standard()), Arc::new(store))
            .with_picker(IllustrationPicker::new(Arc::new(FixedChoice(0))))
    }

    fn rgba(color: Rgb) -> Rgba<u8> {
        color.to_rgba()
    }

    mod layout_tests {
        use super::*;

        #[tokio::test]
        async fn test_card_dimensions_and_background() {
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("7", "S", "").selection(), day())
                .await
                .unwrap();
            assert_eq!(card.dimensions(), (CARD_WIDTH, CARD_HEIGHT));
            assert_eq!(card.pixel(5, 5), rgba(palette::WHITE));
            assert_eq!(card.pixel(20, 500), rgba(palette::FRAME));
            assert_eq!(card.pixel(700, 978), rgba(palette::FRAME));
        }

        #[tokio::test]
        async fn test_text_runs() {
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("7", "S", "").selection(), day())
                .await
                .unwrap();
            let texts: Vec<_> = card.texts().collect();
            assert!(texts.contains(&DEFAULT_TITLE));
            assert!(texts.contains(&"SHRI GANESH"));
            assert!(texts.contains(&"श्री गणेश"));
            assert!(texts.contains(&"Result Date: October 19, 2026"));
            assert!(texts.contains(&"October 19, 2026"));
            assert_eq!(texts.iter().filter(|t| **t == "07").count(), 2);
            for glyph in DECORATIONS {
                assert!(texts.contains(&glyph));
            }
        }

        #[tokio::test]
        async fn test_kundli_badge() {
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("7", "M", "").selection(), day())
                .await
                .unwrap();
            assert_eq!(card.pixel(1320, 80), rgba(palette::BLUSH));
            assert_eq!(card.pixel(1320, 20), rgba(Rgb::from_hex(0x3498db)));
        }

        #[tokio::test]
        async fn test_big_number_has_shadow() {
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("100", "M", "").selection(), day())
                .await
                .unwrap();
            let shadowed = card.ops().iter().any(|op| {
                matches!(op, DrawOp::Text { text, style, .. }
                    if text == "100" && style.shadow.is_some() && style.size == 120.0)
            });
            assert!(shadowed);
        }

        #[tokio::test]
        async fn test_custom_label_uses_default_accent() {
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("12", "G", "Diwali Special").selection(), day())
                .await
                .unwrap();
            let texts: Vec<_> = card.texts().collect();
            assert!(texts.contains(&"Diwali Special"));
            assert!(!texts.contains(&"GAZIABAD"));
            assert_eq!(card.pixel(1320, 20), rgba(palette::DEFAULT_ACCENT));
        }

        #[tokio::test]
        async fn test_configured_title() {
            let card = compositor(MemoryAssetStore::new())
                .with_title("Ganesh Results")
                .compose(&ResultSelection::new(), day())
                .await
                .unwrap();
            assert!(card.texts().any(|t| t == "Ganesh Results"));
        }
    }

    mod placeholder_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_assets_draw_placeholders() {
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("5", "M", "").selection(), day())
                .await
                .unwrap();
            let placeholders: Vec<_> = card.placeholders().collect();
            assert_eq!(
                placeholders,
                vec![(&LOGO_RECT, "🕉️"), (&ILLUSTRATION_RECT, "King Image")]
            );
            assert_eq!(card.pixel(45, 45), rgba(palette::GOLD));
            assert_eq!(card.pixel(60, 360), rgba(palette::PLACEHOLDER));
        }

        #[tokio::test]
        async fn test_loaded_assets_are_drawn() {
            let logo = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
            let god = RgbaImage::from_pixel(30, 20, Rgba([4, 5, 6, 255]));
            let store = MemoryAssetStore::new()
                .with_image(LOGO_ASSET, &logo)
                .unwrap()
                .with_image("daruseth_image1.jpg", &god)
                .unwrap();
            let card = compositor(store)
                .compose(&ResultSelection::new(), day())
                .await
                .unwrap();

            assert_eq!(card.placeholders().count(), 0);
            assert_eq!(card.pixel(100, 100), Rgba([1, 2, 3, 255]));
            assert_eq!(card.pixel(200, 450), Rgba([4, 5, 6, 255]));
            let images: Vec<_> = card
                .ops()
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Image { asset, .. } => Some(asset.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(images, vec![LOGO_ASSET, "daruseth_image1.jpg"]);
        }

        #[tokio::test]
        async fn test_compose_with_explicit_illustration() {
            let card = compositor(MemoryAssetStore::new())
                .compose_with(
                    &ResultForm::new("7", "S", "").selection(),
                    Illustration::ShriGanesh(4),
                    day(),
                )
                .await
                .unwrap();
            assert!(card
                .placeholders()
                .any(|(_, caption)| caption == "Random Shri Ganesh Image"));
        }

    }

    mod lettering_tests {
        use super::*;

        fn inked_in(
            card: &RenderedCard,
            xs: std::ops::Range<u32>,
            ys: std::ops::Range<u32>,
        ) -> usize {
            ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
                .filter(|&(x, y)| card.pixel(x, y) != rgba(palette::WHITE))
                .count()
        }

        #[tokio::test]
        async fn test_default_compositor_rasterizes_text() {
            let c = compositor(MemoryAssetStore::new());
            assert!(c.has_font());
            let card = c
                .compose(&ResultForm::new("7", "S", "").selection(), day())
                .await
                .unwrap();

            assert!(card
                .ops()
                .iter()
                .filter(|op| matches!(op, DrawOp::Text { .. }))
                .all(|op| matches!(op, DrawOp::Text { rasterized: true, .. })));
            assert!(inked_in(&card, 450..950, 70..130) > 200, "title");
            assert!(inked_in(&card, 1050..1350, 380..405) > 100, "result date");
            assert!(inked_in(&card, 1050..1350, 420..600) > 2000, "names and number");
        }

        #[tokio::test]
        async fn test_big_number_is_centred_on_column() {
            let accent = Rgb::from_hex(0x3498db);
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("80", "M", "").selection(), day())
                .await
                .unwrap();

            let solid: Vec<u32> = (495..600)
                .flat_map(|y| (1000..1390).map(move |x| (x, y)))
                .filter(|&(x, y)| card.pixel(x, y) == rgba(accent))
                .map(|(x, _)| x)
                .collect();
            assert!(solid.len() > 500);
            let (min, max) = (solid.iter().min().unwrap(), solid.iter().max().unwrap());
            let mid = (min + max) / 2;
            assert!((1185..=1215).contains(&mid), "number spans {min}..{max}");
        }

        #[tokio::test]
        async fn test_number_shadow_trails_down_right() {
            let accent = Rgb::from_hex(0x3498db);
            let card = compositor(MemoryAssetStore::new())
                .compose(&ResultForm::new("80", "M", "").selection(), day())
                .await
                .unwrap();
            let tinted = |p: Rgba<u8>| p != rgba(palette::WHITE) && p != rgba(accent);

            let below = inked_in(&card, 1100..1300, 556..575);
            assert!(below > 0, "shadow below the baseline");
            let (x, y) = (1100..1300)
                .flat_map(|x| (556..575).map(move |y| (x, y)))
                .find(|&(x, y)| tinted(card.pixel(x, y)))
                .unwrap();
            let p = card.pixel(x, y);
            assert!(p[2] > p[0], "shadow takes the accent hue, got {p:?}");
        }
    }
}
