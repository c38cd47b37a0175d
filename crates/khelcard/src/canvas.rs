//! Off-screen drawing surface for the result card.
//!
//! A small 2D API over a `tiny_skia::Pixmap`: filled and stroked rectangles,
//! rings, discs, scaled images and centred text with an optional drop shadow.
//! Every call is also appended to a draw log so callers can inspect what was
//! drawn without decoding pixels.

use crate::color::Rgb;
use crate::result::{CardError, CardResult};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use serde::Serialize;
use std::sync::Arc;
use tiny_skia::{
    ColorU8, FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

/// Bold sans face drawn when no other font is configured
const BUNDLED_FONT: &[u8] = include_bytes!("../fonts/DejaVuSans-Bold.ttf");

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Rect {
    /// Create a rectangle
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

/// Point in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Drop shadow behind text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    /// Shadow colour
    pub color: Rgb,
    /// Blur radius (canvas `shadowBlur` semantics: sigma is half of it)
    pub blur: f32,
    /// Horizontal offset
    pub offset_x: i32,
    /// Vertical offset
    pub offset_y: i32,
}

/// Font size, colour and shadow for one text run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    /// Pixel size
    pub size: f32,
    /// Fill colour
    pub color: Rgb,
    /// Optional drop shadow
    pub shadow: Option<Shadow>,
}

impl TextStyle {
    /// Plain text style
    #[must_use]
    pub const fn new(size: f32, color: Rgb) -> Self {
        Self {
            size,
            color,
            shadow: None,
        }
    }

    /// Add a drop shadow
    #[must_use]
    pub const fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    /// Solid rectangle
    FillRect {
        /// Area
        rect: Rect,
        /// Fill colour
        color: Rgb,
    },
    /// Rectangle outline centred on the edges
    StrokeRect {
        /// Outline
        rect: Rect,
        /// Stroke colour
        color: Rgb,
        /// Stroke width
        line_width: f32,
    },
    /// Circle outline
    Ring {
        /// Centre
        center: Point,
        /// Radius of the stroke centre line
        radius: f32,
        /// Stroke colour
        color: Rgb,
        /// Stroke width
        line_width: f32,
    },
    /// Filled circle
    Disc {
        /// Centre
        center: Point,
        /// Radius
        radius: f32,
        /// Fill colour
        color: Rgb,
    },
    /// Image asset scaled into a rectangle
    Image {
        /// Asset name
        asset: String,
        /// Destination
        rect: Rect,
    },
    /// Stand-in block for an asset that failed to load
    Placeholder {
        /// Area the asset would have covered
        rect: Rect,
        /// Caption or glyph describing the missing asset
        caption: String,
    },
    /// Centred text run
    Text {
        /// Content
        text: String,
        /// Centre x, alphabetic baseline y
        at: Point,
        /// Style
        style: TextStyle,
        /// Whether glyphs were rasterized (false without a font)
        rasterized: bool,
    },
}

/// TrueType font used for card text
#[derive(Debug, Clone)]
pub struct CardFont {
    font: Font<'static>,
}

/// Rasterized text, positioned relative to the pen origin on the baseline
#[derive(Debug, Clone)]
struct GlyphLayer {
    image: RgbaImage,
    left: i32,
    top: i32,
}

impl CardFont {
    /// Parse a TrueType/OpenType font; `None` if the bytes are not a font
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font })
    }

    /// The font shipped with the crate
    #[must_use]
    pub fn bundled() -> Option<Self> {
        Font::try_from_bytes(BUNDLED_FONT).map(|font| Self { font })
    }

    /// Advance width of `text` at `size` pixels
    #[must_use]
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let scale = Scale::uniform(size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| {
                g.position().x + g.unpositioned().h_metrics().advance_width
            })
    }

    fn layer(&self, text: &str, size: f32, color: Rgb) -> Option<GlyphLayer> {
        let scale = Scale::uniform(size);
        let glyphs: Vec<_> = self.font.layout(text, scale, point(0.0, 0.0)).collect();

        let boxes: Vec<_> = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).collect();
        let min_x = boxes.iter().map(|b| b.min.x).min()?;
        let min_y = boxes.iter().map(|b| b.min.y).min()?;
        let max_x = boxes.iter().map(|b| b.max.x).max()?;
        let max_y = boxes.iter().map(|b| b.max.y).max()?;

        let mut image = RgbaImage::new((max_x - min_x) as u32, (max_y - min_y) as u32);
        for glyph in &glyphs {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                let px = (gx as i32 + bb.min.x - min_x) as u32;
                let py = (gy as i32 + bb.min.y - min_y) as u32;
                if px >= image.width() || py >= image.height() {
                    return;
                }
                let alpha = (v * 255.0).round().clamp(0.0, 255.0) as u8;
                let dst = image.get_pixel_mut(px, py);
                if alpha > dst[3] {
                    *dst = Rgba([color.r, color.g, color.b, alpha]);
                }
            });
        }

        Some(GlyphLayer {
            image,
            left: min_x,
            top: min_y,
        })
    }
}

/// A composed card: the pixels plus the draw log that produced them
#[derive(Debug, Clone)]
pub struct RenderedCard {
    image: RgbaImage,
    ops: Vec<DrawOp>,
}

impl RenderedCard {
    /// Card pixels
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take ownership of the pixels
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Surface size
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Draw log in call order
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text runs in call order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Placeholders drawn for missing assets
    pub fn placeholders(&self) -> impl Iterator<Item = (&Rect, &str)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Placeholder { rect, caption } => Some((rect, caption.as_str())),
            _ => None,
        })
    }

    /// Pixel at a position
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }
}

/// Drawing surface
#[derive(Debug, Clone)]
pub struct Canvas {
    surface: Pixmap,
    ops: Vec<DrawOp>,
    font: Option<Arc<CardFont>>,
}

impl Canvas {
    /// Blank, fully transparent surface
    ///
    /// # Errors
    ///
    /// Returns `CardError::Encoding` if the size is zero or too large
    pub fn new(width: u32, height: u32, font: Option<Arc<CardFont>>) -> CardResult<Self> {
        let surface = Pixmap::new(width, height).ok_or_else(|| {
            CardError::encoding(format!("cannot allocate a {width}x{height} surface"))
        })?;
        Ok(Self {
            surface,
            ops: Vec::new(),
            font,
        })
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::FillRect { rect, color });
        self.paint_rect(rect, color);
    }

    /// Outline a rectangle; the stroke straddles the edges like a 2D canvas
    pub fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f32) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            color,
            line_width,
        });
        if let Some(area) = rect.to_skia() {
            self.stroke(&PathBuilder::from_rect(area), color, line_width);
        }
    }

    /// Stroke a circle of `radius` (centre of the stroke)
    pub fn stroke_ring(&mut self, center: Point, radius: f32, color: Rgb, line_width: f32) {
        self.ops.push(DrawOp::Ring {
            center,
            radius,
            color,
            line_width,
        });
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.stroke(&path, color, line_width);
        }
    }

    /// Fill a circle
    pub fn fill_disc(&mut self, center: Point, radius: f32, color: Rgb) {
        self.ops.push(DrawOp::Disc {
            center,
            radius,
            color,
        });
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.surface.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Draw an image scaled to fill `rect`
    pub fn draw_image(&mut self, asset: &str, img: &RgbaImage, rect: Rect) {
        self.ops.push(DrawOp::Image {
            asset: asset.to_string(),
            rect,
        });
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let scaled = if img.dimensions() == (rect.width, rect.height) {
            img.clone()
        } else {
            imageops::resize(img, rect.width, rect.height, FilterType::Triangle)
        };
        self.draw_layer(&scaled, rect.x as i32, rect.y as i32);
    }

    /// Record a placeholder and fill its block
    pub fn placeholder(&mut self, rect: Rect, fill: Rgb, caption: &str) {
        self.ops.push(DrawOp::Placeholder {
            rect,
            caption: caption.to_string(),
        });
        self.paint_rect(rect, fill);
    }

    /// Draw text centred on `at.x` with its baseline on `at.y`
    pub fn fill_text(&mut self, text: &str, at: Point, style: TextStyle) {
        let rasterized = match self.font.clone() {
            Some(font) => self.paint_text(&font, text, at, style),
            None => false,
        };
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            style,
            rasterized,
        });
    }

    /// Finish drawing
    #[must_use]
    pub fn into_card(self) -> RenderedCard {
        let mut image = RgbaImage::new(self.surface.width(), self.surface.height());
        for (dst, src) in image.pixels_mut().zip(self.surface.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RenderedCard {
            image,
            ops: self.ops,
        }
    }

    fn paint_rect(&mut self, rect: Rect, color: Rgb) {
        if let Some(area) = rect.to_skia() {
            self.surface
                .fill_rect(area, &paint(color), Transform::identity(), None);
        }
    }

    fn stroke(&mut self, path: &tiny_skia::Path, color: Rgb, line_width: f32) {
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.surface
            .stroke_path(path, &paint(color), &stroke, Transform::identity(), None);
    }

    /// Source-over an unpremultiplied layer with its top-left at (x, y)
    fn draw_layer(&mut self, layer: &RgbaImage, x: i32, y: i32) {
        let Some(pixmap) = premultiplied(layer) else {
            return;
        };
        self.surface.draw_pixmap(
            x,
            y,
            pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn paint_text(&mut self, font: &CardFont, text: &str, at: Point, style: TextStyle) -> bool {
        let Some(layer) = font.layer(text, style.size, style.color) else {
            return false;
        };
        let origin_x = (at.x - font.measure(text, style.size) / 2.0).round() as i32;
        let origin_y = at.y.round() as i32;
        let x = origin_x + layer.left;
        let y = origin_y + layer.top;

        if let Some(shadow) = style.shadow {
            let (shadow_layer, pad) = shadow_layer(&layer.image, shadow);
            self.draw_layer(&shadow_layer, x - pad + shadow.offset_x, y - pad + shadow.offset_y);
        }
        self.draw_layer(&layer.image, x, y);
        true
    }
}

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

fn premultiplied(layer: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(layer.width(), layer.height())?;
    let data = layer
        .pixels()
        .flat_map(|p| {
            let c = ColorU8::from_rgba(p[0], p[1], p[2], p[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Pixmap::from_vec(data, size)
}

/// Blurred, tinted copy of a glyph layer, padded so the blur is not clipped
fn shadow_layer(glyphs: &RgbaImage, shadow: Shadow) -> (RgbaImage, i32) {
    let sigma = (shadow.blur / 2.0).max(0.0);
    let pad = (sigma * 3.0).ceil() as u32;
    let Rgb { r, g, b } = shadow.color;
    let mut padded = RgbaImage::from_pixel(
        glyphs.width() + 2 * pad,
        glyphs.height() + 2 * pad,
        Rgba([r, g, b, 0]),
    );
    for (x, y, p) in glyphs.enumerate_pixels() {
        padded.put_pixel(x + pad, y + pad, Rgba([r, g, b, p[3]]));
    }
    let blurred = if sigma > 0.0 {
        imageops::blur(&padded, sigma)
    } else {
        padded
    };
    (blurred, pad as i32)
}
