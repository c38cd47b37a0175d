//! Frames for video capture.

use crate::canvas::RenderedCard;
use crate::compositor::CardCompositor;
use crate::preview::{PreviewState, PreviewView};
use crate::result::{CardError, CardResult};
use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Produces the current picture of the preview region
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Rasterize at `width` x `height`
    async fn rasterize(&self, width: u32, height: u32) -> CardResult<RgbaImage>;
}

/// Rasterizes the last rendered preview through the card compositor
#[derive(Debug)]
pub struct CardFrameSource {
    compositor: Arc<CardCompositor>,
    state: PreviewState,
    card: OnceCell<RgbaImage>,
}

impl CardFrameSource {
    /// Source for a rendered preview state
    #[must_use]
    pub fn new(compositor: Arc<CardCompositor>, state: PreviewState) -> Self {
        Self {
            compositor,
            state,
            card: OnceCell::new(),
        }
    }

    /// Source for whatever `view` shows now
    ///
    /// # Errors
    ///
    /// Returns error if the view has never been rendered
    pub fn from_view(compositor: Arc<CardCompositor>, view: &PreviewView) -> CardResult<Self> {
        let state = view
            .snapshot()
            .cloned()
            .ok_or_else(|| CardError::video("Preview has not been rendered yet"))?;
        Ok(Self::new(compositor, state))
    }

    /// Preview state being captured
    #[must_use]
    pub fn state(&self) -> &PreviewState {
        &self.state
    }
}

#[async_trait]
impl FrameSource for CardFrameSource {
    async fn rasterize(&self, width: u32, height: u32) -> CardResult<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(CardError::video(format!(
                "Cannot rasterize a {width}x{height} frame"
            )));
        }
        let card = self
            .card
            .get_or_try_init(|| async {
                let state = &self.state;
                self.compositor
                    .compose_with(&state.selection, state.illustration, state.day)
                    .await
                    .map(RenderedCard::into_image)
            })
            .await?;
        Ok(imageops::resize(card, width, height, FilterType::Triangle))
    }
}
