// this_file: crates/scrawl-render/src/overlay.rs

//! Anchored image overlays drawn on top of the ink.

use log::warn;
use scrawl_core::{Anchor, Bitmap, ImageOverlay, OverlaySource, Rect, Result, ScrawlError};
use scrawl_skia::{decode_image, RenderContext};
use std::borrow::Cow;

/// Draws every overlay that belongs to one page, in list order.
pub struct ImageOverlayCompositor<'a> {
    overlays: &'a [ImageOverlay],
}

impl<'a> ImageOverlayCompositor<'a> {
    pub fn new(overlays: &'a [ImageOverlay]) -> Self {
        Self { overlays }
    }

    /// Returns how many overlays were drawn. Overlays that cannot be
    /// decoded or placed are skipped with a warning.
    pub fn draw(&self, ctx: &mut RenderContext, page_index: usize, area: &Rect) -> usize {
        let mut drawn = 0;
        for (i, overlay) in self
            .overlays
            .iter()
            .enumerate()
            .filter(|(_, o)| o.page == page_index)
        {
            match draw_overlay(ctx, overlay, area) {
                Ok(()) => drawn += 1,
                Err(err) => warn!(
                    target: "scrawl::render",
                    "overlay {i} on page {page_index} skipped: {err}"
                ),
            }
        }
        drawn
    }
}

fn draw_overlay(ctx: &mut RenderContext, overlay: &ImageOverlay, area: &Rect) -> Result<()> {
    let anchor = Anchor::parse(&overlay.anchor).ok_or_else(|| {
        ScrawlError::setting("anchor", format!("unrecognised anchor '{}'", overlay.anchor))
    })?;
    if !(overlay.scale.is_finite() && overlay.scale > 0.0) {
        return Err(ScrawlError::setting(
            "scale",
            format!("{} must be > 0", overlay.scale),
        ));
    }
    let bitmap: Cow<'_, Bitmap> = match &overlay.source {
        OverlaySource::Decoded(bitmap) => Cow::Borrowed(bitmap.as_ref()),
        OverlaySource::Encoded(bytes) => Cow::Owned(decode_image(bytes)?),
    };
    let width = bitmap.width as f32 * overlay.scale;
    let height = bitmap.height as f32 * overlay.scale;
    let (x, y) = anchor.place(area, width, height);
    ctx.draw_bitmap(&bitmap, x, y, overlay.scale, overlay.opacity)
}
