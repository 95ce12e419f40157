// this_file: crates/scrawl-layout/src/geometry.rs

//! Page size resolution and the writable areas derived from it.

use scrawl_core::{Orientation, PageSettings, Rect, Result, ScrawlError};
use serde::Serialize;

/// Space kept between the margin guide (or content edge) and the first glyph.
pub const TEXT_GUTTER: f32 = 20.0;

/// Resolved page size and drawable area, in nominal pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Page minus margins; ruling is confined to it
    pub content: Rect,
}

impl PageGeometry {
    /// Resolve named or custom size, orientation and margins.
    pub fn resolve(page: &PageSettings) -> Result<Self> {
        let (base_w, base_h) = page
            .size
            .base_pixels()
            .unwrap_or((page.custom_width, page.custom_height));
        if base_w == 0 || base_h == 0 {
            return Err(ScrawlError::geometry(
                base_w as f32,
                base_h as f32,
                "page dimensions must be non-zero",
            ));
        }
        let (width, height) = match page.orientation {
            Orientation::Portrait => (base_w, base_h),
            Orientation::Landscape => (base_h, base_w),
        };

        let m = &page.margins;
        let content = Rect::new(
            m.left,
            m.top,
            width as f32 - m.left - m.right,
            height as f32 - m.top - m.bottom,
        );
        if content.width <= 0.0 || content.height <= 0.0 {
            return Err(ScrawlError::geometry(
                width as f32,
                height as f32,
                format!(
                    "margins leave a {}x{} content area",
                    content.width, content.height
                ),
            ));
        }

        Ok(Self {
            pixel_width: width,
            pixel_height: height,
            content,
        })
    }

    /// Box the text is laid into: `content` with its left edge pushed past
    /// the margin guide at `guide_inset`, or by the gutter alone when no
    /// guide is drawn.
    pub fn text_frame(&self, guide_inset: Option<f32>) -> Result<Rect> {
        let offset = guide_inset.map_or(TEXT_GUTTER, |inset| inset + TEXT_GUTTER);
        let frame = Rect::new(
            self.content.x + offset,
            self.content.y,
            self.content.width - offset,
            self.content.height,
        );
        if frame.width <= 0.0 {
            return Err(ScrawlError::geometry(
                self.pixel_width as f32,
                self.pixel_height as f32,
                format!("no room for text after a {offset}px guide offset"),
            ));
        }
        Ok(frame)
    }
}
