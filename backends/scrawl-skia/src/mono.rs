// this_file: backends/scrawl-skia/src/mono.rs

//! Built-in bitmap face used when no outline font can be found.

use crate::context::RenderContext;
use crate::fonts::{GlyphFace, GlyphInk};
use dashmap::DashMap;
use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use scrawl_core::TextMeasurer;
use std::convert::Infallible;
use std::sync::Arc;
use tiny_skia::{Pixmap, Transform};

const FONT: &MonoFont<'static> = &FONT_10X20;

/// Coverage of one character cell.
struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<bool>,
}

impl GlyphMask {
    fn is_blank(&self) -> bool {
        !self.coverage.iter().any(|&on| on)
    }

    fn to_pixmap(&self, ink: scrawl_core::Rgba) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height)?;
        let alpha = ink.a as u16;
        let premul = |c: u8| ((c as u16 * alpha + 127) / 255) as u8;
        let px = [premul(ink.r), premul(ink.g), premul(ink.b), ink.a];
        for (dst, &on) in pixmap.data_mut().chunks_exact_mut(4).zip(&self.coverage) {
            if on {
                dst.copy_from_slice(&px);
            }
        }
        Some(pixmap)
    }
}

/// DrawTarget collecting lit pixels of a single cell.
struct MaskTarget {
    size: Size,
    coverage: Vec<bool>,
}

impl OriginDimensions for MaskTarget {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for MaskTarget {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.size.width as i32;
        let h = self.size.height as i32;
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= w || point.y >= h {
                continue;
            }
            let idx = (point.y * w + point.x) as usize;
            self.coverage[idx] = color == BinaryColor::On;
        }
        Ok(())
    }
}

/// Fixed-pitch 10x20 face scaled to the requested size.
///
/// Advances are `size / 2` for every character, which makes layout tests
/// independent of the fonts installed on the machine.
pub struct MonoFace {
    masks: DashMap<char, Arc<GlyphMask>>,
}

impl Default for MonoFace {
    fn default() -> Self {
        Self::new()
    }
}

impl MonoFace {
    pub fn new() -> Self {
        Self {
            masks: DashMap::new(),
        }
    }

    fn cell_scale(size: f32) -> f32 {
        size / FONT.character_size.height as f32
    }

    fn mask(&self, ch: char) -> Arc<GlyphMask> {
        if let Some(mask) = self.masks.get(&ch) {
            return mask.value().clone();
        }
        let size = FONT.character_size;
        let mut target = MaskTarget {
            size,
            coverage: vec![false; (size.width * size.height) as usize],
        };
        let style = MonoTextStyle::new(FONT, BinaryColor::On);
        let mut buf = [0u8; 4];
        let text = ch.encode_utf8(&mut buf);
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut target);
        let mask = Arc::new(GlyphMask {
            width: size.width,
            height: size.height,
            coverage: target.coverage,
        });
        self.masks.insert(ch, mask.clone());
        mask
    }
}

impl TextMeasurer for MonoFace {
    fn family(&self) -> &str {
        "builtin"
    }

    fn char_advance(&self, _ch: char, size: f32) -> f32 {
        FONT.character_size.width as f32 * Self::cell_scale(size)
    }
}

impl GlyphFace for MonoFace {
    fn draw_glyph(
        &self,
        ctx: &mut RenderContext,
        ch: char,
        size: f32,
        transform: Transform,
        ink: &GlyphInk,
    ) {
        let mask = self.mask(ch);
        if mask.is_blank() {
            return;
        }
        let Some(pixmap) = mask.to_pixmap(ink.fill) else {
            return;
        };
        let k = Self::cell_scale(size);
        let local = transform
            .pre_scale(k, k)
            .pre_translate(0.0, -(FONT.baseline as f32));
        ctx.draw_pixmap(pixmap.as_ref(), local, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::Rgba;

    #[test]
    fn test_advance_is_half_size() {
        let face = MonoFace::new();
        assert_eq!(face.char_advance('W', 40.0), 20.0);
        assert_eq!(face.measure("abcd", 20.0, 0.0, 0.0), 40.0);
    }

    #[test]
    fn test_space_is_blank() {
        let face = MonoFace::new();
        assert!(face.mask(' ').is_blank());
        assert!(!face.mask('A').is_blank());
    }

    #[test]
    fn test_draws_above_baseline() {
        let face = MonoFace::new();
        let mut ctx = RenderContext::new(60, 60, 1.0, Rgba::WHITE).unwrap();
        face.draw_glyph(
            &mut ctx,
            'H',
            40.0,
            Transform::from_translate(10.0, 45.0),
            &GlyphInk::solid(Rgba::BLACK),
        );
        let mut inked_above = 0;
        let mut inked_below = 0;
        for y in 0..60 {
            for x in 0..60 {
                if ctx.pixel(x, y).is_some_and(|px| px.r < 128) {
                    if y < 45 {
                        inked_above += 1;
                    } else if y >= 50 {
                        inked_below += 1;
                    }
                }
            }
        }
        assert!(inked_above > 20, "glyph body missing: {inked_above}");
        assert_eq!(inked_below, 0);
    }
}
