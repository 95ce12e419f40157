// this_file: crates/scrawl-render/src/jitter.rs

//! Per-glyph perturbation that makes a line look handwritten.

use rand::Rng;
use scrawl_core::{Direction, Settings};
use scrawl_layout::Line;
use scrawl_skia::{GlyphFace, GlyphInk, RenderContext, Transform};

/// Darkening applied to the pen-pressure outline.
pub const OUTLINE_DARKEN: f32 = 0.15;

/// Where one character lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    pub x: f32,
    pub y: f32,
    /// Clockwise rotation about the glyph origin, in radians
    pub rotation: f32,
}

/// Draws lines glyph by glyph with seeded positional noise.
pub struct GlyphJitterRenderer<'a> {
    face: &'a dyn GlyphFace,
    settings: &'a Settings,
}

impl<'a> GlyphJitterRenderer<'a> {
    pub fn new(face: &'a dyn GlyphFace, settings: &'a Settings) -> Self {
        Self { face, settings }
    }

    /// Compute placements for `text` starting at `(x, baseline)`.
    ///
    /// With zero strength no random numbers are drawn and every offset is
    /// exactly zero. Right-to-left text is walked from its last character.
    pub fn place<R: Rng + ?Sized>(
        &self,
        text: &str,
        x: f32,
        baseline: f32,
        rng: &mut R,
    ) -> Vec<GlyphPlacement> {
        let typography = &self.settings.typography;
        let strength = self.settings.jitter.strength;
        let size = typography.font_size;
        let s = strength * size / 30.0;
        let jittered = strength > 0.0;

        let chars: Vec<char> = match typography.direction {
            Direction::Ltr => text.chars().collect(),
            Direction::Rtl => text.chars().rev().collect(),
        };

        let mut cursor = x;
        let mut placements = Vec::with_capacity(chars.len());
        for ch in chars {
            let (dx, dy, rotation) = if jittered {
                (
                    (rng.gen::<f32>() - 0.5) * 2.0 * s,
                    (rng.gen::<f32>() - 0.5) * 4.0 * s,
                    (rng.gen::<f32>() - 0.5) * 0.1 * strength,
                )
            } else {
                (0.0, 0.0, 0.0)
            };
            placements.push(GlyphPlacement {
                ch,
                x: cursor + dx,
                y: baseline + dy,
                rotation,
            });

            let mut advance = self.face.char_advance(ch, size) + typography.letter_spacing;
            if ch == ' ' {
                advance += typography.word_spacing;
            }
            if jittered {
                advance += (rng.gen::<f32>() - 0.5) * 0.4 * s;
            }
            cursor += advance;
        }
        placements
    }

    /// Ink for every glyph of a line.
    pub fn ink(&self) -> GlyphInk {
        let size = self.settings.typography.font_size;
        let fill = self.settings.colors.ink.with_alpha(255);
        GlyphInk {
            fill,
            outline: (!self.settings.jitter.cursive)
                .then(|| (fill.darken(OUTLINE_DARKEN), (size / 40.0).max(0.5))),
        }
    }

    /// Draw one line. Ink opacity is applied once for the whole line by
    /// drawing into a scratch band and compositing it.
    pub fn draw_line<R: Rng + ?Sized>(&self, ctx: &mut RenderContext, line: &Line, rng: &mut R) {
        let placements = self.place(&line.text, line.x, line.baseline, rng);
        if placements.iter().all(|p| p.ch.is_whitespace()) {
            return;
        }
        let colors = &self.settings.colors;
        let opacity = colors.ink_opacity * colors.ink.a as f32 / 255.0;
        if opacity >= 1.0 {
            self.draw_placements(ctx, &placements);
            return;
        }
        if opacity <= 0.0 {
            return;
        }

        let size = self.settings.typography.font_size;
        let band_top = line.baseline - size * 1.5;
        let mut band = match ctx.band_layer(band_top, size * 2.5) {
            Ok(band) => band,
            Err(err) => {
                log::warn!(target: "scrawl::render", "line layer unavailable, drawing opaque: {err}");
                self.draw_placements(ctx, &placements);
                return;
            }
        };
        self.draw_placements(&mut band, &placements);
        ctx.composite(&band, opacity);
    }

    fn draw_placements(&self, ctx: &mut RenderContext, placements: &[GlyphPlacement]) {
        let size = self.settings.typography.font_size;
        let ink = self.ink();
        for p in placements {
            if p.ch.is_whitespace() {
                continue;
            }
            let transform = Transform::from_translate(p.x, p.y)
                .pre_concat(Transform::from_rotate(p.rotation.to_degrees()));
            self.face.draw_glyph(ctx, p.ch, size, transform, &ink);
        }
    }
}
