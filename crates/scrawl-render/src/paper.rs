// this_file: crates/scrawl-render/src/paper.rs

//! Background, ruling, margin guide, line numbers and paper grain.

use log::warn;
use rand::Rng;
use scrawl_core::utils::steps;
use scrawl_core::{Bitmap, Rect, RulingMode, Settings};
use scrawl_layout::PageGeometry;
use scrawl_skia::{GlyphFace, GlyphInk, RenderContext, Transform};

/// Radius of the dots on dotted paper.
pub const DOT_RADIUS: f32 = 2.0;
/// Dash pattern of the cursive top guide.
pub const CURSIVE_DASH: [f32; 2] = [5.0, 5.0];
/// Gap between a line number's right edge and the margin guide.
pub const LINE_NUMBER_GAP: f32 = 10.0;
/// Pixel size of line number digits.
pub const LINE_NUMBER_SIZE: f32 = 16.0;

/// Guide positions of one cursive row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursiveRow {
    /// Dashed ascender guide
    pub top: f32,
    /// Solid writing baseline
    pub baseline: f32,
    /// Solid descender guide
    pub bottom: f32,
}

/// Horizontal rule positions for ruled, grid and dotted paper.
pub fn rule_rows(content: &Rect, spacing: f32) -> Vec<f32> {
    steps(content.y, content.bottom(), spacing).collect()
}

/// Rows of the cursive scheme; a row is kept only while its lower guide
/// stays inside `content`.
pub fn cursive_rows(content: &Rect, spacing: f32) -> Vec<CursiveRow> {
    steps(content.y, content.bottom() - spacing, spacing)
        .map(|y| CursiveRow {
            top: y,
            baseline: y + spacing / 2.0,
            bottom: y + spacing,
        })
        .collect()
}

/// Baselines that receive a line number, in row order.
pub fn numbered_rows(mode: RulingMode, content: &Rect, spacing: f32) -> Vec<f32> {
    match mode {
        RulingMode::Ruled | RulingMode::Grid | RulingMode::Dotted => rule_rows(content, spacing),
        RulingMode::Cursive => cursive_rows(content, spacing)
            .into_iter()
            .map(|row| row.baseline)
            .collect(),
        RulingMode::Blank => Vec::new(),
    }
}

/// Top-left corner and uniform scale that make an image of `image`
/// size cover a `page` sized area, centred, with the overflow cropped.
pub fn cover_fit(image: (u32, u32), page: (f32, f32)) -> Option<(f32, f32, f32)> {
    let (iw, ih) = (image.0 as f32, image.1 as f32);
    if iw <= 0.0 || ih <= 0.0 {
        return None;
    }
    let scale = (page.0 / iw).max(page.1 / ih);
    Some(((page.0 - iw * scale) / 2.0, (page.1 - ih * scale) / 2.0, scale))
}

/// Paints everything that sits underneath the ink.
pub struct PaperRenderer<'a> {
    settings: &'a Settings,
    geometry: &'a PageGeometry,
    background: Option<&'a Bitmap>,
}

impl<'a> PaperRenderer<'a> {
    pub fn new(settings: &'a Settings, geometry: &'a PageGeometry) -> Self {
        Self {
            settings,
            geometry,
            background: None,
        }
    }

    pub fn with_background(mut self, background: Option<&'a Bitmap>) -> Self {
        self.background = background;
        self
    }

    /// Background, ruling, guide, numbers, then grain.
    pub fn draw<R: Rng + ?Sized>(&self, ctx: &mut RenderContext, face: &dyn GlyphFace, rng: &mut R) {
        if self.settings.export.include_background {
            self.draw_background(ctx);
        }
        self.draw_ruling(ctx);
        self.draw_margin_guide(ctx);
        self.draw_line_numbers(ctx, face);
        self.apply_texture(ctx, rng);
    }

    fn draw_background(&self, ctx: &mut RenderContext) {
        let page = (
            self.geometry.pixel_width as f32,
            self.geometry.pixel_height as f32,
        );
        ctx.fill_rect(&Rect::new(0.0, 0.0, page.0, page.1), self.settings.colors.background);

        let Some(bitmap) = self.background else {
            return;
        };
        let Some((x, y, scale)) = cover_fit((bitmap.width, bitmap.height), page) else {
            return;
        };
        let opacity = self.settings.colors.background_opacity;
        if let Err(err) = ctx.draw_bitmap(bitmap, x, y, scale, opacity) {
            warn!(target: "scrawl::render", "background image skipped: {err}");
        }
    }

    fn draw_ruling(&self, ctx: &mut RenderContext) {
        let ruling = &self.settings.ruling;
        let color = self.settings.colors.ruling;
        let content = &self.geometry.content;
        let thickness = ruling.line_thickness;

        match ruling.mode {
            RulingMode::Ruled => {
                for y in rule_rows(content, ruling.line_spacing) {
                    ctx.stroke_line((content.x, y), (content.right(), y), thickness, color, None);
                }
            }
            RulingMode::Grid => {
                for y in rule_rows(content, ruling.line_spacing) {
                    ctx.stroke_line((content.x, y), (content.right(), y), thickness, color, None);
                }
                for x in steps(content.x, content.right(), ruling.grid_step) {
                    ctx.stroke_line((x, content.y), (x, content.bottom()), thickness, color, None);
                }
            }
            RulingMode::Dotted => {
                let columns: Vec<f32> = steps(content.x, content.right(), ruling.grid_step).collect();
                for y in rule_rows(content, ruling.line_spacing) {
                    for &x in &columns {
                        ctx.fill_circle(x, y, DOT_RADIUS, color);
                    }
                }
            }
            RulingMode::Cursive => {
                for row in cursive_rows(content, ruling.line_spacing) {
                    ctx.stroke_line(
                        (content.x, row.top),
                        (content.right(), row.top),
                        thickness,
                        color,
                        Some(CURSIVE_DASH.as_slice()),
                    );
                    for y in [row.baseline, row.bottom] {
                        ctx.stroke_line((content.x, y), (content.right(), y), thickness, color, None);
                    }
                }
            }
            RulingMode::Blank => {}
        }
    }

    fn guide_x(&self) -> f32 {
        self.geometry.content.x + self.settings.ruling.margin_guide_inset
    }

    fn draw_margin_guide(&self, ctx: &mut RenderContext) {
        let ruling = &self.settings.ruling;
        if !ruling.show_margin_guide {
            return;
        }
        let content = &self.geometry.content;
        let x = self.guide_x();
        ctx.stroke_line(
            (x, content.y),
            (x, content.bottom()),
            ruling.line_thickness + 1.0,
            self.settings.colors.margin_guide,
            None,
        );
    }

    fn draw_line_numbers(&self, ctx: &mut RenderContext, face: &dyn GlyphFace) {
        let ruling = &self.settings.ruling;
        if !ruling.show_line_numbers {
            return;
        }
        let right = self.guide_x() - LINE_NUMBER_GAP;
        let ink = GlyphInk::solid(self.settings.colors.ruling);
        let rows = numbered_rows(ruling.mode, &self.geometry.content, ruling.line_spacing);
        for (i, baseline) in rows.into_iter().enumerate() {
            let label = (i + 1).to_string();
            let mut x = right - face.measure(&label, LINE_NUMBER_SIZE, 0.0, 0.0);
            for ch in label.chars() {
                face.draw_glyph(
                    ctx,
                    ch,
                    LINE_NUMBER_SIZE,
                    Transform::from_translate(x, baseline),
                    &ink,
                );
                x += face.char_advance(ch, LINE_NUMBER_SIZE);
            }
        }
    }

    fn apply_texture<R: Rng + ?Sized>(&self, ctx: &mut RenderContext, rng: &mut R) {
        let intensity = self.settings.ruling.texture.intensity();
        if intensity <= 0.0 {
            return;
        }
        let amplitude = intensity * 255.0;
        ctx.add_noise(|| (rng.gen::<f32>() - 0.5) * amplitude);
    }
}
