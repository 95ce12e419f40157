// this_file: crates/scrawl-render/src/engine.rs

//! The render pipeline: paginate, then paper, ink and overlays per page.

use crate::jitter::GlyphJitterRenderer;
use crate::overlay::ImageOverlayCompositor;
use crate::paper::PaperRenderer;
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scrawl_core::{
    Bitmap, Document, OverlaySource, RenderDiagnostics, RenderSurface, Result, Rgba,
};
use scrawl_layout::{Page, PageGeometry, Paginator};
use scrawl_skia::{decode_image, FontLibrary, GlyphFace, RenderContext};
use std::borrow::Cow;
use std::sync::Arc;

/// Texture seed used when no seed is configured and the hand is steady.
pub const STILL_SEED: u64 = 0x5c7a_41d0;

/// A page after rasterization. The surface is never mutated again.
#[derive(Debug)]
pub struct RenderedPage {
    pub index: usize,
    /// Nominal geometry, before the raster scale
    pub geometry: PageGeometry,
    /// Raster scale relative to the nominal geometry
    pub scale: f32,
    pub line_count: usize,
    pub surface: RenderSurface,
}

/// All pages of one render call.
#[derive(Debug)]
pub struct RenderedDocument {
    pub pages: Vec<RenderedPage>,
    /// Lines produced by layout, before pagination
    pub line_count: usize,
    /// Family of the face that was actually used
    pub face: String,
}

/// Renders documents against a font library.
pub struct RenderEngine<'f> {
    fonts: &'f FontLibrary,
}

impl Default for RenderEngine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine<'static> {
    /// Engine backed by the process-wide font library.
    pub fn new() -> Self {
        Self {
            fonts: FontLibrary::shared(),
        }
    }
}

impl<'f> RenderEngine<'f> {
    pub fn with_fonts(fonts: &'f FontLibrary) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &'f FontLibrary {
        self.fonts
    }

    /// Render every page of `doc`.
    ///
    /// Either all pages are produced or an error is returned; there are no
    /// partial documents.
    pub fn render(&self, doc: &Document) -> Result<RenderedDocument> {
        let settings = &doc.settings;
        settings.validate()?;

        let typography = &settings.typography;
        let face: Arc<dyn GlyphFace> = self.fonts.acquire_or_fallback(
            &typography.font_family,
            &typography.fallback_family,
            typography.font_weight,
        );

        let pagination = Paginator::new(&*face, settings).paginate(&doc.text)?;
        let page_count = pagination.pages.len();

        RenderDiagnostics::new(
            settings,
            face.family(),
            pagination.line_count,
            page_count,
            doc.overlays.len(),
        )
        .log();

        for (i, overlay) in doc.overlays.iter().enumerate() {
            if overlay.page >= page_count {
                warn!(
                    target: "scrawl::render",
                    "overlay {i} targets page {} but the document has {page_count}",
                    overlay.page
                );
            }
        }

        let seed = match settings.jitter.seed {
            Some(seed) => seed,
            None if settings.jitter.strength > 0.0 => rand::random(),
            // still paper must come out identical on every render
            None => STILL_SEED,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let background = background_bitmap(doc);
        let pages = pagination
            .pages
            .iter()
            .map(|page| {
                self.render_page(doc, page, face.as_ref(), background.as_deref(), &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            target: "scrawl::render",
            "rendered {page_count} page(s), {} line(s) with '{}'",
            pagination.line_count,
            face.family()
        );

        Ok(RenderedDocument {
            pages,
            line_count: pagination.line_count,
            face: face.family().to_string(),
        })
    }

    fn render_page(
        &self,
        doc: &Document,
        page: &Page,
        face: &dyn GlyphFace,
        background: Option<&Bitmap>,
        rng: &mut ChaCha8Rng,
    ) -> Result<RenderedPage> {
        let settings = &doc.settings;
        let geometry = page.geometry;
        let scale = settings.export.scale;
        let mut ctx = RenderContext::new(
            geometry.pixel_width,
            geometry.pixel_height,
            scale,
            Rgba::BLACK.with_alpha(0),
        )?;

        PaperRenderer::new(settings, &geometry)
            .with_background(background)
            .draw(&mut ctx, face, rng);

        let jitter = GlyphJitterRenderer::new(face, settings);
        for line in &page.lines {
            jitter.draw_line(&mut ctx, line, rng);
        }

        ImageOverlayCompositor::new(&doc.overlays).draw(&mut ctx, page.index, &geometry.content);

        Ok(RenderedPage {
            index: page.index,
            geometry,
            scale,
            line_count: page.lines.len(),
            surface: ctx.finish()?,
        })
    }
}

/// The page background, decoded once per render. An undecodable image is
/// dropped with a warning and the page keeps its plain colour.
fn background_bitmap(doc: &Document) -> Option<Cow<'_, Bitmap>> {
    if !doc.settings.export.include_background {
        return None;
    }
    match doc.background.as_ref()? {
        OverlaySource::Decoded(bitmap) => Some(Cow::Borrowed(bitmap.as_ref())),
        OverlaySource::Encoded(bytes) => match decode_image(bytes) {
            Ok(bitmap) => Some(Cow::Owned(bitmap)),
            Err(err) => {
                warn!(target: "scrawl::render", "background image skipped: {err}");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::{LayoutMode, Margins, PageSize, ScrawlError, Settings, Texture};

    fn library() -> FontLibrary {
        FontLibrary::with_search_dirs(Vec::new())
    }

    fn small(text: &str) -> Document {
        let mut settings = Settings::default();
        settings.page.size = PageSize::Custom;
        settings.page.custom_width = 320;
        settings.page.custom_height = 240;
        settings.page.margins = Margins::uniform(20.0);
        settings.typography.font_family = "builtin".to_string();
        settings.typography.font_size = 20.0;
        settings.typography.line_height = 2.0;
        Document::new(text, settings)
    }

    #[test]
    fn test_zero_jitter_is_byte_identical() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("steady hand, steady lines");
        doc.settings.jitter.strength = 0.0;
        let a = engine.render(&doc).unwrap();
        let b = engine.render(&doc).unwrap();
        assert_eq!(a.pages[0].surface.as_bytes(), b.pages[0].surface.as_bytes());
    }

    #[test]
    fn test_seeded_jitter_repeats() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("wobbly");
        doc.settings.jitter.strength = 2.0;
        doc.settings.jitter.seed = Some(11);
        let a = engine.render(&doc).unwrap();
        let b = engine.render(&doc).unwrap();
        assert_eq!(a.pages[0].surface.as_bytes(), b.pages[0].surface.as_bytes());
    }

    #[test]
    fn test_scale_two_doubles_raster() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("one line");
        doc.settings.export.scale = 2.0;
        let rendered = engine.render(&doc).unwrap();
        let page = &rendered.pages[0];
        assert_eq!((page.surface.width(), page.surface.height()), (640, 480));
        assert_eq!(page.geometry.pixel_width, 320);
        assert_eq!(page.scale, 2.0);
    }

    #[test]
    fn test_overflow_makes_pages() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small(&vec!["line"; 12].join("\n"));
        doc.settings.typography.layout = LayoutMode::Explicit;
        let rendered = engine.render(&doc).unwrap();
        // 200 px frame / 40 px lines
        assert_eq!(rendered.pages.len(), 3);
        assert_eq!(rendered.line_count, 12);
        let total: usize = rendered.pages.iter().map(|p| p.line_count).sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn test_missing_font_falls_back() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("fallback");
        doc.settings.typography.font_family = "Caveat".to_string();
        let rendered = engine.render(&doc).unwrap();
        assert_eq!(rendered.face, "builtin");
    }

    #[test]
    fn test_invalid_geometry_is_fatal() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("nope");
        doc.settings.page.margins.left = 400.0;
        assert!(matches!(
            engine.render(&doc),
            Err(ScrawlError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_empty_text_renders_ruled_page() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("");
        doc.settings.colors.ruling = Rgba::BLACK;
        let rendered = engine.render(&doc).unwrap();
        assert_eq!(rendered.pages.len(), 1);
        assert_eq!(rendered.line_count, 1);
        // rule at y = 60 across the content
        let px = rendered.pages[0].surface.pixel(200, 60).unwrap();
        assert!(px[0] < 200, "{px:?}");
    }

    #[test]
    fn test_zero_jitter_with_texture_and_no_seed_is_stable() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("grainy but steady");
        doc.settings.jitter.strength = 0.0;
        doc.settings.jitter.seed = None;
        doc.settings.ruling.texture = Texture::Light;
        let a = engine.render(&doc).unwrap();
        let b = engine.render(&doc).unwrap();
        assert_eq!(a.pages[0].surface.as_bytes(), b.pages[0].surface.as_bytes());
    }

    fn blue_strip() -> Bitmap {
        Bitmap {
            width: 2,
            height: 1,
            data: [0, 0, 255, 255].repeat(2),
        }
    }

    #[test]
    fn test_background_image_under_every_page() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small(&vec!["line"; 12].join("\n"))
            .with_background(OverlaySource::Decoded(Arc::new(blue_strip())));
        doc.settings.typography.layout = LayoutMode::Explicit;
        doc.settings.colors.ruling = Rgba::rgb(255, 0, 0);
        let rendered = engine.render(&doc).unwrap();
        assert_eq!(rendered.pages.len(), 3);
        for page in &rendered.pages {
            // corners are covered, not letterboxed
            assert_eq!(page.surface.pixel(2, 2), Some([0, 0, 255, 255]));
            assert_eq!(page.surface.pixel(317, 237), Some([0, 0, 255, 255]));
        }
        // ruling is painted over the image
        let rule = rendered.pages[0].surface.pixel(290, 60).unwrap();
        assert!(rule[0] > 100, "{rule:?}");
    }

    #[test]
    fn test_background_opacity_blends_with_paper() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("")
            .with_background(OverlaySource::Decoded(Arc::new(blue_strip())));
        doc.settings.colors.background_opacity = 0.5;
        let rendered = engine.render(&doc).unwrap();
        let px = rendered.pages[0].surface.pixel(2, 2).unwrap();
        assert!((120..=135).contains(&px[0]), "{px:?}");
        assert_eq!(px[2], 255);
    }

    #[test]
    fn test_excluding_background_leaves_page_transparent() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let mut doc = small("")
            .with_background(OverlaySource::Decoded(Arc::new(blue_strip())));
        doc.settings.export.include_background = false;
        let rendered = engine.render(&doc).unwrap();
        assert_eq!(rendered.pages[0].surface.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_undecodable_background_keeps_plain_paper() {
        let fonts = library();
        let engine = RenderEngine::with_fonts(&fonts);
        let doc = small("").with_background(OverlaySource::Encoded(Arc::new(b"junk".to_vec())));
        let rendered = engine.render(&doc).unwrap();
        assert_eq!(rendered.pages[0].surface.pixel(2, 2), Some([255, 255, 255, 255]));
    }
}
