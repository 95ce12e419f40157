// this_file: crates/scrawl-render/src/export.rs

//! Serializing rendered pages to PNG, JPEG or PDF bytes.

use crate::engine::{RenderedDocument, RenderedPage};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use log::debug;
use scrawl_core::{ExportFormat, ExportSettings, RenderSurface, Result, ScrawlError};

/// Encoded output of one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutput {
    /// One raster file per page, in page order
    Pages(Vec<Vec<u8>>),
    /// A single multi-page document
    Document(Vec<u8>),
}

impl ExportOutput {
    /// Every produced file, in order.
    pub fn files(&self) -> Vec<&[u8]> {
        match self {
            Self::Pages(pages) => pages.iter().map(Vec::as_slice).collect(),
            Self::Document(bytes) => vec![bytes.as_slice()],
        }
    }
}

/// Encodes rendered documents in one format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exporter {
    format: ExportFormat,
    quality: u8,
    dpi: f32,
}

impl Exporter {
    pub fn new(format: ExportFormat) -> Self {
        let defaults = ExportSettings::default();
        Self {
            format,
            quality: defaults.quality,
            dpi: defaults.dpi,
        }
    }

    pub fn from_settings(settings: &ExportSettings) -> Self {
        Self {
            format: settings.format,
            quality: settings.quality,
            dpi: settings.dpi,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn export(&self, doc: &RenderedDocument) -> Result<ExportOutput> {
        debug!(
            target: "scrawl::render",
            "exporting {} page(s) as {}",
            doc.pages.len(),
            self.format.extension()
        );
        match self.format {
            ExportFormat::Png | ExportFormat::Jpeg => doc
                .pages
                .iter()
                .map(|page| self.encode_page(page))
                .collect::<Result<Vec<_>>>()
                .map(ExportOutput::Pages),
            ExportFormat::Pdf => self.encode_pdf(&doc.pages).map(ExportOutput::Document),
        }
    }

    /// Encode a single page as a raster file.
    pub fn encode_page(&self, page: &RenderedPage) -> Result<Vec<u8>> {
        match self.format {
            ExportFormat::Png => page.surface.encode_png(),
            ExportFormat::Jpeg => encode_jpeg(&page.surface, self.quality),
            ExportFormat::Pdf => Err(ScrawlError::export_unavailable(
                "pdf",
                "pdf pages are only produced for whole documents",
            )),
        }
    }

    #[cfg(feature = "pdf")]
    fn encode_pdf(&self, pages: &[RenderedPage]) -> Result<Vec<u8>> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(ScrawlError::setting("export_dpi", format!("{} must be > 0", self.dpi)));
        }
        Ok(pdf::write_document(pages, self.dpi))
    }

    #[cfg(not(feature = "pdf"))]
    fn encode_pdf(&self, _pages: &[RenderedPage]) -> Result<Vec<u8>> {
        Err(ScrawlError::export_unavailable(
            "pdf",
            "built without the `pdf` feature",
        ))
    }
}

/// JPEG of the surface flattened onto white. Quality is clamped to 1..=100.
pub fn encode_jpeg(surface: &RenderSurface, quality: u8) -> Result<Vec<u8>> {
    let rgb = surface.to_rgb();
    let mut out = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
        encoder
            .encode(&rgb, surface.width(), surface.height(), ExtendedColorType::Rgb8)
            .map_err(|err| ScrawlError::encode("jpeg", err))?;
    }
    Ok(out)
}

/// Nominal pixels to PDF points.
pub fn px_to_pt(px: f32, dpi: f32) -> f32 {
    px * 72.0 / dpi
}

#[cfg(feature = "pdf")]
mod pdf {
    use super::px_to_pt;
    use crate::engine::RenderedPage;
    use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

    const IMAGE_NAME: &[u8] = b"Im1";

    /// One page per rendered page, each a full-bleed Flate-compressed RGB image.
    pub(super) fn write_document(pages: &[RenderedPage], dpi: f32) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let ids: Vec<(Ref, Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc(), alloc())).collect();

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(ids.iter().map(|(page_id, _, _)| *page_id))
            .count(pages.len() as i32);

        for (page, &(page_id, image_id, content_id)) in pages.iter().zip(&ids) {
            let surface = &page.surface;
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&surface.to_rgb(), 6);
            {
                let mut image = pdf.image_xobject(image_id, &compressed);
                image.filter(Filter::FlateDecode);
                image.width(surface.width() as i32);
                image.height(surface.height() as i32);
                image.color_space().device_rgb();
                image.bits_per_component(8);
            }

            let width_pt = px_to_pt(page.geometry.pixel_width as f32, dpi);
            let height_pt = px_to_pt(page.geometry.pixel_height as f32, dpi);

            let mut content = Content::new();
            content.save_state();
            content.transform([width_pt, 0.0, 0.0, height_pt, 0.0, 0.0]);
            content.x_object(Name(IMAGE_NAME));
            content.restore_state();
            let raw = content.finish();
            let stream = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
            pdf.stream(content_id, &stream).filter(Filter::FlateDecode);

            let mut pdf_page = pdf.page(page_id);
            pdf_page
                .media_box(Rect::new(0.0, 0.0, width_pt, height_pt))
                .parent(pages_id)
                .contents(content_id);
            pdf_page
                .resources()
                .x_objects()
                .pair(Name(IMAGE_NAME), image_id);
        }

        pdf.finish()
    }
}
