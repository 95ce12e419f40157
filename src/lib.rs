// this_file: src/lib.rs

//! Scrawl: render text onto simulated paper as if written by hand.
//!
//! This crate re-exports the workspace members and adds two one-call
//! helpers for the common path:
//!
//! ```no_run
//! use scrawl::{Document, Settings};
//!
//! let doc = Document::new("Dear diary,\ntoday was long.", Settings::default());
//! let output = scrawl::render_to_bytes(&doc)?;
//! for (i, bytes) in output.files().iter().enumerate() {
//!     std::fs::write(format!("page-{}.png", i + 1), bytes)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use scrawl_core::*;
pub use scrawl_layout::{
    page_capacity, split_two_lines, Line, Page, PageGeometry, Pagination, Paginator,
    TextLayoutEngine,
};
pub use scrawl_render::{
    Admission, Completion, ExportOutput, Exporter, GlyphJitterRenderer, ImageOverlayCompositor,
    PaperRenderer, RenderEngine, RenderGate, RenderedDocument, RenderedPage,
};
pub use scrawl_skia::{decode_image, FontLibrary, GlyphFace, OutlineFace, RenderContext};

/// Render `doc` with the process-wide font library.
pub fn render(doc: &Document) -> Result<RenderedDocument> {
    RenderEngine::new().render(doc)
}

/// Render `doc` and encode it in the format named by its export settings.
pub fn render_to_bytes(doc: &Document) -> Result<ExportOutput> {
    let rendered = render(doc)?;
    Exporter::from_settings(&doc.settings.export).export(&rendered)
}
