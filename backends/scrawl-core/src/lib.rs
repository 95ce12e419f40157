// this_file: backends/scrawl-core/src/lib.rs

//! Core types, settings and shared infrastructure for the scrawl handwriting renderer.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod settings;
pub mod surface;
pub mod traits;
pub mod types;
pub mod utils;

pub use cache::{CacheStats, FontCache, FontKey};
pub use config::ConfigWarning;
pub use diagnostics::RenderDiagnostics;
pub use error::ScrawlError;
pub use settings::{
    ColorSettings, Direction, ExportFormat, ExportSettings, JitterSettings, LayoutMode, Margins,
    Orientation, PageSettings, PageSize, RulingMode, RulingSettings, Settings, TextAlign, Texture,
    Typography,
};
pub use surface::RenderSurface;
pub use traits::TextMeasurer;
pub use types::{
    Anchor, Bitmap, Document, HAnchor, ImageOverlay, OverlaySource, Rect, Rgba, VAnchor,
};

/// Result type for scrawl operations
pub type Result<T> = std::result::Result<T, ScrawlError>;
