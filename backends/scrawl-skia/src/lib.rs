// this_file: backends/scrawl-skia/src/lib.rs

//! tiny-skia raster backend for scrawl: the page drawing context, outline and
//! bitmap faces, and image decoding.

pub mod context;
pub mod decode;
pub mod fonts;
pub mod mono;

pub use context::{bitmap_to_pixmap, RenderContext};
pub use decode::decode_image;
pub use fonts::{FontLibrary, GlyphFace, GlyphInk, OutlineFace, BUILTIN_FAMILIES};
pub use mono::MonoFace;
pub use tiny_skia::Transform;
