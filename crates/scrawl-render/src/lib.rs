// this_file: crates/scrawl-render/src/lib.rs

//! Page rendering for scrawl: paper, handwriting jitter, overlays, export,
//! and the request gate in front of them.

pub mod engine;
pub mod export;
pub mod gate;
pub mod jitter;
pub mod overlay;
pub mod paper;

pub use engine::{RenderEngine, RenderedDocument, RenderedPage};
pub use export::{encode_jpeg, px_to_pt, ExportOutput, Exporter};
pub use gate::{Admission, Completion, RenderGate, Ticket};
pub use jitter::{GlyphJitterRenderer, GlyphPlacement};
pub use overlay::ImageOverlayCompositor;
pub use paper::{cursive_rows, numbered_rows, rule_rows, CursiveRow, PaperRenderer};
