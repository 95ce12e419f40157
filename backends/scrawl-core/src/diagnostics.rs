// this_file: backends/scrawl-core/src/diagnostics.rs

//! Structured debug logging for render calls.

use crate::settings::Settings;
use log::{debug, log_enabled, Level};

/// Lightweight snapshot of the effective render request.
#[derive(Debug)]
pub struct RenderDiagnostics<'a> {
    face: &'a str,
    fallback: bool,
    layout: &'static str,
    ruling: &'static str,
    font_size: f32,
    line_advance: f32,
    jitter: f32,
    seeded: bool,
    scale: f32,
    lines: usize,
    pages: usize,
    overlays: usize,
}

impl<'a> RenderDiagnostics<'a> {
    /// Capture the snapshot for one document render.
    pub fn new(
        settings: &'a Settings,
        face: &'a str,
        lines: usize,
        pages: usize,
        overlays: usize,
    ) -> Self {
        use crate::settings::{LayoutMode, RulingMode};
        Self {
            face,
            fallback: !face.eq_ignore_ascii_case(&settings.typography.font_family),
            layout: match settings.typography.layout {
                LayoutMode::SingleLine => "single-line",
                LayoutMode::TwoLine => "two-line",
                LayoutMode::Paragraph => "paragraph",
                LayoutMode::Explicit => "explicit",
            },
            ruling: match settings.ruling.mode {
                RulingMode::Ruled => "ruled",
                RulingMode::Grid => "grid",
                RulingMode::Dotted => "dotted",
                RulingMode::Cursive => "cursive",
                RulingMode::Blank => "blank",
            },
            font_size: settings.typography.font_size,
            line_advance: settings.line_advance(),
            jitter: settings.jitter.strength,
            seeded: settings.jitter.seed.is_some(),
            scale: settings.export.scale,
            lines,
            pages,
            overlays,
        }
    }

    /// Emit the diagnostic snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(Level::Debug) {
            debug!(
                target: "scrawl::render",
                "face={face} fallback={fallback} layout={layout} ruling={ruling} size={size:.1} advance={advance:.1} jitter={jitter:.2} seeded={seeded} scale={scale:.2} lines={lines} pages={pages} overlays={overlays}",
                face = self.face,
                fallback = self.fallback,
                layout = self.layout,
                ruling = self.ruling,
                size = self.font_size,
                advance = self.line_advance,
                jitter = self.jitter,
                seeded = self.seeded,
                scale = self.scale,
                lines = self.lines,
                pages = self.pages,
                overlays = self.overlays,
            );
        }
    }
}
