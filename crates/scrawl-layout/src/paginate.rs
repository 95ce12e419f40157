// this_file: crates/scrawl-layout/src/paginate.rs

//! Assigning laid-out lines to pages and placing them.

use crate::geometry::PageGeometry;
use crate::wrap::TextLayoutEngine;
use log::warn;
use scrawl_core::{Direction, LayoutMode, Rect, Result, Settings, TextAlign, TextMeasurer};
use serde::Serialize;
use std::ops::Range;

/// One laid-out line of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub text: String,
    /// Baseline y within the page
    pub baseline: f32,
    /// Start x derived from the alignment
    pub x: f32,
    /// Measured width under the active metrics
    pub width: f32,
}

/// A page produced by the paginator.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub index: usize,
    pub lines: Vec<Line>,
    pub geometry: PageGeometry,
    /// Box the lines were placed in
    pub frame: Rect,
}

/// Result of paginating one document.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub pages: Vec<Page>,
    /// Lines produced by layout before pages were cut
    pub line_count: usize,
}

/// Lines that fit a frame of `frame_height`; never less than one.
pub fn page_capacity(frame_height: f32, line_height: f32) -> usize {
    if line_height <= 0.0 || !line_height.is_finite() {
        return 1;
    }
    ((frame_height / line_height + 1e-4).floor() as usize).max(1)
}

/// Cut `line_count` lines into consecutive page ranges of at most `capacity`.
///
/// Zero lines still yield one empty range.
pub fn page_ranges(line_count: usize, capacity: usize) -> Vec<Range<usize>> {
    let capacity = capacity.max(1);
    if line_count == 0 {
        return vec![0..0];
    }
    (0..line_count)
        .step_by(capacity)
        .map(|start| start..(start + capacity).min(line_count))
        .collect()
}

/// Lays text out and distributes it over as few pages as possible.
pub struct Paginator<'a, M: TextMeasurer + ?Sized = dyn TextMeasurer> {
    settings: &'a Settings,
    engine: TextLayoutEngine<'a, M>,
}

impl<'a, M: TextMeasurer + ?Sized> Paginator<'a, M> {
    pub fn new(measurer: &'a M, settings: &'a Settings) -> Self {
        Self {
            settings,
            engine: TextLayoutEngine::new(measurer, &settings.typography),
        }
    }

    pub fn paginate(&self, text: &str) -> Result<Pagination> {
        self.settings.validate()?;
        let geometry = PageGeometry::resolve(&self.settings.page)?;
        let ruling = &self.settings.ruling;
        let frame = geometry.text_frame(
            ruling
                .show_margin_guide
                .then_some(ruling.margin_guide_inset),
        )?;

        let typography = &self.settings.typography;
        let texts = self.engine.layout(text, typography.layout, frame.width);
        let line_count = texts.len();
        let line_height = typography.line_advance();
        let capacity = page_capacity(frame.height, line_height);

        let mut ranges = page_ranges(line_count, capacity);
        if !typography.multi_page && ranges.len() > 1 {
            let kept = ranges[0].len();
            warn!(
                target: "scrawl::render",
                "multi-page disabled: dropping {} of {line_count} lines",
                line_count - kept
            );
            ranges.truncate(1);
        }

        let centred = matches!(
            typography.layout,
            LayoutMode::SingleLine | LayoutMode::TwoLine
        );
        let pages = ranges
            .into_iter()
            .enumerate()
            .map(|(index, range)| {
                let block = &texts[range];
                let top = if centred {
                    let block_height = block.len() as f32 * line_height;
                    frame.y + ((frame.height - block_height) / 2.0).max(0.0)
                } else {
                    frame.y
                };
                let lines = block
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        self.place(text, top + typography.font_size + i as f32 * line_height, &frame)
                    })
                    .collect();
                Page {
                    index,
                    lines,
                    geometry,
                    frame,
                }
            })
            .collect();

        Ok(Pagination { pages, line_count })
    }

    fn place(&self, text: &str, baseline: f32, frame: &Rect) -> Line {
        let width = self.engine.measure(text);
        let typography = &self.settings.typography;
        let align = match (typography.align, typography.direction) {
            (TextAlign::Left, Direction::Rtl) => TextAlign::Right,
            (align, _) => align,
        };
        let x = match align {
            TextAlign::Left => frame.x,
            TextAlign::Center => frame.x + (frame.width - width) / 2.0,
            TextAlign::Right => frame.right() - width,
        };
        Line {
            text: text.to_string(),
            baseline,
            x: x.max(frame.x),
            width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scrawl_core::{Margins, PageSize};

    struct HalfEm;

    impl TextMeasurer for HalfEm {
        fn family(&self) -> &str {
            "half-em"
        }

        fn char_advance(&self, _ch: char, size: f32) -> f32 {
            size / 2.0
        }
    }

    /// 400x300 page, 20 px margins, no guide: frame 20+20..380, 20..280.
    fn small_page() -> Settings {
        let mut settings = Settings::default();
        settings.page.size = PageSize::Custom;
        settings.page.custom_width = 400;
        settings.page.custom_height = 300;
        settings.page.margins = Margins::uniform(20.0);
        settings.ruling.show_margin_guide = false;
        settings.typography.font_size = 20.0;
        settings.typography.line_height = 2.0;
        settings
    }

    #[test]
    fn test_capacity() {
        assert_eq!(page_capacity(260.0, 40.0), 6);
        assert_eq!(page_capacity(240.0, 40.0), 6);
        assert_eq!(page_capacity(10.0, 40.0), 1);
    }

    #[test]
    fn test_ranges_are_minimal_and_ordered() {
        assert_eq!(page_ranges(0, 5), vec![0..0]);
        assert_eq!(page_ranges(5, 5), vec![0..5]);
        assert_eq!(page_ranges(11, 5), vec![0..5, 5..10, 10..11]);
        assert_eq!(page_ranges(3, 0), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_pages_reproduce_layout() {
        let mut settings = small_page();
        settings.typography.layout = LayoutMode::Explicit;
        let text = (1..=14).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let paginator = Paginator::new(&HalfEm, &settings);
        let result = paginator.paginate(&text).unwrap();

        assert_eq!(result.line_count, 14);
        // 260 / 40 = 6 lines per page
        assert_eq!(
            result.pages.iter().map(|p| p.lines.len()).collect::<Vec<_>>(),
            vec![6, 6, 2]
        );
        let joined: Vec<String> = result
            .pages
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.text.clone()))
            .collect();
        assert_eq!(joined.join("\n"), text);
        for page in &result.pages {
            let used = page.lines.len() as f32 * 40.0;
            assert!(used <= page.frame.height);
        }
    }

    #[test]
    fn test_baselines_and_alignment() {
        let mut settings = small_page();
        settings.typography.layout = LayoutMode::Explicit;
        settings.typography.align = TextAlign::Right;
        let result = Paginator::new(&HalfEm, &settings)
            .paginate("abc\nde")
            .unwrap();
        let lines = &result.pages[0].lines;
        assert_relative_eq!(lines[0].baseline, 40.0);
        assert_relative_eq!(lines[1].baseline, 80.0);
        assert_relative_eq!(lines[0].x, 380.0 - 30.0);
        assert_relative_eq!(lines[1].x, 380.0 - 20.0);
    }

    #[test]
    fn test_rtl_defaults_to_right_edge() {
        let mut settings = small_page();
        settings.typography.direction = Direction::Rtl;
        let result = Paginator::new(&HalfEm, &settings).paginate("abcd").unwrap();
        assert_relative_eq!(result.pages[0].lines[0].x, 340.0);
    }

    #[test]
    fn test_overwide_line_clamped_to_frame() {
        let mut settings = small_page();
        settings.typography.align = TextAlign::Center;
        let long = "x".repeat(60);
        let result = Paginator::new(&HalfEm, &settings).paginate(&long).unwrap();
        assert_relative_eq!(result.pages[0].lines[0].x, 40.0);
    }

    #[test]
    fn test_two_line_is_centred() {
        let mut settings = small_page();
        settings.typography.layout = LayoutMode::TwoLine;
        let result = Paginator::new(&HalfEm, &settings)
            .paginate("alpha beta gamma delta")
            .unwrap();
        let lines = &result.pages[0].lines;
        // block of 80 px centred in 260 px starting at 20
        assert_relative_eq!(lines[0].baseline, 20.0 + 90.0 + 20.0);
        assert_relative_eq!(lines[1].baseline, 20.0 + 90.0 + 60.0);
    }

    #[test]
    fn test_empty_text_single_page() {
        let settings = small_page();
        let result = Paginator::new(&HalfEm, &settings).paginate("").unwrap();
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].lines.len(), 1);
        assert_eq!(result.pages[0].lines[0].text, "");
    }

    #[test]
    fn test_single_page_mode_drops_overflow() {
        let mut settings = small_page();
        settings.typography.layout = LayoutMode::Explicit;
        settings.typography.multi_page = false;
        let text = vec!["x"; 20].join("\n");
        let result = Paginator::new(&HalfEm, &settings).paginate(&text).unwrap();
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].lines.len(), 6);
        assert_eq!(result.line_count, 20);
    }

    #[test]
    fn test_giant_line_height_still_terminates() {
        let mut settings = small_page();
        settings.typography.layout = LayoutMode::Explicit;
        settings.typography.line_height = 50.0;
        let result = Paginator::new(&HalfEm, &settings).paginate("a\nb\nc").unwrap();
        assert_eq!(result.pages.len(), 3);
    }
}
