// this_file: crates/scrawl-layout/src/wrap.rs

//! Turning raw text into ordered line strings.

use scrawl_core::{LayoutMode, TextMeasurer, Typography};

/// Splits text into lines under one face and spacing setup.
pub struct TextLayoutEngine<'a, M: TextMeasurer + ?Sized = dyn TextMeasurer> {
    measurer: &'a M,
    font_size: f32,
    letter_spacing: f32,
    word_spacing: f32,
}

impl<'a, M: TextMeasurer + ?Sized> TextLayoutEngine<'a, M> {
    pub fn new(measurer: &'a M, typography: &Typography) -> Self {
        Self {
            measurer,
            font_size: typography.font_size,
            letter_spacing: typography.letter_spacing,
            word_spacing: typography.word_spacing,
        }
    }

    /// Width of `text` under the active metrics.
    pub fn measure(&self, text: &str) -> f32 {
        self.measurer
            .measure(text, self.font_size, self.letter_spacing, self.word_spacing)
    }

    /// Lines for `text` in `mode`. Always returns at least one line.
    pub fn layout(&self, text: &str, mode: LayoutMode, max_width: f32) -> Vec<String> {
        if text.is_empty() {
            return vec![String::new()];
        }
        match mode {
            LayoutMode::SingleLine => vec![single_line(text)],
            LayoutMode::TwoLine => {
                let (first, second) = split_two_lines(text);
                vec![first, second]
            }
            LayoutMode::Paragraph => hard_lines(text)
                .flat_map(|paragraph| self.wrap(paragraph, max_width))
                .collect(),
            LayoutMode::Explicit => hard_lines(text).map(str::to_string).collect(),
        }
    }

    /// Greedy word wrap of one paragraph.
    ///
    /// A word wider than `max_width` is kept whole on its own line.
    pub fn wrap(&self, paragraph: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if self.measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
        lines
    }
}

/// Line breaks become spaces; surrounding whitespace is dropped.
fn single_line(text: &str) -> String {
    hard_lines(text).collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Split on `\n`, dropping a trailing `\r` from each piece.
fn hard_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Split once at the whitespace nearest the character midpoint.
///
/// Ties go to the earlier boundary. Text without whitespace is cut exactly at
/// the midpoint. Both halves are trimmed.
pub fn split_two_lines(text: &str) -> (String, String) {
    let flat = single_line(text);
    let chars: Vec<char> = flat.chars().collect();
    let mid = (chars.len() + 1) / 2;

    let split = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .min_by_key(|&i| (i.abs_diff(mid), i))
        .unwrap_or(mid);

    let first: String = chars[..split].iter().collect();
    let second: String = chars[split..].iter().collect();
    (first.trim().to_string(), second.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `size / 2` wide.
    struct HalfEm;

    impl TextMeasurer for HalfEm {
        fn family(&self) -> &str {
            "half-em"
        }

        fn char_advance(&self, _ch: char, size: f32) -> f32 {
            size / 2.0
        }
    }

    fn engine(measurer: &HalfEm) -> TextLayoutEngine<'_, HalfEm> {
        let typography = Typography {
            font_size: 20.0,
            ..Typography::default()
        };
        TextLayoutEngine::new(measurer, &typography)
    }

    #[test]
    fn test_two_line_split() {
        assert_eq!(
            split_two_lines("alpha beta gamma delta"),
            ("alpha beta".to_string(), "gamma delta".to_string())
        );
    }

    #[test]
    fn test_two_line_without_whitespace() {
        assert_eq!(
            split_two_lines("abcdef"),
            ("abc".to_string(), "def".to_string())
        );
        assert_eq!(split_two_lines("a"), ("a".to_string(), String::new()));
    }

    #[test]
    fn test_two_line_tie_prefers_left() {
        // midpoint 3, spaces at 2 and 4
        assert_eq!(
            split_two_lines("ab c d"),
            ("ab".to_string(), "c d".to_string())
        );
    }

    #[test]
    fn test_paragraph_lines_fit() {
        let m = HalfEm;
        let engine = engine(&m);
        // 10 px per char, 100 px fits ten characters
        let lines = engine.layout(
            "the quick brown fox jumps over the lazy dog",
            LayoutMode::Paragraph,
            100.0,
        );
        assert_eq!(
            lines,
            vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
        for line in &lines {
            assert!(engine.measure(line) <= 100.0, "{line}");
        }
    }

    #[test]
    fn test_overwide_word_kept_whole() {
        let m = HalfEm;
        let lines = engine(&m).layout("a incomprehensibilities b", LayoutMode::Paragraph, 50.0);
        assert_eq!(lines, vec!["a", "incomprehensibilities", "b"]);
    }

    #[test]
    fn test_paragraph_hard_breaks() {
        let m = HalfEm;
        let lines = engine(&m).layout("one\r\n\ntwo three", LayoutMode::Paragraph, 1000.0);
        assert_eq!(lines, vec!["one", "", "two three"]);
    }

    #[test]
    fn test_explicit_keeps_lines() {
        let m = HalfEm;
        let lines = engine(&m).layout(
            "first line that is long\r\nsecond",
            LayoutMode::Explicit,
            10.0,
        );
        assert_eq!(lines, vec!["first line that is long", "second"]);
    }

    #[test]
    fn test_single_line_flattens() {
        let m = HalfEm;
        let lines = engine(&m).layout("one\ntwo\n", LayoutMode::SingleLine, 10.0);
        assert_eq!(lines, vec!["one two"]);
    }

    #[test]
    fn test_empty_text_is_one_empty_line() {
        let m = HalfEm;
        let engine = engine(&m);
        for mode in [
            LayoutMode::SingleLine,
            LayoutMode::TwoLine,
            LayoutMode::Paragraph,
            LayoutMode::Explicit,
        ] {
            assert_eq!(engine.layout("", mode, 100.0), vec![String::new()], "{mode:?}");
        }
    }

    #[test]
    fn test_spacing_changes_wrap() {
        let m = HalfEm;
        let typography = Typography {
            font_size: 20.0,
            letter_spacing: 2.0,
            ..Typography::default()
        };
        let engine = TextLayoutEngine::new(&m, &typography);
        // "ab cd" = 5 chars * 12 = 60
        assert_eq!(engine.measure("ab cd"), 60.0);
        assert_eq!(
            engine.layout("ab cd", LayoutMode::Paragraph, 59.0),
            vec!["ab", "cd"]
        );
    }

    #[test]
    fn test_two_line_whitespace_only_keeps_two_lines() {
        let m = HalfEm;
        let engine = engine(&m);
        assert_eq!(engine.layout("   ", LayoutMode::TwoLine, 100.0), vec!["", ""]);
        assert_eq!(engine.layout("\n\t", LayoutMode::TwoLine, 100.0), vec!["", ""]);
        assert_eq!(engine.layout("", LayoutMode::TwoLine, 100.0), vec![String::new()]);
    }
}
