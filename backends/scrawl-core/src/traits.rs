// this_file: backends/scrawl-core/src/traits.rs

//! Seams between layout and the drawing backend.

/// Horizontal metrics of a face at an arbitrary pixel size.
pub trait TextMeasurer: Send + Sync {
    /// Family name the face answers to
    fn family(&self) -> &str;

    /// Advance of one character in pixels at `size`.
    fn char_advance(&self, ch: char, size: f32) -> f32;

    /// Width of `text` with `letter_spacing` added after every character
    /// and `word_spacing` after every space.
    fn measure(&self, text: &str, size: f32, letter_spacing: f32, word_spacing: f32) -> f32 {
        text.chars()
            .map(|ch| {
                let extra = if ch == ' ' { word_spacing } else { 0.0 };
                self.char_advance(ch, size) + letter_spacing + extra
            })
            .sum()
    }
}
