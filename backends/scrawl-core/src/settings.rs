// this_file: backends/scrawl-core/src/settings.rs

//! Render settings and the enumerations they are built from.

use crate::types::Rgba;
use crate::{Result, ScrawlError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upper bound for the jitter strength slider.
pub const MAX_JITTER: f32 = 3.0;
/// Upper bound for the export raster multiplier.
pub const MAX_EXPORT_SCALE: f32 = 8.0;

/// How raw text is turned into lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    SingleLine,
    TwoLine,
    Paragraph,
    Explicit,
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single-line" | "one-line" | "single" => Ok(Self::SingleLine),
            "two-line" | "two-lines" => Ok(Self::TwoLine),
            "paragraph" | "wrap" => Ok(Self::Paragraph),
            "explicit" | "custom-ruled" | "lines" => Ok(Self::Explicit),
            other => Err(format!("unknown layout mode '{other}'")),
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl FromStr for TextAlign {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" | "end" => Ok(Self::Right),
            other => Err(format!("unknown text alignment '{other}'")),
        }
    }
}

/// Writing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(Self::Ltr),
            "rtl" => Ok(Self::Rtl),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Named page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    A5,
    Letter,
    Legal,
    Custom,
}

impl PageSize {
    /// Portrait pixel dimensions at 300 DPI; `None` for custom sizes.
    pub fn base_pixels(&self) -> Option<(u32, u32)> {
        match self {
            Self::A4 => Some((2480, 3508)),
            Self::A5 => Some((1748, 2480)),
            Self::Letter => Some((2550, 3300)),
            Self::Legal => Some((2550, 4200)),
            Self::Custom => None,
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown page size '{other}'")),
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(format!("unknown orientation '{other}'")),
        }
    }
}

/// Background ruling style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulingMode {
    Ruled,
    Grid,
    Dotted,
    Cursive,
    Blank,
}

impl FromStr for RulingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ruled" | "college-ruled" | "lined" => Ok(Self::Ruled),
            "grid" => Ok(Self::Grid),
            "dotted" => Ok(Self::Dotted),
            "cursive" => Ok(Self::Cursive),
            "blank" | "none" => Ok(Self::Blank),
            other => Err(format!("unknown ruling mode '{other}'")),
        }
    }
}

/// Paper grain intensity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    None,
    Light,
    Medium,
    Heavy,
}

impl Texture {
    /// Fraction of full scale used as the noise amplitude.
    pub fn intensity(&self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Light => 0.02,
            Self::Medium => 0.05,
            Self::Heavy => 0.1,
        }
    }
}

impl FromStr for Texture {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "heavy" => Ok(Self::Heavy),
            other => Err(format!("unknown texture '{other}'")),
        }
    }
}

/// Output format for export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

/// Font and line settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub font_family: String,
    /// Family tried when `font_family` cannot be acquired
    pub fallback_family: String,
    /// Font size in pixels
    pub font_size: f32,
    /// Font weight (100-900)
    pub font_weight: u16,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    pub letter_spacing: f32,
    pub word_spacing: f32,
    pub align: TextAlign,
    pub direction: Direction,
    pub layout: LayoutMode,
    /// Keep overflowing lines on extra pages instead of dropping them
    pub multi_page: bool,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Caveat".to_string(),
            fallback_family: "Arial".to_string(),
            font_size: 28.0,
            font_weight: 400,
            line_height: 1.8,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            align: TextAlign::Left,
            direction: Direction::Ltr,
            layout: LayoutMode::Paragraph,
            multi_page: true,
        }
    }
}

impl Typography {
    /// Vertical advance between baselines.
    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }
}

/// Page margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Page size and margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub size: PageSize,
    /// Used when `size` is `custom`
    pub custom_width: u32,
    pub custom_height: u32,
    pub orientation: Orientation,
    pub margins: Margins,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            custom_width: 800,
            custom_height: 1200,
            orientation: Orientation::Portrait,
            margins: Margins::uniform(80.0),
        }
    }
}

/// Background ruling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulingSettings {
    pub mode: RulingMode,
    pub line_spacing: f32,
    /// Horizontal step for grid columns and dot rows
    pub grid_step: f32,
    pub line_thickness: f32,
    pub show_margin_guide: bool,
    /// Distance of the margin guide from the left content edge
    pub margin_guide_inset: f32,
    pub show_line_numbers: bool,
    pub texture: Texture,
}

impl Default for RulingSettings {
    fn default() -> Self {
        Self {
            mode: RulingMode::Ruled,
            line_spacing: 40.0,
            grid_step: 40.0,
            line_thickness: 1.0,
            show_margin_guide: true,
            margin_guide_inset: 40.0,
            show_line_numbers: false,
            texture: Texture::None,
        }
    }
}

/// Handwriting perturbation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterSettings {
    /// 0 disables all randomness
    pub strength: f32,
    /// Cursive style skips the darker pen-pressure outline
    pub cursive: bool,
    /// Fixed seed for reproducible jitter and texture
    pub seed: Option<u64>,
}

impl Default for JitterSettings {
    fn default() -> Self {
        Self {
            strength: 0.6,
            cursive: true,
            seed: None,
        }
    }
}

/// Colour set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub ink: Rgba,
    pub background: Rgba,
    pub ruling: Rgba,
    pub margin_guide: Rgba,
    /// Applied once per line, 0.0-1.0
    pub ink_opacity: f32,
    /// Opacity of the page background image, 0.0-1.0
    pub background_opacity: f32,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            ink: Rgba::rgb(0x22, 0x22, 0x22),
            background: Rgba::WHITE,
            ruling: Rgba::rgb(0xd3, 0xd3, 0xd3),
            margin_guide: Rgba::rgb(0xff, 0x6b, 0x6b),
            ink_opacity: 1.0,
            background_opacity: 1.0,
        }
    }
}

/// Export options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: ExportFormat,
    /// JPEG quality, 0-100
    pub quality: u8,
    /// Raster multiplier applied at render time
    pub scale: f32,
    /// Dots per inch of the nominal page pixels
    pub dpi: f32,
    /// Paint the background colour and image; off leaves the page transparent
    pub include_background: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 95,
            scale: 1.0,
            dpi: 300.0,
            include_background: true,
        }
    }
}

/// Complete configuration of one render call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub typography: Typography,
    pub page: PageSettings,
    pub ruling: RulingSettings,
    pub jitter: JitterSettings,
    pub colors: ColorSettings,
    pub export: ExportSettings,
}

impl Settings {
    /// Check every numeric invariant.
    pub fn validate(&self) -> Result<()> {
        let t = &self.typography;
        positive("font_size", t.font_size)?;
        positive("line_height", t.line_height)?;
        non_negative("letter_spacing", t.letter_spacing)?;
        non_negative("word_spacing", t.word_spacing)?;
        if !(1..=1000).contains(&t.font_weight) {
            return Err(ScrawlError::setting(
                "font_weight",
                format!("{} not in [1, 1000]", t.font_weight),
            ));
        }

        let m = &self.page.margins;
        non_negative("margin_top", m.top)?;
        non_negative("margin_right", m.right)?;
        non_negative("margin_bottom", m.bottom)?;
        non_negative("margin_left", m.left)?;
        if self.page.size == PageSize::Custom
            && (self.page.custom_width == 0 || self.page.custom_height == 0)
        {
            return Err(ScrawlError::setting(
                "custom_width",
                "custom page dimensions must be non-zero",
            ));
        }

        let r = &self.ruling;
        non_negative("line_spacing", r.line_spacing)?;
        non_negative("grid_step", r.grid_step)?;
        non_negative("line_thickness", r.line_thickness)?;
        non_negative("margin_guide_inset", r.margin_guide_inset)?;

        within("jitter", self.jitter.strength, 0.0, MAX_JITTER)?;
        within("ink_opacity", self.colors.ink_opacity, 0.0, 1.0)?;
        within("background_opacity", self.colors.background_opacity, 0.0, 1.0)?;

        let e = &self.export;
        if e.quality > 100 {
            return Err(ScrawlError::setting(
                "export_quality",
                format!("{} not in [0, 100]", e.quality),
            ));
        }
        positive("export_scale", e.scale)?;
        within("export_scale", e.scale, 0.0, MAX_EXPORT_SCALE)?;
        positive("export_dpi", e.dpi)?;
        Ok(())
    }

    /// Line height in nominal pixels.
    pub fn line_advance(&self) -> f32 {
        self.typography.line_advance()
    }
}

fn positive(key: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ScrawlError::setting(key, format!("{value} must be > 0")))
    }
}

fn non_negative(key: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ScrawlError::setting(key, format!("{value} must be >= 0")))
    }
}

fn within(key: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ScrawlError::setting(
            key,
            format!("{value} not in [{min}, {max}]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn test_zero_font_size_rejected() {
        let mut settings = Settings::default();
        settings.typography.font_size = 0.0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("font_size"));
    }

    #[test]
    fn test_negative_margin_rejected() {
        let mut settings = Settings::default();
        settings.page.margins.left = -1.0;
        assert!(matches!(
            settings.validate(),
            Err(ScrawlError::InvalidSetting { ref key, .. }) if key == "margin_left"
        ));
    }

    #[test]
    fn test_background_opacity_range() {
        let mut settings = Settings::default();
        assert!(settings.export.include_background);
        settings.colors.background_opacity = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(ScrawlError::InvalidSetting { ref key, .. }) if key == "background_opacity"
        ));
    }

    #[test]
    fn test_mode_aliases() {
        assert_eq!("two-lines".parse::<LayoutMode>().unwrap(), LayoutMode::TwoLine);
        assert_eq!("custom-ruled".parse::<LayoutMode>().unwrap(), LayoutMode::Explicit);
        assert_eq!("college-ruled".parse::<RulingMode>().unwrap(), RulingMode::Ruled);
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert!("scroll".parse::<PageSize>().is_err());
    }

    #[test]
    fn test_settings_serde_defaults_fill_gaps() {
        let settings: Settings =
            serde_json::from_str(r#"{"typography": {"font_size": 40.0}}"#).unwrap();
        assert_eq!(settings.typography.font_size, 40.0);
        assert_eq!(settings.typography.font_family, "Caveat");
        assert_eq!(settings.ruling, RulingSettings::default());
    }
}
