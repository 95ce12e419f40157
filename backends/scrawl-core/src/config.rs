// this_file: backends/scrawl-core/src/config.rs

//! Validating options layer that turns flat key/value input into [`Settings`].
//!
//! Keys may be snake_case, camelCase or kebab-case. A known key with a bad
//! value is rejected on its own and the previous value kept; unknown keys
//! are reported and ignored.

use crate::settings::{
    Direction, ExportFormat, LayoutMode, Margins, Orientation, PageSize, RulingMode, Settings,
    TextAlign, Texture, MAX_EXPORT_SCALE, MAX_JITTER,
};
use crate::types::Rgba;
use crate::utils::{normalize_key, parse_color};
use crate::{Result, ScrawlError};
use log::warn;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A single option that was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

type Applied = std::result::Result<(), String>;

impl Settings {
    /// Parse a JSON object of options and apply it.
    ///
    /// Malformed JSON or a non-object payload fails with
    /// [`ScrawlError::ConfigParse`] before anything is changed.
    pub fn apply_json(&mut self, json: &str) -> Result<Vec<ConfigWarning>> {
        let value: Value = serde_json::from_str(json).map_err(|err| ScrawlError::ConfigParse {
            reason: err.to_string(),
        })?;
        match value {
            Value::Object(map) => Ok(self.apply_options(&map)),
            other => Err(ScrawlError::ConfigParse {
                reason: format!("expected a JSON object, found {}", kind(&other)),
            }),
        }
    }

    /// Apply every recognised option, returning one warning per rejected key.
    pub fn apply_options(&mut self, options: &Map<String, Value>) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        for (raw_key, value) in options {
            let key = normalize_key(raw_key);
            if let Err(message) = self.apply_one(&key, value) {
                warn!(target: "scrawl::config", "option '{raw_key}' ignored: {message}");
                warnings.push(ConfigWarning {
                    key: raw_key.clone(),
                    message,
                });
            }
        }
        warnings
    }

    /// Apply a single `key=value` pair where the value is plain text, as
    /// typed on a command line. Numbers and booleans are recognised.
    pub fn apply_pair(&mut self, key: &str, raw: &str) -> std::result::Result<(), ConfigWarning> {
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        self.apply_one(&normalize_key(key), &value)
            .map_err(|message| ConfigWarning {
                key: key.to_string(),
                message,
            })
    }

    fn apply_one(&mut self, key: &str, value: &Value) -> Applied {
        let t = &mut self.typography;
        let p = &mut self.page;
        let r = &mut self.ruling;
        let c = &mut self.colors;
        let e = &mut self.export;
        match key {
            "font_family" | "font_name" | "font" => t.font_family = text(value)?,
            "fallback_font_family" | "fallback_family" | "language_fallback_font" => {
                t.fallback_family = text(value)?
            }
            "font_size" => t.font_size = positive(value)?,
            "font_weight" => t.font_weight = integer(value, 1, 1000)? as u16,
            "line_height" => t.line_height = positive(value)?,
            "letter_spacing" => t.letter_spacing = non_negative(value)?,
            "word_spacing" => t.word_spacing = non_negative(value)?,
            "text_align" | "align" => t.align = keyword::<TextAlign>(value)?,
            "direction" | "text_direction" => t.direction = keyword::<Direction>(value)?,
            "layout_mode" | "layout" => t.layout = keyword::<LayoutMode>(value)?,
            "multi_page" | "enable_multi_page" => t.multi_page = boolean(value)?,

            "page_size" => p.size = keyword::<PageSize>(value)?,
            "custom_width" => p.custom_width = integer(value, 1, u32::MAX as i64)? as u32,
            "custom_height" => p.custom_height = integer(value, 1, u32::MAX as i64)? as u32,
            "orientation" | "page_orientation" => p.orientation = keyword::<Orientation>(value)?,
            "margin" | "margins" => p.margins = Margins::uniform(non_negative(value)?),
            "margin_top" => p.margins.top = non_negative(value)?,
            "margin_right" => p.margins.right = non_negative(value)?,
            "margin_bottom" => p.margins.bottom = non_negative(value)?,
            "margin_left" => p.margins.left = non_negative(value)?,

            "ruling" | "ruling_mode" | "paper_style" => r.mode = keyword::<RulingMode>(value)?,
            "line_spacing" => r.line_spacing = non_negative(value)?,
            "line_thickness" => r.line_thickness = non_negative(value)?,
            "grid_step" | "grid_size" => r.grid_step = non_negative(value)?,
            "show_margin_guide" | "show_margins" | "show_margin_line" => {
                r.show_margin_guide = boolean(value)?
            }
            "margin_guide_inset" => r.margin_guide_inset = non_negative(value)?,
            "show_line_numbers" => r.show_line_numbers = boolean(value)?,
            "texture" | "paper_texture" => r.texture = keyword::<Texture>(value)?,

            "jitter" | "jitter_strength" | "handwriting_variation" => {
                self.jitter.strength = range(value, 0.0, MAX_JITTER)?
            }
            "cursive" | "cursive_style" => self.jitter.cursive = boolean(value)?,
            "seed" => {
                self.jitter.seed = match value {
                    Value::Null => None,
                    other => Some(integer(other, 0, i64::MAX)? as u64),
                }
            }

            "ink_color" | "text_color" => c.ink = color(value)?,
            "background_color" | "paper_color" => c.background = color(value)?,
            "ruling_color" | "line_color" => c.ruling = color(value)?,
            "margin_guide_color" | "margin_line_color" => c.margin_guide = color(value)?,
            "ink_opacity" => c.ink_opacity = opacity(value)?,
            "background_opacity" | "background_image_opacity" | "bg_opacity" => {
                c.background_opacity = opacity(value)?
            }

            "export_format" | "format" => e.format = keyword::<ExportFormat>(value)?,
            "export_quality" | "quality" => e.quality = integer(value, 0, 100)? as u8,
            "export_scale" | "scale" => {
                let scale = positive(value)?;
                if scale > MAX_EXPORT_SCALE {
                    return Err(format!("{scale} exceeds {MAX_EXPORT_SCALE}"));
                }
                e.scale = scale;
            }
            "export_dpi" | "dpi" => e.dpi = positive(value)?,
            "include_background" => e.include_background = boolean(value)?,

            _ => return Err("unknown option".to_string()),
        }
        Ok(())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn number(value: &Value) -> std::result::Result<f32, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed.map(|n| n as f32) {
        Some(n) if n.is_finite() => Ok(n),
        Some(_) => Err("out of range for a 32-bit float".to_string()),
        None => Err(format!("expected a number, found {}", kind(value))),
    }
}

fn positive(value: &Value) -> std::result::Result<f32, String> {
    let n = number(value)?;
    if n > 0.0 {
        Ok(n)
    } else {
        Err(format!("{n} must be > 0"))
    }
}

fn non_negative(value: &Value) -> std::result::Result<f32, String> {
    let n = number(value)?;
    if n >= 0.0 {
        Ok(n)
    } else {
        Err(format!("{n} must be >= 0"))
    }
}

fn range(value: &Value, min: f32, max: f32) -> std::result::Result<f32, String> {
    let n = number(value)?;
    if (min..=max).contains(&n) {
        Ok(n)
    } else {
        Err(format!("{n} not in [{min}, {max}]"))
    }
}

/// Accepts 0.0-1.0, or a percentage above 1 as slider widgets send.
fn opacity(value: &Value) -> std::result::Result<f32, String> {
    let n = number(value)?;
    match n {
        n if (0.0..=1.0).contains(&n) => Ok(n),
        n if n > 1.0 && n <= 100.0 => Ok(n / 100.0),
        n => Err(format!("{n} not in [0, 1]")),
    }
}

fn integer(value: &Value, min: i64, max: i64) -> std::result::Result<i64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if (min..=max).contains(&n) => Ok(n),
        Some(n) => Err(format!("{n} not in [{min}, {max}]")),
        None => Err(format!("expected an integer, found {}", kind(value))),
    }
}

fn boolean(value: &Value) -> std::result::Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            other => Err(format!("expected a boolean, found '{other}'")),
        },
        other => Err(format!("expected a boolean, found {}", kind(other))),
    }
}

fn text(value: &Value) -> std::result::Result<String, String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::String(_) => Err("must not be empty".to_string()),
        other => Err(format!("expected a string, found {}", kind(other))),
    }
}

fn keyword<T: FromStr<Err = String>>(value: &Value) -> std::result::Result<T, String> {
    match value {
        Value::String(s) => s.parse(),
        other => Err(format!("expected a keyword, found {}", kind(other))),
    }
}

fn color(value: &Value) -> std::result::Result<Rgba, String> {
    match value {
        Value::String(s) => parse_color(s),
        other => Err(format!("expected a colour string, found {}", kind(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camel_case_keys_apply() {
        let mut settings = Settings::default();
        let warnings = settings
            .apply_json(
                r##"{"fontSize": 32, "lineSpacing": 48, "pageSize": "letter",
                    "inkColor": "#0000ff", "layoutMode": "two-line", "showMarginGuide": false}"##,
            )
            .unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(settings.typography.font_size, 32.0);
        assert_eq!(settings.ruling.line_spacing, 48.0);
        assert_eq!(settings.page.size, PageSize::Letter);
        assert_eq!(settings.colors.ink, Rgba::rgb(0, 0, 255));
        assert_eq!(settings.typography.layout, LayoutMode::TwoLine);
        assert!(!settings.ruling.show_margin_guide);
    }

    #[test]
    fn test_bad_value_keeps_previous() {
        let mut settings = Settings::default();
        let warnings = settings
            .apply_json(r#"{"font_size": -4, "margin_left": "wide", "jitter": 1.5}"#)
            .unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(settings.typography.font_size, 28.0);
        assert_eq!(settings.page.margins.left, 80.0);
        assert_eq!(settings.jitter.strength, 1.5);
    }

    #[test]
    fn test_unknown_key_warns() {
        let mut settings = Settings::default();
        let warnings = settings.apply_json(r#"{"sparkles": true}"#).unwrap();
        assert_eq!(
            warnings,
            vec![ConfigWarning {
                key: "sparkles".to_string(),
                message: "unknown option".to_string()
            }]
        );
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_json_leaves_settings() {
        let mut settings = Settings::default();
        settings.typography.font_size = 50.0;
        let before = settings.clone();
        assert!(matches!(
            settings.apply_json("{font_size: 12"),
            Err(ScrawlError::ConfigParse { .. })
        ));
        assert!(matches!(
            settings.apply_json("[1, 2]"),
            Err(ScrawlError::ConfigParse { .. })
        ));
        assert_eq!(settings, before);
    }

    #[test]
    fn test_apply_pair_parses_scalars() {
        let mut settings = Settings::default();
        settings.apply_pair("seed", "42").unwrap();
        settings.apply_pair("cursive", "false").unwrap();
        settings.apply_pair("ruling", "grid").unwrap();
        settings.apply_pair("inkOpacity", "80").unwrap();
        assert_eq!(settings.jitter.seed, Some(42));
        assert!(!settings.jitter.cursive);
        assert_eq!(settings.ruling.mode, RulingMode::Grid);
        assert_relative_eq!(settings.colors.ink_opacity, 0.8);
        assert!(settings.apply_pair("export_quality", "101").is_err());
    }

    #[test]
    fn test_non_ascii_colour_is_a_warning() {
        let mut settings = Settings::default();
        let warnings = settings
            .apply_json(r##"{"ink_color": "#é1", "paper_color": "#ééé"}"##)
            .unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(settings.colors.ink, Rgba::rgb(0x22, 0x22, 0x22));
        assert_eq!(settings.colors.background, Rgba::WHITE);
    }

    #[test]
    fn test_overflowing_number_keeps_previous() {
        let mut settings = Settings::default();
        let warnings = settings
            .apply_json(r#"{"font_size": 1e300, "line_spacing": -1e300}"#)
            .unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(settings.typography.font_size, 28.0);
        assert_eq!(settings.ruling.line_spacing, 40.0);
        settings.validate().unwrap();
        assert!(settings.apply_pair("font_size", "1e39").is_err());
    }

    #[test]
    fn test_background_keys_apply() {
        let mut settings = Settings::default();
        let warnings = settings
            .apply_json(r#"{"bgOpacity": 0.4, "includeBackground": false}"#)
            .unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_relative_eq!(settings.colors.background_opacity, 0.4);
        assert!(!settings.export.include_background);
        assert!(settings.apply_pair("background-image-opacity", "-1").is_err());
        assert_relative_eq!(settings.colors.background_opacity, 0.4);
    }
}
