// this_file: backends/scrawl-core/src/utils.rs

//! Utility functions for the scrawl rendering engine.

use crate::types::Rgba;

/// Parse a hex (`#rgb`, `#rrggbb`, `#rrggbbaa`) or keyword colour.
pub fn parse_color(color: &str) -> Result<Rgba, String> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        if !hex.is_ascii() {
            return Err(format!("non-ASCII hex colour: {color}"));
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|e| format!("{color}: {e}"));
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                return Ok(Rgba::rgb(expand(0)?, expand(1)?, expand(2)?));
            }
            6 => {
                return Ok(Rgba::rgb(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                ));
            }
            8 => {
                return Ok(Rgba::rgb(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                )
                .with_alpha(channel(&hex[6..8])?));
            }
            _ => return Err(format!("unsupported hex colour length: {color}")),
        }
    }

    match color.to_ascii_lowercase().as_str() {
        "transparent" => Ok(Rgba::BLACK.with_alpha(0)),
        "black" => Ok(Rgba::BLACK),
        "white" => Ok(Rgba::WHITE),
        _ => Err(format!("unrecognised colour: {color}")),
    }
}

/// `lineSpacing` -> `line_spacing`; snake_case input is returned unchanged.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.trim().chars() {
        if ch == '-' {
            out.push('_');
        } else if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Positions `start, start + step, ...` up to and including `end`.
///
/// Positions are computed by multiplication so long runs do not drift.
pub fn steps(start: f32, end: f32, step: f32) -> impl Iterator<Item = f32> {
    let count = if step > 0.0 && end >= start {
        ((end - start) / step + 1e-3).floor() as usize + 1
    } else {
        0
    };
    (0..count).map(move |i| start + i as f32 * step)
}

/// System font directories for different platforms
pub fn system_font_dirs() -> Vec<String> {
    #[cfg(target_os = "macos")]
    {
        vec![
            "/System/Library/Fonts".to_string(),
            "/Library/Fonts".to_string(),
            "~/Library/Fonts".to_string(),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        vec!["C:\\Windows\\Fonts".to_string()]
    }

    #[cfg(target_os = "linux")]
    {
        vec![
            "/usr/share/fonts".to_string(),
            "/usr/share/fonts/truetype".to_string(),
            "/usr/local/share/fonts".to_string(),
            "~/.fonts".to_string(),
            "~/.local/share/fonts".to_string(),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        vec![]
    }
}
