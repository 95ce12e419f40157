// this_file: backends/scrawl-core/src/types.rs

//! Core types shared by the layout, raster and export stages.

use crate::settings::Settings;
use crate::utils::parse_color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Axis-aligned rectangle in nominal page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Straight-alpha RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Subtract `amount` (fraction of full scale) from every channel.
    pub fn darken(self, amount: f32) -> Self {
        let delta = (255.0 * amount).round() as i16;
        let shift = |c: u8| (c as i16 - delta).clamp(0, 255) as u8;
        Self {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
            a: self.a,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_color(&value)
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Decoded image in straight-alpha RGBA.
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel data (RGBA)
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.width as usize * self.height as usize * 4
    }
}

/// Horizontal placement keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAnchor {
    Left,
    Center,
    Right,
}

/// Vertical placement keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAnchor {
    Top,
    Center,
    Bottom,
}

/// Overlay placement inside the content rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub horizontal: HAnchor,
    pub vertical: VAnchor,
}

impl Anchor {
    pub const TOP_LEFT: Anchor = Anchor {
        horizontal: HAnchor::Left,
        vertical: VAnchor::Top,
    };

    /// Parse keywords such as `top-left`, `bottom right`, `center`,
    /// `middle-right` or `top`. Missing axes default to centre; `center`
    /// may appear for either axis.
    pub fn parse(keyword: &str) -> Option<Self> {
        let mut horizontal = None;
        let mut vertical = None;
        let mut centers = 0usize;

        for token in keyword
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match token.to_ascii_lowercase().as_str() {
                "left" if horizontal.is_none() => horizontal = Some(HAnchor::Left),
                "right" if horizontal.is_none() => horizontal = Some(HAnchor::Right),
                "top" if vertical.is_none() => vertical = Some(VAnchor::Top),
                "bottom" if vertical.is_none() => vertical = Some(VAnchor::Bottom),
                "middle" if vertical.is_none() => vertical = Some(VAnchor::Center),
                "center" | "centre" if centers < 2 => centers += 1,
                _ => return None,
            }
        }

        if horizontal.is_none() && vertical.is_none() && centers == 0 {
            return None;
        }

        Some(Self {
            horizontal: horizontal.unwrap_or(HAnchor::Center),
            vertical: vertical.unwrap_or(VAnchor::Center),
        })
    }

    /// Top-left corner for an item of the given size inside `area`.
    pub fn place(&self, area: &Rect, width: f32, height: f32) -> (f32, f32) {
        let x = match self.horizontal {
            HAnchor::Left => area.x,
            HAnchor::Center => area.x + (area.width - width) / 2.0,
            HAnchor::Right => area.right() - width,
        };
        let y = match self.vertical {
            VAnchor::Top => area.y,
            VAnchor::Center => area.y + (area.height - height) / 2.0,
            VAnchor::Bottom => area.bottom() - height,
        };
        (x, y)
    }
}

/// Where an overlay's pixels come from.
#[derive(Debug, Clone)]
pub enum OverlaySource {
    /// Already decoded by the caller
    Decoded(Arc<Bitmap>),
    /// Encoded bytes, decoded during the render
    Encoded(Arc<Vec<u8>>),
}

/// An image placed on top of a rendered page.
#[derive(Debug, Clone)]
pub struct ImageOverlay {
    pub source: OverlaySource,
    /// Anchor keyword, parsed with [`Anchor::parse`]
    pub anchor: String,
    pub scale: f32,
    pub opacity: f32,
    /// Zero-based page the overlay belongs to
    pub page: usize,
}

impl ImageOverlay {
    pub fn new(source: OverlaySource, anchor: impl Into<String>) -> Self {
        Self {
            source,
            anchor: anchor.into(),
            scale: 1.0,
            opacity: 1.0,
            page: 0,
        }
    }

    pub fn from_bitmap(bitmap: Bitmap, anchor: impl Into<String>) -> Self {
        Self::new(OverlaySource::Decoded(Arc::new(bitmap)), anchor)
    }

    pub fn from_encoded(bytes: Vec<u8>, anchor: impl Into<String>) -> Self {
        Self::new(OverlaySource::Encoded(Arc::new(bytes)), anchor)
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn on_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// Everything a render call reads. The engine never mutates it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub text: String,
    pub settings: Settings,
    pub overlays: Vec<ImageOverlay>,
    /// Image stretched to cover every page, under the ruling and ink
    pub background: Option<OverlaySource>,
}

impl Document {
    pub fn new(text: impl Into<String>, settings: Settings) -> Self {
        Self {
            text: text.into(),
            settings,
            overlays: Vec::new(),
            background: None,
        }
    }

    pub fn with_overlay(mut self, overlay: ImageOverlay) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn with_background(mut self, source: OverlaySource) -> Self {
        self.background = Some(source);
        self
    }
}
