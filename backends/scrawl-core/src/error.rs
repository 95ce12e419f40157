// this_file: backends/scrawl-core/src/error.rs

//! Error types for scrawl.
//!
//! Only `InvalidGeometry`, `InvalidSetting`, `Encode`, `Io` and `Render`
//! abort a render call. `FontUnavailable` and `DecodeFailed` are recovered
//! inside the pipeline and surface only in logs; `ConfigParse` is handed
//! back to the caller while the previous settings stay in force.

use thiserror::Error;

/// Main error type for scrawl operations.
#[derive(Error, Debug)]
pub enum ScrawlError {
    /// Margins leave no drawable area on the page
    #[error("Invalid page geometry {width}x{height}: {reason}")]
    InvalidGeometry {
        width: f32,
        height: f32,
        reason: String,
    },

    /// A settings value violates its documented range
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Requested font family could not be acquired
    #[error("Font unavailable: {family} (weight {weight}): {reason}")]
    FontUnavailable {
        family: String,
        weight: u16,
        reason: String,
    },

    /// Overlay image bytes could not be decoded
    #[error("Image decode failed: {reason}")]
    DecodeFailed { reason: String },

    /// Options payload could not be parsed at all
    #[error("Configuration parse error: {reason}")]
    ConfigParse { reason: String },

    /// Export backend or its input is not ready yet
    #[error("Export unavailable ({format}): {reason}")]
    ExportUnavailable { format: String, reason: String },

    /// Encoder failure while serializing a page
    #[error("{format} encoding error: {reason}")]
    Encode { format: String, reason: String },

    /// Raster surface failure
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrawlError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn geometry(width: f32, height: f32, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            width,
            height,
            reason: reason.into(),
        }
    }

    pub fn setting(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn font_unavailable(family: impl Into<String>, weight: u16, reason: impl Into<String>) -> Self {
        Self::FontUnavailable {
            family: family.into(),
            weight,
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }

    pub fn encode(format: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Encode {
            format: format.into(),
            reason: reason.to_string(),
        }
    }

    pub fn export_unavailable(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExportUnavailable {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same call once the missing
    /// resource becomes ready.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExportUnavailable { .. })
    }
}
