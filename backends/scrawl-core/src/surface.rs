// this_file: backends/scrawl-core/src/surface.rs

//! Finished page rasters and their conversion into encoder-ready buffers.

use crate::{Result, ScrawlError};

/// Immutable page raster produced by the drawing backend.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    width: u32,
    height: u32,
    premultiplied: bool,
    data: Vec<u8>,
}

impl RenderSurface {
    /// Create a new RGBA surface.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, premultiplied: bool) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ScrawlError::render(format!(
                "surface buffer holds {} bytes, {width}x{height} needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            premultiplied,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    /// Raw RGBA bytes as produced by the backend.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Straight-alpha RGBA of one pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[offset..offset + 4]);
        if self.premultiplied {
            unpremultiply(&mut px);
        }
        Some(px)
    }

    /// Straight-alpha RGBA copy of the whole surface.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply(&mut data);
        }
        data
    }

    /// Opaque RGB copy, flattening any transparency onto white.
    pub fn to_rgb(&self) -> Vec<u8> {
        let rgba = self.to_rgba();
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for chunk in rgba.chunks_exact(4) {
            let alpha = chunk[3] as u32;
            for &channel in &chunk[..3] {
                let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
                rgb.push(blended as u8);
            }
        }
        rgb
    }

    /// Lossless PNG of the surface.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        encode_png(self.width, self.height, &self.to_rgba())
    }
}

fn unpremultiply(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(4) {
        let alpha = chunk[3];
        if alpha == 0 || alpha == 255 {
            continue;
        }
        let alpha_f = alpha as f32 / 255.0;
        for channel in &mut chunk[..3] {
            let unpremultiplied = ((*channel as f32) / alpha_f).round().clamp(0.0, 255.0);
            *channel = unpremultiplied as u8;
        }
    }
}

fn encode_png(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|err| ScrawlError::encode("png", err))?;
        writer
            .write_image_data(data)
            .map_err(|err| ScrawlError::encode("png", err))?;
    }
    Ok(png_data)
}
