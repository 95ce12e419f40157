// this_file: backends/scrawl-skia/src/decode.rs

use scrawl_core::{Bitmap, Result, ScrawlError};

/// Decode PNG or JPEG bytes into a straight-alpha RGBA bitmap.
pub fn decode_image(bytes: &[u8]) -> Result<Bitmap> {
    let image = image::load_from_memory(bytes).map_err(|err| ScrawlError::decode(err.to_string()))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ScrawlError::decode("image has no pixels"));
    }
    Ok(Bitmap {
        width,
        height,
        data: rgba.into_raw(),
    })
}
