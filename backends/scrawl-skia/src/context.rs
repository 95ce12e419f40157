// this_file: backends/scrawl-skia/src/context.rs

//! Mutable drawing target for one page.
//!
//! All coordinates passed in are nominal page pixels; the base transform maps
//! them onto the raster, so a context built at scale 2 renders every stroke at
//! twice the resolution instead of being resized afterwards.

use scrawl_core::{Bitmap, Rect, RenderSurface, Result, Rgba, ScrawlError};
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    PixmapRef, Stroke, StrokeDash, Transform,
};

/// tiny-skia pixmap plus the transform from nominal to raster pixels.
pub struct RenderContext {
    pixmap: Pixmap,
    base: Transform,
    scale: f32,
    /// Raster position of this context inside its parent page
    origin: (i32, i32),
}

impl RenderContext {
    /// Allocate a page raster of `nominal × scale` pixels filled with `background`.
    pub fn new(nominal_width: u32, nominal_height: u32, scale: f32, background: Rgba) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ScrawlError::setting("export_scale", format!("{scale} must be > 0")));
        }
        let width = scaled(nominal_width, scale);
        let height = scaled(nominal_height, scale);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ScrawlError::render(format!("cannot allocate a {width}x{height} pixmap"))
        })?;
        pixmap.fill(to_color(background));
        Ok(Self {
            pixmap,
            base: Transform::from_scale(scale, scale),
            scale,
            origin: (0, 0),
        })
    }

    /// Transparent scratch layer covering the nominal band `top..top + height`.
    pub fn band_layer(&self, top: f32, height: f32) -> Result<Self> {
        let raster_top = ((top * self.scale).floor() as i32).clamp(0, self.pixmap.height() as i32);
        let raster_bottom = (((top + height) * self.scale).ceil() as i32)
            .clamp(raster_top + 1, self.pixmap.height() as i32 + 1);
        let band_height = (raster_bottom - raster_top).max(1) as u32;
        let pixmap = Pixmap::new(self.pixmap.width(), band_height).ok_or_else(|| {
            ScrawlError::render(format!(
                "cannot allocate a {}x{band_height} layer",
                self.pixmap.width()
            ))
        })?;
        let origin = (self.origin.0, self.origin.1 + raster_top);
        Ok(Self {
            pixmap,
            base: Transform::from_translate(0.0, -(raster_top as f32)).pre_concat(self.base),
            scale: self.scale,
            origin,
        })
    }

    /// Blend a layer produced by [`RenderContext::band_layer`] back in.
    pub fn composite(&mut self, layer: &RenderContext, opacity: f32) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            layer.origin.0 - self.origin.0,
            layer.origin.1 - self.origin.1,
            layer.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Raster dimensions in device pixels.
    pub fn raster_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    pub fn fill_rect(&mut self, rect: &Rect, color: Rgba) {
        if let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
            let paint = paint(color);
            self.pixmap.fill_rect(r, &paint, self.base, None);
        }
    }

    /// Stroke a straight segment, optionally dashed with an on/off pattern.
    pub fn stroke_line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgba,
        dash: Option<&[f32]>,
    ) {
        if width <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };
        let mut stroke = Stroke {
            width,
            ..Stroke::default()
        };
        if let Some(pattern) = dash {
            stroke.dash = StrokeDash::new(pattern.to_vec(), 0.0);
        }
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, self.base, None);
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if let Some(path) = PathBuilder::from_circle(cx, cy, radius) {
            self.pixmap
                .fill_path(&path, &paint(color), FillRule::Winding, self.base, None);
        }
    }

    /// Fill a path given in local units placed by `transform`.
    pub fn fill_path(&mut self, path: &Path, color: Rgba, transform: Transform) {
        self.pixmap.fill_path(
            path,
            &paint(color),
            FillRule::Winding,
            self.base.pre_concat(transform),
            None,
        );
    }

    pub fn stroke_path(&mut self, path: &Path, color: Rgba, width: f32, transform: Transform) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            path,
            &paint(color),
            &stroke,
            self.base.pre_concat(transform),
            None,
        );
    }

    /// Draw a premultiplied pixmap whose top-left lands where `transform`
    /// maps the local origin.
    pub fn draw_pixmap(&mut self, pixmap: PixmapRef<'_>, transform: Transform, opacity: f32) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, pixmap, &paint, self.base.pre_concat(transform), None);
    }

    /// Draw a straight-alpha bitmap at `(x, y)` with its natural size × `scale`.
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, x: f32, y: f32, scale: f32, opacity: f32) -> Result<()> {
        let pixmap = bitmap_to_pixmap(bitmap)?;
        let transform = Transform::from_translate(x, y).pre_scale(scale, scale);
        self.draw_pixmap(pixmap.as_ref(), transform, opacity);
        Ok(())
    }

    /// Add `sample()` to the colour channels of every pixel.
    ///
    /// One sample is drawn per pixel in row-major order and shared by R, G
    /// and B so the grain shifts luminance only.
    pub fn add_noise(&mut self, mut sample: impl FnMut() -> f32) {
        for px in self.pixmap.data_mut().chunks_exact_mut(4) {
            let delta = sample();
            let alpha = px[3] as f32;
            for channel in &mut px[..3] {
                *channel = (*channel as f32 + delta).round().clamp(0.0, alpha) as u8;
            }
        }
    }

    /// Straight-alpha colour at raster coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba {
            r: px.red(),
            g: px.green(),
            b: px.blue(),
            a: px.alpha(),
        })
    }

    /// Freeze the raster. The context is consumed so nothing can draw into
    /// the surface afterwards.
    pub fn finish(self) -> Result<RenderSurface> {
        let (width, height) = self.raster_size();
        RenderSurface::from_rgba(width, height, self.pixmap.take(), true)
    }
}

fn scaled(nominal: u32, scale: f32) -> u32 {
    ((nominal as f32 * scale).round() as u32).max(1)
}

pub(crate) fn to_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_color(color));
    paint.anti_alias = true;
    paint
}

/// Premultiply a straight-alpha bitmap into a pixmap.
pub fn bitmap_to_pixmap(bitmap: &Bitmap) -> Result<Pixmap> {
    if !bitmap.is_consistent() {
        return Err(ScrawlError::decode(format!(
            "bitmap {}x{} carries {} bytes",
            bitmap.width,
            bitmap.height,
            bitmap.data.len()
        )));
    }
    let mut data = bitmap.data.clone();
    for px in data.chunks_exact_mut(4) {
        let alpha = px[3] as u16;
        for channel in &mut px[..3] {
            *channel = ((*channel as u16 * alpha + 127) / 255) as u8;
        }
    }
    let size = IntSize::from_wh(bitmap.width, bitmap.height)
        .ok_or_else(|| ScrawlError::decode("empty bitmap"))?;
    Pixmap::from_vec(data, size).ok_or_else(|| ScrawlError::decode("bitmap size mismatch"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_multiplies_raster() {
        let ctx = RenderContext::new(120, 80, 2.0, Rgba::WHITE).unwrap();
        assert_eq!(ctx.raster_size(), (240, 160));
        let surface = ctx.finish().unwrap();
        assert_eq!((surface.width(), surface.height()), (240, 160));
    }

    #[test]
    fn test_fill_rect_uses_nominal_coordinates() {
        let mut ctx = RenderContext::new(10, 10, 2.0, Rgba::WHITE).unwrap();
        ctx.fill_rect(&Rect::new(5.0, 5.0, 5.0, 5.0), Rgba::BLACK);
        assert_eq!(ctx.pixel(15, 15), Some(Rgba::BLACK));
        assert_eq!(ctx.pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_band_layer_composites_in_place() {
        let mut ctx = RenderContext::new(20, 20, 1.0, Rgba::WHITE).unwrap();
        let mut layer = ctx.band_layer(10.0, 5.0).unwrap();
        assert_eq!(layer.raster_size(), (20, 5));
        layer.fill_rect(&Rect::new(0.0, 10.0, 20.0, 5.0), Rgba::BLACK);
        ctx.composite(&layer, 1.0);
        assert_eq!(ctx.pixel(3, 12), Some(Rgba::BLACK));
        assert_eq!(ctx.pixel(3, 8), Some(Rgba::WHITE));
        assert_eq!(ctx.pixel(3, 16), Some(Rgba::WHITE));
    }

    #[test]
    fn test_half_opacity_layer() {
        let mut ctx = RenderContext::new(4, 4, 1.0, Rgba::WHITE).unwrap();
        let mut layer = ctx.band_layer(0.0, 4.0).unwrap();
        layer.fill_rect(&Rect::new(0.0, 0.0, 4.0, 4.0), Rgba::BLACK);
        ctx.composite(&layer, 0.5);
        let px = ctx.pixel(1, 1).unwrap();
        assert!((120..=135).contains(&px.r), "{px:?}");
    }

    #[test]
    fn test_noise_stays_within_alpha() {
        let mut ctx = RenderContext::new(2, 2, 1.0, Rgba::rgb(250, 128, 3)).unwrap();
        ctx.add_noise(|| 10.0);
        assert_eq!(ctx.pixel(0, 0), Some(Rgba::rgb(255, 138, 13)));
    }

    #[test]
    fn test_bitmap_rejects_inconsistent_buffer() {
        let bitmap = Bitmap {
            width: 2,
            height: 2,
            data: vec![0; 3],
        };
        assert!(bitmap_to_pixmap(&bitmap).is_err());
    }
}
