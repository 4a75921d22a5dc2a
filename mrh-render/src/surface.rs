//! Fixed-size pixel surfaces the renderer paints onto.

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use mrh_core::{CanvasSize, Color, PixelRect};
use std::path::Path;

/// Minimal canvas contract: clear everything, fill axis-aligned rectangles.
pub trait RenderSurface {
    fn size(&self) -> CanvasSize;

    /// Fill the whole surface, discarding previous content.
    fn clear(&mut self, color: &Color);

    /// Fill a rectangle, clipped to the surface. Empty rectangles are no-ops.
    fn fill_rect(&mut self, rect: &PixelRect, color: &Color);
}

/// Clip `rect` to a `width x height` surface; `None` when nothing remains.
pub fn clip_rect(rect: &PixelRect, size: CanvasSize) -> Option<(u32, u32, u32, u32)> {
    if rect.is_empty() {
        return None;
    }
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = rect.x.saturating_add(rect.width).min(size.width as i64);
    let y1 = rect.y.saturating_add(rect.height).min(size.height as i64);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Raster surface backed by an RGBA image.
pub struct PixelSurface {
    image: RgbaImage,
}

impl PixelSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            image: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("writing PNG to {}", path.display()))
    }
}

/// Source-over compositing of straight (non-premultiplied) RGBA.
fn blend(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f64 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f64 * sa + dst[i] as f64 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}

impl RenderSurface for PixelSurface {
    fn size(&self) -> CanvasSize {
        CanvasSize::new(self.image.width(), self.image.height())
    }

    fn clear(&mut self, color: &Color) {
        let px = Rgba(color.to_rgba8());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn fill_rect(&mut self, rect: &PixelRect, color: &Color) {
        let Some((x0, y0, x1, y1)) = clip_rect(rect, self.size()) else {
            return;
        };
        let src = color.to_rgba8();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = self.image.get_pixel_mut(x, y);
                p.0 = blend(p.0, src);
            }
        }
    }
}
