//! # Drawing Surfaces
//!
//! [`DrawSurface`] is the seam between the pad's state machine and
//! whatever actually holds pixels. Coordinates passed to a surface are
//! surface-local logical pixels; the surface applies the device pixel
//! ratio it was mounted with.
//!
//! [`RasterSurface`] keeps an `image::RgbImage`. It has no alpha channel,
//! so every exported image is opaque. Segments are drawn as round-capped
//! capsules with one pixel of anti-aliasing at the edge.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use image::{ImageFormat, Rgb as Pixel, RgbImage};

use crate::color::Rgb;
use crate::config::{fit_scale, scaled_side};
use crate::error::ExportError;
use crate::event::Point;

/// Prefix of every export produced by [`RasterSurface::encode`].
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Something the pad can draw on.
pub trait DrawSurface: Send {
    /// (Re)size for a logical size and device pixel ratio. Existing pixel
    /// content is discarded.
    fn mount(&mut self, logical_width: u32, logical_height: u32, device_pixel_ratio: f64);

    /// Paint every pixel with `color`.
    fn fill(&mut self, color: Rgb);

    /// Draw a line from `from` to `to`. A zero-length segment is a dot.
    fn segment(&mut self, from: Point, to: Point, color: Rgb, width: f64);

    /// Encode the full surface as a self-describing image string.
    fn encode(&self) -> Result<String, ExportError>;

    /// Current raster size in physical pixels.
    fn pixel_size(&self) -> (u32, u32);
}

/// In-memory opaque RGB raster.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbImage,
    scale: f64,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface {
    /// An unmounted 1×1 surface; the pad mounts it to its configured size.
    pub fn new() -> Self {
        Self {
            image: RgbImage::new(1, 1),
            scale: 1.0,
        }
    }

    /// The backing image.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgb, coverage: f64) {
        let px = self.image.get_pixel_mut(x, y);
        *px = Pixel(color.over(px.0, coverage));
    }
}

impl DrawSurface for RasterSurface {
    fn mount(&mut self, logical_width: u32, logical_height: u32, device_pixel_ratio: f64) {
        let scale = fit_scale(logical_width, logical_height, device_pixel_ratio);
        let w = scaled_side(logical_width, scale);
        let h = scaled_side(logical_height, scale);
        self.image = RgbImage::new(w, h);
        self.scale = scale;
    }

    fn fill(&mut self, color: Rgb) {
        let pixel = Pixel(color.to_array());
        for px in self.image.pixels_mut() {
            *px = pixel;
        }
    }

    fn segment(&mut self, from: Point, to: Point, color: Rgb, width: f64) {
        let (w, h) = self.image.dimensions();
        let (ax, ay) = (from.x * self.scale, from.y * self.scale);
        let (bx, by) = (to.x * self.scale, to.y * self.scale);
        let radius = (width * self.scale / 2.0).max(0.5);

        let min_x = (ax.min(bx) - radius - 1.0).floor().max(0.0);
        let min_y = (ay.min(by) - radius - 1.0).floor().max(0.0);
        let max_x = (ax.max(bx) + radius + 1.0).ceil().min(f64::from(w));
        let max_y = (ay.max(by) + radius + 1.0).ceil().min(f64::from(h));
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let (dx, dy) = (bx - ax, by - ay);
        let len_sq = dx * dx + dy * dy;

        for y in (min_y as u32)..(max_y as u32) {
            for x in (min_x as u32)..(max_x as u32) {
                let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
                let t = if len_sq == 0.0 {
                    0.0
                } else {
                    (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
                };
                let (cx, cy) = (ax + t * dx, ay + t * dy);
                let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                let coverage = radius + 0.5 - dist;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn encode(&self) -> Result<String, ExportError> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(format!("{PNG_DATA_URI_PREFIX}{}", B64.encode(&png)))
    }

    fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
