//! Pad configuration.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Size, scaling, and presentation of one signature pad.
///
/// `width` and `height` are logical (CSS) pixels. The raster behind the
/// pad is `width * device_pixel_ratio` by `height * device_pixel_ratio`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
    pub pen_color: Rgb,
    pub background_color: Rgb,
    /// Stroke width in logical pixels.
    pub stroke_width: f64,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 200,
            device_pixel_ratio: 1.0,
            pen_color: Rgb::BLACK,
            background_color: Rgb::WHITE,
            stroke_width: 2.0,
        }
    }
}

impl PadConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = dpr;
        self
    }

    pub fn with_pen_color(mut self, color: Rgb) -> Self {
        self.pen_color = color;
        self
    }

    pub fn with_background_color(mut self, color: Rgb) -> Self {
        self.background_color = color;
        self
    }

    /// The ratio actually applied. See [`fit_scale`].
    pub fn effective_dpr(&self) -> f64 {
        fit_scale(self.width, self.height, self.device_pixel_ratio)
    }

    /// Raster dimensions in physical pixels, between 1 and
    /// [`MAX_PHYSICAL_SIDE`] on each side.
    pub fn physical_size(&self) -> (u32, u32) {
        let dpr = self.effective_dpr();
        (scaled_side(self.width, dpr), scaled_side(self.height, dpr))
    }
}

/// Longest raster side, in physical pixels.
pub const MAX_PHYSICAL_SIDE: u32 = 4096;

/// Scale applied to a logical size for a requested device pixel ratio.
///
/// Non-finite or non-positive ratios fall back to 1. The result is
/// lowered so that the longer side fits in [`MAX_PHYSICAL_SIDE`].
pub fn fit_scale(width: u32, height: u32, device_pixel_ratio: f64) -> f64 {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let longest = f64::from(width.max(height).max(1));
    dpr.min(f64::from(MAX_PHYSICAL_SIDE) / longest)
}

pub(crate) fn scaled_side(logical: u32, scale: f64) -> u32 {
    ((f64::from(logical) * scale).round() as u32).clamp(1, MAX_PHYSICAL_SIDE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_scales_by_dpr() {
        let cfg = PadConfig::default().with_size(300, 100).with_device_pixel_ratio(2.0);
        assert_eq!(cfg.physical_size(), (600, 200));
    }

    #[test]
    fn bad_dpr_falls_back_to_one() {
        let cfg = PadConfig::default().with_device_pixel_ratio(f64::NAN);
        assert_eq!(cfg.effective_dpr(), 1.0);
        let cfg = PadConfig::default().with_device_pixel_ratio(-2.0);
        assert_eq!(cfg.physical_size(), (500, 200));
    }

    #[test]
    fn oversized_configs_are_capped() {
        let cfg = PadConfig::default().with_device_pixel_ratio(1e12);
        assert_eq!(cfg.physical_size(), (MAX_PHYSICAL_SIDE, 1638));

        let cfg = PadConfig::default().with_size(u32::MAX, 10);
        let (w, h) = cfg.physical_size();
        assert_eq!(w, MAX_PHYSICAL_SIDE);
        assert_eq!(h, 1);
        assert!(cfg.effective_dpr() < 1.0);
    }

    #[test]
    fn zero_size_is_clamped() {
        let cfg = PadConfig::default().with_size(0, 0);
        assert_eq!(cfg.physical_size(), (1, 1));
    }
}
