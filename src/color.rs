//! Color value type, Euclidean color metric and RGB<->HSL conversion.
//!
//! Every tolerance match in the engine goes through [`distance`] +
//! [`tolerance_threshold`]: tolerances are per-mille fractions of the maximum
//! possible RGB distance, so tolerance 1000 matches every color.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Maximum Euclidean distance between two RGB colors, as used for tolerance
/// mapping (sqrt(255^2 * 3) rounded down to one decimal).
pub const MAX_COLOR_DISTANCE: f32 = 441.6;

/// An RGBA color with 8-bit color channels and a normalized [0, 1] alpha.
///
/// The 0-255 alpha stored in pixel buffers is converted at the buffer
/// boundary; see [`RgbaColor::from_pixel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl RgbaColor {
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Read a color out of an 8-bit RGBA pixel, normalizing alpha.
    pub fn from_pixel(pixel: &Rgba<u8>) -> Self {
        Self {
            r: pixel[0],
            g: pixel[1],
            b: pixel[2],
            a: pixel[3] as f32 / 255.0,
        }
    }
}

/// Euclidean distance over the three color channels. Alpha is ignored;
/// colors are compared only by their RGB position.
pub fn distance(a: &RgbaColor, b: &RgbaColor) -> f32 {
    let dr = a.r as f32 - b.r as f32;
    let dg = a.g as f32 - b.g as f32;
    let db = a.b as f32 - b.b as f32;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Map a [0, 1000] per-mille tolerance to an absolute distance threshold.
pub fn tolerance_threshold(tolerance: u16) -> f32 {
    (tolerance as f32 / 1000.0) * MAX_COLOR_DISTANCE
}

// ============================================================================
// COLOR SPACE CONVERSION (RGB <-> HSL)
// ============================================================================

/// Convert 8-bit RGB to HSL with h, s, l all in [0, 1].
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        // Achromatic
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Convert HSL (all components in [0, 1]) back to 8-bit RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    (
        (r * 255.0).round().clamp(0.0, 255.0) as u8,
        (g * 255.0).round().clamp(0.0, 255.0) as u8,
        (b * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_equal_colors() {
        let a = RgbaColor::opaque(120, 64, 200);
        let b = RgbaColor::new(120, 64, 200, 0.0); // alpha must not matter
        assert_eq!(distance(&a, &b), 0.0);
    }

    #[test]
    fn test_distance_extremes() {
        let black = RgbaColor::opaque(0, 0, 0);
        let white = RgbaColor::opaque(255, 255, 255);
        let d = distance(&black, &white);
        assert!((d - 441.672).abs() < 0.01);
    }

    #[test]
    fn test_tolerance_threshold_endpoints() {
        assert_eq!(tolerance_threshold(0), 0.0);
        assert_eq!(tolerance_threshold(1000), MAX_COLOR_DISTANCE);
        assert!((tolerance_threshold(500) - 220.8).abs() < 0.001);
    }

    #[test]
    fn test_rgb_hsl_roundtrip_known_colors() {
        let test_colors = [
            (255, 0, 0), (0, 255, 0), (0, 0, 255),
            (255, 255, 255), (0, 0, 0), (128, 128, 128),
            (200, 100, 50), (1, 254, 127),
        ];

        for (r, g, b) in test_colors {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let (r2, g2, b2) = hsl_to_rgb(h, s, l);
            assert!((r as i16 - r2 as i16).abs() <= 1, "Red mismatch for ({}, {}, {})", r, g, b);
            assert!((g as i16 - g2 as i16).abs() <= 1, "Green mismatch for ({}, {}, {})", r, g, b);
            assert!((b as i16 - b2 as i16).abs() <= 1, "Blue mismatch for ({}, {}, {})", r, g, b);
        }
    }

    #[test]
    fn test_rgb_hsl_roundtrip_grid() {
        // Coarse sweep of the 8-bit cube; round trip must hold within +/-1
        for r in (0..=255).step_by(17) {
            for g in (0..=255).step_by(17) {
                for b in (0..=255).step_by(17) {
                    let (h, s, l) = rgb_to_hsl(r as u8, g as u8, b as u8);
                    let (r2, g2, b2) = hsl_to_rgb(h, s, l);
                    assert!((r - r2 as i32).abs() <= 1);
                    assert!((g - g2 as i32).abs() <= 1);
                    assert!((b - b2 as i32).abs() <= 1);
                }
            }
        }
    }

    #[test]
    fn test_hsl_components_in_range() {
        let (h, s, l) = rgb_to_hsl(250, 3, 177);
        assert!((0.0..=1.0).contains(&h));
        assert!((0.0..=1.0).contains(&s));
        assert!((0.0..=1.0).contains(&l));
    }
}
