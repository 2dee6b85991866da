//! Pixel pipeline: applies the resolved operator lists to a pixel buffer.
//!
//! The pipeline is pure. It never mutates its input, never looks at a
//! neighboring pixel, and takes the full resolved parameter snapshot
//! ([`ProcessingParams`]) by reference, so it can run per pixel in any order.
//! Per-pixel evaluation order is fixed:
//!
//! 1. Unaffected-color exclusion - a match copies the pixel through untouched.
//! 2. Transparency operators in resolved order - first match sets alpha 0 and
//!    ends processing for the pixel.
//! 3. Color-change operators in resolved order - every operator whose target
//!    matches the *original* pixel transforms the *running* color, so stacked
//!    operators compose.
//!
//! "Resolved order" is history entries through the cursor, then staging, per
//! operator kind; uncommitted slider state is always previewed.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::{self, RgbaColor};
use crate::ops::{ColorChangeState, TransparencyState, UnaffectedColorState};

// ============================================================================
// PARAMETER SNAPSHOT
// ============================================================================

/// One operator kind's resolved inputs: the active history prefix plus the
/// live staging state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorSet<S> {
    pub history: Vec<S>,
    pub staging: S,
}

impl<S> OperatorSet<S> {
    /// Operators in application order: history first, then staging.
    pub fn resolved(&self) -> impl Iterator<Item = &S> {
        self.history.iter().chain(std::iter::once(&self.staging))
    }
}

/// The full input snapshot the pipeline consumes. Rebuilt from session state
/// whenever anything changes; owns no lifecycle of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingParams {
    pub transparency: OperatorSet<TransparencyState>,
    pub color_change: OperatorSet<ColorChangeState>,
    pub unaffected_color: UnaffectedColorState,
}

// ============================================================================
// RESOLVED OPERATORS
// ============================================================================

// Operators with no color picked are inert; they are dropped here so the
// per-pixel loop only sees matchable operators with precomputed thresholds.

struct ResolvedKey {
    color: RgbaColor,
    threshold: f32,
}

struct ResolvedChange {
    target: RgbaColor,
    threshold: f32,
    hue: i16,
    saturation: i16,
    brightness: i16,
    contrast: i16,
}

struct ResolvedPipeline {
    unaffected: Option<ResolvedKey>,
    transparency: Vec<ResolvedKey>,
    color_change: Vec<ResolvedChange>,
}

impl ResolvedPipeline {
    fn new(params: &ProcessingParams) -> Self {
        let unaffected = match (&params.unaffected_color.color, params.unaffected_color.enabled) {
            (Some(color), true) => Some(ResolvedKey {
                color: *color,
                threshold: color::tolerance_threshold(params.unaffected_color.tolerance),
            }),
            _ => None,
        };

        let transparency = params
            .transparency
            .resolved()
            .filter_map(|op| {
                op.color.map(|color| ResolvedKey {
                    color,
                    threshold: color::tolerance_threshold(op.tolerance),
                })
            })
            .collect();

        let color_change = params
            .color_change
            .resolved()
            .filter_map(|op| {
                op.target.map(|target| ResolvedChange {
                    target,
                    threshold: color::tolerance_threshold(op.tolerance),
                    hue: op.hue,
                    saturation: op.saturation,
                    brightness: op.brightness,
                    contrast: op.contrast,
                })
            })
            .collect();

        Self {
            unaffected,
            transparency,
            color_change,
        }
    }

    fn transform_pixel(&self, pixel: &Rgba<u8>) -> Rgba<u8> {
        let original = RgbaColor::from_pixel(pixel);

        // Unaffected color has absolute priority over every operator
        if let Some(key) = &self.unaffected {
            if color::distance(&original, &key.color) <= key.threshold {
                return *pixel;
            }
        }

        // First matching transparency operator wins; a keyed-out pixel keeps
        // its RGB and skips color change entirely
        for op in &self.transparency {
            if color::distance(&original, &op.color) <= op.threshold {
                return Rgba([pixel[0], pixel[1], pixel[2], 0]);
            }
        }

        let (mut r, mut g, mut b) = (pixel[0], pixel[1], pixel[2]);

        for op in &self.color_change {
            // Match against the original pixel, transform the running color
            if color::distance(&original, &op.target) > op.threshold {
                continue;
            }

            let (h, s, l) = color::rgb_to_hsl(r, g, b);
            let h = (h * 360.0 + op.hue as f32).rem_euclid(360.0) / 360.0;
            let s = (s + op.saturation as f32 / 100.0).clamp(0.0, 1.0);
            let l = (l + op.brightness as f32 / 100.0).clamp(0.0, 1.0);
            let (nr, ng, nb) = color::hsl_to_rgb(h, s, l);

            let factor = (259.0 * (op.contrast as f32 + 255.0)) / (255.0 * (259.0 - op.contrast as f32));
            r = (factor * (nr as f32 - 128.0) + 128.0).clamp(0.0, 255.0).round() as u8;
            g = (factor * (ng as f32 - 128.0) + 128.0).clamp(0.0, 255.0).round() as u8;
            b = (factor * (nb as f32 - 128.0) + 128.0).clamp(0.0, 255.0).round() as u8;
        }

        Rgba([r, g, b, pixel[3]])
    }
}

// ============================================================================
// PIPELINE ENTRY POINTS
// ============================================================================

/// Run the pipeline over a buffer, returning a new buffer of the same
/// dimensions. The input is never mutated.
pub fn process_image(original: &RgbaImage, params: &ProcessingParams) -> RgbaImage {
    let resolved = ResolvedPipeline::new(params);
    let mut output = RgbaImage::new(original.width(), original.height());

    for (x, y, pixel) in original.enumerate_pixels() {
        output.put_pixel(x, y, resolved.transform_pixel(pixel));
    }

    output
}

/// Same result as [`process_image`], with rows processed in parallel. The
/// per-pixel computation only reads the original pixel and the immutable
/// snapshot, so row chunking is safe.
pub fn process_image_par(original: &RgbaImage, params: &ProcessingParams) -> RgbaImage {
    let (width, height) = original.dimensions();
    if width == 0 || height == 0 {
        return original.clone();
    }

    let resolved = ResolvedPipeline::new(params);
    let row_len = width as usize * 4;
    let mut output = vec![0u8; row_len * height as usize];

    output
        .par_chunks_mut(row_len)
        .zip(original.as_raw().par_chunks(row_len))
        .for_each(|(out_row, src_row)| {
            for (out_px, src_px) in out_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let pixel = Rgba([src_px[0], src_px[1], src_px[2], src_px[3]]);
                out_px.copy_from_slice(&resolved.transform_pixel(&pixel).0);
            }
        });

    RgbaImage::from_raw(width, height, output).expect("output buffer matches input dimensions")
}
