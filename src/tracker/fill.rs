//! Fill rendering and per-contour feature recovery.
//!
//! After identity assignment, every contour of the current frame is drawn
//! filled onto a shared canvas in contour-list order, later contours
//! overwriting earlier ones wherever boundaries overlap. Pixel membership is
//! recovered from an integer label raster (each pixel stores the index of
//! the last contour drawn over it), so two contours can never alias the way
//! colliding RGB keys could; the color-filled RGB render is derived from the
//! same label raster and therefore agrees with it exactly.

use image::{Rgb, RgbImage};

use crate::frame::Frame;
use crate::grid::SphericalGrid;
use crate::Point2;

/// Render the frame's contours as a label raster.
///
/// Returns a row-major raster of `rows * cols` entries where 0 is background
/// and `k + 1` marks pixels owned by `frame.contours[k]`. Contours are drawn
/// in list order; later contours overwrite earlier ones.
pub(crate) fn render_labels(frame: &Frame) -> Vec<u32> {
    let (rows, cols) = frame.dims;
    let mut canvas = vec![0u32; rows as usize * cols as usize];
    for (k, contour) in frame.contours.iter().enumerate() {
        fill_polygon(&mut canvas, rows, cols, &contour.boundary, k as u32 + 1);
    }
    canvas
}

/// Render the frame's contours color-filled on a blank canvas.
///
/// This is the rendered product the original pipeline hands to the inverse
/// reprojection; contours without an assigned color fall back to the
/// background. Derived from the label raster, so its pixels match
/// [`Contour::pixel_membership`] exactly.
pub fn render_filled(frame: &Frame, background: Rgb<u8>) -> RgbImage {
    let (rows, cols) = frame.dims;
    let labels = render_labels(frame);
    let mut img = RgbImage::from_pixel(cols, rows, background);
    for (idx, &label) in labels.iter().enumerate() {
        if label > 0 {
            let color = frame.contours[label as usize - 1]
                .color
                .unwrap_or(background);
            let row = idx as u32 / cols;
            let col = idx as u32 % cols;
            img.put_pixel(col, row, color);
        }
    }
    img
}

/// Recompute every contour's membership and physical features from a fresh
/// fill render. Overwrites the feature fields in place.
pub(crate) fn recompute_features(frame: &mut Frame, grid: &SphericalGrid) {
    let (rows, cols) = frame.dims;
    if frame.contours.is_empty() || rows < 2 || cols < 2 {
        return;
    }

    let labels = render_labels(frame);
    let mut memberships: Vec<Vec<(u32, u32)>> = vec![Vec::new(); frame.contours.len()];
    for (idx, &label) in labels.iter().enumerate() {
        if label > 0 {
            let row = idx as u32 / cols;
            let col = idx as u32 % cols;
            memberships[label as usize - 1].push((row, col));
        }
    }

    for (contour, membership) in frame.contours.iter_mut().zip(memberships) {
        contour.update_features(membership, grid);
    }
}

/// Scanline fill of a closed polygon, plus explicit marking of every
/// polygon vertex.
///
/// Boundaries produced by tracing are dense pixel chains, so marking the
/// vertices paints the complete rim; the even-odd scanline pass paints the
/// interior.
fn fill_polygon(canvas: &mut [u32], rows: u32, cols: u32, poly: &[Point2], value: u32) {
    if poly.is_empty() {
        return;
    }

    for p in poly {
        let row = p.y.round() as i64;
        let col = p.x.round() as i64;
        if row >= 0 && col >= 0 && (row as u32) < rows && (col as u32) < cols {
            canvas[row as usize * cols as usize + col as usize] = value;
        }
    }
    if poly.len() < 3 {
        return;
    }

    let y_min = poly.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let y_max = poly.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let row_lo = (y_min.ceil().max(0.0)) as u32;
    let row_hi = (y_max.floor().min(rows as f32 - 1.0)) as u32;

    let mut xs: Vec<f32> = Vec::new();
    for row in row_lo..=row_hi {
        let yf = row as f32;
        xs.clear();
        for i in 0..poly.len() {
            let p = poly[i];
            let q = poly[(i + 1) % poly.len()];
            // Half-open rule so shared vertices are counted once.
            if (p.y <= yf && q.y > yf) || (q.y <= yf && p.y > yf) {
                let t = (yf - p.y) / (q.y - p.y);
                xs.push(p.x + t * (q.x - p.x));
            }
        }
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for pair in xs.chunks_exact(2) {
            let c0 = pair[0].ceil().max(0.0) as u32;
            let c1 = pair[1].floor().min(cols as f32 - 1.0) as i64;
            for col in c0 as i64..=c1 {
                canvas[row as usize * cols as usize + col as usize] = value;
            }
        }
    }
}
