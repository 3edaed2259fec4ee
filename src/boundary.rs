//! Extract coronal-hole boundaries from a segmented grayscale raster.
//!
//! Coronal holes appear dark in EUV synoptic maps, so the foreground is
//! every pixel at or below the intensity threshold. The pipeline:
//! 1. Threshold the raster into a binary mask
//! 2. Label connected components (8-connectivity, two-pass union-find)
//! 3. Discard components at or below the minimum pixel area
//! 4. Trace each surviving component's exterior boundary polygon
//!
//! Interior contours (bright islands inside a hole) are not retained; only
//! exterior boundaries are traced. Extraction is a pure function of the
//! raster: an empty raster yields an empty [`Frame`].

use anyhow::Result;
use image::GrayImage;

use crate::contour::Contour;
use crate::frame::Frame;
use crate::Point2;

/// Configuration for boundary extraction.
#[derive(Debug, Clone)]
pub struct BoundaryExtractionConfig {
    /// Intensity at or below which a pixel counts as coronal-hole interior.
    /// Default: 55
    pub intensity_threshold: u8,

    /// Components with this many pixels or fewer are discarded as noise.
    /// Default: 50
    pub min_area_px: usize,
}

impl Default for BoundaryExtractionConfig {
    fn default() -> Self {
        Self {
            intensity_threshold: 55,
            min_area_px: 50,
        }
    }
}

/// Extract exterior boundary contours from a grayscale raster.
///
/// Returns a [`Frame`] whose contours are in labeling order (top-to-bottom
/// by first pixel); the order carries no meaning. Each contour's pixel
/// centroid is the mean of its component pixels, available immediately for
/// matching; the remaining features are populated later by the tracker's
/// fill render.
pub fn extract_boundaries(img: &GrayImage, config: &BoundaryExtractionConfig) -> Frame {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Frame::new((height, width), Vec::new());
    }
    let w = width as usize;
    let h = height as usize;

    let mask: Vec<bool> = img
        .as_raw()
        .iter()
        .map(|&v| v <= config.intensity_threshold)
        .collect();

    let (labels, num_labels) = label_components(&mask, w, h);

    // Gather component pixels in row-major order, so the first pixel of each
    // component is its topmost-leftmost one (the tracing start point).
    let mut components: Vec<Vec<(u32, u32)>> = vec![Vec::new(); num_labels];
    for (idx, &label) in labels.iter().enumerate() {
        if label > 0 {
            let row = (idx / w) as u32;
            let col = (idx % w) as u32;
            components[label as usize - 1].push((row, col));
        }
    }

    let mut contours = Vec::new();
    for (k, pixels) in components.into_iter().enumerate() {
        if pixels.len() <= config.min_area_px {
            continue;
        }

        let label = k as u32 + 1;
        let boundary = trace_exterior_boundary(&labels, w, h, label, pixels[0]);

        let n = pixels.len() as f64;
        let sum_row: f64 = pixels.iter().map(|&(r, _)| r as f64).sum();
        let sum_col: f64 = pixels.iter().map(|&(_, c)| c as f64).sum();
        let centroid = Point2::new((sum_col / n) as f32, (sum_row / n) as f32);

        contours.push(Contour::new(boundary, centroid));
    }

    Frame::new((height, width), contours)
}

/// Extract boundaries from raw row-major grayscale pixel data.
///
/// Fails fast with a descriptive error if the pixel slice length does not
/// match `width * height`.
pub fn extract_boundaries_from_raw(
    pixels: &[u8],
    width: u32,
    height: u32,
    config: &BoundaryExtractionConfig,
) -> Result<Frame> {
    anyhow::ensure!(
        pixels.len() == (width as usize) * (height as usize),
        "Pixel data length ({}) does not match width*height ({}x{}={})",
        pixels.len(),
        width,
        height,
        width as usize * height as usize
    );
    let img = GrayImage::from_raw(width, height, pixels.to_vec())
        .expect("length checked above");
    Ok(extract_boundaries(&img, config))
}

// ─── Internal helpers ──────────────────────────────────────────────────────

/// Two-pass union-find labeling of the foreground mask, 8-connectivity.
///
/// Returns the label raster (0 = background, labels start at 1) and the
/// number of distinct labels.
fn label_components(mask: &[bool], w: usize, h: usize) -> (Vec<u32>, usize) {
    let mut labels = vec![0u32; w * h];
    // parent[0] is the background sentinel.
    let mut parent: Vec<u32> = vec![0];

    fn find(parent: &mut [u32], mut x: u32) -> u32 {
        while parent[x as usize] != x {
            parent[x as usize] = parent[parent[x as usize] as usize];
            x = parent[x as usize];
        }
        x
    }

    // First pass: provisional labels, merging across the four already-seen
    // neighbors (W, NW, N, NE).
    for row in 0..h {
        for col in 0..w {
            let idx = row * w + col;
            if !mask[idx] {
                continue;
            }

            let mut seen = [0u32; 4];
            let mut n_seen = 0;
            if col > 0 && labels[idx - 1] > 0 {
                seen[n_seen] = labels[idx - 1];
                n_seen += 1;
            }
            if row > 0 {
                if labels[idx - w] > 0 {
                    seen[n_seen] = labels[idx - w];
                    n_seen += 1;
                }
                if col > 0 && labels[idx - w - 1] > 0 {
                    seen[n_seen] = labels[idx - w - 1];
                    n_seen += 1;
                }
                if col + 1 < w && labels[idx - w + 1] > 0 {
                    seen[n_seen] = labels[idx - w + 1];
                    n_seen += 1;
                }
            }

            if n_seen == 0 {
                let fresh = parent.len() as u32;
                parent.push(fresh);
                labels[idx] = fresh;
            } else {
                let min_label = *seen[..n_seen].iter().min().unwrap();
                labels[idx] = min_label;
                for &nl in &seen[..n_seen] {
                    let ra = find(&mut parent, min_label);
                    let rb = find(&mut parent, nl);
                    if ra != rb {
                        // Merge the higher root into the lower to keep the
                        // final ordering stable.
                        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
                        parent[hi as usize] = lo;
                    }
                }
            }
        }
    }

    // Second pass: flatten to sequential labels in order of first appearance.
    let mut root_map = std::collections::HashMap::new();
    let mut next = 1u32;
    for label in labels.iter_mut() {
        if *label > 0 {
            let root = find(&mut parent, *label);
            let mapped = *root_map.entry(root).or_insert_with(|| {
                let s = next;
                next += 1;
                s
            });
            *label = mapped;
        }
    }

    (labels, (next - 1) as usize)
}

/// Clockwise neighbor offsets (row, col), starting north.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Moore-neighbor boundary tracing.
///
/// `start` must be the component's topmost-leftmost pixel so that its west
/// neighbor is guaranteed to be background. The walk terminates when the
/// first boundary move recurs (same pixel entered from the same backtrack
/// cell), which is robust for single-pixel-wide components where the plain
/// "start revisited" criterion is not. A single-pixel component yields a
/// one-point polygon.
fn trace_exterior_boundary(
    labels: &[u32],
    w: usize,
    h: usize,
    label: u32,
    start: (u32, u32),
) -> Vec<Point2> {
    let at = |r: i64, c: i64| -> bool {
        r >= 0 && c >= 0 && (r as usize) < h && (c as usize) < w
            && labels[r as usize * w + c as usize] == label
    };
    let point = |(r, c): (i64, i64)| Point2::new(c as f32, r as f32);

    // One clockwise step: from `cur`, entered with backtrack cell `back`,
    // scan the 8 neighbors clockwise starting just past `back`.
    let step = |cur: (i64, i64), back: (i64, i64)| -> Option<((i64, i64), (i64, i64))> {
        let diff = (back.0 - cur.0, back.1 - cur.1);
        let pos = NEIGHBORS.iter().position(|&d| d == diff).expect("adjacent");
        for k in 1..=8 {
            let d = NEIGHBORS[(pos + k) % 8];
            let cand = (cur.0 + d.0, cur.1 + d.1);
            if at(cand.0, cand.1) {
                let prev = NEIGHBORS[(pos + k - 1) % 8];
                return Some((cand, (cur.0 + prev.0, cur.1 + prev.1)));
            }
        }
        None
    };

    let s = (start.0 as i64, start.1 as i64);
    let b0 = (s.0, s.1 - 1); // west neighbor, background by construction

    let mut boundary = vec![point(s)];
    let Some(first) = step(s, b0) else {
        // Isolated single pixel.
        return boundary;
    };
    let (mut cur, mut back) = first;

    // Each boundary pixel is entered from at most 8 directions.
    let limit = 8 * w * h;
    for _ in 0..limit {
        boundary.push(point(cur));
        match step(cur, back) {
            Some(state) if state == first => break,
            Some((next, next_back)) => {
                cur = next;
                back = next_back;
            }
            None => break,
        }
    }

    // The walk re-enters the start before the first move recurs; drop the
    // explicit closing vertex.
    if boundary.len() > 1 && boundary.last() == boundary.first() {
        boundary.pop();
    }

    boundary
}
