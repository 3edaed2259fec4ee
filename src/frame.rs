//! One raster's worth of extracted contours.

use crate::contour::Contour;
use crate::Point2;

/// The complete set of contours extracted from one raster at one timestamp.
///
/// Contour order is extraction order and carries no meaning beyond draw
/// order in the fill render. The tracker stamps `sequence` on ingestion;
/// `timestamp` ties the frame to its source raster and is for the caller to
/// fill in.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raster dimensions as (rows, cols).
    pub dims: (u32, u32),
    pub contours: Vec<Contour>,
    pub sequence: u64,
    pub timestamp: f64,
}

impl Frame {
    pub fn new(dims: (u32, u32), contours: Vec<Contour>) -> Self {
        Self {
            dims,
            contours,
            sequence: 0,
            timestamp: 0.0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Contour> {
        self.contours.iter()
    }

    /// Pixel centroids of all contours, in contour order.
    pub fn centroids(&self) -> Vec<Point2> {
        self.contours.iter().map(|c| c.centroid_pixel).collect()
    }
}
