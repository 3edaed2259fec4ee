//! Raster ↔ sphere coordinate mapping for synoptic maps.
//!
//! A synoptic raster is an equirectangular grid in colatitude and Carrington
//! longitude: row 0 corresponds to colatitude θ = π, the last row to θ = 0,
//! and columns span longitude φ ∈ [0, 2π]. Both the physical feature math
//! and the polar reprojection share this mapping, so it lives in one place.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Equirectangular colatitude/longitude grid over a raster of fixed size.
///
/// Rows map linearly onto colatitude θ ∈ [π, 0] (row 0 at θ = π) and columns
/// onto longitude φ ∈ [0, 2π], endpoints inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalGrid {
    rows: u32,
    cols: u32,
}

impl SphericalGrid {
    /// Create a grid for a raster of `rows × cols` pixels.
    ///
    /// Both dimensions must be at least 2 so the cell spacings are defined.
    pub fn new(rows: u32, cols: u32) -> Self {
        assert!(rows >= 2 && cols >= 2, "grid must be at least 2x2");
        Self { rows, cols }
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Colatitude spacing between adjacent rows (radians).
    #[inline]
    pub fn delta_theta(&self) -> f64 {
        PI / (self.rows - 1) as f64
    }

    /// Longitude spacing between adjacent columns (radians).
    #[inline]
    pub fn delta_phi(&self) -> f64 {
        TAU / (self.cols - 1) as f64
    }

    /// Colatitude of a row center. Row 0 is θ = π, the last row θ = 0.
    #[inline]
    pub fn theta(&self, row: f64) -> f64 {
        PI - row * self.delta_theta()
    }

    /// Latitude of a row center (π/2 − θ).
    #[inline]
    pub fn latitude(&self, row: f64) -> f64 {
        FRAC_PI_2 - self.theta(row)
    }

    /// Longitude of a column center.
    #[inline]
    pub fn longitude(&self, col: f64) -> f64 {
        col * self.delta_phi()
    }

    /// Solid angle subtended by one raster cell in the given row (steradians).
    ///
    /// Cells shrink as sin θ toward the poles; physical areas are sums of
    /// these weights, never raw pixel counts.
    #[inline]
    pub fn cell_solid_angle(&self, row: u32) -> f64 {
        self.theta(row as f64).sin() * self.delta_theta() * self.delta_phi()
    }

    /// Physical area of an axis-aligned pixel box (steradians).
    ///
    /// The box spans full pixel extents: rows `r0..=r1`, columns `c0..=c1`.
    /// Integrating sin θ over the colatitude span gives the closed form
    /// Δφ · (cos θ_low − cos θ_high).
    pub fn box_solid_angle(&self, r0: u32, r1: u32, c0: u32, c1: u32) -> f64 {
        let half_t = self.delta_theta() / 2.0;
        // Colatitude decreases with row index.
        let theta_high = (self.theta(r0 as f64) + half_t).min(PI);
        let theta_low = (self.theta(r1 as f64) - half_t).max(0.0);
        let phi_span = (c1 - c0 + 1) as f64 * self.delta_phi();
        phi_span * (theta_low.cos() - theta_high.cos())
    }
}
