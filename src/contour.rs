//! The per-region entity: one detected coronal hole in one raster.
//!
//! A `Contour` is created by boundary extraction with its geometry only.
//! The tracker assigns identity and color on first sighting or on a match,
//! and overwrites the derived physical features after every frame's fill
//! render. The boundary polygon itself is immutable once extracted.

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::grid::SphericalGrid;
use crate::Point2;

/// Axis-aligned bounding box in pixel coordinates, inclusive on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl BoundingBox {
    /// Grow the box to include the pixel at (row, col).
    fn include(&mut self, row: u32, col: u32) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }

    pub fn width(&self) -> u32 {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> u32 {
        self.max_row - self.min_row + 1
    }
}

/// One detected coronal-hole region.
#[derive(Debug, Clone)]
pub struct Contour {
    /// Closed exterior boundary polygon in pixel coordinates (x = column,
    /// y = row), in tracing order.
    pub boundary: Vec<Point2>,
    /// Persistent identity, assigned once by the tracker and never reused.
    pub id: Option<u32>,
    /// Rendering key; unique among live identities.
    pub color: Option<Rgb<u8>>,
    /// Raster coordinates (row, col) owned by this contour in the most
    /// recent fill render. Recomputed every frame.
    pub pixel_membership: Vec<(u32, u32)>,
    /// Centroid in pixel coordinates.
    pub centroid_pixel: Point2,
    /// Centroid as (longitude, latitude) in radians, weighted by per-pixel
    /// solid angle.
    pub centroid_physical: Option<(f64, f64)>,
    /// Axis-aligned pixel bounding box of the membership.
    pub bounding_box: Option<BoundingBox>,
    /// Physical area in steradians (solid-angle weighted, not pixel count).
    pub area_physical: Option<f64>,
    /// Physical area of the bounding box in steradians.
    pub bounding_box_area: Option<f64>,
}

impl Contour {
    /// Create a contour from its traced boundary and initial pixel centroid.
    pub fn new(boundary: Vec<Point2>, centroid_pixel: Point2) -> Self {
        Self {
            boundary,
            id: None,
            color: None,
            pixel_membership: Vec::new(),
            centroid_pixel,
            centroid_physical: None,
            bounding_box: None,
            area_physical: None,
            bounding_box_area: None,
        }
    }

    /// Replace the pixel membership and recompute every derived feature.
    ///
    /// An empty membership (the contour was completely overdrawn by later
    /// contours in the fill render) clears the derived fields and leaves the
    /// extraction-time pixel centroid in place.
    pub fn update_features(&mut self, membership: Vec<(u32, u32)>, grid: &SphericalGrid) {
        self.pixel_membership = membership;
        if self.pixel_membership.is_empty() {
            self.centroid_physical = None;
            self.bounding_box = None;
            self.area_physical = None;
            self.bounding_box_area = None;
            return;
        }

        let (r0, c0) = self.pixel_membership[0];
        let mut bbox = BoundingBox {
            min_row: r0,
            min_col: c0,
            max_row: r0,
            max_col: c0,
        };

        let mut sum_row = 0.0_f64;
        let mut sum_col = 0.0_f64;
        let mut weight = 0.0_f64;
        let mut w_row = 0.0_f64;
        let mut w_col = 0.0_f64;

        for &(row, col) in &self.pixel_membership {
            bbox.include(row, col);
            sum_row += row as f64;
            sum_col += col as f64;

            let w = grid.cell_solid_angle(row);
            weight += w;
            w_row += row as f64 * w;
            w_col += col as f64 * w;
        }

        let n = self.pixel_membership.len() as f64;
        self.centroid_pixel = Point2::new((sum_col / n) as f32, (sum_row / n) as f32);

        // At the exact poles every cell weight vanishes; fall back to the
        // unweighted pixel centroid there.
        self.centroid_physical = if weight > 0.0 {
            Some((
                grid.longitude(w_col / weight),
                grid.latitude(w_row / weight),
            ))
        } else {
            Some((
                grid.longitude(sum_col / n),
                grid.latitude(sum_row / n),
            ))
        };

        self.area_physical = Some(weight);
        self.bounding_box_area = Some(grid.box_solid_angle(
            bbox.min_row,
            bbox.max_row,
            bbox.min_col,
            bbox.max_col,
        ));
        self.bounding_box = Some(bbox);
    }

    /// Export view of a fully tracked contour, or `None` if the tracker has
    /// not yet assigned identity and features.
    pub fn summary(&self) -> Option<ContourSummary> {
        Some(ContourSummary {
            id: self.id?,
            color: self.color?.0,
            centroid_longitude: self.centroid_physical?.0,
            centroid_latitude: self.centroid_physical?.1,
            centroid_pixel: (self.centroid_pixel.x, self.centroid_pixel.y),
            area: self.area_physical?,
            bounding_box: self.bounding_box?,
            bounding_box_area: self.bounding_box_area?,
        })
    }
}

/// Identity-tagged measurement record for one contour in one frame.
///
/// This is the shape consumed by the downstream map-construction stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourSummary {
    pub id: u32,
    pub color: [u8; 3],
    /// Longitude of the physical centroid, radians.
    pub centroid_longitude: f64,
    /// Latitude of the physical centroid, radians.
    pub centroid_latitude: f64,
    /// Centroid in pixel coordinates (x = column, y = row).
    pub centroid_pixel: (f32, f32),
    /// Physical area in steradians.
    pub area: f64,
    pub bounding_box: BoundingBox,
    /// Physical area of the bounding box in steradians.
    pub bounding_box_area: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_membership(r0: u32, c0: u32, side: u32) -> Vec<(u32, u32)> {
        let mut px = Vec::new();
        for r in r0..r0 + side {
            for c in c0..c0 + side {
                px.push((r, c));
            }
        }
        px
    }

    #[test]
    fn test_features_of_equatorial_square() {
        let grid = SphericalGrid::new(91, 181);
        let mut c = Contour::new(Vec::new(), Point2::new(0.0, 0.0));
        // 5x5 square centered on the equator row (45).
        c.update_features(square_membership(43, 88, 5), &grid);

        let bbox = c.bounding_box.unwrap();
        assert_eq!(bbox.min_row, 43);
        assert_eq!(bbox.max_row, 47);
        assert_eq!(bbox.width(), 5);

        // Pixel centroid at the square center.
        assert!((c.centroid_pixel.x - 90.0).abs() < 1e-4);
        assert!((c.centroid_pixel.y - 45.0).abs() < 1e-4);

        // Physical centroid on the equator (latitude 0), longitude π.
        let (lon, lat) = c.centroid_physical.unwrap();
        assert!(lat.abs() < 1e-6, "lat = {lat}");
        assert!((lon - std::f64::consts::PI).abs() < 1e-6);

        // Area below the bounding box area, both positive.
        let area = c.area_physical.unwrap();
        let box_area = c.bounding_box_area.unwrap();
        assert!(area > 0.0);
        assert!(box_area >= area);
    }

    #[test]
    fn test_area_equal_under_longitude_translation() {
        let grid = SphericalGrid::new(91, 181);
        let mut a = Contour::new(Vec::new(), Point2::new(0.0, 0.0));
        let mut b = Contour::new(Vec::new(), Point2::new(0.0, 0.0));
        a.update_features(square_membership(40, 20, 7), &grid);
        b.update_features(square_membership(40, 120, 7), &grid);
        // Same latitude band, so the weight sums are identical term by term.
        assert_eq!(a.area_physical.unwrap(), b.area_physical.unwrap());
    }

    #[test]
    fn test_empty_membership_clears_features() {
        let grid = SphericalGrid::new(91, 181);
        let mut c = Contour::new(Vec::new(), Point2::new(3.0, 4.0));
        c.update_features(square_membership(10, 10, 3), &grid);
        assert!(c.area_physical.is_some());
        c.update_features(Vec::new(), &grid);
        assert!(c.area_physical.is_none());
        assert!(c.bounding_box.is_none());
        assert!(c.summary().is_none());
    }

    #[test]
    fn test_summary_requires_identity() {
        let grid = SphericalGrid::new(91, 181);
        let mut c = Contour::new(Vec::new(), Point2::new(0.0, 0.0));
        c.update_features(square_membership(40, 40, 4), &grid);
        assert!(c.summary().is_none());
        c.id = Some(7);
        c.color = Some(image::Rgb([10, 20, 30]));
        let s = c.summary().unwrap();
        assert_eq!(s.id, 7);
        assert_eq!(s.color, [10, 20, 30]);
        assert!(s.area > 0.0);
    }
}
