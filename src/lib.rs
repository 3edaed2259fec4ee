//! # chtrack
//!
//! Coronal-hole detection and tracking for EUV synoptic-map pipelines.
//!
//! Given a time-ordered sequence of segmented grayscale rasters (colatitude
//! × Carrington longitude), `chtrack` extracts closed coronal-hole boundary
//! contours, assigns each hole a persistent identity across frames, and
//! measures per-hole physical features (centroid, area, and bounding box in
//! longitude/latitude space). A polar reprojection is provided so extraction
//! and rendering can run in a rotated frame where pole-adjacent regions sit
//! on the equator, free of the extreme pixel distortion of an
//! equirectangular grid.
//!
//! ## Example
//!
//! ```no_run
//! use chtrack::{BoundaryExtractionConfig, CoronalHoleTracker, TrackerConfig};
//!
//! let mut tracker = CoronalHoleTracker::new(TrackerConfig::default());
//! let extraction = BoundaryExtractionConfig::default();
//!
//! for path in ["frame_000.png", "frame_001.png"] {
//!     let raster = image::open(path).unwrap().to_luma8();
//!     let update = tracker.ingest_raster(&raster, &extraction);
//!     println!(
//!         "frame {}: {} matched, {} new",
//!         update.sequence, update.matched, update.appeared
//!     );
//!     for contour in tracker.current_frame().unwrap().iter() {
//!         if let Some(summary) = contour.summary() {
//!             println!("  hole {} area {:.2e} sr", summary.id, summary.area);
//!         }
//!     }
//! }
//! ```
//!
//! ## Pipeline overview
//!
//! 1. **Boundary extraction** ([`boundary`]) — threshold the raster (holes
//!    are dark in EUV), label connected components, trace each component's
//!    exterior boundary polygon.
//! 2. **Tracking** ([`tracker`]) — greedy centroid-distance matching
//!    against the previous frame; matched contours inherit identity and
//!    color, the rest are registered as new.
//! 3. **Feature recovery** — a fill render in contour order resolves
//!    overlapping regions, and each contour's membership yields its
//!    physical centroid, area, and bounding box on the spherical grid.
//! 4. **Reprojection** ([`projection`]) — optional ±90° rotation of the
//!    working frame for pole-safe extraction and rendering.

pub mod boundary;
pub mod contour;
pub mod frame;
pub mod grid;
pub mod projection;
pub mod tracker;

pub use boundary::{extract_boundaries, extract_boundaries_from_raw, BoundaryExtractionConfig};
pub use contour::{BoundingBox, Contour, ContourSummary};
pub use frame::Frame;
pub use grid::SphericalGrid;
pub use projection::{polar_forward, polar_forward_rgb, polar_inverse, polar_inverse_rgb};
pub use tracker::{
    render_filled, CoronalHoleTracker, IdentityRegistry, RetentionPolicy, TrackerConfig,
    TrackingUpdate,
};

// Commonly used types
// Note: pixel geometry is single precision; the physical feature math
// switches to f64 where solid-angle sums need the headroom.
pub type Point2 = nalgebra::Point2<f32>;
