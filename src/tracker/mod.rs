//! Multi-frame coronal-hole tracking.
//!
//! The tracker ingests a time-ordered sequence of [`Frame`]s and assigns
//! each contour a persistent identity. Processing one frame:
//!
//! 1. Match the new frame's centroids against the previous frame's
//!    ([`matching`]): survivors inherit id and color, the rest are issued
//!    fresh identities.
//! 2. Render the frame color-filled and recover per-contour pixel
//!    membership from the label raster ([`fill`]).
//! 3. Recompute every contour's physical features in place.
//! 4. Record sightings in the append-only [`registry`] and apply the
//!    retention policy.
//!
//! Ingestion is inherently sequential (each step depends on the previous
//! frame's identity assignments), so a tracker instance must not be shared
//! across threads. A caller may stop at any frame boundary; the registry is
//! always left in a valid state.

pub mod fill;
pub mod matching;
pub mod registry;

use std::collections::VecDeque;

use image::{GrayImage, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::boundary::{extract_boundaries, BoundaryExtractionConfig};
use crate::frame::Frame;
use crate::grid::SphericalGrid;

pub use fill::render_filled;
pub use matching::{assign, Assignment};
pub use registry::{IdentityRecord, IdentityRegistry, RetentionPolicy};

/// Configuration for the tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Number of recent frames retained in the history ring buffer.
    /// Only the two most recent participate in matching.
    /// Default: 5
    pub history_depth: usize,

    /// Policy for pruning cached snapshots of disappeared holes.
    /// Default: keep forever
    pub retention: RetentionPolicy,

    /// Seed for the color generator. `None` seeds from the OS for unique
    /// colors across runs; fix it for reproducible renders.
    /// Default: None
    pub color_seed: Option<u64>,

    /// Background color of the fill render.
    /// Default: white
    pub background: Rgb<u8>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_depth: 5,
            retention: RetentionPolicy::KeepForever,
            color_seed: None,
            background: Rgb([255, 255, 255]),
        }
    }
}

/// Per-frame ingestion diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingUpdate {
    /// Sequence number stamped on the ingested frame.
    pub sequence: u64,
    /// Contours that inherited an identity from the previous frame.
    pub matched: usize,
    /// Contours issued a fresh identity.
    pub appeared: usize,
}

/// Stateful multi-object tracker over coronal-hole frames.
pub struct CoronalHoleTracker {
    config: TrackerConfig,
    registry: IdentityRegistry,
    /// Recent frames, most recent first.
    history: VecDeque<Frame>,
    frame_count: u64,
    rng: StdRng,
}

impl CoronalHoleTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let rng = match config.color_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            registry: IdentityRegistry::new(),
            history: VecDeque::new(),
            frame_count: 0,
            rng,
        }
    }

    /// Ingest the next frame in the sequence.
    ///
    /// On the first frame every contour is new; afterwards contours are
    /// matched against the previous frame by centroid distance. Either
    /// frame being empty degrades to "no matches, all new". After identity
    /// assignment the frame is fill-rendered and every contour's features
    /// are recomputed before the frame enters the history buffer.
    pub fn ingest(&mut self, mut frame: Frame) -> TrackingUpdate {
        frame.sequence = self.frame_count;
        self.frame_count += 1;

        let assignment = matching::assign(
            &frame.centroids(),
            &self
                .history
                .front()
                .map(|prev| prev.centroids())
                .unwrap_or_default(),
        );

        for &(new_idx, old_idx) in &assignment.pairs {
            let prev = &self.history.front().expect("pairs imply a previous frame")
                .contours[old_idx];
            frame.contours[new_idx].id = prev.id;
            frame.contours[new_idx].color = prev.color;
        }
        for &new_idx in &assignment.unmatched {
            let color = self.generate_color();
            let id = self.registry.issue(color, frame.sequence);
            frame.contours[new_idx].id = Some(id);
            frame.contours[new_idx].color = Some(color);
        }

        if frame.dims.0 >= 2 && frame.dims.1 >= 2 {
            let grid = SphericalGrid::new(frame.dims.0, frame.dims.1);
            fill::recompute_features(&mut frame, &grid);
        }

        for contour in &frame.contours {
            let id = contour.id.expect("every contour tagged above");
            self.registry
                .record_sighting(id, contour.clone(), frame.sequence);
        }
        self.registry.prune(frame.sequence, self.config.retention);

        debug!(
            sequence = frame.sequence,
            contours = frame.len(),
            matched = assignment.pairs.len(),
            appeared = assignment.unmatched.len(),
            identities = self.registry.len(),
            "frame ingested"
        );

        let update = TrackingUpdate {
            sequence: frame.sequence,
            matched: assignment.pairs.len(),
            appeared: assignment.unmatched.len(),
        };

        self.history.push_front(frame);
        self.history.truncate(self.config.history_depth.max(1));

        update
    }

    /// Extract boundaries from a grayscale raster and ingest the result.
    pub fn ingest_raster(
        &mut self,
        img: &GrayImage,
        extraction: &BoundaryExtractionConfig,
    ) -> TrackingUpdate {
        self.ingest(extract_boundaries(img, extraction))
    }

    /// The most recently ingested frame, fully identity-tagged.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.history.front()
    }

    /// The frame before the current one.
    pub fn previous_frame(&self) -> Option<&Frame> {
        self.history.get(1)
    }

    /// Color-filled render of the current frame.
    pub fn render_current(&self) -> Option<image::RgbImage> {
        self.history
            .front()
            .map(|f| fill::render_filled(f, self.config.background))
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Generate a random color distinct from the background and from every
    /// identity already issued.
    ///
    /// Falls back to a deterministic linear scan if rejection sampling runs
    /// out of attempts; only exhaustion of the full 24-bit space could fail.
    fn generate_color(&mut self) -> Rgb<u8> {
        for _ in 0..1 << 16 {
            let candidate = Rgb(self.rng.gen::<[u8; 3]>());
            if candidate != self.config.background && !self.registry.color_in_use(candidate) {
                return candidate;
            }
        }
        for r in 0..=255u8 {
            for g in 0..=255u8 {
                for b in 0..=255u8 {
                    let candidate = Rgb([r, g, b]);
                    if candidate != self.config.background
                        && !self.registry.color_in_use(candidate)
                    {
                        return candidate;
                    }
                }
            }
        }
        unreachable!("more than 2^24 live identities")
    }
}

impl Default for CoronalHoleTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::Contour;
    use crate::Point2;

    fn frame_at(dims: (u32, u32), centroids: &[(f32, f32)]) -> Frame {
        let contours = centroids
            .iter()
            .map(|&(x, y)| Contour::new(Vec::new(), Point2::new(x, y)))
            .collect();
        Frame::new(dims, contours)
    }

    fn tracker() -> CoronalHoleTracker {
        CoronalHoleTracker::new(TrackerConfig {
            color_seed: Some(42),
            ..Default::default()
        })
    }

    #[test]
    fn test_first_frame_initializes_all() {
        let mut t = tracker();
        let up = t.ingest(frame_at((0, 0), &[(10.0, 10.0), (40.0, 40.0)]));
        assert_eq!(up.matched, 0);
        assert_eq!(up.appeared, 2);

        let frame = t.current_frame().unwrap();
        assert_eq!(frame.contours[0].id, Some(0));
        assert_eq!(frame.contours[1].id, Some(1));
        assert_ne!(frame.contours[0].color, frame.contours[1].color);
        assert_eq!(t.registry().len(), 2);
    }

    #[test]
    fn test_match_preserves_identity() {
        let mut t = tracker();
        t.ingest(frame_at((0, 0), &[(10.0, 10.0)]));
        let first_color = t.current_frame().unwrap().contours[0].color;

        let up = t.ingest(frame_at((0, 0), &[(12.0, 11.0), (80.0, 80.0)]));
        assert_eq!(up.matched, 1);
        assert_eq!(up.appeared, 1);

        let frame = t.current_frame().unwrap();
        assert_eq!(frame.contours[0].id, Some(0));
        assert_eq!(frame.contours[0].color, first_color);
        assert_eq!(frame.contours[1].id, Some(1));
        assert_eq!(t.registry().len(), 2);
    }

    #[test]
    fn test_empty_frames_keep_tracking_alive() {
        let mut t = tracker();
        t.ingest(frame_at((0, 0), &[(10.0, 10.0)]));
        let up = t.ingest(frame_at((0, 0), &[]));
        assert_eq!(up.matched, 0);
        assert_eq!(up.appeared, 0);

        // The hole "reappears" as a new identity: no gap matching.
        let up = t.ingest(frame_at((0, 0), &[(10.0, 10.0)]));
        assert_eq!(up.appeared, 1);
        assert_eq!(t.current_frame().unwrap().contours[0].id, Some(1));
    }

    #[test]
    fn test_identity_monotonicity() {
        let mut t = tracker();
        let mut seen = Vec::new();
        for i in 0..10 {
            let offset = i as f32 * 3.0;
            t.ingest(frame_at(
                (0, 0),
                &[(10.0 + offset, 10.0), (200.0 - offset, 50.0)],
            ));
            for c in t.current_frame().unwrap().iter() {
                seen.push(c.id.unwrap());
            }
        }
        let issued = t.registry().len() as u32;
        let mut distinct: Vec<u32> = seen.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct, (0..issued).collect::<Vec<_>>());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut t = CoronalHoleTracker::new(TrackerConfig {
            history_depth: 3,
            color_seed: Some(1),
            ..Default::default()
        });
        for _ in 0..8 {
            t.ingest(frame_at((0, 0), &[(10.0, 10.0)]));
        }
        assert_eq!(t.history.len(), 3);
        assert_eq!(t.frame_count(), 8);
        assert_eq!(t.current_frame().unwrap().sequence, 7);
    }

    #[test]
    fn test_colors_unique_across_registry() {
        let mut t = tracker();
        // 40 holes far enough apart to all be distinct identities.
        let centroids: Vec<(f32, f32)> = (0..40)
            .map(|i| ((i % 8) as f32 * 100.0, (i / 8) as f32 * 100.0))
            .collect();
        t.ingest(frame_at((0, 0), &centroids));
        let mut colors: Vec<_> = t.registry().iter().map(|r| r.color.0).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 40);
    }

    #[test]
    fn test_retention_policy_prunes_snapshots() {
        let mut t = CoronalHoleTracker::new(TrackerConfig {
            retention: RetentionPolicy::PruneAfter { frames: 2 },
            color_seed: Some(5),
            ..Default::default()
        });
        t.ingest(frame_at((0, 0), &[(10.0, 10.0)]));
        for _ in 0..4 {
            t.ingest(frame_at((0, 0), &[]));
        }
        // Identity 0 disappeared 4 frames ago: snapshot pruned, id retained.
        assert_eq!(t.registry().len(), 1);
        assert!(t.registry().get(0).unwrap().latest.is_none());
    }
}
