//! Append-only arena of coronal-hole identities.
//!
//! Identities are dense integers issued in increasing order starting at 0
//! and never reused, so a `Vec` indexed by id is the natural store. Records
//! are never removed; the configurable retention policy only drops the
//! cached contour snapshot of holes that have not been sighted recently,
//! bounding memory while keeping the id space intact.

use image::Rgb;

use crate::contour::Contour;

/// Policy for pruning cached contour snapshots of disappeared holes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep every identity's latest sighting forever.
    #[default]
    KeepForever,
    /// Drop the cached contour of any identity not sighted within the last
    /// `frames` ingested frames. The identity record itself stays.
    PruneAfter { frames: u64 },
}

/// One identity's lifetime record.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub id: u32,
    pub color: Rgb<u8>,
    /// Sequence number of the frame that introduced this identity.
    pub first_seen: u64,
    /// Sequence number of the most recent sighting.
    pub last_seen: u64,
    /// Most recent sighting, if not pruned by the retention policy.
    pub latest: Option<Contour>,
}

/// Dense arena of every identity ever issued.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    records: Vec<IdentityRecord>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities ever issued (also the next id to be assigned).
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&IdentityRecord> {
        self.records.get(id as usize)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &IdentityRecord> {
        self.records.iter()
    }

    /// Issue the next identity with the given color.
    pub fn issue(&mut self, color: Rgb<u8>, sequence: u64) -> u32 {
        let id = self.records.len() as u32;
        self.records.push(IdentityRecord {
            id,
            color,
            first_seen: sequence,
            last_seen: sequence,
            latest: None,
        });
        id
    }

    /// Record a sighting of an existing identity, replacing its snapshot.
    pub fn record_sighting(&mut self, id: u32, contour: Contour, sequence: u64) {
        let rec = &mut self.records[id as usize];
        rec.last_seen = sequence;
        rec.latest = Some(contour);
    }

    /// True if any unpruned identity already uses this color.
    pub fn color_in_use(&self, color: Rgb<u8>) -> bool {
        self.records.iter().any(|r| r.color == color)
    }

    /// Apply the retention policy after ingesting the frame at `sequence`.
    pub fn prune(&mut self, sequence: u64, policy: RetentionPolicy) {
        if let RetentionPolicy::PruneAfter { frames } = policy {
            for rec in &mut self.records {
                if rec.latest.is_some() && sequence.saturating_sub(rec.last_seen) > frames {
                    rec.latest = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point2;

    fn dummy_contour() -> Contour {
        Contour::new(Vec::new(), Point2::new(0.0, 0.0))
    }

    #[test]
    fn test_ids_issued_densely() {
        let mut reg = IdentityRegistry::new();
        assert_eq!(reg.issue(Rgb([1, 2, 3]), 0), 0);
        assert_eq!(reg.issue(Rgb([4, 5, 6]), 0), 1);
        assert_eq!(reg.issue(Rgb([7, 8, 9]), 3), 2);
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.get(2).unwrap().first_seen, 3);
    }

    #[test]
    fn test_color_lookup() {
        let mut reg = IdentityRegistry::new();
        reg.issue(Rgb([9, 9, 9]), 0);
        assert!(reg.color_in_use(Rgb([9, 9, 9])));
        assert!(!reg.color_in_use(Rgb([9, 9, 8])));
    }

    #[test]
    fn test_prune_clears_snapshot_not_record() {
        let mut reg = IdentityRegistry::new();
        let a = reg.issue(Rgb([1, 1, 1]), 0);
        let b = reg.issue(Rgb([2, 2, 2]), 0);
        reg.record_sighting(a, dummy_contour(), 0);
        reg.record_sighting(b, dummy_contour(), 10);

        reg.prune(10, RetentionPolicy::KeepForever);
        assert!(reg.get(a).unwrap().latest.is_some());

        reg.prune(10, RetentionPolicy::PruneAfter { frames: 5 });
        assert!(reg.get(a).unwrap().latest.is_none());
        assert!(reg.get(b).unwrap().latest.is_some());
        // The id space is untouched.
        assert_eq!(reg.len(), 2);
    }
}
