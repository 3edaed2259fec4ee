//! Greedy centroid-distance assignment between consecutive frames.
//!
//! The matcher builds the full pairwise Euclidean distance matrix between
//! the new frame's centroids (rows) and the previous frame's centroids
//! (columns), lists each row with its closest column, orders the list by
//! that closest distance, and keeps a candidate only if its column has not
//! already been claimed by a closer row. This is deliberately a greedy
//! approximation, not a minimum-cost bipartite matching: ties and duplicate
//! claims are broken purely by list order, and a row displaced from its
//! closest column is *not* rematched to its second-closest; it simply goes
//! unmatched. Downstream treats unmatched rows as newly appeared holes.

use nalgebra::DMatrix;

use crate::Point2;

/// Result of one matching pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Surviving (new_index, old_index) pairs, in priority (closest-first)
    /// order. No two pairs share an old_index.
    pub pairs: Vec<(usize, usize)>,
    /// New-frame indices claimed by no surviving pair, ascending.
    pub unmatched: Vec<usize>,
}

/// Match new centroids (rows) against old centroids (columns).
///
/// Either side being empty degrades to "no matches, all new" rather than an
/// error. The assignment is deterministic for fixed inputs.
pub fn assign(new: &[Point2], old: &[Point2]) -> Assignment {
    if new.is_empty() || old.is_empty() {
        return Assignment {
            pairs: Vec::new(),
            unmatched: (0..new.len()).collect(),
        };
    }

    let dist = distance_matrix(new, old);

    // Per-row closest column; first occurrence wins on exact ties.
    let closest: Vec<(usize, f32)> = (0..new.len())
        .map(|i| {
            let mut best = (0usize, dist[(i, 0)]);
            for j in 1..old.len() {
                if dist[(i, j)] < best.1 {
                    best = (j, dist[(i, j)]);
                }
            }
            best
        })
        .collect();

    // Priority queue: rows ordered by their closest distance, ascending.
    // The sort is stable, so equal distances keep row order.
    let mut order: Vec<usize> = (0..new.len()).collect();
    order.sort_by(|&a, &b| {
        closest[a]
            .1
            .partial_cmp(&closest[b].1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Greedy duplicate rejection in priority order.
    let mut claimed = vec![false; old.len()];
    let mut matched_row = vec![false; new.len()];
    let mut pairs = Vec::new();
    for &row in &order {
        let (col, _) = closest[row];
        if !claimed[col] {
            claimed[col] = true;
            matched_row[row] = true;
            pairs.push((row, col));
        }
    }

    let unmatched = (0..new.len()).filter(|&i| !matched_row[i]).collect();

    Assignment { pairs, unmatched }
}

/// Full pairwise Euclidean distance matrix; rows = new, columns = old.
fn distance_matrix(new: &[Point2], old: &[Point2]) -> DMatrix<f32> {
    DMatrix::from_fn(new.len(), old.len(), |i, j| {
        nalgebra::distance(&new[i], &old[j])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f32, f32)]) -> Vec<Point2> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn test_empty_sides_all_new() {
        let a = assign(&pts(&[(1.0, 1.0), (2.0, 2.0)]), &[]);
        assert!(a.pairs.is_empty());
        assert_eq!(a.unmatched, vec![0, 1]);

        let b = assign(&[], &pts(&[(1.0, 1.0)]));
        assert!(b.pairs.is_empty());
        assert!(b.unmatched.is_empty());
    }

    #[test]
    fn test_nearby_match_and_new_appearance() {
        // Old frame: one hole near (10, 10). New frame: a near match plus a
        // far newcomer.
        let old = pts(&[(10.0, 10.0)]);
        let new = pts(&[(12.0, 11.0), (80.0, 80.0)]);
        let a = assign(&new, &old);
        assert_eq!(a.pairs, vec![(0, 0)]);
        assert_eq!(a.unmatched, vec![1]);
    }

    #[test]
    fn test_duplicate_claim_resolved_greedily() {
        // Both new holes are closest to old hole 0; the closer new hole
        // wins, the loser goes unmatched even though old hole 1 was free.
        let old = pts(&[(20.0, 20.0), (40.0, 20.0)]);
        let new = pts(&[(22.0, 20.0), (25.0, 20.0)]);
        let a = assign(&new, &old);
        assert_eq!(a.pairs, vec![(0, 0)]);
        assert_eq!(a.unmatched, vec![1]);
    }

    #[test]
    fn test_no_duplicate_old_indices() {
        let old = pts(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let new = pts(&[(1.0, 0.0), (2.0, 0.0), (6.0, 0.0), (11.0, 0.0)]);
        let a = assign(&new, &old);
        let mut seen = std::collections::HashSet::new();
        for &(_, old_idx) in &a.pairs {
            assert!(seen.insert(old_idx), "old index {old_idx} claimed twice");
        }
    }

    #[test]
    fn test_survivors_ordered_by_distance() {
        let old = pts(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]);
        let new = pts(&[(103.0, 0.0), (1.0, 0.0), (52.0, 0.0)]);
        let a = assign(&new, &old);
        assert_eq!(a.pairs.len(), 3);
        let dists: Vec<f32> = a
            .pairs
            .iter()
            .map(|&(i, j)| nalgebra::distance(&new[i], &old[j]))
            .collect();
        for w in dists.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn test_crossing_paths_follow_priority_order() {
        // Two holes whose nearest old partners "cross": both resolve by
        // priority order, not by global cost minimization.
        let old = pts(&[(0.0, 0.0), (10.0, 0.0)]);
        let new = pts(&[(9.0, 0.0), (1.0, 0.0)]);
        let a = assign(&new, &old);
        // Row 0 is closest to old 1 (d=1), row 1 to old 0 (d=1); the stable
        // tie-break keeps row order, and both columns are distinct.
        assert_eq!(a.pairs, vec![(0, 1), (1, 0)]);
        assert!(a.unmatched.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let old = pts(&[(3.0, 4.0), (10.0, 2.0), (5.5, 9.0)]);
        let new = pts(&[(4.0, 4.5), (9.0, 3.0), (5.0, 8.0), (30.0, 30.0)]);
        let first = assign(&new, &old);
        for _ in 0..10 {
            assert_eq!(assign(&new, &old), first);
        }
    }
}
