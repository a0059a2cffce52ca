//! Candidate reduction and merging.
//!
//! Includes the center-distance reduction used by color detection and the
//! overlap merges used by template matching. None of the passes ever returns
//! more rectangles than it was given.

use crate::geometry::Rect;
use std::cmp::Ordering;

/// How the color detector treats two candidates whose centers are close.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CloseMergePolicy {
    /// Keep the earlier candidate unchanged and drop the later one.
    #[default]
    KeepFirst,
    /// Replace the earlier candidate by the union of both.
    Union,
}

/// How overlapping template candidates are grouped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Single left-to-right greedy pass over candidates sorted by `x`.
    ///
    /// Two overlapping candidates stay separate when a third, non-overlapping
    /// candidate sorts between them.
    #[default]
    Sweep,
    /// Transitive closure of pairwise intersection (union-find).
    Cluster,
}

/// A candidate rectangle with its correlation score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Placement and size of the transformed pattern.
    pub rect: Rect,
    /// Normalized correlation at the placement.
    pub score: f32,
}

fn candidate_cmp(a: &Candidate, b: &Candidate) -> Ordering {
    a.rect
        .x
        .cmp(&b.rect.x)
        .then_with(|| a.rect.y.cmp(&b.rect.y))
        .then_with(|| a.rect.width.cmp(&b.rect.width))
        .then_with(|| a.rect.height.cmp(&b.rect.height))
        .then_with(|| b.score.total_cmp(&a.score))
}

/// Sorts candidates by left edge with deterministic tie-breaking.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp);
}

/// Reduces candidates whose integer centers are closer than `max_distance`.
///
/// Candidates are visited in order; each unvisited candidate absorbs every
/// later unvisited candidate close to it. With [`CloseMergePolicy::KeepFirst`]
/// absorbed candidates simply disappear.
pub fn reduce_close(rects: &[Rect], max_distance: f64, policy: CloseMergePolicy) -> Vec<Rect> {
    let mut visited = vec![false; rects.len()];
    let mut out = Vec::new();
    for i in 0..rects.len() {
        if visited[i] {
            continue;
        }
        let anchor = rects[i];
        let mut kept = anchor;
        for j in (i + 1)..rects.len() {
            if visited[j] || anchor.center_distance(&rects[j]) >= max_distance {
                continue;
            }
            visited[j] = true;
            if policy == CloseMergePolicy::Union {
                kept = kept.union(&rects[j]);
            }
        }
        out.push(kept);
    }
    out
}

/// Merges overlapping candidates with the chosen strategy.
///
/// Merged candidates carry the best score of their constituents. The output
/// is sorted the same way as [`sort_candidates`].
pub fn merge_overlapping(candidates: Vec<Candidate>, strategy: MergeStrategy) -> Vec<Candidate> {
    match strategy {
        MergeStrategy::Sweep => merge_sweep(candidates),
        MergeStrategy::Cluster => merge_clusters(candidates),
    }
}

fn absorb(current: Candidate, next: &Candidate) -> Candidate {
    Candidate {
        rect: current.rect.union(&next.rect),
        score: current.score.max(next.score),
    }
}

fn merge_sweep(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    sort_candidates(&mut candidates);
    let mut iter = candidates.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };
    let mut merged = Vec::new();
    for next in iter {
        if current.rect.intersects(&next.rect) {
            current = absorb(current, &next);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Lower index stays root so cluster order follows sort order.
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

fn merge_clusters(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    sort_candidates(&mut candidates);
    let n = candidates.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        let right = candidates[i].rect.right();
        for j in (i + 1)..n {
            // Sorted by x: nothing further can overlap horizontally.
            if candidates[j].rect.x >= right {
                break;
            }
            if candidates[i].rect.intersects(&candidates[j].rect) {
                uf.union(i, j);
            }
        }
    }

    let mut slots: Vec<Option<Candidate>> = vec![None; n];
    for (idx, cand) in candidates.iter().enumerate() {
        let root = uf.find(idx);
        slots[root] = Some(match slots[root] {
            Some(acc) => absorb(acc, cand),
            None => *cand,
        });
    }
    let mut merged: Vec<Candidate> = slots.into_iter().flatten().collect();
    sort_candidates(&mut merged);
    merged
}
