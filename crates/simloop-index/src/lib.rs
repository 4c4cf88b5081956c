//! Spatial indexing abstractions for agent neighborhood queries.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors emitted by spatial index implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Indicates configuration values that cannot be used (e.g., non-positive cell size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Common behaviour exposed by neighborhood indices.
///
/// Distances are reported squared. A point counts as inside a query radius only when its
/// squared distance is strictly below `radius_sq`.
pub trait NeighborhoodIndex {
    /// Rebuild internal structures from agent positions.
    fn rebuild(&mut self, positions: &[(f32, f32)]) -> Result<(), IndexError>;

    /// Visit every indexed point within the squared radius of `(x, y)`.
    fn query_point(
        &self,
        x: f32,
        y: f32,
        radius_sq: f32,
        visitor: &mut dyn FnMut(usize, OrderedFloat<f32>),
    );

    /// Position recorded for `agent_idx` during the last rebuild.
    fn position(&self, agent_idx: usize) -> Option<(f32, f32)>;

    /// Visit neighbors of `agent_idx` within the provided squared radius, excluding itself.
    fn neighbors_within(
        &self,
        agent_idx: usize,
        radius_sq: f32,
        visitor: &mut dyn FnMut(usize, OrderedFloat<f32>),
    ) {
        let Some((x, y)) = self.position(agent_idx) else {
            return;
        };
        self.query_point(x, y, radius_sq, &mut |idx, dist_sq| {
            if idx != agent_idx {
                visitor(idx, dist_sq);
            }
        });
    }

    /// Closest indexed point to `(x, y)` accepted by `filter`, ties broken by lower index.
    fn nearest_matching(
        &self,
        x: f32,
        y: f32,
        radius_sq: f32,
        filter: &dyn Fn(usize) -> bool,
    ) -> Option<(usize, OrderedFloat<f32>)> {
        let mut best: Option<(usize, OrderedFloat<f32>)> = None;
        self.query_point(x, y, radius_sq, &mut |idx, dist_sq| {
            if !filter(idx) {
                return;
            }
            let closer = match best {
                None => true,
                Some((best_idx, best_dist)) => {
                    dist_sq < best_dist || (dist_sq == best_dist && idx < best_idx)
                }
            };
            if closer {
                best = Some((idx, dist_sq));
            }
        });
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellBounds {
    min: (i32, i32),
    max: (i32, i32),
}

/// Uniform grid index bucketing points into square cells of `cell_size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformGridIndex {
    /// Edge length of each grid cell used for bucketing agents.
    pub cell_size: f32,
    #[serde(skip)]
    positions: Vec<(f32, f32)>,
    #[serde(skip)]
    buckets: HashMap<(i32, i32), Vec<usize>>,
    #[serde(skip)]
    bounds: Option<CellBounds>,
}

impl UniformGridIndex {
    /// Create a new uniform grid with the provided cell size.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            positions: Vec::new(),
            buckets: HashMap::new(),
            bounds: None,
        }
    }

    /// Build an index over `positions` in one call.
    pub fn build(cell_size: f32, positions: &[(f32, f32)]) -> Result<Self, IndexError> {
        let mut index = Self::new(cell_size);
        index.rebuild(positions)?;
        Ok(index)
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index currently holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of non-empty grid cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }

    fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }
}

impl Default for UniformGridIndex {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl NeighborhoodIndex for UniformGridIndex {
    fn rebuild(&mut self, positions: &[(f32, f32)]) -> Result<(), IndexError> {
        if self.cell_size <= 0.0 || !self.cell_size.is_finite() {
            return Err(IndexError::InvalidConfig(
                "cell_size must be positive and finite",
            ));
        }
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        self.bounds = None;

        for (idx, &(x, y)) in positions.iter().enumerate() {
            let cell = self.cell_of(x, y);
            self.buckets.entry(cell).or_default().push(idx);
            self.bounds = Some(match self.bounds {
                None => CellBounds {
                    min: cell,
                    max: cell,
                },
                Some(bounds) => CellBounds {
                    min: (bounds.min.0.min(cell.0), bounds.min.1.min(cell.1)),
                    max: (bounds.max.0.max(cell.0), bounds.max.1.max(cell.1)),
                },
            });
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
        Ok(())
    }

    fn query_point(
        &self,
        x: f32,
        y: f32,
        radius_sq: f32,
        visitor: &mut dyn FnMut(usize, OrderedFloat<f32>),
    ) {
        let Some(bounds) = self.bounds else {
            return;
        };
        if radius_sq.is_nan() || radius_sq <= 0.0 {
            return;
        }
        let radius = radius_sq.sqrt();
        let lo = self.cell_of(x - radius, y - radius);
        let hi = self.cell_of(x + radius, y + radius);
        let (min_cx, max_cx) = (lo.0.max(bounds.min.0), hi.0.min(bounds.max.0));
        let (min_cy, max_cy) = (lo.1.max(bounds.min.1), hi.1.min(bounds.max.1));

        // Dense scan is cheaper once the query window covers more cells than exist.
        let window = (i64::from(max_cx) - i64::from(min_cx) + 1)
            .saturating_mul(i64::from(max_cy) - i64::from(min_cy) + 1);
        if window > self.buckets.len() as i64 {
            let mut visit_bucket = |bucket: &Vec<usize>| {
                for &idx in bucket {
                    let (px, py) = self.positions[idx];
                    let dist_sq = (px - x).powi(2) + (py - y).powi(2);
                    if dist_sq < radius_sq {
                        visitor(idx, OrderedFloat(dist_sq));
                    }
                }
            };
            let mut cells: Vec<_> = self
                .buckets
                .iter()
                .filter(|((cx, cy), _)| {
                    (min_cx..=max_cx).contains(cx) && (min_cy..=max_cy).contains(cy)
                })
                .collect();
            cells.sort_unstable_by_key(|(cell, _)| **cell);
            for (_, bucket) in cells {
                visit_bucket(bucket);
            }
            return;
        }

        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                let Some(bucket) = self.buckets.get(&(cx, cy)) else {
                    continue;
                };
                for &idx in bucket {
                    let (px, py) = self.positions[idx];
                    let dist_sq = (px - x).powi(2) + (py - y).powi(2);
                    if dist_sq < radius_sq {
                        visitor(idx, OrderedFloat(dist_sq));
                    }
                }
            }
        }
    }

    fn position(&self, agent_idx: usize) -> Option<(f32, f32)> {
        self.positions.get(agent_idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    fn scatter(count: usize, seed: u64) -> Vec<(f32, f32)> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..count)
            .map(|_| (rng.random_range(0.0..400.0), rng.random_range(0.0..300.0)))
            .collect()
    }

    fn brute_force(points: &[(f32, f32)], x: f32, y: f32, radius_sq: f32) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, (px, py))| (px - x).powi(2) + (py - y).powi(2) < radius_sq)
            .map(|(idx, _)| idx)
            .collect()
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        let mut index = UniformGridIndex::new(0.0);
        assert_eq!(
            index.rebuild(&[(1.0, 1.0)]),
            Err(IndexError::InvalidConfig(
                "cell_size must be positive and finite"
            ))
        );
    }

    #[test]
    fn radius_queries_match_brute_force() {
        let points = scatter(250, 7);
        let index = UniformGridIndex::build(30.0, &points).expect("index");
        for &(x, y, radius) in &[(10.0, 10.0, 30.0), (200.0, 150.0, 45.0), (390.0, 5.0, 80.0)] {
            let mut found = Vec::new();
            index.query_point(x, y, radius * radius, &mut |idx, _| found.push(idx));
            found.sort_unstable();
            assert_eq!(found, brute_force(&points, x, y, radius * radius));
        }
    }

    #[test]
    fn huge_radius_visits_every_point_once() {
        let points = scatter(64, 11);
        let index = UniformGridIndex::build(10.0, &points).expect("index");
        let mut found = Vec::new();
        index.query_point(0.0, 0.0, f32::INFINITY, &mut |idx, _| found.push(idx));
        found.sort_unstable();
        assert_eq!(found, (0..points.len()).collect::<Vec<_>>());
    }

    #[test]
    fn neighbors_exclude_the_query_agent() {
        let points = vec![(0.0, 0.0), (3.0, 4.0), (50.0, 50.0)];
        let index = UniformGridIndex::build(10.0, &points).expect("index");
        let mut seen = Vec::new();
        index.neighbors_within(0, 36.0, &mut |idx, dist_sq| seen.push((idx, dist_sq.0)));
        assert_eq!(seen, vec![(1, 25.0)]);
    }

    #[test]
    fn nearest_matching_respects_filter_and_radius() {
        let points = vec![(0.0, 0.0), (5.0, 0.0), (8.0, 0.0), (100.0, 0.0)];
        let index = UniformGridIndex::build(20.0, &points).expect("index");
        let nearest = index.nearest_matching(4.0, 0.0, 400.0, &|idx| idx != 1);
        assert_eq!(nearest.map(|(idx, _)| idx), Some(2));
        assert!(index.nearest_matching(60.0, 0.0, 100.0, &|_| true).is_none());
    }

    #[test]
    fn rebuild_discards_previous_points() {
        let mut index = UniformGridIndex::new(10.0);
        index.rebuild(&scatter(20, 3)).expect("first rebuild");
        index.rebuild(&[(5.0, 5.0)]).expect("second rebuild");
        assert_eq!(index.len(), 1);
        assert_eq!(index.occupied_cells(), 1);
    }
}
