//! Bounded position histories used for visual traces.

use std::collections::VecDeque;

use crate::Position;

/// Bounded FIFO of past positions for one tracked entity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    points: VecDeque<Position>,
    capacity: usize,
}

impl TrailBuffer {
    /// Create an empty trail holding at most `capacity` points.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    /// Append a point, returning the evicted oldest point once the trail is full.
    pub fn push(&mut self, point: Position) -> Option<Position> {
        let evicted = if self.points.len() >= self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        evicted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent point.
    #[must_use]
    pub fn last(&self) -> Option<Position> {
        self.points.back().copied()
    }

    /// Oldest-first iterator over the retained points.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Position> + ExactSizeIterator + '_ {
        self.points.iter().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// One trail per tracked entity, all sharing a capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailSet {
    trails: Vec<TrailBuffer>,
    capacity: usize,
}

impl TrailSet {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            trails: Vec::new(),
            capacity,
        }
    }

    /// Append `points[i]` to trail `i`, creating trails for newly tracked entities.
    pub fn record(&mut self, points: &[Position]) {
        if self.trails.len() < points.len() {
            let capacity = self.capacity;
            self.trails
                .resize_with(points.len(), || TrailBuffer::new(capacity));
        }
        for (trail, point) in self.trails.iter_mut().zip(points) {
            trail.push(*point);
        }
    }

    #[must_use]
    pub fn get(&self, entity: usize) -> Option<&TrailBuffer> {
        self.trails.get(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailBuffer> + '_ {
        self.trails.iter()
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every trail; entities are re-created on the next record.
    pub fn clear(&mut self) {
        self.trails.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> Position {
        Position::new(i as f32, -(i as f32))
    }

    #[test]
    fn trail_never_exceeds_capacity() {
        let mut trail = TrailBuffer::new(500);
        for i in 0..2_000 {
            trail.push(point(i));
            assert!(trail.len() <= 500);
        }
        assert_eq!(trail.len(), 500);
    }

    #[test]
    fn full_trail_evicts_exactly_the_oldest_point() {
        let mut trail = TrailBuffer::new(3);
        assert_eq!(trail.push(point(0)), None);
        assert_eq!(trail.push(point(1)), None);
        assert_eq!(trail.push(point(2)), None);
        assert_eq!(trail.push(point(3)), Some(point(0)));
        assert_eq!(trail.push(point(4)), Some(point(1)));
        assert_eq!(trail.iter().collect::<Vec<_>>(), vec![point(2), point(3), point(4)]);
        assert_eq!(trail.last(), Some(point(4)));
    }

    #[test]
    fn trail_set_grows_per_entity_and_clears() {
        let mut set = TrailSet::new(2);
        set.record(&[point(0)]);
        set.record(&[point(1), point(10)]);
        set.record(&[point(2), point(11)]);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.get(0).map(|t| t.iter().collect::<Vec<_>>()),
            Some(vec![point(1), point(2)])
        );
        assert_eq!(set.get(1).map(TrailBuffer::len), Some(2));

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 2);
    }
}
