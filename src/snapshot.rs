use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, GridSize, Point};

/// Point-in-time copy of the simulation, the only view consumers get.
///
/// Owns all of its data; holding one never borrows the engine.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub head: Point,
    /// Body segments, head first.
    pub body: Vec<Point>,
    pub food: Point,
    pub direction: Direction,
    pub score: u32,
    pub width: u16,
    pub height: u16,
}

impl Snapshot {
    #[must_use]
    pub fn bounds(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    #[must_use]
    pub fn in_bounds(&self, point: Point) -> bool {
        point.is_within_bounds(self.bounds())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
