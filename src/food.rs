use rand::Rng;

use crate::error::GameError;
use crate::geometry::{GridSize, Point};
use crate::snake::Snake;

/// Random draws attempted before falling back to enumerating free cells.
pub const MAX_RANDOM_PLACEMENT_ATTEMPTS: usize = 64;

/// The single food item on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Food {
    pub position: Point,
}

impl Food {
    /// Creates food at `position`.
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self { position }
    }

    /// Spawns food in a cell the snake does not occupy.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        bounds: GridSize,
        snake: &Snake,
    ) -> Result<Self, GameError> {
        spawn_position(rng, bounds, snake).map(Self::at)
    }
}

/// Picks a uniformly random free cell.
///
/// Draws cells uniformly and rejects occupied ones. If every bounded draw
/// misses, the free cells are enumerated and one is picked uniformly. A board
/// with no free cell is an error.
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
) -> Result<Point, GameError> {
    let board_full = || GameError::BoardFull {
        width: bounds.width,
        height: bounds.height,
    };

    if bounds.total_cells() == 0 || snake.len() >= bounds.total_cells() {
        return Err(board_full());
    }

    for _ in 0..MAX_RANDOM_PLACEMENT_ATTEMPTS {
        let candidate = Point::new(
            rng.gen_range(0..i32::from(bounds.width)),
            rng.gen_range(0..i32::from(bounds.height)),
        );
        if !snake.occupies(candidate) {
            return Ok(candidate);
        }
    }

    tracing::debug!(
        snake_len = snake.len(),
        cells = bounds.total_cells(),
        "random food placement exhausted, scanning free cells"
    );

    let mut candidates = Vec::new();
    for y in 0..i32::from(bounds.height) {
        for x in 0..i32::from(bounds.width) {
            let point = Point::new(x, y);
            if !snake.occupies(point) {
                candidates.push(point);
            }
        }
    }

    if candidates.is_empty() {
        return Err(board_full());
    }

    let index = rng.gen_range(0..candidates.len());
    Ok(candidates[index])
}
