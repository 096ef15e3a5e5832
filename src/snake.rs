use std::collections::VecDeque;

use crate::geometry::{Direction, Point};

/// Snake body plus the decoupled current/next heading.
///
/// A direction requested between ticks lands in `next_direction` and only
/// becomes the heading when the following move commits it.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Point>,
    current_direction: Direction,
    next_direction: Direction,
}

impl Snake {
    /// Creates a one-cell snake at `start` heading in `direction`.
    #[must_use]
    pub fn new(start: Point, direction: Direction) -> Self {
        let mut body = VecDeque::new();
        body.push_front(start);

        Self {
            body,
            current_direction: direction,
            next_direction: direction,
        }
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// An empty segment list yields a one-cell snake at the origin.
    #[must_use]
    pub fn from_segments(segments: Vec<Point>, direction: Direction) -> Self {
        let mut body = VecDeque::from(segments);
        if body.is_empty() {
            body.push_back(Point::new(0, 0));
        }

        Self {
            body,
            current_direction: direction,
            next_direction: direction,
        }
    }

    /// Commits the pending direction and advances one cell.
    ///
    /// The tail is dropped unless `grow` is set. No bounds checking happens
    /// here; an off-grid head is left for the engine to detect.
    pub fn move_forward(&mut self, grow: bool) {
        self.current_direction = self.next_direction;
        let next_head = self.head().offset(self.current_direction);

        self.body.push_front(next_head);
        if !grow {
            let _ = self.body.pop_back();
        }
    }

    /// Stores `direction` for the next move unless it reverses the current heading.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction.is_opposite(self.current_direction) {
            return;
        }
        self.next_direction = direction;
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Point {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns the current tail position.
    #[must_use]
    pub fn tail(&self) -> Point {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `point`.
    #[must_use]
    pub fn occupies(&self, point: Point) -> bool {
        self.body.contains(&point)
    }

    /// Returns true if the head overlaps any non-head segment.
    ///
    /// Meant to run on the post-move body, so a cell the tail vacated this
    /// tick no longer counts.
    #[must_use]
    pub fn head_overlaps_body(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Heading committed by the most recent move.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.current_direction
    }

    /// Heading the next move will commit.
    #[must_use]
    pub fn next_direction(&self) -> Direction {
        self.next_direction
    }

    /// Copies the body into a vector, head first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Point> {
        self.body.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Direction, Point};

    use super::Snake;

    #[test]
    fn snake_moves_one_cell_per_tick() {
        let mut snake = Snake::new(Point::new(5, 5), Direction::Right);

        snake.move_forward(false);

        assert_eq!(snake.head(), Point::new(6, 5));
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn snake_growth_keeps_previous_tail() {
        let mut snake = Snake::new(Point::new(5, 5), Direction::Right);

        snake.move_forward(true);

        assert_eq!(snake.len(), 2);
        assert_eq!(snake.head(), Point::new(6, 5));
        assert_eq!(snake.tail(), Point::new(5, 5));
    }

    #[test]
    fn move_may_leave_the_grid() {
        let mut snake = Snake::new(Point::new(0, 0), Direction::Up);

        snake.move_forward(false);

        assert_eq!(snake.head(), Point::new(0, -1));
    }

    #[test]
    fn reversal_request_is_ignored() {
        let mut snake = Snake::new(Point::new(5, 5), Direction::Right);

        snake.set_direction(Direction::Left);
        assert_eq!(snake.next_direction(), Direction::Right);

        snake.move_forward(false);
        assert_eq!(snake.head(), Point::new(6, 5));
        assert_eq!(snake.direction(), Direction::Right);
    }

    #[test]
    fn direction_change_waits_for_next_move() {
        let mut snake = Snake::new(Point::new(5, 5), Direction::Right);

        snake.set_direction(Direction::Down);
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.next_direction(), Direction::Down);

        snake.move_forward(false);
        assert_eq!(snake.direction(), Direction::Down);
        assert_eq!(snake.head(), Point::new(5, 6));
    }

    #[test]
    fn reversal_is_judged_against_committed_heading() {
        let mut snake = Snake::new(Point::new(5, 5), Direction::Right);

        // Down is queued, but Up is still only perpendicular to Right.
        snake.set_direction(Direction::Down);
        snake.set_direction(Direction::Up);
        snake.move_forward(false);

        assert_eq!(snake.head(), Point::new(5, 4));
    }

    #[test]
    fn self_collision_detects_overlap() {
        // Head at (2,2) turning Left into (1,2), which stays occupied.
        let mut snake = Snake::from_segments(
            vec![
                Point::new(2, 2),
                Point::new(2, 3),
                Point::new(1, 3),
                Point::new(1, 2),
                Point::new(1, 1),
            ],
            Direction::Up,
        );

        snake.set_direction(Direction::Left);
        snake.move_forward(false);

        assert!(snake.head_overlaps_body());
    }

    #[test]
    fn moving_into_vacating_tail_is_not_a_collision() {
        // A 2x2 loop: the head chases the tail cell.
        let mut snake = Snake::from_segments(
            vec![
                Point::new(1, 0),
                Point::new(1, 1),
                Point::new(0, 1),
                Point::new(0, 0),
            ],
            Direction::Up,
        );

        snake.set_direction(Direction::Left);
        snake.move_forward(false);

        assert_eq!(snake.head(), Point::new(0, 0));
        assert!(!snake.head_overlaps_body());
    }

    #[test]
    fn empty_segments_fall_back_to_single_cell() {
        let snake = Snake::from_segments(Vec::new(), Direction::Right);
        assert_eq!(snake.len(), 1);
        assert!(!snake.is_empty());
    }
}
