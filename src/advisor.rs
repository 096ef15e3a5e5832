//! Local move and text advice computed purely from a [`Snapshot`].
//!
//! The move heuristic is a greedy one-ply lookahead: it only checks that the
//! very next cell is free, so it will happily steer into a pocket that traps
//! the snake a few moves later.

use rand::Rng;

use crate::geometry::{Direction, Point};
use crate::snapshot::Snapshot;

/// Body length above which path-planning advice kicks in.
const LONG_SNAKE_LEN: usize = 10;

/// Body cells nearest the head that never count as "close to yourself".
const NECK_SEGMENTS: usize = 3;

const TIPS: [&str; 5] = [
    "Coil the body into a spiral to leave room for later moves.",
    "Don't rush the food; a safe route beats a short one.",
    "When the snake gets long, trace the border to buy time.",
    "Plan a few moves ahead before committing to a turn.",
    "Corners are traps. Give them extra space.",
];

/// Suggests the first safe direction, preferring those that close in on food.
///
/// Returns `None` when every neighbouring cell is a wall or body.
#[must_use]
pub fn suggest_move(snapshot: &Snapshot) -> Option<Direction> {
    food_directions(snapshot)
        .into_iter()
        .chain(Direction::ALL)
        .find(|direction| is_safe_move(snapshot, *direction))
}

/// Like [`suggest_move`], but never proposes reversing the current heading.
///
/// The engine drops reversal requests, so a driver that feeds suggestions
/// back into it uses this variant.
#[must_use]
pub fn steerable_move(snapshot: &Snapshot) -> Option<Direction> {
    let reverse = snapshot.direction.opposite();
    food_directions(snapshot)
        .into_iter()
        .chain(Direction::ALL)
        .filter(|direction| *direction != reverse)
        .find(|direction| is_safe_move(snapshot, *direction))
}

/// Directions that reduce the distance to the food, larger axis first.
///
/// Ties go to the horizontal axis. Axes with zero delta contribute nothing.
#[must_use]
pub fn food_directions(snapshot: &Snapshot) -> Vec<Direction> {
    let dx = snapshot.food.x - snapshot.head.x;
    let dy = snapshot.food.y - snapshot.head.y;

    let horizontal = match dx.signum() {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    };
    let vertical = match dy.signum() {
        1 => Some(Direction::Down),
        -1 => Some(Direction::Up),
        _ => None,
    };

    let ordered = if dx.abs() >= dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    ordered.into_iter().flatten().collect()
}

/// True when stepping `direction` stays on the board and avoids the body.
///
/// The tail cell counts as free because it moves away on a normal step.
#[must_use]
pub fn is_safe_move(snapshot: &Snapshot, direction: Direction) -> bool {
    let next = snapshot.head.offset(direction);
    if !snapshot.in_bounds(next) {
        return false;
    }

    let without_tail = snapshot.body.len().saturating_sub(1);
    !snapshot.body[..without_tail].contains(&next)
}

/// Builds a short human-readable hint for the current position.
#[must_use]
pub fn local_advice(snapshot: &Snapshot) -> String {
    let dx = snapshot.food.x - snapshot.head.x;
    let dy = snapshot.food.y - snapshot.head.y;

    let mut hints = Vec::new();

    let toward_food = if dx.abs() > dy.abs() {
        if dx > 0 { "right" } else { "left" }
    } else if dy > 0 {
        "down"
    } else {
        "up"
    };
    hints.push(format!("Head {toward_food} toward the food."));

    if is_near_wall(snapshot) {
        hints.push("Watch the walls!".to_owned());
    }
    if is_near_self(snapshot) {
        hints.push("Careful not to bite yourself!".to_owned());
    }
    if snapshot.len() > LONG_SNAKE_LEN {
        hints.push("You're long now; plan your path before turning.".to_owned());
    }

    hints.join(" ")
}

/// Picks one of the built-in strategy tips.
#[must_use]
pub fn random_tip<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    TIPS[rng.gen_range(0..TIPS.len())]
}

/// Compares `score` against recent history.
#[must_use]
pub fn performance_summary(score: u32, recent_scores: &[u32]) -> String {
    if recent_scores.is_empty() {
        return format!("You scored {score}. Keep practising to find the rhythm!");
    }

    let total: u64 = recent_scores.iter().map(|s| u64::from(*s)).sum();
    let average = total as f64 / recent_scores.len() as f64;

    if f64::from(score) > average {
        format!("Nice run! {score} beats your recent average of {average:.1}. Keep it up!")
    } else {
        format!(
            "{score} is below your recent average of {average:.1}. Work on planning routes and spotting danger early."
        )
    }
}

fn is_near_wall(snapshot: &Snapshot) -> bool {
    let head = snapshot.head;
    head.x <= 1
        || head.y <= 1
        || head.x >= i32::from(snapshot.width) - 2
        || head.y >= i32::from(snapshot.height) - 2
}

fn is_near_self(snapshot: &Snapshot) -> bool {
    let head: Point = snapshot.head;
    snapshot
        .body
        .iter()
        .skip(NECK_SEGMENTS)
        .any(|segment| head.manhattan_distance(*segment) <= 2)
}
