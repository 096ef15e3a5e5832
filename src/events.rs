use std::sync::mpsc::Sender;

use crate::geometry::Point;

/// Notifications pushed by the engine after a tick.
///
/// Within one tick `GameOver` is exclusive; otherwise `ScoreChanged` (when
/// food was eaten) precedes `Updated`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GameEvent {
    Updated {
        body: Vec<Point>,
        food: Point,
        score: u32,
    },
    ScoreChanged {
        score: u32,
    },
    GameOver {
        final_score: u32,
    },
}

/// Receiver side of the engine's event registration.
pub trait EventSink: Send {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Sender<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(event);
    }
}
