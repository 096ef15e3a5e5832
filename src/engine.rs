use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::EngineConfig;
use crate::error::GameError;
use crate::events::{EventSink, GameEvent};
use crate::food::Food;
use crate::geometry::{Direction, GridSize};
use crate::snake::Snake;
use crate::snapshot::Snapshot;

/// High-level lifecycle of one simulation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SimulationState {
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// What a single call to [`Engine::tick`] did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// The engine was not playing; nothing changed.
    Ignored,
    Moved,
    Ate,
    Collided,
    /// Food was eaten but no free cell remained for the next one.
    BoardFilled,
}

/// Sole owner and writer of the snake, the food and the score.
pub struct Engine {
    config: EngineConfig,
    snake: Snake,
    food: Food,
    score: u32,
    state: SimulationState,
    tick_interval: Duration,
    tick_count: u64,
    rng: StdRng,
    sink: Option<Box<dyn EventSink>>,
}

impl Engine {
    /// Creates an engine in the `Ready` state, seeded from OS entropy.
    pub fn new(config: EngineConfig) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible runs.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Creates a `Ready` engine around an explicit snake and food layout.
    pub fn from_parts(
        config: EngineConfig,
        snake: Snake,
        food: Food,
        seed: u64,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if snake.occupies(food.position) {
            return Err(GameError::InvalidConfig(format!(
                "food at ({}, {}) overlaps the snake",
                food.position.x, food.position.y
            )));
        }

        Ok(Self {
            config,
            snake,
            food,
            score: 0,
            state: SimulationState::Ready,
            tick_interval: config.initial_tick_interval,
            tick_count: 0,
            rng: StdRng::seed_from_u64(seed),
            sink: None,
        })
    }

    fn with_rng(config: EngineConfig, mut rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;
        let (snake, food) = fresh_round(&mut rng, config.bounds)?;

        Ok(Self {
            config,
            snake,
            food,
            score: 0,
            state: SimulationState::Ready,
            tick_interval: config.initial_tick_interval,
            tick_count: 0,
            rng,
            sink: None,
        })
    }

    /// Registers `sink` as the event observer, replacing any previous one.
    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = Some(sink);
    }

    /// Registers a channel observer and returns its receiving end.
    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (sender, receiver) = mpsc::channel();
        self.set_sink(Box::new(sender));
        receiver
    }

    /// `Ready`/`Paused` → `Playing`. Ignored in any other state.
    pub fn start(&mut self) {
        if matches!(self.state, SimulationState::Ready | SimulationState::Paused) {
            self.state = SimulationState::Playing;
            tracing::info!(score = self.score, "simulation playing");
        }
    }

    /// `Playing` → `Paused`. Ignored in any other state.
    pub fn pause(&mut self) {
        if self.state == SimulationState::Playing {
            self.state = SimulationState::Paused;
            tracing::info!(score = self.score, tick = self.tick_count, "simulation paused");
        }
    }

    /// Pauses when playing, resumes when paused.
    pub fn toggle_pause(&mut self) {
        match self.state {
            SimulationState::Playing => self.pause(),
            SimulationState::Paused => self.start(),
            SimulationState::Ready | SimulationState::GameOver => {}
        }
    }

    /// Replaces snake and food with a fresh round and starts playing.
    ///
    /// The ramped tick interval carries over into the new round.
    pub fn restart(&mut self) {
        match fresh_round(&mut self.rng, self.config.bounds) {
            Ok((snake, food)) => {
                self.snake = snake;
                self.food = food;
                self.score = 0;
                self.tick_count = 0;
                self.state = SimulationState::Ready;
                tracing::info!(
                    interval_ms = duration_ms(self.tick_interval),
                    "simulation restarted"
                );
                self.start();
            }
            Err(error) => {
                tracing::error!(%error, "restart could not place food");
                self.state = SimulationState::GameOver;
            }
        }
    }

    /// Forwards a direction request to the snake while playing.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.state == SimulationState::Playing {
            self.snake.set_direction(direction);
        }
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != SimulationState::Playing {
            return TickOutcome::Ignored;
        }

        self.tick_count += 1;

        // Eating is decided from the head before it moves.
        let ate_food = self.snake.head() == self.food.position;
        self.snake.move_forward(ate_food);

        let head = self.snake.head();
        if !head.is_within_bounds(self.config.bounds) || self.snake.head_overlaps_body() {
            tracing::debug!(x = head.x, y = head.y, "collision");
            self.finish();
            return TickOutcome::Collided;
        }

        if ate_food {
            self.score += self.config.food_reward;

            match Food::spawn(&mut self.rng, self.config.bounds, &self.snake) {
                Ok(food) => self.food = food,
                Err(error) => {
                    tracing::info!(%error, "board filled");
                    self.finish();
                    return TickOutcome::BoardFilled;
                }
            }

            self.emit(GameEvent::ScoreChanged { score: self.score });
            self.apply_speed_ramp();
        }

        self.emit(GameEvent::Updated {
            body: self.snake.to_vec(),
            food: self.food.position,
            score: self.score,
        });

        if ate_food {
            TickOutcome::Ate
        } else {
            TickOutcome::Moved
        }
    }

    /// Returns a detached copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            head: self.snake.head(),
            body: self.snake.to_vec(),
            food: self.food.position,
            direction: self.snake.direction(),
            score: self.score,
            width: self.config.bounds.width,
            height: self.config.bounds.height,
        }
    }

    #[must_use]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current delay between ticks after speed-ups.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Ticks processed since the round started.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn snake_len(&self) -> usize {
        self.snake.len()
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.config.bounds
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn finish(&mut self) {
        self.state = SimulationState::GameOver;
        tracing::info!(
            score = self.score,
            length = self.snake.len(),
            ticks = self.tick_count,
            "game over"
        );
        self.emit(GameEvent::GameOver {
            final_score: self.score,
        });
    }

    fn apply_speed_ramp(&mut self) {
        if self.score % self.config.speedup_every_points != 0
            || self.tick_interval <= self.config.min_tick_interval
        {
            return;
        }

        self.tick_interval = self
            .tick_interval
            .saturating_sub(self.config.tick_step)
            .max(self.config.min_tick_interval);
        tracing::debug!(
            score = self.score,
            interval_ms = duration_ms(self.tick_interval),
            "speed increased"
        );
    }

    fn emit(&mut self, event: GameEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(event);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("score", &self.score)
            .field("tick_interval", &self.tick_interval)
            .field("tick_count", &self.tick_count)
            .field("snake_len", &self.snake.len())
            .field("food", &self.food.position)
            .finish_non_exhaustive()
    }
}

/// Builds the snake and food for a new round: a one-cell snake in the
/// centre heading right, food anywhere else.
fn fresh_round(rng: &mut StdRng, bounds: GridSize) -> Result<(Snake, Food), GameError> {
    let snake = Snake::new(bounds.center(), Direction::Right);
    let food = Food::spawn(rng, bounds, &snake)?;
    Ok((snake, food))
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::EngineConfig;
    use crate::events::GameEvent;
    use crate::food::Food;
    use crate::geometry::{Direction, GridSize, Point};
    use crate::snake::Snake;

    use super::{Engine, SimulationState, TickOutcome};

    fn playing_engine(bounds: GridSize, snake: Snake, food: Point) -> Engine {
        let mut engine = Engine::from_parts(
            EngineConfig::with_bounds(bounds),
            snake,
            Food::at(food),
            1,
        )
        .expect("valid layout");
        engine.start();
        engine
    }

    #[test]
    fn new_engine_is_ready_with_centered_snake() {
        let engine = Engine::with_seed(EngineConfig::default(), 9).expect("default config");

        assert_eq!(engine.state(), SimulationState::Ready);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.snapshot().head, Point::new(15, 10));
        assert_eq!(engine.snapshot().direction, Direction::Right);
        assert_ne!(engine.snapshot().food, Point::new(15, 10));
    }

    #[test]
    fn ticks_are_ignored_unless_playing() {
        let mut engine = Engine::with_seed(EngineConfig::default(), 2).expect("default config");
        let before = engine.snapshot();

        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.snapshot(), before);

        engine.start();
        engine.pause();
        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn eating_is_detected_from_pre_move_head() {
        let mut engine = playing_engine(
            GridSize::new(10, 10),
            Snake::new(Point::new(1, 1), Direction::Right),
            Point::new(2, 1),
        );

        // Head lands on the food without growing.
        assert_eq!(engine.tick(), TickOutcome::Moved);
        assert_eq!(engine.snake_len(), 1);
        assert_eq!(engine.score(), 0);

        // Next tick starts on the food, so this move grows and scores.
        assert_eq!(engine.tick(), TickOutcome::Ate);
        assert_eq!(engine.snake_len(), 2);
        assert_eq!(engine.score(), 10);
        assert!(!engine.snapshot().body.contains(&engine.snapshot().food));
    }

    #[test]
    fn wall_collision_sets_game_over() {
        let mut engine = playing_engine(
            GridSize::new(4, 4),
            Snake::new(Point::new(3, 1), Direction::Right),
            Point::new(0, 0),
        );
        let events = engine.subscribe();

        assert_eq!(engine.tick(), TickOutcome::Collided);
        assert_eq!(engine.state(), SimulationState::GameOver);

        let received: Vec<GameEvent> = events.try_iter().collect();
        assert_eq!(received, vec![GameEvent::GameOver { final_score: 0 }]);

        assert_eq!(engine.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn collision_suppresses_score_for_that_tick() {
        // Head sits on the food but the move runs into the wall.
        let mut engine = playing_engine(
            GridSize::new(4, 4),
            Snake::new(Point::new(3, 2), Direction::Right),
            Point::new(0, 0),
        );
        engine.food = Food::at(Point::new(3, 2));
        engine.score = 30;
        let events = engine.subscribe();

        assert_eq!(engine.tick(), TickOutcome::Collided);
        assert_eq!(engine.score(), 30);
        let received: Vec<GameEvent> = events.try_iter().collect();
        assert_eq!(received, vec![GameEvent::GameOver { final_score: 30 }]);
    }

    #[test]
    fn score_event_precedes_update() {
        let mut engine = playing_engine(
            GridSize::new(10, 10),
            Snake::new(Point::new(5, 5), Direction::Right),
            Point::new(6, 5),
        );
        let events = engine.subscribe();

        engine.tick();
        engine.tick();

        let received: Vec<GameEvent> = events.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert!(matches!(received[0], GameEvent::Updated { score: 0, .. }));
        assert_eq!(received[1], GameEvent::ScoreChanged { score: 10 });
        match &received[2] {
            GameEvent::Updated { body, score, .. } => {
                assert_eq!(*score, 10);
                assert_eq!(body, &vec![Point::new(7, 5), Point::new(6, 5)]);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn speed_ramp_steps_down_to_floor() {
        let config = EngineConfig {
            initial_tick_interval: Duration::from_millis(80),
            ..EngineConfig::with_bounds(GridSize::new(20, 20))
        };
        let mut engine = Engine::from_parts(
            config,
            Snake::new(Point::new(0, 0), Direction::Right),
            Food::at(Point::new(19, 19)),
            5,
        )
        .expect("valid layout");
        engine.start();

        let mut intervals = Vec::new();
        for _ in 0..25 {
            // Put the food under a fresh head so this tick eats it.
            engine.snake = Snake::new(Point::new(0, 10), Direction::Right);
            engine.food = Food::at(Point::new(0, 10));
            assert_eq!(engine.tick(), TickOutcome::Ate);
            intervals.push((engine.score(), engine.tick_interval().as_millis()));
        }

        let at = |score: u32| {
            intervals
                .iter()
                .find(|(s, _)| *s == score)
                .map(|(_, ms)| *ms)
                .expect("score reached")
        };
        assert_eq!(at(40), 80);
        assert_eq!(at(50), 70);
        assert_eq!(at(90), 70);
        assert_eq!(at(100), 60);
        assert_eq!(at(150), 50);
        assert_eq!(at(200), 50);
        assert_eq!(at(250), 50);
    }

    #[test]
    fn default_ramp_from_200_reaches_floor_only_after_many_steps() {
        let mut engine = playing_engine(
            GridSize::new(10, 10),
            Snake::new(Point::new(5, 5), Direction::Right),
            Point::new(0, 0),
        );

        for expected in [190, 180, 170] {
            engine.score += 40;
            engine.snake = Snake::new(Point::new(5, 5), Direction::Right);
            engine.food = Food::at(Point::new(5, 5));
            assert_eq!(engine.tick(), TickOutcome::Ate);
            assert_eq!(engine.tick_interval(), Duration::from_millis(expected));
        }
    }

    #[test]
    fn pause_is_idempotent_and_silent() {
        let mut engine = playing_engine(
            GridSize::new(10, 10),
            Snake::new(Point::new(5, 5), Direction::Right),
            Point::new(0, 0),
        );
        let events = engine.subscribe();

        engine.pause();
        engine.pause();

        assert_eq!(engine.state(), SimulationState::Paused);
        assert_eq!(events.try_iter().count(), 0);

        engine.start();
        assert_eq!(engine.state(), SimulationState::Playing);
    }

    #[test]
    fn pause_preserves_entities_exactly() {
        let mut engine = playing_engine(
            GridSize::new(10, 10),
            Snake::new(Point::new(2, 5), Direction::Right),
            Point::new(0, 0),
        );
        engine.tick();
        let before = engine.snapshot();

        engine.pause();
        for _ in 0..5 {
            engine.tick();
        }
        engine.start();

        assert_eq!(engine.snapshot(), before);
        engine.tick();
        assert_eq!(engine.snapshot().head, Point::new(4, 5));
    }

    #[test]
    fn direction_requests_ignored_unless_playing() {
        let mut engine = Engine::from_parts(
            EngineConfig::with_bounds(GridSize::new(10, 10)),
            Snake::new(Point::new(5, 5), Direction::Right),
            Food::at(Point::new(0, 0)),
            3,
        )
        .expect("valid layout");

        engine.set_direction(Direction::Down);
        engine.start();
        engine.tick();

        assert_eq!(engine.snapshot().head, Point::new(6, 5));
    }

    #[test]
    fn restart_is_legal_from_any_state() {
        let mut engine = playing_engine(
            GridSize::new(4, 4),
            Snake::new(Point::new(3, 1), Direction::Right),
            Point::new(0, 0),
        );
        engine.score = 20;
        engine.tick();
        assert_eq!(engine.state(), SimulationState::GameOver);

        engine.restart();
        assert_eq!(engine.state(), SimulationState::Playing);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.snake_len(), 1);
        assert_eq!(engine.snapshot().head, Point::new(2, 2));

        engine.pause();
        engine.restart();
        assert_eq!(engine.state(), SimulationState::Playing);

        let mut ready = Engine::with_seed(EngineConfig::default(), 4).expect("default config");
        ready.restart();
        assert_eq!(ready.state(), SimulationState::Playing);
    }

    #[test]
    fn start_does_not_resume_after_game_over() {
        let mut engine = playing_engine(
            GridSize::new(4, 4),
            Snake::new(Point::new(3, 1), Direction::Right),
            Point::new(0, 0),
        );
        engine.tick();

        engine.start();
        engine.toggle_pause();

        assert_eq!(engine.state(), SimulationState::GameOver);
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        // 3x1 board: snake (1,0),(0,0) heading right, head on the food.
        let mut engine = playing_engine(
            GridSize::new(3, 1),
            Snake::from_segments(vec![Point::new(1, 0), Point::new(0, 0)], Direction::Right),
            Point::new(2, 0),
        );
        engine.food = Food::at(Point::new(1, 0));
        let events = engine.subscribe();

        assert_eq!(engine.tick(), TickOutcome::BoardFilled);
        assert_eq!(engine.state(), SimulationState::GameOver);
        assert_eq!(engine.score(), 10);
        let received: Vec<GameEvent> = events.try_iter().collect();
        assert_eq!(received, vec![GameEvent::GameOver { final_score: 10 }]);
    }

    #[test]
    fn from_parts_rejects_food_on_snake() {
        let result = Engine::from_parts(
            EngineConfig::with_bounds(GridSize::new(5, 5)),
            Snake::new(Point::new(2, 2), Direction::Right),
            Food::at(Point::new(2, 2)),
            0,
        );

        assert!(result.is_err());
    }
}
