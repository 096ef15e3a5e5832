use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::geometry::GridSize;

/// Default grid width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 30;

/// Default grid height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 20;

/// Base tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;

/// Minimum tick interval in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 50;

/// Interval reduction applied per speed-up.
pub const TICK_STEP_MS: u64 = 10;

/// Score granted per food eaten.
pub const FOOD_REWARD: u32 = 10;

/// A speed-up happens whenever the score lands on a multiple of this.
pub const SPEEDUP_EVERY_POINTS: u32 = 50;

const DEFAULT_PLAYER_NAME: &str = "Player";

/// User-facing settings, persisted as JSON.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub tick_interval_ms: u64,
    pub min_tick_interval_ms: u64,
    pub tick_step_ms: u64,
    pub speedup_every_points: u32,
    pub food_reward: u32,
    pub grid_width: u16,
    pub grid_height: u16,
    pub advisor_enabled: bool,
    /// Carried for settings-file compatibility; nothing plays sound.
    pub sound_enabled: bool,
    pub player_name: String,
    pub high_score: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            min_tick_interval_ms: MIN_TICK_INTERVAL_MS,
            tick_step_ms: TICK_STEP_MS,
            speedup_every_points: SPEEDUP_EVERY_POINTS,
            food_reward: FOOD_REWARD,
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            advisor_enabled: true,
            sound_enabled: true,
            player_name: DEFAULT_PLAYER_NAME.to_owned(),
            high_score: 0,
        }
    }
}

impl GameSettings {
    /// Restores defaults for everything except the high score.
    pub fn reset_to_defaults(&mut self) {
        let high_score = self.high_score;
        *self = Self {
            high_score,
            ..Self::default()
        };
    }

    /// Raises the stored high score. Returns true when it changed.
    pub fn update_high_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::from(self)
    }
}

/// Parameters fixed for one engine's lifetime.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EngineConfig {
    pub bounds: GridSize,
    pub initial_tick_interval: Duration,
    pub min_tick_interval: Duration,
    pub tick_step: Duration,
    pub food_reward: u32,
    pub speedup_every_points: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&GameSettings::default())
    }
}

impl From<&GameSettings> for EngineConfig {
    fn from(settings: &GameSettings) -> Self {
        Self {
            bounds: GridSize::new(settings.grid_width, settings.grid_height),
            initial_tick_interval: Duration::from_millis(settings.tick_interval_ms),
            min_tick_interval: Duration::from_millis(settings.min_tick_interval_ms),
            tick_step: Duration::from_millis(settings.tick_step_ms),
            food_reward: settings.food_reward,
            speedup_every_points: settings.speedup_every_points,
        }
    }
}

impl EngineConfig {
    /// Default parameters on a custom board.
    #[must_use]
    pub fn with_bounds(bounds: GridSize) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Rejects configurations the engine cannot run.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.bounds.width == 0 || self.bounds.height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.bounds.width, self.bounds.height
            )));
        }
        if self.bounds.total_cells() < 2 {
            return Err(GameError::InvalidConfig(
                "grid needs room for the snake and one food".to_owned(),
            ));
        }
        if self.min_tick_interval.is_zero() {
            return Err(GameError::InvalidConfig(
                "minimum tick interval must be positive".to_owned(),
            ));
        }
        if self.min_tick_interval > self.initial_tick_interval {
            return Err(GameError::InvalidConfig(format!(
                "minimum tick interval {:?} exceeds initial interval {:?}",
                self.min_tick_interval, self.initial_tick_interval
            )));
        }
        if self.speedup_every_points == 0 {
            return Err(GameError::InvalidConfig(
                "speed-up threshold must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
