use serde::{Deserialize, Serialize};

/// Lifetime play statistics, persisted as JSON.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_games: u32,
    pub total_play_time_secs: u64,
    pub total_score: u64,
    pub highest_score: u32,
    pub longest_snake: usize,
    pub advice_used: u32,
}

impl Statistics {
    /// Mean score per finished game, `0.0` before the first one.
    #[must_use]
    pub fn average_score(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.total_score as f64 / f64::from(self.total_games)
    }

    /// Folds one finished game into the totals.
    pub fn record_game(&mut self, score: u32, play_time_secs: u64, snake_length: usize) {
        self.total_games += 1;
        self.total_score += u64::from(score);
        self.total_play_time_secs += play_time_secs;
        self.highest_score = self.highest_score.max(score);
        self.longest_snake = self.longest_snake.max(snake_length);
    }

    pub fn record_advice_used(&mut self) {
        self.advice_used += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn record_game_tracks_extremes_and_average() {
        let mut stats = Statistics::default();
        assert_eq!(stats.average_score(), 0.0);

        stats.record_game(30, 20, 4);
        stats.record_game(10, 5, 7);

        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.total_score, 40);
        assert_eq!(stats.total_play_time_secs, 25);
        assert_eq!(stats.highest_score, 30);
        assert_eq!(stats.longest_snake, 7);
        assert!((stats.average_score() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_clears_everything() {
        let mut stats = Statistics::default();
        stats.record_game(50, 60, 6);
        stats.record_advice_used();

        stats.reset();

        assert_eq!(stats, Statistics::default());
    }
}
