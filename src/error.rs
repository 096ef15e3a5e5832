use std::io;

use thiserror::Error;

/// Failures raised by the simulation core.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no free cell left for food on a {width}x{height} board")]
    BoardFull { width: u16, height: u16 },
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Failures raised while loading or saving persisted settings and stats.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures raised by a remote advice service.
///
/// Every variant is recoverable: callers fall back to the local heuristic.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum AdviceError {
    #[error("advice service unavailable: {0}")]
    Unavailable(String),
    #[error("advice service timed out")]
    Timeout,
    #[error("could not interpret advice response: {0:?}")]
    Unparseable(String),
}
