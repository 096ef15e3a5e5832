pub mod advisor;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod food;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod remote;
pub mod renderer;
pub mod scheduler;
pub mod snake;
pub mod snapshot;
pub mod stats;
pub mod store;
