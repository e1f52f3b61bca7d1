pub mod config;
pub mod error;
pub mod grid;
pub mod progress;
