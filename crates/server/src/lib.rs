#![forbid(unsafe_code)]

pub mod config;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use state::{AppState, BalanceUpdate};
