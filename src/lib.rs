// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod market;
pub mod models;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use config::SessionConfig;
pub use error::SessionError;
pub use models::*;
pub use session::{SessionManager, SessionReport};
pub use strategy::Strategy;
