//! Configuration schema and loading for the Engram stack.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Config loading helpers.
pub use loader::{API_KEY_ENV, default_config, load_config};
/// Configuration schema models.
pub use model::*;
