//! Public SDK surface for Engram.
//!
//! This crate re-exports the core building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use engram_rs_config as config;
pub use engram_rs_core as core;
/// Re-export for convenience.
pub use engram_rs_embedding as embedding;
/// Re-export for convenience.
pub use engram_rs_llm as llm;
/// Re-export for convenience.
pub use engram_rs_memory as memory;

#[inline]
/// Initialize logging using env_logger.
///
/// Binaries are expected to call this early in startup to ensure log
/// output is wired up.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
