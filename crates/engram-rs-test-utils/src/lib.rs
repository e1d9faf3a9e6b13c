//! Collaborator fakes shared by Engram tests.

mod embedding;
mod llm;

/// Embedding fakes.
pub use embedding::{FailingEmbedder, FixedEmbedder};
/// Text-generation fakes.
pub use llm::{FailingGenerator, FixedGenerator, RecordingGenerator};
