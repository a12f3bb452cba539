//! The story generation pipeline.
//!
//! [`orchestrator::JobOrchestrator`] drives a claimed job through four
//! generation steps (story first, then metadata, artwork, and audio
//! concurrently), persisting per-step progress as it goes and landing
//! the job in exactly one terminal state.

pub mod orchestrator;
pub mod prompts;
pub mod steps;
pub mod store;

pub use orchestrator::JobOrchestrator;
pub use store::{PgPipelineStore, PipelineStore};
