//! HTTP clients for the external services the generation pipeline
//! depends on: OpenAI (text and images), ElevenLabs (speech), and S3
//! (asset storage).
//!
//! Every client is exposed behind a trait in [`traits`] so the
//! pipeline can be driven by fakes in tests. [`services::GenerationServices`]
//! bundles one implementation of each trait for injection.

pub mod config;
pub mod elevenlabs;
pub mod openai;
pub mod s3;
pub mod services;
pub mod traits;

pub use config::ClientsConfig;
pub use elevenlabs::ElevenLabsClient;
pub use openai::OpenAiClient;
pub use s3::S3Store;
pub use services::GenerationServices;
pub use traits::{ChatParams, ImageGenerator, ObjectStore, SpeechSynthesizer, TextGenerator};
