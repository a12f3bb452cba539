//! Domain logic for the drowse story-generation platform.
//!
//! Everything in this crate is pure (no database, no HTTP): the error
//! taxonomy, the retry executor, prompt assembly, generated-content
//! cleanup/parsing, and the small boundary helpers (tokens, phone
//! numbers, webhook signatures). I/O lives in the `drowse-db`,
//! `drowse-clients`, and `drowse-api` crates.

pub mod artwork;
pub mod customization;
pub mod error;
pub mod metadata;
pub mod phone;
pub mod retry;
pub mod signature;
pub mod step;
pub mod story;
pub mod token;
pub mod types;
