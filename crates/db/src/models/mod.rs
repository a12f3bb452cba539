pub mod asset;
pub mod job;
pub mod progress;
pub mod status;
