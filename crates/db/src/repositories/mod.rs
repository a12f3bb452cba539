pub mod asset_repo;
pub mod job_repo;
pub mod progress_repo;

pub use asset_repo::AssetRepo;
pub use job_repo::JobRepo;
pub use progress_repo::ProgressRepo;
