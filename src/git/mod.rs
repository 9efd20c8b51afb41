pub mod reflog;
pub mod repo;

pub use repo::GitRepo;
