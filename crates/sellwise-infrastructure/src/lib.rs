pub mod kv_repository;
pub mod media_file;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use kv_repository::{FileKeyValueRepository, InMemoryKeyValueRepository};
pub use paths::SellwisePaths;
pub use secret_service::SecretServiceImpl;
pub use storage::ConfigStorage;
