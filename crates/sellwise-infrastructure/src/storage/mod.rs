//! File storage primitives.

pub mod atomic_file;
pub mod config_storage;
pub mod secret_storage;

pub use atomic_file::{AtomicFile, AtomicFileError, FileFormat};
pub use config_storage::ConfigStorage;
pub use secret_storage::{SecretStorage, SecretStorageError};
