//! file-store - A small async abstraction over file storage
//!
//! This crate provides save, read, delete, existence and metadata operations for files
//! addressed by relative keys:
//! - `FileStore` trait so remote backends can slot in behind the same contract
//! - `LocalFileStore` backed by a base directory on the local filesystem
//! - Keys sanitized so they cannot escape the base directory
//! - Failures reported through `Result`, with detail logged via `tracing`

pub mod config;
pub mod store;
pub mod stream;
pub mod telemetry;

pub use config::{Config, StorageConfig};
pub use store::{FileRecord, FileStore, LocalFileStore, SaveOptions, StoreError};
pub use stream::ByteStream;
