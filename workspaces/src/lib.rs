// Workspace snapshot engine (capture + restore + storage)
pub mod snapshot;

// On-disk naming configuration
pub mod config;

pub mod error;

// Logging setup for binaries
pub mod logging;

// In-memory editor host (only compiled in tests)
#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use error::{Result, SnapshotError};
