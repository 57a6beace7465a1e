#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Configuration options
pub mod config;

/// Local post cache (the on-disk replica)
pub mod cache;

/// Error (common error types)
pub mod error;

/// Content fingerprints (SHA-256 over canonical serializations)
pub mod fingerprint;

/// Filesystem abstraction
pub mod fs;

/// Post model as exchanged with the remote backend
pub mod post;

/// Two-replica synchronization engine
pub mod sync;

#[cfg(test)]
pub mod test_utils;
