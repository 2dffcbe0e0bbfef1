//! Durable key-value slot port.
//!
//! The cart store persists its state as JSON text under a single key. The
//! storage behind that key is injected, so the same store logic runs against
//! process memory in tests and against the filesystem in the CLI and server.
//!
//! # Available Implementations
//!
//! | Backend | Use Case | Durability |
//! |---------|----------|------------|
//! | [`MemorySlot`] | Tests, ephemeral sessions | None |
//! | [`FileSlot`] | CLI and storefront | Atomic replace per write |
//!
//! # Concurrency
//!
//! Writes are full overwrites with no versioning. Two writers sharing a key
//! race and the last one wins.

mod file;
mod memory;

pub use file::FileSlot;
pub use memory::MemorySlot;

use thiserror::Error;

/// Errors that can occur when reading or writing a slot.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Filesystem I/O failed.
    #[error("slot I/O error for key {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be used with this backend.
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("slot storage lock poisoned")]
    Poisoned,
}

/// Durable storage for serialized state, addressed by key.
///
/// # Implementor Notes
///
/// - All methods must be thread-safe (`Send + Sync` bound)
/// - A missing key is `Ok(None)` from [`get`](Self::get), never an error
/// - [`set`](Self::set) replaces the whole value
pub trait DurableSlot: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), SlotError>;

    /// Delete the value under `key`. Returns whether a value existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete(&self, key: &str) -> Result<bool, SlotError>;
}
