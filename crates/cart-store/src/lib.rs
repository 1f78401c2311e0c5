//! Durable key/value storage for RocketCart.
//!
//! The cart is persisted as an opaque byte blob under a single fixed key.
//! This crate defines the [`PersistentStore`] interface and its backends; it
//! never interprets the bytes it holds.
//!
//! # Storage Backends
//!
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileStore`] -- one file per key inside a directory
//!
//! # Design Rules
//!
//! 1. A write replaces the whole value for a key; readers never observe a
//!    partially written value.
//! 2. A missing key is `Ok(None)`, not an error.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use traits::PersistentStore;
