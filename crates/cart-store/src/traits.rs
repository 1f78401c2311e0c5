use crate::error::StoreResult;

/// Durable key/value byte storage.
///
/// All implementations must satisfy these invariants:
/// - `write` replaces the full value atomically: a later `read` returns
///   either the old or the new bytes, never a mix.
/// - The store never interprets values.
/// - All I/O errors are propagated, never silently ignored.
pub trait PersistentStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing has been written under `key`.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write (create or replace) the value stored under `key`.
    fn write(&self, key: &str, value: &[u8]) -> StoreResult<()>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for std::sync::Arc<S> {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).write(key, value)
    }
}
