//! Durable key-value slots that an [`ItemStore`](crate::ItemStore) writes its
//! snapshot into.
//!
//! Storage works on strings only; encoding the item list is the item
//! store's job.

mod file;
mod memory;

use std::sync::Arc;

pub use file::{FileStorage, FileStorageError};
pub use memory::MemoryStorage;

/// A string key-value store.
///
/// All methods take `&self` so backends can use interior locking.
pub trait KeyValue {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the value stored under `key`, or `None` if the slot is empty.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

impl<K: KeyValue + ?Sized> KeyValue for &K {
    type Error = K::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }
}

impl<K: KeyValue + ?Sized> KeyValue for Arc<K> {
    type Error = K::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }
}
