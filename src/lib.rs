//! # Estimator
//!
//! Line items for a project cost estimate, kept in an observable list that is
//! written to durable storage after every change.
//!
//! ## Store (observable state)
//!
//! - `Store<T>` - Thread-safe state container that notifies subscribers
//! - `Subscription` - Handle that removes a subscriber when dropped
//!
//! ## Items
//!
//! - `ItemStore` - Most-recent-first list of `Item`s with add, edit and
//!   delete, persisted as JSON under the `"materials"` key
//! - `IdSource` - Strategies for assigning ids to new items
//! - `KeyValue` - The storage an `ItemStore` writes to, with in-memory and
//!   file-backed implementations
//!
//! ## Form
//!
//! - `Draft` - Entry form state with validation, submitting to an `ItemStore`

pub mod config;
mod error;
pub mod form;
pub mod item;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use error::Error;
pub use form::{Draft, FormError, Mode, Submitted};
pub use item::{
    total, ClockIds, IdSource, IdStrategy, Item, ItemStore, SequentialIds, TimestampIds,
    STORAGE_KEY,
};
pub use storage::{FileStorage, FileStorageError, KeyValue, MemoryStorage};
pub use store::{Store, Subscription};
