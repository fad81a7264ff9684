//! Line items and the persisted store that holds them.

mod id;
mod item;
mod item_store;

pub use id::{ClockIds, IdSource, IdStrategy, SequentialIds, TimestampIds};
pub use item::{total, Item};
pub use item_store::{ItemStore, STORAGE_KEY};
