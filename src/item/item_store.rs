use tracing::{debug, info};

use super::id::{ClockIds, IdSource};
use super::item::{total, Item};
use crate::error::Error;
use crate::storage::KeyValue;
use crate::store::{Store, Subscription};

/// Storage key the item list is persisted under.
pub const STORAGE_KEY: &str = "materials";

/// The observable, persisted list of line items.
///
/// Items are kept most-recent-first. Every mutation that changes the list is
/// written to storage before observers hear about it; if the write fails the
/// list is left as it was. Prices that cannot be stored (NaN or infinite) are
/// refused the same way.
///
/// # Examples
///
/// ```
/// use estimator::{ItemStore, MemoryStorage};
///
/// let store = ItemStore::open(MemoryStorage::new()).unwrap();
/// store.add("Wood", 5.0).unwrap();
/// store.add("Glue", 2.0).unwrap();
///
/// let names: Vec<_> = store.items().into_iter().map(|item| item.name).collect();
/// assert_eq!(names, ["Glue", "Wood"]);
/// assert_eq!(store.total(), 7.0);
/// ```
pub struct ItemStore<S> {
    items: Store<Vec<Item>>,
    storage: S,
    ids: Box<dyn IdSource>,
}

impl<S: KeyValue> ItemStore<S> {
    /// Loads the persisted list from `storage`, using [`ClockIds`] for new
    /// items.
    pub fn open(storage: S) -> Result<Self, Error> {
        Self::with_ids(storage, Box::new(ClockIds::new()))
    }

    /// Loads the persisted list from `storage`, drawing new ids from `ids`.
    ///
    /// A missing or empty slot yields an empty list. A slot that does not
    /// decode is an error; it is never replaced with an empty list.
    pub fn with_ids(storage: S, ids: Box<dyn IdSource>) -> Result<Self, Error> {
        let items = match storage.get(STORAGE_KEY).map_err(Error::storage)? {
            Some(json) if !json.is_empty() => {
                serde_json::from_str::<Vec<Item>>(&json).map_err(|source| Error::Corrupt {
                    key: STORAGE_KEY.to_string(),
                    source,
                })?
            }
            _ => Vec::new(),
        };

        if let Some(max) = items.iter().map(|item| item.id).max() {
            ids.advance_past(max);
        }
        info!(count = items.len(), "loaded items");

        Ok(Self {
            items: Store::new(items),
            storage,
            ids,
        })
    }

    /// Registers `observer`, calling it with the current list right away and
    /// again after every change.
    ///
    /// The observer may read this store but must not modify it.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&[Item]) + Send + Sync + 'static,
    {
        self.items
            .watch(move |items: &Vec<Item>| observer(items.as_slice()))
    }

    /// Prepends a new item and returns its id.
    pub fn add(&self, name: impl Into<String>, price: f64) -> Result<u64, Error> {
        let item = Item::new(self.ids.next_id(), name, price);
        let id = item.id;
        self.mutate(move |items| {
            items.insert(0, item);
            true
        })?;
        debug!(id, "added item");
        Ok(id)
    }

    /// Replaces the name and price of the item with `id`, keeping its place.
    ///
    /// Returns `false` without touching storage when no item has that id.
    pub fn edit(&self, id: u64, name: impl Into<String>, price: f64) -> Result<bool, Error> {
        let name = name.into();
        let changed = self.mutate(|items| match items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.name = name;
                item.price = price;
                true
            }
            None => false,
        })?;
        debug!(id, changed, "edit");
        Ok(changed)
    }

    /// Removes the item with `id`, keeping the order of the rest.
    ///
    /// Returns `false` without touching storage when no item has that id.
    pub fn delete_row(&self, id: u64) -> Result<bool, Error> {
        let changed = self.mutate(|items| {
            let before = items.len();
            items.retain(|item| item.id != id);
            items.len() != before
        })?;
        debug!(id, changed, "delete");
        Ok(changed)
    }

    /// Snapshot of the current list.
    pub fn items(&self) -> Vec<Item> {
        self.items.get()
    }

    pub fn get(&self, id: u64) -> Option<Item> {
        self.items
            .read(|items| items.iter().find(|item| item.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.items.read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.items.read(Vec::is_empty)
    }

    /// Sum of all item prices.
    pub fn total(&self) -> f64 {
        self.items.read(|items| total(items))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Gives back the storage, e.g. to reopen it.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn mutate<F>(&self, f: F) -> Result<bool, Error>
    where
        F: FnOnce(&mut Vec<Item>) -> bool,
    {
        self.items.try_update(|items| {
            if !f(items) {
                return Ok(false);
            }
            self.persist(items)?;
            Ok(true)
        })
    }

    fn persist(&self, items: &[Item]) -> Result<(), Error> {
        // serde_json writes NaN and infinities as null, which would not load back.
        if let Some(item) = items.iter().find(|item| !item.price.is_finite()) {
            return Err(Error::NonFinitePrice {
                id: item.id,
                price: item.price,
            });
        }
        let json = serde_json::to_string(items).map_err(Error::Encode)?;
        self.storage
            .set(STORAGE_KEY, &json)
            .map_err(Error::storage)?;
        Ok(())
    }
}
