//! The entry form in front of an [`ItemStore`].
//!
//! The store accepts whatever it is given; checking that a name is present
//! and a price is non-negative happens here, before the store is called.

use thiserror::Error;

use crate::error::Error;
use crate::item::{Item, ItemStore};
use crate::storage::KeyValue;

/// Price a fresh draft starts with.
pub const DEFAULT_PRICE: f64 = 5.0;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("price must be zero or more, got {0}")]
    NegativePrice(f64),

    #[error("price must be a finite number")]
    InvalidPrice,

    #[error(transparent)]
    Store(#[from] Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Add,
    Edit,
}

/// What a successful [`Draft::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Added(u64),
    Edited(u64),
    /// The draft pointed at an id that is no longer in the store.
    Missing(u64),
}

/// Values currently entered in the form.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub id: Option<u64>,
    pub name: String,
    pub price: f64,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            price: DEFAULT_PRICE,
        }
    }
}

impl Draft {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
        }
    }

    /// A draft pre-filled from an existing item, submitting as an edit.
    pub fn editing(item: &Item) -> Self {
        Self {
            id: Some(item.id),
            name: item.name.clone(),
            price: item.price,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.id {
            Some(_) => Mode::Edit,
            None => Mode::Add,
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }
        if !self.price.is_finite() {
            return Err(FormError::InvalidPrice);
        }
        if self.price < 0.0 {
            return Err(FormError::NegativePrice(self.price));
        }
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates the draft and hands it to `store`.
    ///
    /// The draft is reset once the store accepted it. On any error it is left
    /// as entered.
    pub fn submit<S: KeyValue>(&mut self, store: &ItemStore<S>) -> Result<Submitted, FormError> {
        self.validate()?;
        let submitted = match self.id {
            None => Submitted::Added(store.add(self.name.clone(), self.price)?),
            Some(id) => {
                if store.edit(id, self.name.clone(), self.price)? {
                    Submitted::Edited(id)
                } else {
                    Submitted::Missing(id)
                }
            }
        };
        self.cancel();
        Ok(submitted)
    }

    /// Clears the draft back to its defaults.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}
