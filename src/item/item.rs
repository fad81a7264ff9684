use serde::{Deserialize, Serialize};

/// A priced line item.
///
/// Serialized as `{ "id": number, "name": string, "price": number }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub price: f64,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }
}

/// Sum of all prices; `0.0` for an empty list.
pub fn total(items: &[Item]) -> f64 {
    items.iter().map(|item| item.price).sum()
}
