use thiserror::Error;

/// Errors raised by [`ItemStore`](crate::ItemStore).
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("persisted data under {key:?} is malformed: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("price {price} of item {id} cannot be stored")]
    NonFinitePrice { id: u64, price: f64 },

    #[error("failed to encode items: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Error {
    pub(crate) fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}
