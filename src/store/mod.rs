//! Observable state containers.
//!
//! A [`Store`] holds a value behind a lock and hands every change to the
//! callbacks registered on it. Registration returns a [`Subscription`] that
//! removes the callback again.

mod store;

pub use store::{Store, Subscription};
