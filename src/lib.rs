//! Storefront
//!
//! Client-side state for a small storefront: the shopping cart, the colour theme and the
//! signed-in session, each persisted to a key-value slot and observable by subscribers.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod observability;
pub mod prelude;
pub mod prices;
pub mod products;
pub mod receipt;
pub mod session;
pub mod storage;
pub mod store;
pub mod subscribers;
pub mod summary;
pub mod theme;
