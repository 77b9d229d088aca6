//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{ALL_CATEGORIES, Catalog, CatalogError},
    checkout::{CheckoutError, OrderDraft, PaymentMethod, ShippingAddress},
    prices::Price,
    products::{Product, ProductId},
    session::{Session, SessionChange, SessionStore, User},
    storage::{FileStorage, MemoryStorage, Storage, StorageError},
    store::{CART_KEY, CartStore, PersistMode},
    subscribers::{Subscribers, SubscriptionKey},
    summary::{CartSummary, SummaryError},
    theme::{Theme, ThemeStore},
};
