//! The RocketCart cart store.
//!
//! [`CartStore`] owns the authoritative list of cart lines. Every mutation
//! follows the same path:
//!
//! 1. copy the current cart,
//! 2. validate the candidate (line uniqueness, amount bounds, live stock),
//! 3. persist the encoded candidate,
//! 4. publish it as the current cart.
//!
//! A failure at any step leaves the current cart untouched, reports a
//! localized message through the [`NotificationSink`] and returns a typed
//! [`CartError`] to the caller.

pub mod config;
pub mod error;
pub mod messages;
pub mod notify;
pub mod store;

pub use config::{CartConfig, ConfigError, Locale};
pub use error::{CartError, CartResult, ErrorKind, Operation};
pub use messages::Messages;
pub use notify::{NotificationSink, RecordingSink, TracingSink};
pub use store::{CartOptions, CartStore, CartUpdate, LineChange};

pub use cart_types::{Cart, CartLine, Product, ProductId, StockInfo};
