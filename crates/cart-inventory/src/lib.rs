//! Remote inventory access for RocketCart.
//!
//! The cart never owns stock or catalog data; it asks for it at mutation
//! time through two request/response interfaces:
//!
//! - [`StockService`] -- current available stock for a product
//! - [`ProductCatalog`] -- descriptive metadata for a product
//!
//! # Backends
//!
//! - [`InMemoryInventory`] -- maps of products and stock, for tests and demos
//! - [`HttpInventory`] -- JSON API client (`/stock/{id}`, `/products/{id}`)

pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::{InventoryError, InventoryResult};
pub use http::HttpInventory;
pub use memory::InMemoryInventory;
pub use traits::{ProductCatalog, StockService};
