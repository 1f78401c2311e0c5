//! Foundation types for RocketCart.
//!
//! This crate provides the product, stock and cart types shared by every
//! other RocketCart crate. It performs no I/O.
//!
//! # Key Types
//!
//! - [`ProductId`] — Integer product identifier, unique within a cart
//! - [`Product`] — Catalog metadata used to materialize a new cart line
//! - [`StockInfo`] — Stock count reported by the inventory service
//! - [`CartLine`] — One product entry in the cart with its quantity
//! - [`Cart`] — Ordered sequence of cart lines
//!
//! The [`codec`] module turns a [`Cart`] into the byte blob kept in durable
//! storage and back.

pub mod cart;
pub mod codec;
pub mod error;
pub mod product;

pub use cart::{Cart, CartLine};
pub use codec::{decode_cart, encode_cart};
pub use error::TypeError;
pub use product::{Product, ProductId, StockInfo};
