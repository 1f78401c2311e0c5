use thiserror::Error;

use crate::product::ProductId;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid product id: {0}")]
    InvalidProductId(String),

    #[error("duplicate cart line for product {0}")]
    DuplicateLine(ProductId),

    #[error("cart line for product {0} has zero amount")]
    ZeroAmount(ProductId),

    #[error("serialization error: {0}")]
    Serialization(String),
}
