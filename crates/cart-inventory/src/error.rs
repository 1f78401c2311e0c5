use cart_types::ProductId;
use thiserror::Error;

/// Errors from stock and catalog lookups.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The service does not know the product.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The service could not be reached or answered with a failure status.
    #[error("inventory service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a body that could not be decoded.
    #[error("invalid inventory response: {0}")]
    Decode(String),
}

impl InventoryError {
    /// Whether the product itself is unknown, as opposed to a service failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;
