use std::fmt;

use cart_inventory::InventoryError;
use cart_store::StoreError;
use cart_types::{ProductId, TypeError};
use thiserror::Error;

/// The cart operation a failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
    Clear,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::UpdateAmount => "update-amount",
            Self::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// Broad class of a cart failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is invalid against the cart or current stock.
    Validation,
    /// The stock service or product catalog failed.
    Dependency,
    /// The candidate cart could not be written to durable storage.
    Persistence,
}

/// Errors from cart operations.
///
/// None of these are fatal: the cart is unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("{operation}: product {product_id} is not in the cart")]
    LineNotFound {
        operation: Operation,
        product_id: ProductId,
    },

    #[error("invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: u32 },

    #[error("{operation}: requested {requested} of product {product_id}, {available} in stock")]
    StockExceeded {
        operation: Operation,
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("{operation}: inventory lookup for product {product_id} failed: {source}")]
    Inventory {
        operation: Operation,
        product_id: ProductId,
        #[source]
        source: InventoryError,
    },

    #[error("{operation}: candidate cart rejected: {source}")]
    Invariant {
        operation: Operation,
        #[source]
        source: TypeError,
    },

    #[error("{operation}: cart could not be encoded: {source}")]
    Encode {
        operation: Operation,
        #[source]
        source: TypeError,
    },

    #[error("{operation}: cart could not be persisted: {source}")]
    Persistence {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl CartError {
    /// The operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            Self::InvalidAmount { .. } => Operation::UpdateAmount,
            Self::LineNotFound { operation, .. }
            | Self::StockExceeded { operation, .. }
            | Self::Inventory { operation, .. }
            | Self::Invariant { operation, .. }
            | Self::Encode { operation, .. }
            | Self::Persistence { operation, .. } => *operation,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LineNotFound { .. }
            | Self::InvalidAmount { .. }
            | Self::StockExceeded { .. }
            | Self::Invariant { .. } => ErrorKind::Validation,
            Self::Inventory { .. } => ErrorKind::Dependency,
            Self::Encode { .. } | Self::Persistence { .. } => ErrorKind::Persistence,
        }
    }

    pub fn is_stock_exceeded(&self) -> bool {
        matches!(self, Self::StockExceeded { .. })
    }
}

/// Result alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;
