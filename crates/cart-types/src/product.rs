use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TypeError;

/// Identifier of a purchasable product.
///
/// Product ids are assigned by the catalog and are unique within a cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw catalog id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw catalog id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ProductId> for u64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl FromStr for ProductId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidProductId(s.to_string()))
    }
}

/// Descriptive product metadata as served by the catalog.
///
/// Field names on the wire follow the catalog API (`title`, `image`);
/// `name` and `imageUrl` are accepted on read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "title", alias = "name")]
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "image", alias = "imageUrl")]
    pub image_url: String,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image_url: image_url.into(),
        }
    }
}

/// Available stock for a product at the time it was fetched.
///
/// Never stored: fetched fresh for every validation. A negative amount on
/// the wire reads as zero stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    pub id: ProductId,
    #[serde(deserialize_with = "stock_amount")]
    pub amount: u32,
}

fn stock_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let amount = i64::deserialize(deserializer)?;
    Ok(u32::try_from(amount.max(0)).unwrap_or(u32::MAX))
}

impl StockInfo {
    pub const fn new(id: ProductId, amount: u32) -> Self {
        Self { id, amount }
    }

    /// Whether `requested` units can be taken from this stock.
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}
