use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::product::{Product, ProductId};

/// One product entry in the cart with its quantity.
///
/// Metadata is copied from the catalog when the line is created and is not
/// refreshed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    #[serde(rename = "title", alias = "name")]
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "image", alias = "imageUrl")]
    pub image_url: String,
    pub amount: u32,
}

impl CartLine {
    /// A fresh line for `product` holding a single unit.
    pub fn from_product(product: Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            price: product.price,
            image_url: product.image_url,
            amount: 1,
        }
    }

    /// Price times amount.
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

/// Ordered sequence of cart lines.
///
/// Lines keep the order in which their products were first added. A `Cart`
/// value is immutable in practice: every change produces a new `Cart`, so a
/// snapshot handed out to a reader is never affected by later mutations.
///
/// Invariants (checked by [`Cart::from_lines`] and on deserialize):
/// - no two lines share a product id
/// - every line has `amount >= 1`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<CartLine>", try_from = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from lines, enforcing the cart invariants.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, TypeError> {
        let cart = Self { lines };
        cart.validate()?;
        Ok(cart)
    }

    /// Check the cart invariants.
    pub fn validate(&self) -> Result<(), TypeError> {
        let mut seen = HashSet::with_capacity(self.lines.len());
        for line in &self.lines {
            if line.amount == 0 {
                return Err(TypeError::ZeroAmount(line.product_id));
            }
            if !seen.insert(line.product_id) {
                return Err(TypeError::DuplicateLine(line.product_id));
            }
        }
        Ok(())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartLine> {
        self.lines.iter()
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Copy of this cart with `line` appended.
    ///
    /// Fails if a line for the same product already exists.
    pub fn with_line(&self, line: CartLine) -> Result<Self, TypeError> {
        if line.amount == 0 {
            return Err(TypeError::ZeroAmount(line.product_id));
        }
        if self.contains(line.product_id) {
            return Err(TypeError::DuplicateLine(line.product_id));
        }
        let mut lines = self.lines.clone();
        lines.push(line);
        Ok(Self { lines })
    }

    /// Copy of this cart with the amount of an existing line replaced.
    ///
    /// Returns `None` if the product is not in the cart or `amount` is zero.
    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> Option<Self> {
        if amount == 0 {
            return None;
        }
        let mut lines = self.lines.clone();
        let line = lines.iter_mut().find(|line| line.product_id == product_id)?;
        line.amount = amount;
        Some(Self { lines })
    }

    /// Copy of this cart without the line for `product_id`.
    ///
    /// Returns `None` if the product is not in the cart. The remaining lines
    /// keep their relative order.
    pub fn without(&self, product_id: ProductId) -> Option<Self> {
        if !self.contains(product_id) {
            return None;
        }
        let lines = self
            .lines
            .iter()
            .filter(|line| line.product_id != product_id)
            .cloned()
            .collect();
        Some(Self { lines })
    }

    /// Sum of every line's subtotal.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Subtotal for one product, if present.
    pub fn line_subtotal(&self, product_id: ProductId) -> Option<Decimal> {
        self.get(product_id).map(CartLine::subtotal)
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.amount)).sum()
    }

    /// Amount in cart per product id.
    pub fn amounts_by_product(&self) -> BTreeMap<ProductId, u32> {
        self.lines
            .iter()
            .map(|line| (line.product_id, line.amount))
            .collect()
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = TypeError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
