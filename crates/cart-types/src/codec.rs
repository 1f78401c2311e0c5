//! Cart blob codec.
//!
//! A persisted cart is a JSON array of line records in cart order:
//!
//! ```text
//! [{"id":42,"title":"Shoe","price":"100","image":"shoe.png","amount":1}, ...]
//! ```

use crate::cart::{Cart, CartLine};
use crate::error::TypeError;

/// Serialize a cart into its storage blob.
pub fn encode_cart(cart: &Cart) -> Result<Vec<u8>, TypeError> {
    serde_json::to_vec(cart).map_err(|e| TypeError::Serialization(e.to_string()))
}

/// Deserialize a storage blob into a cart.
///
/// A blob that parses but breaks a cart invariant (duplicate product, zero
/// amount) is rejected the same way as malformed JSON.
pub fn decode_cart(bytes: &[u8]) -> Result<Cart, TypeError> {
    let lines: Vec<CartLine> =
        serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))?;
    Cart::from_lines(lines)
}
