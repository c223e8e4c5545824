//! Shopping cart kept in per-browser storage.
//!
//! The cart never talks to the API. It is a list of lines keyed by product id,
//! serialized as a JSON array under [`Cart::STORAGE_KEY`]. Name and price are
//! copied from the product at the time it was added so the cart page renders
//! without refetching.

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

impl CartItem {
    /// Price of the whole line, if the product had a price.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.price.map(|p| p.times(self.qty))
    }
}

/// An ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Storage key the cart is persisted under.
    pub const STORAGE_KEY: &'static str = "cart:v1";

    /// Largest quantity a single line can hold.
    pub const MAX_QTY: u32 = 99;

    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Load a cart from its stored JSON form.
    ///
    /// Corrupt or foreign data yields an empty cart rather than an error; a
    /// broken cart must never break the page.
    #[must_use]
    pub fn from_json(raw: &str) -> Self {
        let mut cart: Self = serde_json::from_str(raw).unwrap_or_default();
        for line in &mut cart.items {
            line.qty = line.qty.min(Self::MAX_QTY);
        }
        cart
    }

    /// Serialize to the stored JSON form.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: &Product) {
        self.add_qty(product, 1);
    }

    /// Add `qty` units of `product`, merging with an existing line.
    ///
    /// A zero quantity is ignored; lines stop at [`Cart::MAX_QTY`].
    pub fn add_qty(&mut self, product: &Product, qty: u32) {
        if qty == 0 {
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| line.id == product.id) {
            line.qty = line.qty.saturating_add(qty).min(Self::MAX_QTY);
            return;
        }
        self.items.push(CartItem {
            id: product.id,
            qty: qty.min(Self::MAX_QTY),
            name: Some(product.name.clone()),
            price: product.price,
        });
    }

    /// Set the quantity of a line, capped at [`Cart::MAX_QTY`]. Zero removes
    /// it; unknown ids are ignored.
    pub fn set_qty(&mut self, id: ProductId, qty: u32) {
        if qty == 0 {
            self.remove(id);
        } else if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.qty = qty.min(Self::MAX_QTY);
        }
    }

    /// Remove a line.
    pub fn remove(&mut self, id: ProductId) {
        self.items.retain(|line| line.id != id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (the badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.qty))
    }

    /// Sum of priced lines. Unpriced lines do not contribute.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().filter_map(CartItem::line_total).sum()
    }
}
