//! The shopping cart.
//!
//! A cart is a set of lines keyed by product id, each holding a snapshot of
//! the product taken when it was first added and a quantity of at least one.
//! Lines keep the order in which they were first added.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Product snapshot stored on a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: Price,
    pub image: String,
    pub category: String,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.cart_price(),
            image: product.image_or_placeholder().to_string(),
            category: product.category_slug.clone(),
        }
    }
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Per-session shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: IndexMap<ProductId, CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product, merging with an existing line.
    pub fn add(&mut self, product: CartProduct) {
        self.add_quantity(product, 1);
    }

    /// Add `quantity` units of a product. Adding zero units does nothing.
    pub fn add_quantity(&mut self, product: CartProduct, quantity: u32) {
        if quantity == 0 {
            return;
        }
        self.lines
            .entry(product.id.clone())
            .and_modify(|line| line.quantity = line.quantity.saturating_add(quantity))
            .or_insert(CartItem { product, quantity });
    }

    /// Remove a line, returning it if it existed.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartItem> {
        self.lines.shift_remove(id)
    }

    /// Set the quantity of a line. A quantity below one removes the line;
    /// an unknown id is ignored.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
        } else if let Some(line) = self.lines.get_mut(id) {
            line.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn items(&self) -> impl ExactSizeIterator<Item = &CartItem> {
        self.lines.values()
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.lines.get(id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .values()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of line totals, unrounded.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.values().map(CartItem::line_total).sum()
    }
}
