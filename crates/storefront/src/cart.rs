//! Session cart.
//!
//! `CartStore` is plain data: it is loaded from the visitor's session at the
//! start of a request, mutated, and written back by the route. It never makes
//! network calls, so every operation is synchronous and infallible.

use serde::{Deserialize, Serialize};

use commerce_wave_core::{CurrencyCode, Price, ProductId};

use crate::models::Product;

/// Most units of one product a cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image_id: String,
    /// Unit price captured when the product was added.
    pub price: Price,
    /// Between 1 and [`MAX_LINE_QUANTITY`].
    pub quantity: u32,
}

impl CartEntry {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            image_id: product.image_id.clone(),
            price: product.price,
            quantity,
        }
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Result of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// The entry now has the requested quantity.
    Updated,
    /// The requested quantity was zero or negative, so the entry was dropped.
    Removed,
    /// No entry for that product; nothing changed.
    NotInCart,
}

/// Ordered cart entries, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartStore {
    entries: Vec<CartEntry>,
}

impl CartStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add `quantity` of a product, merging with an existing entry.
    ///
    /// A quantity of 0 counts as 1 so entries never drop below one unit. The
    /// merged line is capped at [`MAX_LINE_QUANTITY`].
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
        if let Some(entry) = self.entry_mut(&product.id) {
            entry.quantity = entry
                .quantity
                .saturating_add(quantity)
                .min(MAX_LINE_QUANTITY);
        } else {
            self.entries.push(CartEntry::from_product(product, quantity));
        }
    }

    /// Remove a product's entry. Returns whether anything was removed.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.product_id != product_id);
        self.entries.len() != before
    }

    /// Set a product's quantity; zero or negative removes the entry and
    /// anything above [`MAX_LINE_QUANTITY`] is capped.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> QuantityUpdate {
        if !self.contains(product_id) {
            return QuantityUpdate::NotInCart;
        }
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return QuantityUpdate::Removed;
        }

        let quantity =
            u32::try_from(quantity).map_or(MAX_LINE_QUANTITY, |q| q.min(MAX_LINE_QUANTITY));
        if let Some(entry) = self.entry_mut(product_id) {
            entry.quantity = quantity;
        }
        QuantityUpdate::Updated
    }

    pub fn clear_cart(&mut self) {
        self.entries.clear();
    }

    /// Sum of unit price times quantity over all entries.
    #[must_use]
    pub fn total_price(&self) -> Price {
        let currency = self
            .entries
            .first()
            .map_or_else(CurrencyCode::default, |e| e.price.currency_code);
        self.entries
            .iter()
            .fold(Price::zero(currency), |total, e| total + e.line_total())
    }

    /// Total number of units (not distinct products).
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |count, e| count.saturating_add(e.quantity))
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.entries.iter().any(|e| &e.product_id == product_id)
    }

    /// Units of a product in the cart; 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.entries
            .iter()
            .find(|e| &e.product_id == product_id)
            .map_or(0, |e| e.quantity)
    }

    fn entry_mut(&mut self, product_id: &ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| &e.product_id == product_id)
    }
}
