//! Catalog product.

use serde::Serialize;

use commerce_wave_core::{Category, Price, ProductId};

/// A product in the built-in catalog.
///
/// Products are immutable once the catalog is built; carts and orders take
/// snapshots of the fields they need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL segment for the detail page; unique within the catalog.
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub category: Category,
    /// Placeholder image reference resolved by the front end.
    pub image_id: String,
}
