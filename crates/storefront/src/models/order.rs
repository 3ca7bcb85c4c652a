//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commerce_wave_core::{OrderId, OrderStatus, Price, ProductId, UserId};

/// Shipping details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip: String,
}

/// One line of an order, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    /// Unit price at the time of purchase.
    pub price: Price,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An order ready to be written; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build the stored order from a new order and the store-assigned fields.
    #[must_use]
    pub fn from_new(id: OrderId, created_at: DateTime<Utc>, new: NewOrder) -> Self {
        Self {
            id,
            user_id: new.user_id,
            items: new.items,
            total: new.total,
            shipping_address: new.shipping_address,
            status: new.status,
            created_at,
        }
    }

    /// Abbreviated id shown in order history (first seven characters).
    #[must_use]
    pub fn short_id(&self) -> &str {
        let id = self.id.as_str();
        id.char_indices()
            .nth(7)
            .and_then(|(end, _)| id.get(..end))
            .unwrap_or(id)
    }
}
