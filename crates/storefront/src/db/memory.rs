//! In-memory order store.
//!
//! Used when no database is configured and by the test suites. Orders live
//! for the lifetime of the process.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use commerce_wave_core::{OrderId, UserId};

use super::{OrderStore, RepositoryError};
use crate::models::{NewOrder, Order};

/// Process-local [`OrderStore`].
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    // Append-only; insertion order breaks created_at ties.
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders stored across all users.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::new(Uuid::new_v4().simple().to_string());
        let order = Order::from_new(id, Utc::now(), order);
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut owned: Vec<Order> = orders
            .iter()
            .rev()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps newest-inserted first among equal timestamps
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use commerce_wave_core::{CurrencyCode, OrderStatus, Price, ProductId};

    use super::*;
    use crate::models::{OrderItem, ShippingAddress};

    fn new_order(user: &str, name: &str) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user),
            items: vec![OrderItem {
                product_id: ProductId::new("6"),
                name: name.to_string(),
                quantity: 1,
                price: Price::from_cents(14_999, CurrencyCode::USD),
            }],
            total: Price::from_cents(14_999, CurrencyCode::USD),
            shipping_address: ShippingAddress {
                name: "Grace Hopper".to_string(),
                address: "12 Harbor Lane".to_string(),
                city: "Arlington".to_string(),
                zip: "22201".to_string(),
            },
            status: OrderStatus::Processing,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_keeps_snapshot() {
        let store = MemoryOrderStore::new();
        let order = store.create(new_order("u1", "Mechanical Keyboard")).await.unwrap();

        assert!(!order.id.as_str().is_empty());
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.items[0].name, "Mechanical Keyboard");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner_and_newest_first() {
        let store = MemoryOrderStore::new();
        store.create(new_order("u1", "first")).await.unwrap();
        store.create(new_order("u2", "other user")).await.unwrap();
        store.create(new_order("u1", "second")).await.unwrap();

        let orders = store.list_for_user(&UserId::new("u1")).await.unwrap();
        let names: Vec<_> = orders.iter().map(|o| o.items[0].name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);

        assert!(
            store
                .list_for_user(&UserId::new("nobody"))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
