//! Order history for the signed-in user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, instrument};

use commerce_wave_core::{OrderId, OrderStatus, Price, ProductId};

use crate::db::OrderStore;
use crate::models::{CurrentUser, Order, ShippingAddress};

/// Notice attached to the page when the history could not be loaded.
pub const ORDERS_UNAVAILABLE_NOTICE: &str = "We couldn't load your orders right now.";

/// Outcome of loading the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdersState {
    /// The user has no orders yet.
    Empty,
    Loaded,
    /// The store query failed; the list is empty but not authoritative.
    Unavailable,
}

/// One order line as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
    pub line_total: Price,
}

/// One order as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    /// First seven characters of the id, shown as the order number.
    pub short_id: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Price,
    pub items: Vec<OrderLineView>,
    pub shipping_address: ShippingAddress,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let short_id = order.short_id().to_string();
        let items = order
            .items
            .into_iter()
            .map(|item| OrderLineView {
                line_total: item.line_total(),
                product_id: item.product_id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        Self {
            id: order.id,
            short_id,
            created_at: order.created_at,
            status: order.status,
            total: order.total,
            items,
            shipping_address: order.shipping_address,
        }
    }
}

/// The orders page document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrdersPage {
    pub state: OrdersState,
    pub orders: Vec<OrderView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

/// Load the user's orders, newest first.
///
/// A store failure is logged and reported as [`OrdersState::Unavailable`]
/// with an empty list.
#[instrument(skip(store, user), fields(user_id = %user.id))]
pub async fn load_orders(store: &dyn OrderStore, user: &CurrentUser) -> OrdersPage {
    match store.list_for_user(&user.id).await {
        Ok(orders) if orders.is_empty() => OrdersPage {
            state: OrdersState::Empty,
            orders: Vec::new(),
            notice: None,
        },
        Ok(orders) => OrdersPage {
            state: OrdersState::Loaded,
            orders: orders.into_iter().map(OrderView::from).collect(),
            notice: None,
        },
        Err(e) => {
            error!(error = %e, "Failed to load orders");
            OrdersPage {
                state: OrdersState::Unavailable,
                orders: Vec::new(),
                notice: Some(ORDERS_UNAVAILABLE_NOTICE),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use commerce_wave_core::{CurrencyCode, UserId};

    use super::*;
    use crate::db::{MemoryOrderStore, RepositoryError};
    use crate::models::{NewOrder, OrderItem};

    struct BrokenStore;

    #[async_trait]
    impl OrderStore for BrokenStore {
        async fn create(&self, _order: NewOrder) -> Result<Order, RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolClosed))
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolClosed))
        }
    }

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            display_name: None,
            email: None,
        }
    }

    fn usd(cents: i64) -> Price {
        Price::from_cents(cents, CurrencyCode::USD)
    }

    fn new_order(user_id: &str, name: &str, quantity: u32, cents: i64) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user_id),
            items: vec![OrderItem {
                product_id: ProductId::new("1"),
                name: name.to_string(),
                quantity,
                price: usd(cents),
            }],
            total: usd(cents).times(quantity),
            shipping_address: ShippingAddress {
                name: "Ada Lovelace".to_string(),
                address: "12 St James's Square".to_string(),
                city: "London".to_string(),
                zip: "10001".to_string(),
            },
            status: OrderStatus::Processing,
        }
    }

    #[tokio::test]
    async fn test_zero_orders_is_empty_not_error() {
        let page = load_orders(&MemoryOrderStore::new(), &user("u1")).await;
        assert_eq!(page.state, OrdersState::Empty);
        assert!(page.orders.is_empty());
        assert_eq!(page.notice, None);
    }

    #[tokio::test]
    async fn test_loaded_orders_are_newest_first_and_scoped() {
        let store = MemoryOrderStore::new();
        store.create(new_order("u1", "first", 1, 19_999)).await.unwrap();
        store.create(new_order("u2", "other", 1, 100)).await.unwrap();
        store.create(new_order("u1", "second", 2, 24_999)).await.unwrap();

        let page = load_orders(&store, &user("u1")).await;
        assert_eq!(page.state, OrdersState::Loaded);
        let names: Vec<_> = page.orders.iter().map(|o| o.items[0].name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);

        let line = &page.orders[0].items[0];
        assert_eq!(line.line_total.amount, Decimal::new(49_998, 2));
        assert_eq!(page.orders[0].short_id.chars().count(), 7);
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let page = load_orders(&BrokenStore, &user("u1")).await;
        assert_eq!(page.state, OrdersState::Unavailable);
        assert!(page.orders.is_empty());
        assert_eq!(page.notice, Some(ORDERS_UNAVAILABLE_NOTICE));

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["state"], "unavailable");
    }
}
