//! `PostgreSQL` order store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use commerce_wave_core::{CurrencyCode, OrderId, OrderStatus, Price, ProductId, UserId};

use super::{OrderStore, RepositoryError, conflict_on_unique};
use crate::models::{NewOrder, Order, OrderItem, ShippingAddress};

/// Order store backed by the `storefront.order` and `storefront.order_item` tables.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items_for(
        &self,
        order_ids: &[String],
    ) -> Result<HashMap<String, Vec<OrderItem>>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT i.order_id, i.product_id, i.name, i.quantity, i.unit_price, o.currency_code
            FROM storefront.order_item i
            JOIN storefront.order o ON o.id = i.order_id
            WHERE i.order_id = ANY($1)
            ORDER BY i.order_id, i.position
            ",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id: String = row.try_get("order_id")?;
            let quantity: i32 = row.try_get("quantity")?;
            let quantity = u32::try_from(quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("negative quantity on order {order_id}"))
            })?;
            let currency = parse_currency(row.try_get("currency_code")?)?;

            items.entry(order_id).or_default().push(OrderItem {
                product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
                name: row.try_get("name")?,
                quantity,
                price: Price::new(row.try_get::<Decimal, _>("unit_price")?, currency),
            });
        }
        Ok(items)
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len()))]
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::new(Uuid::new_v4().simple().to_string());
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r"
            INSERT INTO storefront.order
                (id, user_id, total, currency_code, shipping_name, shipping_address,
                 shipping_city, shipping_zip, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING created_at
            ",
        )
        .bind(id.as_str())
        .bind(order.user_id.as_str())
        .bind(order.total.amount)
        .bind(order.total.currency_code.code())
        .bind(&order.shipping_address.name)
        .bind(&order.shipping_address.address)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.zip)
        .bind(order.status.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "order"))?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                RepositoryError::DataCorruption("too many order items".to_owned())
            })?;
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity too large: {}", item.quantity))
            })?;

            sqlx::query(
                r"
                INSERT INTO storefront.order_item
                    (order_id, position, product_id, name, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(id.as_str())
            .bind(position)
            .bind(item.product_id.as_str())
            .bind(&item.name)
            .bind(quantity)
            .bind(item.price.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order::from_new(id, created_at, order))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, total, currency_code, shipping_name, shipping_address,
                   shipping_city, shipping_zip, status, created_at
            FROM storefront.order
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut items = self.items_for(&ids).await?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let order_items = items.remove(&id).unwrap_or_default();
                order_from_row(row, order_items)
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn order_from_row(row: &PgRow, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
    let currency = parse_currency(row.try_get("currency_code")?)?;
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<OrderStatus>()
        .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

    Ok(Order {
        id: OrderId::new(row.try_get::<String, _>("id")?),
        user_id: UserId::new(row.try_get::<String, _>("user_id")?),
        items,
        total: Price::new(row.try_get::<Decimal, _>("total")?, currency),
        shipping_address: ShippingAddress {
            name: row.try_get("shipping_name")?,
            address: row.try_get("shipping_address")?,
            city: row.try_get("shipping_city")?,
            zip: row.try_get("shipping_zip")?,
        },
        status,
        created_at: row.try_get("created_at")?,
    })
}

fn parse_currency(code: &str) -> Result<CurrencyCode, RepositoryError> {
    CurrencyCode::from_code(code)
        .ok_or_else(|| RepositoryError::DataCorruption(format!("unknown currency code: {code}")))
}
