//! Cart route handlers.
//!
//! The cart lives in the visitor's session: each handler loads it, applies one
//! operation and writes it back before answering with the updated view.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use commerce_wave_core::{Price, ProductId};

use crate::cart::{CartEntry, CartStore, MAX_LINE_QUANTITY, QuantityUpdate};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::visitor;
use crate::state::AppState;

/// Cart document returned by every cart endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub entries: Vec<CartLineView>,
    pub count: u32,
    pub total: Price,
}

/// One cart line with its line total.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub entry: CartEntry,
    pub line_total: Price,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            entries: cart
                .entries()
                .iter()
                .map(|entry| CartLineView {
                    line_total: entry.line_total(),
                    entry: entry.clone(),
                })
                .collect(),
            count: cart.cart_count(),
            total: cart.total_price(),
        }
    }
}

/// Count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Add to cart body.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity body. The quantity is parsed here so a non-numeric value
/// is rejected before it reaches the cart.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: serde_json::Value,
}

/// Remove from cart body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

fn too_many() -> AppError {
    AppError::BadRequest(format!(
        "at most {MAX_LINE_QUANTITY} of a product can be in the cart"
    ))
}

/// Accept a JSON integer or a string holding one, up to the line maximum.
fn parse_quantity(value: &serde_json::Value) -> Result<i64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    let quantity = parsed
        .ok_or_else(|| AppError::BadRequest("quantity must be a whole number".to_string()))?;
    if quantity > i64::from(MAX_LINE_QUANTITY) {
        return Err(too_many());
    }
    Ok(quantity)
}

/// Display the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = visitor::load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let cart = visitor::load_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.cart_count(),
    }))
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddToCartForm>,
) -> Result<Json<CartView>> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let product = state
        .catalog()
        .find_by_id(&form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut cart = visitor::load_cart(&session).await?;
    if quantity > MAX_LINE_QUANTITY.saturating_sub(cart.quantity_of(&product.id)) {
        return Err(too_many());
    }
    cart.add_to_cart(product, quantity);
    visitor::save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product.id.as_str())]),
    );
    tracing::info!(product_id = %product.id, quantity, "Added to cart");

    Ok(Json(CartView::from(&cart)))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(form): Json<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let quantity = parse_quantity(&form.quantity)?;

    let mut cart = visitor::load_cart(&session).await?;
    match cart.update_quantity(&form.product_id, quantity) {
        QuantityUpdate::Updated | QuantityUpdate::Removed => {
            visitor::save_cart(&session, &cart).await?;
        }
        QuantityUpdate::NotInCart => {
            tracing::debug!(product_id = %form.product_id, "Quantity update for product not in cart");
        }
    }

    Ok(Json(CartView::from(&cart)))
}

/// Remove a product from the cart.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(form): Json<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = visitor::load_cart(&session).await?;
    if cart.remove_from_cart(&form.product_id) {
        visitor::save_cart(&session, &cart).await?;
    }
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = visitor::load_cart(&session).await?;
    cart.clear_cart();
    visitor::save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}
