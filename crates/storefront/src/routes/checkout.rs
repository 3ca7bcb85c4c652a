//! Checkout route handlers.
//!
//! Both handlers re-run the sign-in and empty-cart guards on every request.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::{
    CheckoutError, CheckoutForm, CheckoutGuard, CheckoutService, ORDER_FAILED_NOTICE, ORDERS_PATH,
};
use crate::error::{Result, add_breadcrumb};
use crate::cart::CartStore;
use crate::middleware::{OptionalAuth, visitor};
use crate::models::Order;
use crate::routes::cart::CartView;
use crate::state::AppState;

/// Checkout page document.
#[derive(Debug, Serialize)]
pub struct CheckoutSummary {
    pub cart: CartView,
    /// Prefill for the shipping name field.
    pub name: Option<String>,
}

/// Show the order summary, or redirect when a guard fails.
#[instrument(skip(session, auth))]
pub async fn show(session: Session, OptionalAuth(auth): OptionalAuth) -> Result<Response> {
    let cart = visitor::load_cart(&session).await?;

    if let Some(target) = CheckoutGuard::evaluate(auth.user(), &cart).redirect_to() {
        return Ok(Redirect::to(&target).into_response());
    }

    Ok(Json(CheckoutSummary {
        cart: CartView::from(&cart),
        name: auth.user().and_then(|u| u.display_name.clone()),
    })
    .into_response())
}

/// Place the order.
///
/// Answers 303 to the orders page with the new order as body, 422 with
/// per-field messages, or 502 with a notice when the order store fails.
#[instrument(skip(state, session, auth, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Json(form): Json<CheckoutForm>,
) -> Result<Response> {
    let mut cart = visitor::load_cart(&session).await?;
    let service = CheckoutService::new(state.orders());

    match service.place_order(auth.user(), &mut cart, &form).await {
        Ok(order) => {
            save_emptied_cart(&session, &cart).await;
            state.recommender().invalidate(&order.user_id).await;
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_id", order.id.as_str())]),
            );
            Ok(order_placed(order))
        }
        Err(err) => Ok(checkout_error_response(err)),
    }
}

/// Write the emptied cart back. The order is already stored, so a session
/// failure is logged and the visitor still goes to the orders page.
async fn save_emptied_cart(session: &Session, cart: &CartStore) -> bool {
    match visitor::save_cart(session, cart).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Order placed but the session cart was not cleared");
            false
        }
    }
}

fn order_placed(order: Order) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, ORDERS_PATH)],
        Json(order),
    )
        .into_response()
}

fn checkout_error_response(err: CheckoutError) -> Response {
    if let Some(target) = err.redirect_to() {
        return Redirect::to(&target).into_response();
    }

    match err {
        CheckoutError::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response(),
        CheckoutError::OrderFailed(ref source) => {
            let event_id = sentry::capture_error(&err);
            tracing::error!(
                error = %source,
                sentry_event_id = %event_id,
                "Failed to place order"
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": ORDER_FAILED_NOTICE })),
            )
                .into_response()
        }
        CheckoutError::SignInRequired | CheckoutError::EmptyCart => {
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::session_store::{self, SessionStore};

    use commerce_wave_core::{CurrencyCode, OrderId, OrderStatus, Price, UserId};

    use super::*;
    use crate::db::RepositoryError;
    use crate::models::{NewOrder, ShippingAddress};

    /// Session backend that is always down.
    #[derive(Debug, Clone)]
    struct DownStore;

    #[async_trait]
    impl SessionStore for DownStore {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("down".to_string()))
        }

        async fn load(&self, _session_id: &Id) -> session_store::Result<Option<Record>> {
            Err(session_store::Error::Backend("down".to_string()))
        }

        async fn delete(&self, _session_id: &Id) -> session_store::Result<()> {
            Err(session_store::Error::Backend("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_session_failure_after_order_still_redirects() {
        let session = Session::new(Some(Id::default()), Arc::new(DownStore), None);
        assert!(!save_emptied_cart(&session, &CartStore::new()).await);

        let order = Order::from_new(
            OrderId::new("ord-1"),
            Utc::now(),
            NewOrder {
                user_id: UserId::new("u1"),
                items: Vec::new(),
                total: Price::zero(CurrencyCode::USD),
                shipping_address: ShippingAddress {
                    name: "Ada Lovelace".to_string(),
                    address: "12 Analytical Row".to_string(),
                    city: "London".to_string(),
                    zip: "10001".to_string(),
                },
                status: OrderStatus::Processing,
            },
        );
        let response = order_placed(order);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], ORDERS_PATH);
    }

    #[test]
    fn test_guard_failures_redirect() {
        let response = checkout_error_response(CheckoutError::EmptyCart);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/products");

        let response = checkout_error_response(CheckoutError::SignInRequired);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?redirect=%2Fcheckout"
        );
    }

    #[test]
    fn test_store_failure_is_bad_gateway() {
        let response = checkout_error_response(CheckoutError::OrderFailed(
            RepositoryError::Database(sqlx::Error::PoolTimedOut),
        ));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
