//! Order history route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::middleware::RequireAuth;
use crate::orders::{OrdersPage, load_orders};
use crate::state::AppState;

/// The signed-in user's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Json<OrdersPage> {
    Json(load_orders(state.orders(), &user).await)
}
