//! Recommendation route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use commerce_wave_core::ProductId;

use crate::ai::{RecommendationRequest, RecommendationSource, Recommendations};
use crate::error::Result;
use crate::middleware::{OptionalAuth, visitor};
use crate::models::{CurrentUser, Order, Product};
use crate::state::AppState;

/// Recommendation strip document.
#[derive(Debug, Serialize)]
pub struct RecommendationsView {
    pub products: Vec<Product>,
    /// Absent for anonymous visitors, who get no recommendations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<RecommendationSource>,
}

impl From<Recommendations> for RecommendationsView {
    fn from(recs: Recommendations) -> Self {
        Self {
            products: recs.products,
            source: Some(recs.source),
        }
    }
}

/// Distinct purchased product ids, most recent order first.
fn past_purchases(orders: &[Order]) -> Vec<ProductId> {
    let mut ids = Vec::new();
    for item in orders.iter().flat_map(|o| &o.items) {
        if !ids.contains(&item.product_id) {
            ids.push(item.product_id.clone());
        }
    }
    ids
}

/// Personalised recommendations for the signed-in user.
///
/// Order history is advisory here: if it cannot be read the prompt runs
/// without past purchases.
#[instrument(skip(state, session, auth))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<Json<RecommendationsView>> {
    let Some(user) = auth.user() else {
        return Ok(Json(RecommendationsView {
            products: Vec::new(),
            source: None,
        }));
    };

    let request = build_request(&state, &session, user).await?;
    let recs = state.recommender().recommend(state.catalog(), &request).await;
    Ok(Json(recs.into()))
}

async fn build_request(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> Result<RecommendationRequest> {
    let browsing_history = visitor::recently_viewed(session).await?;
    let past_purchases = match state.orders().list_for_user(&user.id).await {
        Ok(orders) => past_purchases(&orders),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load purchases for recommendations");
            Vec::new()
        }
    };

    Ok(RecommendationRequest {
        user_id: user.id.clone(),
        browsing_history,
        past_purchases,
    })
}
