//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use commerce_wave_core::Category;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, visitor};
use crate::models::Product;
use crate::state::AppState;

/// Listing filters. `category=all` (or empty) means no category filter.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

impl ProductQuery {
    fn category(&self) -> Result<Option<Category>> {
        match self.category.as_deref().map(str::trim) {
            None | Some("" | "all") => Ok(None),
            Some(name) => name
                .parse()
                .map(Some)
                .map_err(|e: commerce_wave_core::CategoryError| AppError::BadRequest(e.to_string())),
        }
    }
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub count: usize,
}

/// List products, optionally filtered by category and name search.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>> {
    let products: Vec<Product> = state
        .catalog()
        .filter(query.category()?, query.q.as_deref())
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ProductList {
        count: products.len(),
        products,
    }))
}

/// Product detail. The visit is remembered for recommendations.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .find_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound(slug.clone()))?
        .clone();

    // Cached picks were built from the old history
    if visitor::record_view(&session, &product.id).await?
        && let Some(user) = auth.user()
    {
        state.recommender().invalidate(&user.id).await;
    }
    add_breadcrumb(
        "navigation",
        "Viewed product page",
        Some(&[("product_id", product.id.as_str())]),
    );

    Ok(Json(product))
}

/// Distinct categories in catalog order.
pub async fn categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog().categories())
}

/// Featured products for the home page.
pub async fn featured(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog().featured().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>) -> ProductQuery {
        ProductQuery {
            category: category.map(String::from),
            q: None,
        }
    }

    #[test]
    fn test_category_query_parsing() {
        assert_eq!(query(None).category().ok(), Some(None));
        assert_eq!(query(Some("all")).category().ok(), Some(None));
        assert_eq!(
            query(Some("cameras")).category().ok(),
            Some(Some(Category::Cameras))
        );
        assert!(matches!(
            query(Some("Garden")).category(),
            Err(AppError::BadRequest(_))
        ));
    }
}
