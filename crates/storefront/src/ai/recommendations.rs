//! Personalised product recommendations.
//!
//! The model suggests product ids; the storefront keeps only ids that exist
//! in the catalog, in catalog order, capped at [`MAX_RECOMMENDATIONS`]. When
//! nothing usable comes back the catalog fallback slice is shown instead.
//! Personalised picks are cached per user (5-minute TTL by default).

use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use commerce_wave_core::{ProductId, UserId};

use crate::catalog::Catalog;
use crate::models::Product;

use super::{PromptError, PromptRequest, PromptRunner, run_typed};

/// Most products shown in the recommendation strip.
pub const MAX_RECOMMENDATIONS: usize = 4;

/// Flow input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRequest {
    pub user_id: UserId,
    /// Recently viewed product ids.
    pub browsing_history: Vec<ProductId>,
    /// Previously purchased product ids.
    pub past_purchases: Vec<ProductId>,
}

/// Flow output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecommendationResult {
    #[serde(alias = "recommendedProducts")]
    pub recommended_products: Vec<ProductId>,
}

/// Where a recommendation list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Personalized,
    Fallback,
}

/// Products to show, with their provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    pub products: Vec<Product>,
    pub source: RecommendationSource,
}

impl Recommendations {
    fn fallback(catalog: &Catalog) -> Self {
        Self {
            products: catalog.fallback_recommendations().to_vec(),
            source: RecommendationSource::Fallback,
        }
    }
}

#[derive(Template)]
#[template(path = "prompts/recommendations.txt")]
struct RecommendationsPrompt<'a> {
    user_id: &'a UserId,
    browsing_history: &'a [ProductId],
    past_purchases: &'a [ProductId],
    products: &'a [Product],
}

fn output_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "recommended_products": {
                "type": "array",
                "items": { "type": "string" },
                "description": "A list of product IDs recommended for the user."
            }
        },
        "required": ["recommended_products"]
    })
}

/// Run the recommendation flow.
///
/// # Errors
///
/// Returns `PromptError` if the template fails to render, the runner fails,
/// or the reply does not match the output schema.
pub async fn personalized_recommendations(
    runner: &dyn PromptRunner,
    catalog: &Catalog,
    request: &RecommendationRequest,
) -> Result<RecommendationResult, PromptError> {
    let prompt = RecommendationsPrompt {
        user_id: &request.user_id,
        browsing_history: &request.browsing_history,
        past_purchases: &request.past_purchases,
        products: catalog.products(),
    }
    .render()?;

    run_typed(
        runner,
        &PromptRequest {
            name: "personalized_product_recommendations",
            prompt,
            output_schema: output_schema(),
        },
    )
    .await
}

/// Catalog products named in `ids`, in catalog order, at most four.
#[must_use]
pub fn select_products(catalog: &Catalog, ids: &[ProductId]) -> Vec<Product> {
    catalog
        .products()
        .iter()
        .filter(|p| ids.contains(&p.id))
        .take(MAX_RECOMMENDATIONS)
        .cloned()
        .collect()
}

/// Recommendation service with a per-user cache of personalised picks.
/// Cached picks live until the TTL expires or the user views a new product
/// or places an order.
#[derive(Clone)]
pub struct Recommender {
    inner: Arc<RecommenderInner>,
}

struct RecommenderInner {
    runner: Arc<dyn PromptRunner>,
    cache: Cache<UserId, Vec<Product>>,
}

impl Recommender {
    #[must_use]
    pub fn new(runner: Arc<dyn PromptRunner>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(RecommenderInner { runner, cache }),
        }
    }

    /// The prompt runner shared with the other flows.
    #[must_use]
    pub fn runner(&self) -> &dyn PromptRunner {
        self.inner.runner.as_ref()
    }

    /// Recommendations for a signed-in user. Never fails: errors and empty
    /// picks yield the fallback slice, which is not cached.
    #[instrument(skip(self, catalog, request), fields(user_id = %request.user_id))]
    pub async fn recommend(
        &self,
        catalog: &Catalog,
        request: &RecommendationRequest,
    ) -> Recommendations {
        if let Some(products) = self.inner.cache.get(&request.user_id).await {
            debug!("Cache hit for recommendations");
            return Recommendations {
                products,
                source: RecommendationSource::Personalized,
            };
        }

        match personalized_recommendations(self.runner(), catalog, request).await {
            Ok(result) => {
                let products = select_products(catalog, &result.recommended_products);
                if products.is_empty() {
                    debug!("No catalog products in recommendation reply; using fallback");
                    return Recommendations::fallback(catalog);
                }
                self.inner
                    .cache
                    .insert(request.user_id.clone(), products.clone())
                    .await;
                Recommendations {
                    products,
                    source: RecommendationSource::Personalized,
                }
            }
            Err(e) => {
                warn!(error = %e, "Recommendation flow failed; using fallback");
                Recommendations::fallback(catalog)
            }
        }
    }

    /// Drop a user's cached picks (after a new product view or an order).
    pub async fn invalidate(&self, user_id: &UserId) {
        self.inner.cache.invalidate(user_id).await;
    }
}
