//! Built-in product catalog.
//!
//! The catalog is a fixed list built once at startup and shared read-only
//! through `AppState`. Listing order is the catalog order everywhere: product
//! grids, category lists, recommendation filtering and fallbacks.

use std::ops::Range;

use commerce_wave_core::{Category, CurrencyCode, Price, ProductId};

use crate::models::Product;

/// Number of products on the featured strip.
pub const FEATURED_COUNT: usize = 4;

/// Catalog positions shown when personalised recommendations are unavailable.
pub const FALLBACK_RANGE: Range<usize> = 2..6;

/// Read-only product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from products, keeping their order.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The CommerceWave launch catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let usd = |cents| Price::from_cents(cents, CurrencyCode::USD);
        let product = |id: &str, name: &str, slug: &str, description: &str, price, category, image: &str| {
            Product {
                id: ProductId::new(id),
                name: name.to_string(),
                slug: slug.to_string(),
                description: description.to_string(),
                price,
                category,
                image_id: image.to_string(),
            }
        };

        Self::new(vec![
            product(
                "1",
                "Wireless Headphones",
                "wireless-headphones",
                "Immerse yourself in high-fidelity sound with these noise-cancelling wireless headphones. Long-lasting battery and comfortable design for all-day listening.",
                usd(19_999),
                Category::Electronics,
                "product-headphones",
            ),
            product(
                "2",
                "Smartwatch Pro",
                "smartwatch-pro",
                "Stay connected and track your fitness goals with the Smartwatch Pro. Features a vibrant AMOLED display, heart rate monitor, and GPS.",
                usd(24_999),
                Category::Electronics,
                "product-smartwatch",
            ),
            product(
                "3",
                "Digital Camera X1",
                "digital-camera-x1",
                "Capture stunning photos and 4K videos with this professional-grade digital camera. Comes with a versatile 18-55mm lens.",
                usd(79_999),
                Category::Cameras,
                "product-camera",
            ),
            product(
                "4",
                "Ultra-Slim Laptop",
                "ultra-slim-laptop",
                "A powerful yet lightweight laptop designed for productivity on the go. Features a 14-inch display and the latest generation processor.",
                usd(129_999),
                Category::Computers,
                "product-laptop",
            ),
            product(
                "5",
                "Quadcopter Drone",
                "quadcopter-drone",
                "Explore the world from a new perspective. This drone offers a 4K camera, 30 minutes of flight time, and intelligent flight modes.",
                usd(49_999),
                Category::Cameras,
                "product-drone",
            ),
            product(
                "6",
                "Mechanical Keyboard",
                "mechanical-keyboard",
                "Experience a superior typing feel with this backlit mechanical keyboard. Customizable RGB lighting and durable switches.",
                usd(14_999),
                Category::Computers,
                "product-keyboard",
            ),
        ])
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn find_by_id(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Products matching an optional category and a case-insensitive name
    /// search. A blank query matches everything.
    #[must_use]
    pub fn filter(&self, category: Option<Category>, query: Option<&str>) -> Vec<&Product> {
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        self.products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| {
                needle
                    .as_deref()
                    .is_none_or(|n| p.name.to_lowercase().contains(n))
            })
            .collect()
    }

    /// Distinct categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category) {
                seen.push(product.category);
            }
        }
        seen
    }

    /// The first products of the catalog, for the home page.
    #[must_use]
    pub fn featured(&self) -> &[Product] {
        self.products
            .get(..FEATURED_COUNT)
            .unwrap_or(&self.products)
    }

    /// Products shown when no personalised recommendations are available.
    #[must_use]
    pub fn fallback_recommendations(&self) -> &[Product] {
        let end = FALLBACK_RANGE.end.min(self.products.len());
        let start = FALLBACK_RANGE.start.min(end);
        self.products.get(start..end).unwrap_or_default()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products().len(), 6);

        let camera = catalog.find_by_slug("digital-camera-x1").unwrap();
        assert_eq!(camera.id, ProductId::new("3"));
        assert_eq!(camera.price.to_string(), "$799.99");
        assert!(catalog.find_by_slug("toaster").is_none());
        assert_eq!(
            catalog.find_by_id(&ProductId::new("6")).unwrap().name,
            "Mechanical Keyboard"
        );
    }

    #[test]
    fn test_slugs_are_unique() {
        let catalog = Catalog::builtin();
        let mut slugs: Vec<_> = catalog.products().iter().map(|p| &p.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), catalog.products().len());
    }

    #[test]
    fn test_filter_by_category_and_query() {
        let catalog = Catalog::builtin();

        assert_eq!(ids(&catalog.filter(None, None)).len(), 6);
        assert_eq!(
            ids(&catalog.filter(Some(Category::Cameras), None)),
            vec!["3", "5"]
        );
        assert_eq!(ids(&catalog.filter(None, Some("LAPTOP"))), vec!["4"]);
        assert_eq!(
            ids(&catalog.filter(Some(Category::Electronics), Some("pro"))),
            vec!["2"]
        );
        assert!(catalog.filter(Some(Category::Computers), Some("drone")).is_empty());
        assert_eq!(catalog.filter(None, Some("   ")).len(), 6);
    }

    #[test]
    fn test_categories_in_catalog_order() {
        assert_eq!(
            Catalog::builtin().categories(),
            vec![Category::Electronics, Category::Cameras, Category::Computers]
        );
    }

    #[test]
    fn test_featured_and_fallback() {
        let catalog = Catalog::builtin();
        let featured: Vec<_> = catalog.featured().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(featured, vec!["1", "2", "3", "4"]);

        let fallback: Vec<_> = catalog
            .fallback_recommendations()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(fallback, vec!["3", "4", "5", "6"]);
    }

    #[test]
    fn test_small_catalog_slices_do_not_panic() {
        let two = Catalog::new(Catalog::builtin().products()[..2].to_vec());
        assert_eq!(two.featured().len(), 2);
        assert!(two.fallback_recommendations().is_empty());
    }
}
