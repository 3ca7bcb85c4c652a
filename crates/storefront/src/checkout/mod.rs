//! Checkout flow.
//!
//! Placing an order runs three gates in order: the visitor must be signed
//! in, the cart must not be empty, and the form must validate. Only then is
//! the order written, once, and the cart cleared. A failed write leaves the
//! cart exactly as it was.

pub mod form;

use thiserror::Error;
use tracing::{info, instrument};

use commerce_wave_core::OrderStatus;

use crate::cart::CartStore;
use crate::db::{OrderStore, RepositoryError};
use crate::models::{CurrentUser, NewOrder, Order, OrderItem, ShippingAddress};

pub use form::{CheckoutErrors, CheckoutField, CheckoutForm};

/// Where checkout sends the visitor after a successful order.
pub const ORDERS_PATH: &str = "/orders";

/// Where checkout sends visitors with an empty cart.
pub const CATALOG_PATH: &str = "/products";

pub const CHECKOUT_PATH: &str = "/checkout";

/// Notice shown when the order write fails.
pub const ORDER_FAILED_NOTICE: &str = "There was a problem placing your order. Please try again.";

/// Login page URL that returns to `return_to` after sign-in.
#[must_use]
pub fn login_redirect(return_to: &str) -> String {
    format!("/login?redirect={}", urlencoding::encode(return_to))
}

/// Result of the checkout entry guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutGuard {
    Proceed,
    /// No signed-in user.
    SignIn,
    /// Nothing to buy.
    EmptyCart,
}

impl CheckoutGuard {
    /// Evaluate the guards; sign-in is checked before the cart.
    #[must_use]
    pub fn evaluate(user: Option<&CurrentUser>, cart: &CartStore) -> Self {
        if user.is_none() {
            Self::SignIn
        } else if cart.is_empty() {
            Self::EmptyCart
        } else {
            Self::Proceed
        }
    }

    /// Redirect target for a failed guard.
    #[must_use]
    pub fn redirect_to(self) -> Option<String> {
        match self {
            Self::Proceed => None,
            Self::SignIn => Some(login_redirect(CHECKOUT_PATH)),
            Self::EmptyCart => Some(CATALOG_PATH.to_string()),
        }
    }
}

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign-in required")]
    SignInRequired,

    #[error("cart is empty")]
    EmptyCart,

    #[error("checkout form has {} invalid field(s)", .0.len())]
    Invalid(CheckoutErrors),

    #[error("order could not be saved: {0}")]
    OrderFailed(#[source] RepositoryError),
}

impl CheckoutError {
    /// Redirect target for the guard failures.
    #[must_use]
    pub fn redirect_to(&self) -> Option<String> {
        match self {
            Self::SignInRequired => CheckoutGuard::SignIn.redirect_to(),
            Self::EmptyCart => CheckoutGuard::EmptyCart.redirect_to(),
            Self::Invalid(_) | Self::OrderFailed(_) => None,
        }
    }
}

/// Snapshot the cart and shipping details into a new order.
#[must_use]
pub fn build_order(user: &CurrentUser, cart: &CartStore, shipping: ShippingAddress) -> NewOrder {
    NewOrder {
        user_id: user.id.clone(),
        items: cart
            .entries()
            .iter()
            .map(|entry| OrderItem {
                product_id: entry.product_id.clone(),
                name: entry.name.clone(),
                quantity: entry.quantity,
                price: entry.price,
            })
            .collect(),
        total: cart.total_price(),
        shipping_address: shipping,
        status: OrderStatus::Processing,
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    orders: &'a dyn OrderStore,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(orders: &'a dyn OrderStore) -> Self {
        Self { orders }
    }

    /// Place an order for the cart and clear it.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::SignInRequired` or `CheckoutError::EmptyCart`
    /// when a guard fails, `CheckoutError::Invalid` with every failing field,
    /// or `CheckoutError::OrderFailed` if the store rejects the write. The
    /// cart is untouched in every error case.
    #[instrument(skip_all, fields(user_id))]
    pub async fn place_order(
        &self,
        user: Option<&CurrentUser>,
        cart: &mut CartStore,
        form: &CheckoutForm,
    ) -> Result<Order, CheckoutError> {
        let user = match (CheckoutGuard::evaluate(user, cart), user) {
            (CheckoutGuard::Proceed, Some(user)) => user,
            (CheckoutGuard::EmptyCart, _) => return Err(CheckoutError::EmptyCart),
            _ => return Err(CheckoutError::SignInRequired),
        };
        tracing::Span::current().record("user_id", tracing::field::display(&user.id));

        let shipping = form.validate().map_err(CheckoutError::Invalid)?;
        let new_order = build_order(user, cart, shipping);

        let order = self
            .orders
            .create(new_order)
            .await
            .map_err(CheckoutError::OrderFailed)?;

        cart.clear_cart();
        info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use commerce_wave_core::{ProductId, UserId};

    use super::*;
    use crate::catalog::Catalog;
    use crate::db::MemoryOrderStore;

    /// Store whose writes always fail.
    struct UnavailableStore;

    #[async_trait]
    impl OrderStore for UnavailableStore {
        async fn create(&self, _order: NewOrder) -> Result<Order, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            display_name: Some("Ada".to_string()),
            email: None,
        }
    }

    fn cart_with(items: &[(&str, u32)]) -> CartStore {
        let catalog = Catalog::builtin();
        let mut cart = CartStore::new();
        for (id, quantity) in items {
            let product = catalog.find_by_id(&ProductId::new(*id)).unwrap();
            cart.add_to_cart(product, *quantity);
        }
        cart
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            name: "Ada Lovelace".to_string(),
            address: "12 St James's Square".to_string(),
            city: "London".to_string(),
            zip: "10001".to_string(),
            card: "4242424242424242".to_string(),
            expiry: "09/27".to_string(),
            cvc: "123".to_string(),
        }
    }

    #[test]
    fn test_guard_order() {
        let empty = CartStore::new();
        let full = cart_with(&[("1", 1)]);

        assert_eq!(CheckoutGuard::evaluate(None, &empty), CheckoutGuard::SignIn);
        assert_eq!(CheckoutGuard::evaluate(None, &full), CheckoutGuard::SignIn);
        assert_eq!(
            CheckoutGuard::evaluate(Some(&user()), &empty),
            CheckoutGuard::EmptyCart
        );
        assert_eq!(
            CheckoutGuard::evaluate(Some(&user()), &full),
            CheckoutGuard::Proceed
        );
    }

    #[test]
    fn test_guard_redirects() {
        assert_eq!(
            CheckoutGuard::SignIn.redirect_to().unwrap(),
            "/login?redirect=%2Fcheckout"
        );
        assert_eq!(CheckoutGuard::EmptyCart.redirect_to().unwrap(), "/products");
        assert_eq!(CheckoutGuard::Proceed.redirect_to(), None);
    }

    #[tokio::test]
    async fn test_place_order_snapshots_cart_and_clears_it() {
        let store = MemoryOrderStore::new();
        let mut cart = cart_with(&[("1", 2), ("2", 1)]);

        let order = CheckoutService::new(&store)
            .place_order(Some(&user()), &mut cart, &valid_form())
            .await
            .unwrap();

        assert!(cart.is_empty());
        assert_eq!(order.total.amount, Decimal::new(64_997, 2));
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.user_id, UserId::new("u1"));
        assert_eq!(order.shipping_address.city, "London");
        let lines: Vec<_> = order
            .items
            .iter()
            .map(|i| (i.product_id.as_str(), i.quantity, i.price.to_string()))
            .collect();
        assert_eq!(
            lines,
            vec![("1", 2, "$199.99".to_string()), ("2", 1, "$249.99".to_string())]
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_store() {
        let store = MemoryOrderStore::new();
        let mut cart = CartStore::new();

        let err = CheckoutService::new(&store)
            .place_order(Some(&user()), &mut cart, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(err.redirect_to().unwrap(), "/products");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_signed_out_is_redirected_to_login() {
        let store = MemoryOrderStore::new();
        let mut cart = cart_with(&[("3", 1)]);

        let err = CheckoutService::new(&store)
            .place_order(None, &mut cart, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::SignInRequired));
        assert_eq!(err.redirect_to().unwrap(), "/login?redirect=%2Fcheckout");
        assert_eq!(cart.cart_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_cart() {
        let store = MemoryOrderStore::new();
        let mut cart = cart_with(&[("3", 1)]);
        let form = CheckoutForm {
            zip: "123".to_string(),
            ..valid_form()
        };

        let err = CheckoutService::new(&store)
            .place_order(Some(&user()), &mut cart, &form)
            .await
            .unwrap_err();

        let CheckoutError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.get(CheckoutField::Zip), Some("ZIP code must be 5 characters."));
        assert_eq!(cart.cart_count(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cart_unchanged() {
        let mut cart = cart_with(&[("4", 1), ("6", 3)]);
        let before = cart.clone();

        let err = CheckoutService::new(&UnavailableStore)
            .place_order(Some(&user()), &mut cart, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::OrderFailed(_)));
        assert_eq!(err.redirect_to(), None);
        assert_eq!(cart, before);
    }
}
