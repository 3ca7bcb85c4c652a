//! Domain models for the storefront.
//!
//! These are validated domain types, separate from database row types and
//! from the JSON views the routes render.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{NewOrder, Order, OrderItem, ShippingAddress};
pub use product::Product;
pub use session::{AuthState, CurrentUser};
pub use user::User;
