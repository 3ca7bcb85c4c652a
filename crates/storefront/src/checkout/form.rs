//! Checkout form validation.
//!
//! Every field is checked on each submission and all failures are reported
//! together, keyed by field. Lengths count characters, not bytes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::ShippingAddress;

/// Expiry in MM/YY form with a real month.
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("Invalid regex"));

/// Submitted checkout form.
///
/// Card number and CVC are only length-checked; they are never stored,
/// logged or forwarded. `Debug` redacts them.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub card: String,
    pub expiry: String,
    pub cvc: String,
}

impl std::fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutForm")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("city", &self.city)
            .field("zip", &self.zip)
            .field("card", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

/// A checkout form field, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    Name,
    Address,
    City,
    Zip,
    Card,
    Expiry,
    Cvc,
}

impl CheckoutField {
    /// Message shown next to the field when it fails validation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Name => "Name must be at least 2 characters.",
            Self::Address => "Address must be at least 5 characters.",
            Self::City => "City must be at least 2 characters.",
            Self::Zip => "ZIP code must be 5 characters.",
            Self::Card => "Card number must be 16 digits.",
            Self::Expiry => "Expiry must be in MM/YY format.",
            Self::Cvc => "CVC must be 3 digits.",
        }
    }
}

/// Field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CheckoutErrors {
    fields: BTreeMap<CheckoutField, &'static str>,
}

impl CheckoutErrors {
    fn reject(&mut self, field: CheckoutField) {
        self.fields.insert(field, field.message());
    }

    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&'static str> {
        self.fields.get(&field).copied()
    }

    /// Failed fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = CheckoutField> + '_ {
        self.fields.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl CheckoutForm {
    /// Check every field and return the shipping details on success.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutErrors` naming every field that failed.
    pub fn validate(&self) -> Result<ShippingAddress, CheckoutErrors> {
        let mut errors = CheckoutErrors::default();

        if char_len(&self.name) < 2 {
            errors.reject(CheckoutField::Name);
        }
        if char_len(&self.address) < 5 {
            errors.reject(CheckoutField::Address);
        }
        if char_len(&self.city) < 2 {
            errors.reject(CheckoutField::City);
        }
        if char_len(&self.zip) != 5 {
            errors.reject(CheckoutField::Zip);
        }
        if char_len(&self.card) != 16 {
            errors.reject(CheckoutField::Card);
        }
        if !EXPIRY_RE.is_match(&self.expiry) {
            errors.reject(CheckoutField::Expiry);
        }
        if !(3..=4).contains(&char_len(&self.cvc)) {
            errors.reject(CheckoutField::Cvc);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ShippingAddress {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            zip: self.zip.clone(),
        })
    }
}
