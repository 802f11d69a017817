//! Role-keyed pricing
//!
//! A price can only exist on a post owned by a business account. Instead of
//! an optional field checked in several places, the rule is encoded in the
//! [`Pricing`] variant, which can only be built from the owner's [`Role`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PostError, Result};
use crate::identity::Role;

/// A non-negative, finite price
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(PostError::validation("Price must be a finite number"));
        }
        if value < 0.0 {
            return Err(PostError::validation("Price cannot be negative"));
        }
        Ok(Self(value))
    }

    /// Parse a price submitted as text (form fields arrive as strings)
    pub fn parse(raw: &str) -> Result<Self> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| PostError::validation(format!("Invalid price: {raw}")))?;
        Self::new(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = PostError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commercial terms of a post, keyed on the owner's role
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pricing {
    /// General and admin accounts: never priced
    Personal,
    /// Business accounts: price is optional
    Business { price: Option<Price> },
}

impl Pricing {
    /// Resolve the pricing of a new submission
    ///
    /// A blank price counts as "not supplied". A supplied price from a
    /// non-business account is rejected, never silently dropped.
    pub fn resolve(role: Role, raw_price: Option<&str>) -> Result<Self> {
        let raw = raw_price.map(str::trim).filter(|s| !s.is_empty());

        match (role, raw) {
            (Role::Business, raw) => Ok(Self::Business {
                price: raw.map(Price::parse).transpose()?,
            }),
            (_, Some(_)) => Err(PostError::validation(
                "Only business accounts can add a price",
            )),
            (_, None) => Ok(Self::Personal),
        }
    }

    /// Rebuild pricing from stored values, re-checking the role rule
    pub fn from_stored(role: Role, price: Option<Price>) -> Result<Self> {
        match (role, price) {
            (Role::Business, price) => Ok(Self::Business { price }),
            (_, Some(_)) => Err(PostError::repository(format!(
                "stored post owned by a {role} account carries a price"
            ))),
            (_, None) => Ok(Self::Personal),
        }
    }

    pub fn price(&self) -> Option<Price> {
        match self {
            Self::Personal => None,
            Self::Business { price } => *price,
        }
    }
}
