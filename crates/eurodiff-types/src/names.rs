//! Country (and currency) names.
//!
//! Every country issues exactly one currency, and that currency carries the
//! country's name. A single newtype covers both roles so a currency can never
//! be confused with an arbitrary string at compile time.

use serde::{Deserialize, Serialize};

/// Name of a country, and of the currency the country issues.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryName(String);

impl CountryName {
    /// Create a country name from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CountryName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CountryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CountryName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for CountryName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
