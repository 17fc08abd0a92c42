//! Web origins.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Origin
// ============================================================================

/// A serialized tuple origin such as `https://portal.example:8443`.
///
/// Comparison against a message event's origin is exact string equality on
/// the ASCII serialization, which is how browsers report `event.origin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(String);

impl Origin {
    /// Parses a bare origin (`scheme://host[:port]`, optional trailing `/`).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `input` does not parse
    /// - [`Error::InvalidOrigin`] if it is opaque or has a path, query or fragment
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| Error::invalid_url(input, e))?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(Error::invalid_origin(input));
        }
        Self::from_url(&url).ok_or_else(|| Error::invalid_origin(input))
    }

    /// Returns the origin of an arbitrary absolute URL.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `input` does not parse
    /// - [`Error::InvalidOrigin`] if its origin is opaque (`data:`, `file:`, ...)
    pub fn of_url(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| Error::invalid_url(input, e))?;
        Self::from_url(&url).ok_or_else(|| Error::invalid_origin(input))
    }

    fn from_url(url: &Url) -> Option<Self> {
        let origin = url.origin();
        origin
            .is_tuple()
            .then(|| Self(origin.ascii_serialization()))
    }

    /// Returns the serialized origin.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `origin` is exactly this origin.
    #[inline]
    #[must_use]
    pub fn matches(&self, origin: &str) -> bool {
        self.0 == origin
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
