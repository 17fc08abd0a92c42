//! Frame URL composition.
//!
//! # Example
//!
//! ```
//! use portal_bridge::compose_frame_url;
//!
//! let url = compose_frame_url("https://portal.example/patient", Some("a b"));
//! assert_eq!(url.as_str(), "https://portal.example/patient?token=a%20b");
//! assert_eq!(url.token().as_deref(), Some("a b"));
//!
//! let bare = compose_frame_url("https://portal.example/patient", None);
//! assert_eq!(bare.as_str(), "https://portal.example/patient");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Query parameter carrying the token.
pub const TOKEN_PARAM: &str = "token";

// ============================================================================
// FrameUrl
// ============================================================================

/// A frame source URL built by the host.
///
/// Only [`compose_frame_url`] creates values of this type, which is what lets
/// a view layer treat it as trusted for a frame `src` without sanitizing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameUrl(String);

impl FrameUrl {
    /// Returns the URL as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper.
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Decodes the `token` query parameter, if present.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let url = Url::parse(&self.0).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == TOKEN_PARAM)
            .map(|(_, value)| value.into_owned())
    }
}

impl AsRef<str> for FrameUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Appends the percent-encoded token to `base`.
///
/// With no token the base URL is returned unchanged. The separator is `&`
/// when `base` already carries a query, and any fragment stays last.
#[must_use]
pub fn compose_frame_url(base: &str, token: Option<&str>) -> FrameUrl {
    let Some(token) = token else {
        return FrameUrl(base.to_string());
    };

    let (head, fragment) = match base.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (base, None),
    };
    let separator = if head.contains('?') { '&' } else { '?' };

    let mut url = format!(
        "{head}{separator}{TOKEN_PARAM}={}",
        urlencoding::encode(token)
    );
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    FrameUrl(url)
}

// ============================================================================
// Tests
// ============================================================================
