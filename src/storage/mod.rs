//! Token persistence.
//!
//! The host keeps exactly one bearer token under the well-known key
//! [`TOKEN_COOKIE_KEY`]. Storage sits behind the [`TokenStore`] capability so
//! the same host logic runs against a browser cookie jar, an in-memory jar in
//! tests, or a plain in-memory store on non-browser targets.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TokenStore`] | `set` / `get` / `remove` / `has` capability |
//! | [`CookieTokenStore`] | Token persisted as a cookie record in a [`CookieJar`] |
//! | [`MemoryCookieJar`] | In-process jar with browser cookie semantics |
//! | [`MemoryTokenStore`] | Token held in memory only |

// ============================================================================
// Submodules
// ============================================================================

/// Cookie-backed token storage.
pub mod cookie;

/// In-memory token storage.
pub mod memory;

// ============================================================================
// Re-exports
// ============================================================================

pub use cookie::{CookieJar, CookieTokenStore, MemoryCookieJar};
pub use memory::MemoryTokenStore;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Cookie name the token is stored under.
pub const TOKEN_COOKIE_KEY: &str = "authToken";

/// Lifetime of a stored token, counted from the last `set`.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

// ============================================================================
// TokenStore
// ============================================================================

/// Storage capability for the host's bearer token.
///
/// Writes are fire-and-forget: implementations swallow backend failures
/// instead of reporting them, and a store with no backend behaves as if it
/// were permanently empty.
pub trait TokenStore: Send + Sync {
    /// Persists `token`, replacing any previous value.
    fn set(&self, token: &str);

    /// Returns the stored token, if any.
    fn get(&self) -> Option<String>;

    /// Deletes the stored token.
    fn remove(&self);

    /// Returns `true` if a token is currently stored.
    fn has(&self) -> bool {
        self.get().is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
