//! In-memory token storage.

use parking_lot::Mutex;
use tracing::debug;

use super::TokenStore;

// ============================================================================
// MemoryTokenStore
// ============================================================================

/// Token store that keeps the token in process memory.
///
/// Nothing expires and nothing survives a restart. Suitable for tests and
/// for targets where the token is handed over by another component.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    #[inline]
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn set(&self, token: &str) {
        debug!(token_len = token.len(), "Storing token in memory");
        *self.token.lock() = Some(token.to_string());
    }

    fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn remove(&self) {
        debug!("Removing token from memory");
        self.token.lock().take();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = MemoryTokenStore::new();
        assert!(!store.has());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryTokenStore::with_token("first");
        store.set("second");
        assert_eq!(store.get().as_deref(), Some("second"));
    }

    #[test]
    fn test_remove() {
        let store = MemoryTokenStore::with_token("abc");
        store.remove();
        assert!(!store.has());
    }
}
