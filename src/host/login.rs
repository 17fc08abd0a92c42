//! Login form handling.

use super::Host;

// ============================================================================
// LoginOutcome
// ============================================================================

/// Result of submitting a token to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The token was stored and both frame URLs were recomputed.
    Stored,
    /// The input was empty; nothing happened.
    Ignored,
}

impl LoginOutcome {
    /// Returns `true` if the token was stored.
    #[inline]
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }
}

// ============================================================================
// LoginForm
// ============================================================================

/// The token input field on the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    input: String,
}

impl LoginForm {
    /// Creates an empty form.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the field contents.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    /// Returns the field contents.
    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Submits the field to `host`, clearing it once the token is stored.
    pub fn submit(&mut self, host: &Host) -> LoginOutcome {
        let outcome = host.login(&self.input);
        if outcome.is_stored() {
            self.input.clear();
        }
        outcome
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::config::HostConfig;
    use crate::frame::MemoryFrames;
    use crate::identifiers::FrameKind;
    use crate::storage::MemoryTokenStore;

    fn host() -> Host {
        let config = HostConfig::builder()
            .patient_url("https://portal.example/patient")
            .staff_url("https://portal.example/staff")
            .build()
            .expect("config");
        Host::new(
            config,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(MemoryFrames::new()),
        )
    }

    #[test]
    fn test_submit_clears_input_on_success() {
        let host = host();
        let mut form = LoginForm::new();
        form.set_input("abc");

        assert_eq!(form.submit(&host), LoginOutcome::Stored);
        assert_eq!(form.input(), "");
        assert_eq!(host.token().as_deref(), Some("abc"));
        assert_eq!(
            host.frame_url(FrameKind::Staff).token().as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_submit_empty_does_nothing() {
        let host = host();
        let mut form = LoginForm::new();
        form.set_input("  ");

        assert_eq!(form.submit(&host), LoginOutcome::Ignored);
        assert_eq!(form.input(), "  ");
        assert_eq!(host.token(), None);
    }
}
