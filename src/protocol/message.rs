//! Cross-window message types.
//!
//! # Format
//!
//! Host to frame:
//!
//! ```json
//! { "type": "AUTH_TOKEN", "token": "..." }
//! ```
//!
//! Frame to host:
//!
//! ```json
//! { "type": "CLOSE_PATIENT_IFRAME" }
//! { "type": "CLOSE_STAFF_IFRAME" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::FrameKind;

// ============================================================================
// Constants
// ============================================================================

/// Type tag of the token message.
pub const AUTH_TOKEN: &str = "AUTH_TOKEN";

/// Type tag of the patient close request.
pub const CLOSE_PATIENT_IFRAME: &str = "CLOSE_PATIENT_IFRAME";

/// Type tag of the staff close request.
pub const CLOSE_STAFF_IFRAME: &str = "CLOSE_STAFF_IFRAME";

// ============================================================================
// OutboundMessage
// ============================================================================

/// A message posted from the host into an embedded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Hands the current bearer token to the frame.
    #[serde(rename = "AUTH_TOKEN")]
    AuthToken {
        /// The opaque token.
        token: String,
    },
}

impl OutboundMessage {
    /// Creates a token message.
    #[inline]
    #[must_use]
    pub fn auth_token(token: impl Into<String>) -> Self {
        Self::AuthToken {
            token: token.into(),
        }
    }

    /// Serializes the message into the structured-clone payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

// ============================================================================
// InboundMessage
// ============================================================================

/// A message posted from an embedded frame to the host.
///
/// Unrecognised type tags are preserved in [`InboundMessage::Unknown`] so the
/// dispatch over known kinds stays exhaustive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// The patient portal asks to be closed.
    ClosePatientFrame,

    /// The staff portal asks to be closed.
    CloseStaffFrame,

    /// Any other object payload.
    Unknown {
        /// The `type` field, if it was a string.
        kind: Option<String>,
    },
}

impl InboundMessage {
    /// Parses message data.
    ///
    /// Returns `None` when `data` is not a JSON object; such payloads come
    /// from unrelated scripts sharing the window and are never dispatched.
    #[must_use]
    pub fn parse(data: &Value) -> Option<Self> {
        let object = data.as_object()?;
        let kind = object.get("type").and_then(Value::as_str);

        let message = match kind {
            Some(CLOSE_PATIENT_IFRAME) => Self::ClosePatientFrame,
            Some(CLOSE_STAFF_IFRAME) => Self::CloseStaffFrame,
            other => Self::Unknown {
                kind: other.map(str::to_string),
            },
        };
        Some(message)
    }

    /// Returns the frame this message asks to close, if any.
    #[inline]
    #[must_use]
    pub fn close_target(&self) -> Option<FrameKind> {
        match self {
            Self::ClosePatientFrame => Some(FrameKind::Patient),
            Self::CloseStaffFrame => Some(FrameKind::Staff),
            Self::Unknown { .. } => None,
        }
    }
}

// ============================================================================
// MessageEvent
// ============================================================================

/// A delivered cross-window message, as seen by the host's listener.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageEvent {
    /// Serialized origin of the sending window.
    pub origin: String,

    /// Structured payload.
    pub data: Value,
}

impl MessageEvent {
    /// Creates a message event.
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
