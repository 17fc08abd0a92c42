//! Cross-window protocol message types.
//!
//! This module defines the messages exchanged between the host page and
//! the embedded portal frames.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `AUTH_TOKEN` | Host → Frame | Deliver the bearer token |
//! | `CLOSE_PATIENT_IFRAME` | Frame → Host | Hide the patient frame |
//! | `CLOSE_STAFF_IFRAME` | Frame → Host | Hide the staff frame |
//!
//! The token also travels in the frame URL (`?token=`); that copy is the
//! reliable channel; the message is best-effort.

// ============================================================================
// Submodules
// ============================================================================

/// Message definitions.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::{InboundMessage, MessageEvent, OutboundMessage};
