//! Token delivery into embedded frames.
//!
//! The token reaches a frame over two channels:
//!
//! | Channel | When | Reliability |
//! |---------|------|-------------|
//! | [`TokenChannel::UrlParameter`] | Frame load, via `?token=` | Always present while a token is stored |
//! | [`TokenChannel::Message`] | Settle delay after show | Best-effort, lost if the frame is not listening yet |
//!
//! [`MessageSender`] drives the message channel.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::identifiers::FrameKind;
use crate::protocol::OutboundMessage;

use super::Origin;

// ============================================================================
// TokenChannel
// ============================================================================

/// A path by which the token reaches an embedded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenChannel {
    /// The `token` query parameter of the frame URL.
    UrlParameter,
    /// The `AUTH_TOKEN` cross-window message.
    Message,
}

impl TokenChannel {
    /// Returns `true` for the channel the frame can always fall back to.
    #[inline]
    #[must_use]
    pub const fn is_reliable(&self) -> bool {
        matches!(self, Self::UrlParameter)
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// A live window of an embedded frame.
pub trait FrameWindow: Send + Sync {
    /// Posts `message` to the window.
    ///
    /// Implementations must drop the message unless the window's current
    /// origin equals `target_origin`, as `window.postMessage` does.
    fn post_message(&self, message: Value, target_origin: &Origin);
}

/// Finds the window of a mounted frame.
pub trait FrameLocator: Send + Sync {
    /// Returns the frame's window, or `None` if it is not mounted or loaded.
    fn frame_window(&self, kind: FrameKind) -> Option<Arc<dyn FrameWindow>>;
}

// ============================================================================
// Delivery
// ============================================================================

/// Outcome of one message-channel send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message was handed to the frame window.
    Posted,
    /// No window was available; nothing was sent.
    FrameNotMounted,
    /// No token was stored when the send was due; nothing was sent.
    NoToken,
    /// The message could not be serialized.
    Failed,
}

// ============================================================================
// MessageSender
// ============================================================================

/// Posts `AUTH_TOKEN` messages into frame windows.
#[derive(Clone)]
pub struct MessageSender {
    locator: Arc<dyn FrameLocator>,
}

impl fmt::Debug for MessageSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSender").finish_non_exhaustive()
    }
}

impl MessageSender {
    /// Creates a sender over `locator`.
    #[inline]
    #[must_use]
    pub fn new(locator: Arc<dyn FrameLocator>) -> Self {
        Self { locator }
    }

    /// Sends `token` to the `kind` frame, pinned to `expected_origin`.
    ///
    /// A frame that is not mounted yet is skipped silently.
    pub fn send(&self, kind: FrameKind, token: &str, expected_origin: &Origin) -> Delivery {
        let Some(window) = self.locator.frame_window(kind) else {
            debug!(frame = %kind, "Frame not mounted, token message skipped");
            return Delivery::FrameNotMounted;
        };

        let payload = match OutboundMessage::auth_token(token).to_value() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(frame = %kind, error = %e, "Failed to serialize token message");
                return Delivery::Failed;
            }
        };

        window.post_message(payload, expected_origin);
        debug!(
            frame = %kind,
            origin = %expected_origin,
            token_len = token.len(),
            "Token message posted"
        );
        Delivery::Posted
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::frame::{MemoryFrameWindow, MemoryFrames};

    fn origin() -> Origin {
        Origin::parse("https://portal.example").expect("origin")
    }

    #[test]
    fn test_channel_reliability() {
        assert!(TokenChannel::UrlParameter.is_reliable());
        assert!(!TokenChannel::Message.is_reliable());
    }

    #[test]
    fn test_send_to_unmounted_frame_is_noop() {
        let frames = Arc::new(MemoryFrames::new());
        let sender = MessageSender::new(frames);

        let delivery = sender.send(FrameKind::Patient, "abc", &origin());
        assert_eq!(delivery, Delivery::FrameNotMounted);
    }

    #[test]
    fn test_send_posts_auth_token() {
        let frames = Arc::new(MemoryFrames::new());
        let window = frames.mount(FrameKind::Staff, MemoryFrameWindow::new("https://portal.example"));
        let sender = MessageSender::new(frames);

        let delivery = sender.send(FrameKind::Staff, "abc", &origin());

        assert_eq!(delivery, Delivery::Posted);
        assert_eq!(
            window.received(),
            vec![json!({ "type": "AUTH_TOKEN", "token": "abc" })]
        );
    }

    #[test]
    fn test_window_refuses_other_origin() {
        let frames = Arc::new(MemoryFrames::new());
        let window = frames.mount(FrameKind::Patient, MemoryFrameWindow::new("https://evil.example"));
        let sender = MessageSender::new(frames);

        sender.send(FrameKind::Patient, "abc", &origin());

        assert!(window.received().is_empty());
        assert_eq!(window.refused_count(), 1);
    }
}
