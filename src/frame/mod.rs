//! Embedded frame plumbing.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Origin`] | Serialized web origin with exact matching |
//! | [`FrameUrl`] | Host-built frame source URL carrying the token |
//! | [`MessageSender`] | Posts the token message into a frame window |
//! | [`FrameLocator`] / [`FrameWindow`] | Capabilities the embedder provides |
//! | [`MemoryFrames`] | In-process locator for tests and headless targets |

// ============================================================================
// Submodules
// ============================================================================

/// In-process frame windows.
pub mod memory;

/// Web origins.
pub mod origin;

/// Token message delivery.
pub mod sender;

/// Frame URL composition.
pub mod url;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{MemoryFrameWindow, MemoryFrames};
pub use origin::Origin;
pub use sender::{Delivery, FrameLocator, FrameWindow, MessageSender, TokenChannel};
pub use self::url::{FrameUrl, compose_frame_url};
