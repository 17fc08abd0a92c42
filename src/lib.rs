//! Portal Bridge - token propagation into embedded portal frames.
//!
//! A host page embeds the patient and staff portals in frame popups and
//! hands each of them the bearer token it keeps in cookie storage.
//!
//! # Architecture
//!
//! The token reaches a frame over two channels:
//!
//! - **URL parameter**: `?token=<percent-encoded>` on the frame source,
//!   recomputed every time a frame is shown or the token changes
//! - **Message**: `{ "type": "AUTH_TOKEN", "token": ... }` posted into the
//!   frame window after a settle delay, pinned to the portal origin
//!
//! The URL copy is the reliable one; the message is best-effort and lost if
//! the frame has not registered its listener yet. Frames ask to be closed
//! with `CLOSE_PATIENT_IFRAME` / `CLOSE_STAFF_IFRAME`, accepted only from the
//! configured origin.
//!
//! Browser facilities sit behind small capability traits ([`TokenStore`],
//! [`CookieJar`], [`FrameLocator`], [`FrameWindow`]) so the same [`Host`]
//! runs against a browser binding or the in-memory implementations.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use portal_bridge::{
//!     CookieTokenStore, FrameKind, Host, HostConfig, MemoryCookieJar, MemoryFrames,
//!     MessageEvent, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = HostConfig::builder()
//!         .patient_url("https://portal.example/patient")
//!         .staff_url("https://portal.example/staff")
//!         .build()?;
//!
//!     let store = Arc::new(CookieTokenStore::new(Arc::new(MemoryCookieJar::new())));
//!     let host = Host::new(config, store, Arc::new(MemoryFrames::new()));
//!
//!     host.login("secret-token");
//!     host.toggle(FrameKind::Patient);
//!     println!("patient frame: {}", host.frame_url(FrameKind::Patient));
//!
//!     let close = MessageEvent::new(
//!         "https://portal.example",
//!         serde_json::json!({ "type": "CLOSE_PATIENT_IFRAME" }),
//!     );
//!     host.handle_message(&close);
//!     assert!(!host.is_visible(FrameKind::Patient));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`HostConfig`] and its builder |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`frame`] | Origins, frame URLs, message delivery |
//! | [`host`] | [`Host`] controller, visibility, login |
//! | [`identifiers`] | [`FrameKind`], [`DispatchId`] |
//! | [`protocol`] | Cross-window message types |
//! | [`storage`] | Token persistence |

// ============================================================================
// Modules
// ============================================================================

/// Host configuration.
pub mod config;

/// Error types and result aliases.
///
/// Only configuration and serialization are fallible.
pub mod error;

/// Embedded frame plumbing.
///
/// - [`Origin`] - exact-match web origin
/// - [`FrameUrl`] - token-carrying frame source
/// - [`MessageSender`] - `AUTH_TOKEN` delivery
pub mod frame;

/// The host page controller.
pub mod host;

/// Type-safe identifiers.
pub mod identifiers;

/// Cross-window protocol message types.
pub mod protocol;

/// Token persistence.
pub mod storage;

// ============================================================================
// Re-exports
// ============================================================================

// Config types
pub use config::{DEFAULT_SETTLE_DELAY, HostConfig, HostConfigBuilder};

// Error types
pub use error::{Error, Result};

// Frame types
pub use frame::{
    Delivery, FrameLocator, FrameUrl, FrameWindow, MemoryFrameWindow, MemoryFrames,
    MessageSender, Origin, TokenChannel, compose_frame_url,
};

// Host types
pub use host::{
    FrameSnapshot, Host, IgnoreReason, LoginForm, LoginOutcome, MessageOutcome, PendingSend,
    ViewListener, Visibility,
};

// Identifier types
pub use identifiers::{DispatchId, FrameKind};

// Protocol types
pub use protocol::{InboundMessage, MessageEvent, OutboundMessage};

// Storage types
pub use storage::{
    CookieJar, CookieTokenStore, MemoryCookieJar, MemoryTokenStore, TOKEN_COOKIE_KEY,
    TOKEN_LIFETIME, TokenStore,
};
