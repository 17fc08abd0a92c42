//! The host page controller.
//!
//! [`Host`] owns the token store, both frame sessions and the settle timers.
//! It is the single place where visibility changes, token sends and inbound
//! frame messages meet.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use portal_bridge::{FrameKind, Host, HostConfig, MemoryFrames, MemoryTokenStore};
//!
//! # async fn example() -> portal_bridge::Result<()> {
//! let config = HostConfig::builder()
//!     .patient_url("https://portal.example/patient")
//!     .staff_url("https://portal.example/staff")
//!     .build()?;
//!
//! let frames = Arc::new(MemoryFrames::new());
//! let host = Host::new(config, Arc::new(MemoryTokenStore::new()), frames);
//!
//! host.login("token-123");
//! host.toggle(FrameKind::Patient);
//! assert!(host.frame_url(FrameKind::Patient).as_str().ends_with("?token=token-123"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Login form handling.
pub mod login;

/// Cancellable settle timer.
pub mod schedule;

/// Per-frame session state.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use login::{LoginForm, LoginOutcome};
pub use schedule::PendingSend;
pub use session::{FrameSnapshot, Visibility};

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use crate::config::HostConfig;
use crate::frame::{Delivery, FrameLocator, FrameUrl, MessageSender, compose_frame_url};
use crate::identifiers::{DispatchId, FrameKind};
use crate::protocol::{InboundMessage, MessageEvent};
use crate::storage::TokenStore;

use session::{FrameSession, FrameSessions};

// ============================================================================
// Types
// ============================================================================

/// View listener callback type.
///
/// Called with the new state of a frame whenever its visibility or URL
/// changes, including changes triggered by cross-window messages.
pub type ViewListener = Arc<dyn Fn(&FrameSnapshot) + Send + Sync>;

// ============================================================================
// MessageOutcome
// ============================================================================

/// Why an inbound message was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// `data` was not a structured object.
    NotAnObject,
    /// The sender's origin is not the configured frame origin.
    ForeignOrigin,
    /// The `type` tag is not one the host handles.
    UnknownType,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// A close request was applied to the frame.
    Closed(FrameKind),
    /// The message was dropped.
    Ignored(IgnoreReason),
}

// ============================================================================
// Host
// ============================================================================

/// Controller for the host page.
///
/// Cheap to clone; clones share state. Showing a frame schedules a tokio
/// task, so [`Host::toggle`] should run inside a tokio runtime. Outside one
/// the frame still gets its token through the URL but no message is sent.
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

struct HostInner {
    config: HostConfig,
    store: Arc<dyn TokenStore>,
    sender: MessageSender,
    sessions: Mutex<FrameSessions>,
    view_listener: Mutex<Option<ViewListener>>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("frame_origin", self.inner.config.frame_origin())
            .field("sessions", &*self.inner.sessions.lock())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Host - Constructor
// ============================================================================

impl Host {
    /// Creates a host with both frames hidden.
    ///
    /// Frame URLs are composed from whatever token the store already holds.
    #[must_use]
    pub fn new(
        config: HostConfig,
        store: Arc<dyn TokenStore>,
        locator: Arc<dyn FrameLocator>,
    ) -> Self {
        let token = store.get();
        let session = |kind: FrameKind| {
            FrameSession::new(kind, compose_frame_url(config.base_url(kind), token.as_deref()))
        };
        let sessions = FrameSessions::new(session(FrameKind::Patient), session(FrameKind::Staff));

        debug!(
            frame_origin = %config.frame_origin(),
            has_token = token.is_some(),
            "Host created"
        );

        Self {
            inner: Arc::new(HostInner {
                sender: MessageSender::new(locator),
                sessions: Mutex::new(sessions),
                view_listener: Mutex::new(None),
                config,
                store,
            }),
        }
    }
}

// ============================================================================
// Host - Accessors
// ============================================================================

impl Host {
    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.inner.config
    }

    /// Returns the stored token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.store.get()
    }

    /// Returns `true` if the `kind` frame is shown.
    #[must_use]
    pub fn is_visible(&self, kind: FrameKind) -> bool {
        self.inner.sessions.lock().get(kind).visibility().is_shown()
    }

    /// Returns the URL the `kind` frame should load.
    #[must_use]
    pub fn frame_url(&self, kind: FrameKind) -> FrameUrl {
        self.inner.sessions.lock().get(kind).url().clone()
    }

    /// Returns the current state of the `kind` frame.
    #[must_use]
    pub fn snapshot(&self, kind: FrameKind) -> FrameSnapshot {
        self.inner.sessions.lock().get(kind).snapshot()
    }

    /// Returns how many token sends are waiting for their settle delay.
    #[must_use]
    pub fn pending_sends(&self) -> usize {
        self.inner.sessions.lock().pending_count()
    }
}

// ============================================================================
// Host - View
// ============================================================================

impl Host {
    /// Sets the view listener.
    pub fn set_view_listener<F>(&self, listener: F)
    where
        F: Fn(&FrameSnapshot) + Send + Sync + 'static,
    {
        *self.inner.view_listener.lock() = Some(Arc::new(listener));
    }

    /// Clears the view listener.
    pub fn clear_view_listener(&self) {
        *self.inner.view_listener.lock() = None;
    }

    /// Pushes `snapshot` to the view listener.
    ///
    /// Called with no session lock held so the listener may query the host.
    fn notify(&self, snapshot: &FrameSnapshot) {
        let listener = self.inner.view_listener.lock().clone();
        if let Some(listener) = listener {
            listener(snapshot);
        }
    }
}

// ============================================================================
// Host - Visibility
// ============================================================================

impl Host {
    /// Flips the `kind` frame between hidden and shown.
    ///
    /// Showing recomputes the frame URL from the latest token and schedules
    /// the token message after the settle delay. Hiding cancels a send that
    /// has not fired yet. Returns the new visibility.
    pub fn toggle(&self, kind: FrameKind) -> Visibility {
        let snapshot = {
            let mut sessions = self.inner.sessions.lock();
            let session = sessions.get_mut(kind);

            match session.visibility().toggled() {
                Visibility::Shown => {
                    let url = self.compose_url(kind);
                    let pending = self.schedule_send(kind);
                    session.show(url, pending);
                    debug!(frame = %kind, "Frame shown");
                }
                Visibility::Hidden => {
                    session.hide();
                    debug!(frame = %kind, "Frame hidden");
                }
            }
            session.snapshot()
        };

        self.notify(&snapshot);
        snapshot.visibility
    }

    /// Hides the `kind` frame without any other side effect.
    ///
    /// Returns `true` if the frame was shown.
    pub fn close_frame(&self, kind: FrameKind) -> bool {
        let (changed, snapshot) = {
            let mut sessions = self.inner.sessions.lock();
            let session = sessions.get_mut(kind);
            (session.hide(), session.snapshot())
        };

        if changed {
            debug!(frame = %kind, "Frame closed");
            self.notify(&snapshot);
        }
        changed
    }

    fn compose_url(&self, kind: FrameKind) -> FrameUrl {
        let token = self.inner.store.get();
        compose_frame_url(self.inner.config.base_url(kind), token.as_deref())
    }

    /// Recomputes both frame URLs from the stored token.
    ///
    /// With `forget_deliveries` the recorded message deliveries are dropped
    /// as well, since the token they carried is gone.
    fn recompute_urls(&self, forget_deliveries: bool) {
        let snapshots: Vec<FrameSnapshot> = {
            let mut sessions = self.inner.sessions.lock();
            FrameKind::ALL
                .iter()
                .map(|&kind| {
                    let session = sessions.get_mut(kind);
                    session.set_url(self.compose_url(kind));
                    if forget_deliveries {
                        session.clear_delivery();
                    }
                    session.snapshot()
                })
                .collect()
        };

        for snapshot in &snapshots {
            self.notify(snapshot);
        }
    }
}

// ============================================================================
// Host - Token Delivery
// ============================================================================

impl Host {
    fn schedule_send(&self, kind: FrameKind) -> Option<PendingSend> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(frame = %kind, "No async runtime, token message will not be sent");
            return None;
        };

        let inner: Weak<HostInner> = Arc::downgrade(&self.inner);
        let pending = PendingSend::schedule(&runtime, self.inner.config.settle_delay(), move |id| {
            if let Some(inner) = inner.upgrade() {
                Host { inner }.fire_send(kind, id);
            }
        });
        Some(pending)
    }

    /// Runs when a settle timer elapses.
    fn fire_send(&self, kind: FrameKind, id: DispatchId) {
        let claimed = self.inner.sessions.lock().get_mut(kind).claim_pending(id);
        let Some(showing) = claimed else {
            trace!(frame = %kind, dispatch_id = %id, "Stale token send dropped");
            return;
        };

        let delivery = match self.inner.store.get() {
            Some(token) => self
                .inner
                .sender
                .send(kind, &token, self.inner.config.frame_origin()),
            None => {
                debug!(frame = %kind, "No token stored, token message skipped");
                Delivery::NoToken
            }
        };

        // the session lock is not held while posting, so the frame may have
        // been hidden or shown again in the meantime
        let (recorded, shown) = {
            let mut sessions = self.inner.sessions.lock();
            let session = sessions.get_mut(kind);
            (
                session.finish_delivery(showing, delivery),
                session.visibility().is_shown(),
            )
        };

        if !recorded {
            debug!(frame = %kind, dispatch_id = %id, "Frame shown again during token send, outcome discarded");
        } else if !shown {
            debug!(frame = %kind, dispatch_id = %id, "Frame hidden during token send");
        }
    }
}

// ============================================================================
// Host - Messages
// ============================================================================

impl Host {
    /// Handles a cross-window message delivered to the host window.
    ///
    /// Install once at startup and forward every `message` event here.
    pub fn handle_message(&self, event: &MessageEvent) -> MessageOutcome {
        let Some(message) = InboundMessage::parse(&event.data) else {
            trace!(origin = %event.origin, "Ignoring non-object message");
            return MessageOutcome::Ignored(IgnoreReason::NotAnObject);
        };

        if !self.inner.config.frame_origin().matches(&event.origin) {
            warn!(
                origin = %event.origin,
                expected = %self.inner.config.frame_origin(),
                "Ignoring message from foreign origin"
            );
            return MessageOutcome::Ignored(IgnoreReason::ForeignOrigin);
        }

        match message.close_target() {
            Some(kind) => {
                self.close_frame(kind);
                MessageOutcome::Closed(kind)
            }
            None => {
                trace!(?message, "Ignoring unknown message type");
                MessageOutcome::Ignored(IgnoreReason::UnknownType)
            }
        }
    }
}

// ============================================================================
// Host - Login
// ============================================================================

impl Host {
    /// Stores `token` and recomputes both frame URLs.
    ///
    /// Empty or whitespace-only input is ignored. No frame is shown and no
    /// message is sent; open frames pick the token up the next time they
    /// are shown.
    pub fn login(&self, token: &str) -> LoginOutcome {
        if token.trim().is_empty() {
            debug!("Empty token submitted, ignoring");
            return LoginOutcome::Ignored;
        }

        self.inner.store.set(token);
        self.recompute_urls(false);
        info!(token_len = token.len(), "Token stored");
        LoginOutcome::Stored
    }

    /// Removes the token and resets both frame URLs to their bases.
    pub fn logout(&self) {
        self.inner.store.remove();
        self.recompute_urls(true);
        info!("Token removed");
    }
}

// ============================================================================
// Tests
// ============================================================================
