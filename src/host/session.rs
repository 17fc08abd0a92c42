//! Per-frame session state.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::frame::{Delivery, FrameUrl, TokenChannel};
use crate::identifiers::{DispatchId, FrameKind};

use super::schedule::PendingSend;

// ============================================================================
// Visibility
// ============================================================================

/// Visibility state of a frame popup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Not displayed. Initial state.
    #[default]
    Hidden,
    /// Displayed.
    Shown,
}

impl Visibility {
    /// Returns the opposite state.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Hidden => Self::Shown,
            Self::Shown => Self::Hidden,
        }
    }

    /// Returns `true` for [`Visibility::Shown`].
    #[inline]
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Shown)
    }
}

// ============================================================================
// FrameSnapshot
// ============================================================================

/// Point-in-time view of a frame session, handed to view listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    /// Which portal.
    pub kind: FrameKind,
    /// Current visibility.
    pub visibility: Visibility,
    /// URL the frame element should load.
    pub url: FrameUrl,
    /// Whether a token send is waiting for the settle delay.
    pub send_pending: bool,
    /// Outcome of the most recent token send.
    pub last_delivery: Option<Delivery>,
}

impl FrameSnapshot {
    /// Returns the channels that have carried the token to this frame.
    #[must_use]
    pub fn token_channels(&self) -> Vec<TokenChannel> {
        let mut channels = Vec::with_capacity(2);
        if self.url.token().is_some() {
            channels.push(TokenChannel::UrlParameter);
        }
        if self.last_delivery == Some(Delivery::Posted) {
            channels.push(TokenChannel::Message);
        }
        channels
    }
}

// ============================================================================
// FrameSession
// ============================================================================

/// Mutable state of one embedded frame.
#[derive(Debug)]
pub(crate) struct FrameSession {
    kind: FrameKind,
    visibility: Visibility,
    url: FrameUrl,
    pending: Option<PendingSend>,
    last_delivery: Option<Delivery>,
    /// Bumped on every show; ties a delivery to the showing that sent it.
    showing: u64,
}

impl FrameSession {
    pub(crate) fn new(kind: FrameKind, url: FrameUrl) -> Self {
        Self {
            kind,
            visibility: Visibility::Hidden,
            url,
            pending: None,
            last_delivery: None,
            showing: 0,
        }
    }

    #[inline]
    pub(crate) fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub(crate) fn url(&self) -> &FrameUrl {
        &self.url
    }

    #[inline]
    pub(crate) fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn set_url(&mut self, url: FrameUrl) {
        self.url = url;
    }

    /// Shows the frame with a fresh URL, replacing any pending send.
    ///
    /// The previous delivery belonged to an earlier showing and is dropped.
    pub(crate) fn show(&mut self, url: FrameUrl, pending: Option<PendingSend>) {
        self.cancel_pending();
        self.visibility = Visibility::Shown;
        self.url = url;
        self.pending = pending;
        self.last_delivery = None;
        self.showing = self.showing.wrapping_add(1);
    }

    /// Hides the frame and cancels its pending send.
    ///
    /// Returns `true` if the frame was shown.
    pub(crate) fn hide(&mut self) -> bool {
        self.cancel_pending();
        let was_shown = self.visibility.is_shown();
        self.visibility = Visibility::Hidden;
        was_shown
    }

    /// Takes ownership of the pending send if it is `id` and the frame is
    /// still shown, returning the showing it belongs to. A stale timer gets
    /// `None` and must not send.
    pub(crate) fn claim_pending(&mut self, id: DispatchId) -> Option<u64> {
        let current = self.pending.as_ref().is_some_and(|p| p.id() == id);
        if !current || !self.visibility.is_shown() {
            return None;
        }
        // the timer task is the caller; dropping its handle only detaches it
        self.pending = None;
        Some(self.showing)
    }

    /// Records `delivery` for the showing it was claimed in.
    ///
    /// Returns `false` and records nothing if the frame has been shown
    /// again since.
    pub(crate) fn finish_delivery(&mut self, showing: u64, delivery: Delivery) -> bool {
        if showing != self.showing {
            return false;
        }
        self.last_delivery = Some(delivery);
        true
    }

    pub(crate) fn clear_delivery(&mut self) {
        self.last_delivery = None;
    }

    pub(crate) fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            kind: self.kind,
            visibility: self.visibility,
            url: self.url.clone(),
            send_pending: self.pending.is_some(),
            last_delivery: self.last_delivery,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(frame = %self.kind, dispatch_id = %pending.id(), "Cancelling pending token send");
            pending.cancel();
        }
    }
}

// ============================================================================
// FrameSessions
// ============================================================================

/// The host's two frame sessions.
#[derive(Debug)]
pub(crate) struct FrameSessions {
    patient: FrameSession,
    staff: FrameSession,
}

impl FrameSessions {
    pub(crate) fn new(patient: FrameSession, staff: FrameSession) -> Self {
        Self { patient, staff }
    }

    #[inline]
    pub(crate) fn get(&self, kind: FrameKind) -> &FrameSession {
        match kind {
            FrameKind::Patient => &self.patient,
            FrameKind::Staff => &self.staff,
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, kind: FrameKind) -> &mut FrameSession {
        match kind {
            FrameKind::Patient => &mut self.patient,
            FrameKind::Staff => &mut self.staff,
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        usize::from(self.patient.has_pending()) + usize::from(self.staff.has_pending())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::frame::compose_frame_url;

    fn session() -> FrameSession {
        FrameSession::new(
            FrameKind::Patient,
            compose_frame_url("https://portal.example/patient", None),
        )
    }

    #[test]
    fn test_visibility_toggle() {
        assert_eq!(Visibility::default(), Visibility::Hidden);
        assert_eq!(Visibility::Hidden.toggled(), Visibility::Shown);
        assert_eq!(Visibility::Shown.toggled(), Visibility::Hidden);
    }

    #[test]
    fn test_new_session_is_hidden() {
        let session = session();
        assert_eq!(session.visibility(), Visibility::Hidden);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_show_then_hide() {
        let mut session = session();
        let url = compose_frame_url("https://portal.example/patient", Some("t"));

        session.show(url.clone(), None);
        assert_eq!(session.visibility(), Visibility::Shown);
        assert_eq!(session.url(), &url);

        assert!(session.hide());
        assert!(!session.hide());
    }

    #[test]
    fn test_claim_without_pending_fails() {
        let mut session = session();
        session.show(compose_frame_url("https://portal.example/patient", None), None);
        assert_eq!(session.claim_pending(DispatchId::generate()), None);
    }

    #[test]
    fn test_delivery_from_earlier_showing_is_dropped() {
        let mut session = session();
        let url = compose_frame_url("https://portal.example/patient", Some("t"));

        session.show(url.clone(), None);
        let earlier = session.showing;
        session.hide();
        session.show(url, None);

        assert!(!session.finish_delivery(earlier, Delivery::Posted));
        assert_eq!(session.snapshot().last_delivery, None);

        assert!(session.finish_delivery(session.showing, Delivery::Posted));
        assert_eq!(session.snapshot().last_delivery, Some(Delivery::Posted));
    }

    #[test]
    fn test_token_channels() {
        let mut session = session();
        assert!(session.snapshot().token_channels().is_empty());

        session.set_url(compose_frame_url("https://portal.example/patient", Some("t")));
        session.finish_delivery(session.showing, Delivery::Posted);
        assert_eq!(
            session.snapshot().token_channels(),
            vec![TokenChannel::UrlParameter, TokenChannel::Message]
        );

        session.finish_delivery(session.showing, Delivery::FrameNotMounted);
        assert_eq!(
            session.snapshot().token_channels(),
            vec![TokenChannel::UrlParameter]
        );
    }

    #[test]
    fn test_reshow_forgets_previous_delivery() {
        let mut session = session();
        let url = compose_frame_url("https://portal.example/patient", Some("t"));

        session.show(url.clone(), None);
        session.finish_delivery(session.showing, Delivery::Posted);
        session.hide();
        assert_eq!(session.snapshot().last_delivery, Some(Delivery::Posted));

        session.show(url, None);
        assert_eq!(session.snapshot().last_delivery, None);
        assert_eq!(
            session.snapshot().token_channels(),
            vec![TokenChannel::UrlParameter]
        );
    }
}
