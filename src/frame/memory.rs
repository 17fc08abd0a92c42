//! In-process frame windows.
//!
//! Stand-ins for real browser frames on non-browser targets and in tests.
//! [`MemoryFrameWindow`] enforces the same target-origin rule a browser
//! applies to `postMessage`.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::identifiers::FrameKind;

use super::{FrameLocator, FrameWindow, Origin};

// ============================================================================
// MemoryFrameWindow
// ============================================================================

/// A frame window that records the messages delivered to it.
#[derive(Debug)]
pub struct MemoryFrameWindow {
    origin: String,
    received: Mutex<Vec<Value>>,
    refused: AtomicUsize,
}

impl MemoryFrameWindow {
    /// Creates a window whose document has the given serialized origin.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            received: Mutex::new(Vec::new()),
            refused: AtomicUsize::new(0),
        }
    }

    /// Returns the window's origin.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns every message delivered so far, oldest first.
    #[must_use]
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().clone()
    }

    /// Returns how many posts were dropped for targeting another origin.
    #[must_use]
    pub fn refused_count(&self) -> usize {
        self.refused.load(Ordering::Relaxed)
    }
}

impl FrameWindow for MemoryFrameWindow {
    fn post_message(&self, message: Value, target_origin: &Origin) {
        if !target_origin.matches(&self.origin) {
            trace!(expected = %target_origin, actual = %self.origin, "postMessage target origin mismatch");
            self.refused.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.received.lock().push(message);
    }
}

// ============================================================================
// MemoryFrames
// ============================================================================

/// A [`FrameLocator`] over explicitly mounted windows.
#[derive(Debug, Default)]
pub struct MemoryFrames {
    windows: Mutex<FxHashMap<FrameKind, Arc<MemoryFrameWindow>>>,
}

impl MemoryFrames {
    /// Creates a locator with no frames mounted.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `window` as the `kind` frame, replacing any previous one.
    pub fn mount(&self, kind: FrameKind, window: MemoryFrameWindow) -> Arc<MemoryFrameWindow> {
        let window = Arc::new(window);
        self.windows.lock().insert(kind, Arc::clone(&window));
        window
    }

    /// Unmounts the `kind` frame.
    pub fn unmount(&self, kind: FrameKind) -> Option<Arc<MemoryFrameWindow>> {
        self.windows.lock().remove(&kind)
    }

    /// Returns `true` if the `kind` frame is mounted.
    #[must_use]
    pub fn is_mounted(&self, kind: FrameKind) -> bool {
        self.windows.lock().contains_key(&kind)
    }
}

impl FrameLocator for MemoryFrames {
    fn frame_window(&self, kind: FrameKind) -> Option<Arc<dyn FrameWindow>> {
        self.windows
            .lock()
            .get(&kind)
            .map(|window| Arc::clone(window) as Arc<dyn FrameWindow>)
    }
}

// ============================================================================
// Tests
// ============================================================================
