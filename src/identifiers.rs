//! Type-safe identifiers for frames and scheduled dispatches.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`FrameKind`] | Which embedded portal a frame hosts |
//! | [`DispatchId`] | Identity of one scheduled token send |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// FrameKind
// ============================================================================

/// The embedded portals the host knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Patient-facing portal.
    Patient,
    /// Staff-facing portal.
    Staff,
}

impl FrameKind {
    /// Every frame kind, in display order.
    pub const ALL: [FrameKind; 2] = [FrameKind::Patient, FrameKind::Staff];

    /// Returns the lowercase name used in logs and config.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DispatchId
// ============================================================================

/// Identifies a single scheduled token send.
///
/// A new id is generated every time a frame is shown, so a cancelled send
/// can be told apart from its replacement in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchId(Uuid);

impl DispatchId {
    /// Generates a fresh random id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
