//! Host configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use portal_bridge::HostConfig;
//!
//! # fn example() -> portal_bridge::Result<()> {
//! let config = HostConfig::builder()
//!     .patient_url("https://portal.example/patient")
//!     .staff_url("https://portal.example/staff")
//!     .settle_delay(Duration::from_millis(750))
//!     .build()?;
//!
//! assert_eq!(config.frame_origin().as_str(), "https://portal.example");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::frame::Origin;
use crate::identifiers::FrameKind;

// ============================================================================
// Constants
// ============================================================================

/// Wait between showing a frame and posting the token message.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

// ============================================================================
// HostConfig
// ============================================================================

/// Validated host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    patient_url: String,
    staff_url: String,
    frame_origin: Origin,
    settle_delay: Duration,
}

impl HostConfig {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> HostConfigBuilder {
        HostConfigBuilder::new()
    }

    /// Parses a JSON configuration document.
    ///
    /// ```json
    /// {
    ///   "patientUrl": "https://portal.example/patient",
    ///   "staffUrl": "https://portal.example/staff",
    ///   "frameOrigin": "https://portal.example",
    ///   "settleDelayMs": 500
    /// }
    /// ```
    ///
    /// `frameOrigin` and `settleDelayMs` are optional.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the document is malformed
    /// - Any validation error from [`HostConfigBuilder::build`]
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawHostConfig = serde_json::from_str(json)?;

        let mut builder = HostConfigBuilder::new()
            .patient_url(raw.patient_url)
            .staff_url(raw.staff_url);
        if let Some(origin) = raw.frame_origin {
            builder = builder.frame_origin(origin);
        }
        if let Some(ms) = raw.settle_delay_ms {
            builder = builder.settle_delay(Duration::from_millis(ms));
        }
        builder.build()
    }

    /// Returns the base URL of the `kind` frame.
    #[inline]
    #[must_use]
    pub fn base_url(&self, kind: FrameKind) -> &str {
        match kind {
            FrameKind::Patient => &self.patient_url,
            FrameKind::Staff => &self.staff_url,
        }
    }

    /// Returns the origin both portals are served from.
    #[inline]
    #[must_use]
    pub fn frame_origin(&self) -> &Origin {
        &self.frame_origin
    }

    /// Returns the settle delay.
    #[inline]
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}

/// Wire shape of [`HostConfig::from_json`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHostConfig {
    patient_url: String,
    staff_url: String,
    frame_origin: Option<String>,
    settle_delay_ms: Option<u64>,
}

// ============================================================================
// HostConfigBuilder
// ============================================================================

/// Builder for [`HostConfig`].
#[derive(Debug, Clone, Default)]
pub struct HostConfigBuilder {
    patient_url: Option<String>,
    staff_url: Option<String>,
    frame_origin: Option<String>,
    settle_delay: Option<Duration>,
}

impl HostConfigBuilder {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the patient portal base URL.
    #[inline]
    #[must_use]
    pub fn patient_url(mut self, url: impl Into<String>) -> Self {
        self.patient_url = Some(url.into());
        self
    }

    /// Sets the staff portal base URL.
    #[inline]
    #[must_use]
    pub fn staff_url(mut self, url: impl Into<String>) -> Self {
        self.staff_url = Some(url.into());
        self
    }

    /// Sets the expected frame origin.
    ///
    /// Defaults to the origin of the patient URL.
    #[inline]
    #[must_use]
    pub fn frame_origin(mut self, origin: impl Into<String>) -> Self {
        self.frame_origin = Some(origin.into());
        self
    }

    /// Sets the settle delay. Defaults to [`DEFAULT_SETTLE_DELAY`].
    #[inline]
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a URL is missing or a portal is served from
    ///   a different origin than the configured frame origin
    /// - [`Error::InvalidUrl`] if a URL is not absolute
    /// - [`Error::InvalidOrigin`] if the frame origin is not a bare origin
    pub fn build(self) -> Result<HostConfig> {
        let patient_url = required(self.patient_url, "patient_url")?;
        let staff_url = required(self.staff_url, "staff_url")?;

        let frame_origin = match &self.frame_origin {
            Some(origin) => Origin::parse(origin)?,
            None => Origin::of_url(&patient_url)?,
        };

        for (kind, url) in [(FrameKind::Patient, &patient_url), (FrameKind::Staff, &staff_url)] {
            let origin = Origin::of_url(url)?;
            if origin != frame_origin {
                return Err(Error::config(format!(
                    "{kind} url {url} is served from {origin}, expected {frame_origin}"
                )));
            }
        }

        Ok(HostConfig {
            patient_url,
            staff_url,
            frame_origin,
            settle_delay: self.settle_delay.unwrap_or(DEFAULT_SETTLE_DELAY),
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::config(format!(
            "{name} is required. Use HostConfig::builder().{name}(..) to set it."
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
