#![forbid(unsafe_code)]

//! Page behaviour configuration.
//!
//! Every tunable constant lives here. Hosts normally use
//! [`PageConfig::default`]; a host may also hand over a JSON object with any
//! subset of the fields, e.g. `{"autoplay_period_ms": 8000}`.

use serde::Deserialize;
use web_time::Duration;

use crate::error::PageError;
use crate::viewport::MOBILE_BREAKPOINT_PX;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Widest viewport still treated as mobile, in CSS pixels.
    pub mobile_breakpoint_px: f64,
    /// Quiet period before a resize is acted on.
    pub resize_debounce_ms: u64,
    /// Initial before/after divider position, in percent.
    pub slider_initial_position: f64,
    /// Arrow-key step for the before/after divider, in percent.
    pub slider_key_step: f64,
    /// Carousel auto-advance period.
    pub autoplay_period_ms: u64,
    /// Lifetime of form success/error banners.
    pub banner_ttl_ms: u64,
    /// Latency of the simulated form submitter.
    pub submit_latency_ms: u64,
    /// Visible fraction that reveals a fade-in section.
    pub reveal_threshold: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint_px: MOBILE_BREAKPOINT_PX,
            resize_debounce_ms: 250,
            slider_initial_position: 50.0,
            slider_key_step: 5.0,
            autoplay_period_ms: 5000,
            banner_ttl_ms: 5000,
            submit_latency_ms: 1000,
            reveal_threshold: 0.1,
        }
    }
}

impl PageConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| PageError::InvalidConfig(err.to_string()))?;
        config.validated()
    }

    fn validated(self) -> Result<Self, PageError> {
        if !(0.0..=100.0).contains(&self.slider_initial_position) {
            return Err(PageError::InvalidConfig(format!(
                "slider_initial_position {} outside [0, 100]",
                self.slider_initial_position
            )));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(PageError::InvalidConfig(format!(
                "reveal_threshold {} outside [0, 1]",
                self.reveal_threshold
            )));
        }
        if !self.mobile_breakpoint_px.is_finite() || !self.slider_key_step.is_finite() {
            return Err(PageError::InvalidConfig(
                "breakpoint and key step must be finite".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Set the mobile breakpoint.
    #[must_use]
    pub fn mobile_breakpoint_px(mut self, px: f64) -> Self {
        self.mobile_breakpoint_px = px;
        self
    }

    /// Set the resize debounce window.
    #[must_use]
    pub fn resize_debounce(mut self, wait: Duration) -> Self {
        self.resize_debounce_ms = wait.as_millis() as u64;
        self
    }

    /// Set the carousel auto-advance period.
    #[must_use]
    pub fn autoplay_period(mut self, period: Duration) -> Self {
        self.autoplay_period_ms = period.as_millis() as u64;
        self
    }

    /// Set the banner lifetime.
    #[must_use]
    pub fn banner_ttl(mut self, ttl: Duration) -> Self {
        self.banner_ttl_ms = ttl.as_millis() as u64;
        self
    }

    /// Set the simulated submission latency.
    #[must_use]
    pub fn submit_latency(mut self, latency: Duration) -> Self {
        self.submit_latency_ms = latency.as_millis() as u64;
        self
    }

    #[must_use]
    pub const fn resize_debounce_duration(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    #[must_use]
    pub const fn autoplay_period_duration(&self) -> Duration {
        Duration::from_millis(self.autoplay_period_ms)
    }

    #[must_use]
    pub const fn banner_ttl_duration(&self) -> Duration {
        Duration::from_millis(self.banner_ttl_ms)
    }

    #[must_use]
    pub const fn submit_latency_duration(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }
}
