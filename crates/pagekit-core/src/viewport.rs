#![forbid(unsafe_code)]

//! Viewport width classification.

/// Widest viewport, in CSS pixels, still treated as mobile.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

/// Whether `width` is a mobile-width viewport (`width <= breakpoint`).
#[must_use]
pub fn is_mobile(width: f64, breakpoint: f64) -> bool {
    width <= breakpoint
}
