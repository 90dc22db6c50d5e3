#![forbid(unsafe_code)]

//! Page host for pagekit.
//!
//! # Role in pagekit
//! `pagekit-web` is the composition root. [`PageCore`] mounts every
//! controller from `pagekit-widgets` against one [`pagekit_core::Dom`] and
//! routes events, timers and animation frames to them.
//!
//! # How it fits in the system
//! On `wasm32` the crate exports `boot`, `bootWithConfig` and `teardown`
//! to JavaScript and drives `PageCore` over the real document through
//! `WebDom`. Everywhere else the same core is driven directly, which is
//! how the integration tests exercise whole-page scenarios.

pub mod page_core;

#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
mod web_dom;

pub use page_core::PageCore;
#[cfg(target_arch = "wasm32")]
pub use wasm::{boot, boot_with_config, teardown};
#[cfg(target_arch = "wasm32")]
pub use web_dom::WebDom;
