#![forbid(unsafe_code)]

//! Core: DOM abstraction, page events, host-driven time and shared page
//! resources.
//!
//! # Role in pagekit
//! `pagekit-core` is the layer every behaviour controller is written
//! against. It never touches a browser API directly:
//! - **Dom**: element handles, classes, attributes, inline styles, focus.
//! - **PageEvent / Binding**: normalized events and the listeners that
//!   produce them.
//! - **TimerQueue / Debounce / FrameSlot**: deterministic timers, trailing
//!   debounce and single-slot animation-frame coalescing.
//! - **ScrollLock**: the page-wide `no-scroll` resource, shared by holder.
//! - **Mount**: constructor-time capability check for components.
//!
//! # How it fits in the system
//! `pagekit-widgets` implements the controllers on top of these types and
//! `pagekit-web` hosts them, either in the browser (`wasm32`) or against
//! [`memory_dom::MemoryDom`] in tests.

pub mod config;
pub mod context;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod event;
pub mod frame;
pub mod mount;
pub mod scroll_lock;
pub mod timer;
pub mod viewport;

#[cfg(any(test, feature = "test-helpers"))]
pub mod memory_dom;

pub use config::PageConfig;
pub use context::Ctx;
pub use dom::{ClientRect, Dom, NodeId};
pub use error::{PageError, SubmitError};
pub use event::{Binding, Dispatch, EventKind, Key, Observation, PageEvent, PointerSource, Target};
pub use mount::Mount;
pub use timer::{DeterministicClock, TimerId, TimerQueue};
