#![forbid(unsafe_code)]

//! Shared page scroll lock.
//!
//! The `no-scroll` class on `<body>` is a page-wide resource. Components
//! acquire it under their own [`LockHolder`] name; the class stays on while
//! at least one holder remains, so one component releasing its lock never
//! unlocks the page under another.

use std::collections::BTreeSet;

use crate::dom::Dom;

/// Class toggled on `<body>` while the page is locked.
pub const NO_SCROLL_CLASS: &str = "no-scroll";

/// Identity of a lock holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LockHolder(&'static str);

impl LockHolder {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScrollLock {
    holders: BTreeSet<LockHolder>,
}

impl ScrollLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock page scrolling on behalf of `holder`. Re-acquiring is a no-op.
    pub fn acquire(&mut self, dom: &mut dyn Dom, holder: LockHolder) {
        if self.holders.insert(holder) {
            tracing::debug!(holder = holder.name(), "scroll lock acquired");
        }
        let body = dom.body();
        dom.add_class(body, NO_SCROLL_CLASS);
    }

    /// Drop `holder`'s lock; scrolling resumes once nobody holds it.
    pub fn release(&mut self, dom: &mut dyn Dom, holder: LockHolder) {
        if self.holders.remove(&holder) {
            tracing::debug!(holder = holder.name(), "scroll lock released");
        }
        self.reconcile(dom);
    }

    /// Remove a stray `no-scroll` class left without any holder.
    ///
    /// Never drops a live holder and never adds the class.
    pub fn reconcile(&self, dom: &mut dyn Dom) {
        if self.holders.is_empty() {
            let body = dom.body();
            dom.remove_class(body, NO_SCROLL_CLASS);
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        !self.holders.is_empty()
    }

    #[must_use]
    pub fn is_held_by(&self, holder: LockHolder) -> bool {
        self.holders.contains(&holder)
    }
}
