#![forbid(unsafe_code)]

//! Single-slot animation-frame coalescing.
//!
//! Holds at most one pending value. Requests made before the next frame
//! overwrite the slot instead of queuing, so only the latest value is
//! applied when the frame fires.

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSlot<T> {
    pending: Option<T>,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FrameSlot<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Store `value` for the next frame.
    ///
    /// Returns `true` when the slot was empty, i.e. the caller must ask the
    /// host for a frame. A `false` return means a frame is already owed.
    pub fn request(&mut self, value: T) -> bool {
        self.pending.replace(value).is_none()
    }

    /// Consume the pending value at frame time.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
