#![forbid(unsafe_code)]

//! Per-dispatch handler context.

use web_time::Duration;

use crate::dom::Dom;
use crate::scroll_lock::ScrollLock;
use crate::timer::TimerQueue;

/// Everything a controller may touch while handling one event, timer or
/// animation frame.
pub struct Ctx<'a> {
    pub dom: &'a mut dyn Dom,
    pub timers: &'a mut TimerQueue,
    pub scroll_lock: &'a mut ScrollLock,
    pub now: Duration,
    frame_requested: bool,
}

impl<'a> Ctx<'a> {
    pub fn new(
        dom: &'a mut dyn Dom,
        timers: &'a mut TimerQueue,
        scroll_lock: &'a mut ScrollLock,
        now: Duration,
    ) -> Self {
        Self {
            dom,
            timers,
            scroll_lock,
            now,
            frame_requested: false,
        }
    }

    /// Ask the host for an animation frame.
    pub fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    #[must_use]
    pub const fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Schedule a one-shot timer `delay` from now.
    pub fn schedule_once(&mut self, delay: Duration) -> crate::timer::TimerId {
        self.timers.schedule_once(self.now, delay)
    }
}
