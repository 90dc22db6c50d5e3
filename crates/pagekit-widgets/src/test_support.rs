//! Headless harness shared by unit tests.

use pagekit_core::memory_dom::MemoryDom;
use pagekit_core::scroll_lock::ScrollLock;
use pagekit_core::{Ctx, Dispatch, PageEvent, TimerQueue};
use web_time::Duration;

use crate::Controller;

pub(crate) struct Harness {
    pub dom: MemoryDom,
    pub timers: TimerQueue,
    pub lock: ScrollLock,
    pub now: Duration,
    pub frames_requested: usize,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dom: MemoryDom::new(),
            timers: TimerQueue::new(),
            lock: ScrollLock::new(),
            now: Duration::ZERO,
            frames_requested: 0,
        }
    }

    /// Run `f` with a fresh context, counting frame requests.
    pub fn with<R>(&mut self, f: impl FnOnce(&mut Ctx<'_>) -> R) -> R {
        let (out, wants_frame) = {
            let mut ctx = Ctx::new(&mut self.dom, &mut self.timers, &mut self.lock, self.now);
            let out = f(&mut ctx);
            (out, ctx.frame_requested())
        };
        if wants_frame {
            self.frames_requested += 1;
        }
        out
    }

    pub fn dispatch(&mut self, controller: &mut dyn Controller, event: PageEvent) -> Dispatch {
        self.with(|ctx| controller.handle(&event, ctx))
    }

    /// Advance time by `dt`, firing due timers into `controller`.
    pub fn advance(&mut self, controller: &mut dyn Controller, dt: Duration) {
        self.now += dt;
        while let Some(id) = self.timers.pop_due(self.now) {
            self.with(|ctx| controller.on_timer(id, ctx));
        }
    }

    pub fn frame(&mut self, controller: &mut dyn Controller) {
        self.with(|ctx| controller.on_frame(ctx));
    }
}
