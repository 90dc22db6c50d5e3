#![forbid(unsafe_code)]

//! Composition root for one page.
//!
//! [`PageCore`] mounts every controller against a [`Dom`] once, then fans
//! host events, timers and animation frames out to the active ones. It also
//! owns the two page-level behaviours that belong to no single controller:
//! the debounced resize reconcile of the scroll lock and routing document
//! visibility to the carousel.
//!
//! `PageCore` is platform-independent. The browser host in `wasm.rs` feeds it
//! real DOM events; native tests drive it against
//! `pagekit_core::memory_dom::MemoryDom`.

use std::collections::HashSet;

use pagekit_core::debounce::Debounce;
use pagekit_core::scroll_lock::ScrollLock;
use pagekit_core::viewport::is_mobile;
use pagekit_core::{
    Binding, Ctx, DeterministicClock, Dispatch, Dom, EventKind, Mount, Observation, PageConfig,
    PageEvent, Target, TimerId, TimerQueue,
};
use pagekit_widgets::Controller;
use pagekit_widgets::before_after::BeforeAfterSlider;
use pagekit_widgets::carousel::TestimonialsCarousel;
use pagekit_widgets::copyright_year::stamp_current_year;
use pagekit_widgets::form::{FormSubmitter, FormValidator, SimulatedSubmitter};
use pagekit_widgets::mobile_menu::MobileMenu;
use pagekit_widgets::scroll_animator::ScrollAnimator;
use pagekit_widgets::smooth_scroll::SmoothScroll;
use web_time::Duration;

struct Controllers {
    menu: Mount<MobileMenu>,
    sliders: Vec<Mount<BeforeAfterSlider>>,
    carousel: Mount<TestimonialsCarousel>,
    form: Mount<FormValidator>,
    smooth_scroll: Mount<SmoothScroll>,
    animator: Mount<ScrollAnimator>,
}

impl Controllers {
    /// Active controllers in mount order.
    fn active(&self) -> Vec<&dyn Controller> {
        let mut active: Vec<&dyn Controller> = Vec::new();
        if let Some(menu) = self.menu.as_active() {
            active.push(menu);
        }
        for slider in self.sliders.iter().filter_map(Mount::as_active) {
            active.push(slider);
        }
        if let Some(carousel) = self.carousel.as_active() {
            active.push(carousel);
        }
        if let Some(form) = self.form.as_active() {
            active.push(form);
        }
        if let Some(scroll) = self.smooth_scroll.as_active() {
            active.push(scroll);
        }
        if let Some(animator) = self.animator.as_active() {
            active.push(animator);
        }
        active
    }

    fn active_mut(&mut self) -> Vec<&mut dyn Controller> {
        let mut active: Vec<&mut dyn Controller> = Vec::new();
        if let Some(menu) = self.menu.as_active_mut() {
            active.push(menu);
        }
        for slider in self.sliders.iter_mut().filter_map(Mount::as_active_mut) {
            active.push(slider);
        }
        if let Some(carousel) = self.carousel.as_active_mut() {
            active.push(carousel);
        }
        if let Some(form) = self.form.as_active_mut() {
            active.push(form);
        }
        if let Some(scroll) = self.smooth_scroll.as_active_mut() {
            active.push(scroll);
        }
        if let Some(animator) = self.animator.as_active_mut() {
            active.push(animator);
        }
        active
    }
}

/// Every controller of one page plus the shared resources they use.
pub struct PageCore<D: Dom> {
    dom: D,
    clock: DeterministicClock,
    timers: TimerQueue,
    scroll_lock: ScrollLock,
    config: PageConfig,
    controllers: Controllers,
    resize: Debounce<f64>,
    frame_requested: bool,
    torn_down: bool,
}

impl<D: Dom> core::fmt::Debug for PageCore<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageCore")
            .field("now", &self.clock.now())
            .field("timers", &self.timers.len())
            .field("active", &self.controllers.active().len())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl<D: Dom> PageCore<D> {
    /// Mount every controller with the simulated form submitter.
    pub fn boot(dom: D, config: PageConfig, year: i32) -> Self {
        let submitter = Box::new(SimulatedSubmitter::new(config.submit_latency_duration()));
        Self::boot_with_submitter(dom, config, year, submitter)
    }

    /// Mount every controller, delivering form data to `submitter`.
    ///
    /// Components whose elements are missing stay inactive; `year` is
    /// written into `#currentYear` when present.
    pub fn boot_with_submitter(
        mut dom: D,
        config: PageConfig,
        year: i32,
        submitter: Box<dyn FormSubmitter>,
    ) -> Self {
        let clock = DeterministicClock::new();
        let mut timers = TimerQueue::new();
        let mut scroll_lock = ScrollLock::new();

        let (controllers, frame_requested) = {
            let mut ctx = Ctx::new(&mut dom, &mut timers, &mut scroll_lock, clock.now());
            let controllers = Controllers {
                menu: MobileMenu::mount(ctx.dom, &config),
                sliders: BeforeAfterSlider::mount_all(&mut ctx, &config),
                carousel: TestimonialsCarousel::mount(&mut ctx, &config),
                form: FormValidator::mount(&mut ctx, &config, submitter),
                smooth_scroll: SmoothScroll::mount(ctx.dom),
                animator: ScrollAnimator::mount(ctx.dom, &config),
            };
            if let Err(err) = stamp_current_year(ctx.dom, year) {
                tracing::debug!(%err, "copyright year not stamped");
            }
            (controllers, ctx.frame_requested())
        };

        let page = Self {
            dom,
            clock,
            timers,
            scroll_lock,
            resize: Debounce::new(config.resize_debounce_duration()),
            config,
            controllers,
            frame_requested,
            torn_down: false,
        };
        tracing::info!(
            active = page.controllers.active().len(),
            sliders = page.controllers.sliders.len(),
            "page booted"
        );
        page
    }

    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    #[must_use]
    pub fn menu(&self) -> Option<&MobileMenu> {
        self.controllers.menu.as_active()
    }

    #[must_use]
    pub fn sliders(&self) -> Vec<&BeforeAfterSlider> {
        self.controllers
            .sliders
            .iter()
            .filter_map(Mount::as_active)
            .collect()
    }

    #[must_use]
    pub fn carousel(&self) -> Option<&TestimonialsCarousel> {
        self.controllers.carousel.as_active()
    }

    #[must_use]
    pub fn form(&self) -> Option<&FormValidator> {
        self.controllers.form.as_active()
    }

    #[must_use]
    pub fn smooth_scroll(&self) -> Option<&SmoothScroll> {
        self.controllers.smooth_scroll.as_active()
    }

    #[must_use]
    pub fn scroll_animator(&self) -> Option<&ScrollAnimator> {
        self.controllers.animator.as_active()
    }

    /// Listeners the host must install, deduplicated, page-level ones first.
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        if self.torn_down {
            return Vec::new();
        }
        let page_level = [
            Binding::new(Target::Window, EventKind::Resize),
            Binding::new(Target::Document, EventKind::VisibilityChange),
        ];
        let mut seen = HashSet::new();
        page_level
            .into_iter()
            .chain(
                self.controllers
                    .active()
                    .into_iter()
                    .flat_map(|controller| controller.bindings()),
            )
            .filter(|binding| seen.insert(*binding))
            .collect()
    }

    /// Elements the host must observe for intersection.
    #[must_use]
    pub fn observed(&self) -> Vec<Observation> {
        if self.torn_down {
            return Vec::new();
        }
        self.controllers
            .active()
            .into_iter()
            .flat_map(|controller| controller.observations())
            .collect()
    }

    /// Route one event to every active controller.
    pub fn dispatch(&mut self, event: PageEvent) -> Dispatch {
        if self.torn_down {
            return Dispatch::default();
        }
        let now = self.clock.now();
        match &event {
            PageEvent::Resize { width } => self.resize.call(&mut self.timers, now, *width),
            PageEvent::VisibilityChange { hidden } => {
                if let Some(carousel) = self.controllers.carousel.as_active_mut() {
                    if *hidden {
                        carousel.pause();
                    } else {
                        carousel.resume();
                    }
                }
            }
            _ => {}
        }

        let mut out = Dispatch::default();
        let mut ctx = Ctx::new(&mut self.dom, &mut self.timers, &mut self.scroll_lock, now);
        for controller in self.controllers.active_mut() {
            out.merge(controller.handle(&event, &mut ctx));
        }
        self.frame_requested |= ctx.frame_requested();
        out
    }

    /// Move the clock to `now` and fire every timer due by then.
    ///
    /// Each callback observes the clock at its own deadline, so timers it
    /// schedules are anchored there rather than at `now`.
    pub fn advance_to(&mut self, now: Duration) {
        self.clock.set(now);
        let now = self.clock.now();
        while let Some(due) = self.timers.next_deadline().filter(|due| *due <= now) {
            let Some(id) = self.timers.pop_due(now) else {
                break;
            };
            self.fire(id, due);
        }
    }

    /// Advance the clock by `dt`, firing due timers.
    pub fn advance_by(&mut self, dt: Duration) {
        self.advance_to(self.clock.now().saturating_add(dt));
    }

    fn fire(&mut self, id: TimerId, at: Duration) {
        if self.torn_down {
            return;
        }
        if let Some(width) = self.resize.fire(id) {
            if is_mobile(width, self.config.mobile_breakpoint_px) {
                self.scroll_lock.reconcile(&mut self.dom);
            }
            return;
        }
        let mut ctx = Ctx::new(&mut self.dom, &mut self.timers, &mut self.scroll_lock, at);
        let handled = self
            .controllers
            .active_mut()
            .into_iter()
            .any(|controller| controller.on_timer(id, &mut ctx));
        if !handled {
            tracing::debug!(?id, "timer without owner");
        }
        self.frame_requested |= ctx.frame_requested();
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Whether some controller asked for an animation frame.
    #[must_use]
    pub const fn wants_animation_frame(&self) -> bool {
        self.frame_requested
    }

    /// Apply deferred visual updates.
    pub fn animation_frame(&mut self) {
        self.frame_requested = false;
        if self.torn_down {
            return;
        }
        let mut ctx = Ctx::new(
            &mut self.dom,
            &mut self.timers,
            &mut self.scroll_lock,
            self.clock.now(),
        );
        for controller in self.controllers.active_mut() {
            controller.on_frame(&mut ctx);
        }
        self.frame_requested = ctx.frame_requested();
    }

    /// Tear down every controller and cancel page-level timers.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.resize.cancel(&mut self.timers);
        let mut ctx = Ctx::new(
            &mut self.dom,
            &mut self.timers,
            &mut self.scroll_lock,
            self.clock.now(),
        );
        for controller in self.controllers.active_mut() {
            tracing::debug!(controller = controller.name(), "teardown");
            controller.teardown(&mut ctx);
        }
        self.frame_requested = false;
        self.torn_down = true;
    }

    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
