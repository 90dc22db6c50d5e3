#![forbid(unsafe_code)]

//! Slide-out navigation menu.
//!
//! Two states, closed and open. Opening activates the button, panel and
//! overlay, takes the page scroll lock and focuses the first nav link;
//! closing reverses all of it and hands focus back to the button.

use pagekit_core::debounce::Debounce;
use pagekit_core::scroll_lock::LockHolder;
use pagekit_core::viewport::is_mobile;
use pagekit_core::{
    Binding, Ctx, Dispatch, Dom, EventKind, Key, Mount, NodeId, PageConfig, PageError, PageEvent,
    Target, TimerId,
};

use crate::Controller;

pub const MENU_BUTTON_SELECTOR: &str = "#mobileMenuBtn";
pub const NAV_SELECTOR: &str = "#navLinks";
pub const OVERLAY_SELECTOR: &str = "#menuOverlay";
pub const ACTIVE_CLASS: &str = "active";

const LOCK_HOLDER: LockHolder = LockHolder::new("mobile-menu");

#[derive(Debug)]
pub struct MobileMenu {
    button: NodeId,
    nav: NodeId,
    overlay: NodeId,
    links: Vec<NodeId>,
    is_open: bool,
    breakpoint: f64,
    resize: Debounce<f64>,
}

impl MobileMenu {
    /// Find the menu elements; inert if any of them is missing.
    pub fn mount(dom: &dyn Dom, config: &PageConfig) -> Mount<Self> {
        Self::try_mount(dom, config).into()
    }

    fn try_mount(dom: &dyn Dom, config: &PageConfig) -> Result<Self, PageError> {
        let find = |selector: &str| {
            dom.query(selector)
                .ok_or_else(|| PageError::missing("mobile-menu", selector))
        };
        let button = find(MENU_BUTTON_SELECTOR)?;
        let nav = find(NAV_SELECTOR)?;
        let overlay = find(OVERLAY_SELECTOR)?;
        Ok(Self {
            button,
            nav,
            overlay,
            links: dom.query_all_within(nav, "a"),
            is_open: false,
            breakpoint: config.mobile_breakpoint_px,
            resize: Debounce::new(config.resize_debounce_duration()),
        })
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn toggle(&mut self, ctx: &mut Ctx<'_>) {
        if self.is_open {
            self.close(ctx);
        } else {
            self.open(ctx);
        }
    }

    /// Open the menu. Opening an already open menu leaves focus where the
    /// user moved it.
    pub fn open(&mut self, ctx: &mut Ctx<'_>) {
        if self.is_open {
            return;
        }
        for node in [self.button, self.nav, self.overlay] {
            ctx.dom.add_class(node, ACTIVE_CLASS);
        }
        ctx.scroll_lock.acquire(ctx.dom, LOCK_HOLDER);
        self.is_open = true;
        if let Some(first) = self.links.first() {
            ctx.dom.focus(*first);
        }
        tracing::debug!("mobile menu opened");
    }

    /// Close the menu. Closing an already closed menu leaves focus alone.
    pub fn close(&mut self, ctx: &mut Ctx<'_>) {
        if !self.is_open {
            return;
        }
        for node in [self.button, self.nav, self.overlay] {
            ctx.dom.remove_class(node, ACTIVE_CLASS);
        }
        ctx.scroll_lock.release(ctx.dom, LOCK_HOLDER);
        self.is_open = false;
        ctx.dom.focus(self.button);
        tracing::debug!("mobile menu closed");
    }
}

impl Controller for MobileMenu {
    fn name(&self) -> &'static str {
        "mobile-menu"
    }

    fn bindings(&self) -> Vec<Binding> {
        let mut bindings = vec![
            Binding::node(self.button, EventKind::Click),
            Binding::node(self.overlay, EventKind::Click),
            Binding::new(Target::Document, EventKind::KeyDown),
            Binding::new(Target::Window, EventKind::Resize),
        ];
        bindings.extend(
            self.links
                .iter()
                .map(|link| Binding::node(*link, EventKind::Click)),
        );
        bindings
    }

    fn handle(&mut self, event: &PageEvent, ctx: &mut Ctx<'_>) -> Dispatch {
        match event {
            PageEvent::Click { target } if *target == self.button => self.toggle(ctx),
            PageEvent::Click { target }
                if *target == self.overlay || self.links.contains(target) =>
            {
                self.close(ctx);
            }
            PageEvent::KeyDown {
                target: Target::Document,
                key: Key::Escape,
            } => self.close(ctx),
            PageEvent::Resize { width } => self.resize.call(ctx.timers, ctx.now, *width),
            _ => {}
        }
        Dispatch::default()
    }

    fn on_timer(&mut self, id: TimerId, ctx: &mut Ctx<'_>) -> bool {
        let Some(width) = self.resize.fire(id) else {
            return false;
        };
        if !is_mobile(width, self.breakpoint) && self.is_open {
            self.close(ctx);
        }
        true
    }

    fn teardown(&mut self, ctx: &mut Ctx<'_>) {
        self.resize.cancel(ctx.timers);
        if self.is_open {
            for node in [self.button, self.nav, self.overlay] {
                ctx.dom.remove_class(node, ACTIVE_CLASS);
            }
            self.is_open = false;
        }
        ctx.scroll_lock.release(ctx.dom, LOCK_HOLDER);
    }
}
