#![forbid(unsafe_code)]

//! Auto-advancing testimonial carousel.
//!
//! Every direct child of `.testimonials-slider` is a slide; exactly one is
//! shown at a time. Navigation chrome (prev/next buttons and one dot per
//! slide) is generated on mount. A periodic timer advances the carousel
//! while it is playing; hovering or a hidden page pauses it, but the timer
//! itself keeps running and is only gated by the playing flag.

use pagekit_core::{
    Binding, Ctx, Dispatch, Dom, EventKind, Key, Mount, NodeId, PageConfig, PageError, PageEvent,
    Target, TimerId,
};

use crate::Controller;

pub const CONTAINER_SELECTOR: &str = ".testimonials-slider";
pub const ACTIVE_CLASS: &str = "active";

/// Index after `current` in a ring of `len` slides.
#[must_use]
pub const fn next_index(current: usize, len: usize) -> usize {
    (current + 1) % len
}

/// Index before `current` in a ring of `len` slides.
#[must_use]
pub const fn prev_index(current: usize, len: usize) -> usize {
    (current + len - 1) % len
}

#[derive(Debug)]
pub struct TestimonialsCarousel {
    container: NodeId,
    slides: Vec<NodeId>,
    controls: NodeId,
    prev_button: NodeId,
    next_button: NodeId,
    dots: Vec<NodeId>,
    current: usize,
    playing: bool,
    autoplay: Option<TimerId>,
}

impl TestimonialsCarousel {
    /// Mount on the page's carousel. Needs at least two slides.
    pub fn mount(ctx: &mut Ctx<'_>, config: &PageConfig) -> Mount<Self> {
        Self::try_mount(ctx, config).into()
    }

    fn try_mount(ctx: &mut Ctx<'_>, config: &PageConfig) -> Result<Self, PageError> {
        let container = ctx
            .dom
            .query(CONTAINER_SELECTOR)
            .ok_or_else(|| PageError::missing("carousel", CONTAINER_SELECTOR))?;
        let slides = ctx.dom.children(container);
        if slides.len() < 2 {
            return Err(PageError::missing(
                "carousel",
                format!("{CONTAINER_SELECTOR} > * (at least two slides)"),
            ));
        }

        let (controls, prev_button, next_button, dots) =
            build_controls(ctx.dom, container, slides.len());
        let mut carousel = Self {
            container,
            slides,
            controls,
            prev_button,
            next_button,
            dots,
            current: 0,
            playing: true,
            autoplay: None,
        };
        carousel.refresh_dots(ctx.dom);
        carousel.setup_slides(ctx.dom);
        carousel.autoplay = Some(
            ctx.timers
                .schedule_every(ctx.now, config.autoplay_period_duration()),
        );
        tracing::debug!(slides = carousel.slides.len(), "carousel mounted");
        Ok(carousel)
    }

    fn setup_slides(&self, dom: &mut dyn Dom) {
        for (index, slide) in self.slides.iter().enumerate() {
            let shown = index == 0;
            dom.set_attribute(*slide, "role", "tabpanel");
            dom.set_attribute(*slide, "aria-hidden", bool_attr(!shown));
            dom.set_style(*slide, "display", if shown { "block" } else { "none" });
        }
    }

    fn refresh_dots(&self, dom: &mut dyn Dom) {
        for (index, dot) in self.dots.iter().enumerate() {
            let current = index == self.current;
            if current {
                dom.add_class(*dot, ACTIVE_CLASS);
            } else {
                dom.remove_class(*dot, ACTIVE_CLASS);
            }
            dom.set_attribute(*dot, "aria-current", bool_attr(current));
        }
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Show slide `index`, hiding the current one. Out-of-range indices are
    /// ignored.
    pub fn go_to(&mut self, index: usize, dom: &mut dyn Dom) {
        let Some(target) = self.slides.get(index).copied() else {
            return;
        };
        let leaving = self.slides[self.current];
        dom.set_style(leaving, "display", "none");
        dom.set_attribute(leaving, "aria-hidden", "true");

        self.current = index;
        dom.set_style(target, "display", "block");
        dom.set_attribute(target, "aria-hidden", "false");
        self.refresh_dots(dom);
    }

    pub fn next(&mut self, dom: &mut dyn Dom) {
        self.go_to(next_index(self.current, self.slides.len()), dom);
    }

    pub fn prev(&mut self, dom: &mut dyn Dom) {
        self.go_to(prev_index(self.current, self.slides.len()), dom);
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn button(dom: &mut dyn Dom, class: &str, label: &str) -> NodeId {
    let node = dom.create_element("button");
    dom.set_attribute(node, "class", class);
    dom.set_attribute(node, "aria-label", label);
    node
}

/// Build `div.testimonial-controls` and append it to `container`.
fn build_controls(
    dom: &mut dyn Dom,
    container: NodeId,
    slides: usize,
) -> (NodeId, NodeId, NodeId, Vec<NodeId>) {
    let controls = dom.create_element("div");
    dom.set_attribute(controls, "class", "testimonial-controls");

    let prev = button(dom, "testimonial-nav prev", "Previous testimonial");
    let next = button(dom, "testimonial-nav next", "Next testimonial");

    let dot_row = dom.create_element("div");
    dom.set_attribute(dot_row, "class", "testimonial-dots");
    let dots = (0..slides)
        .map(|index| {
            let label = format!("Go to testimonial {}", index + 1);
            let dot = button(dom, "testimonial-dot", &label);
            dom.append_child(dot_row, dot);
            dot
        })
        .collect();

    dom.append_child(controls, prev);
    dom.append_child(controls, dot_row);
    dom.append_child(controls, next);
    dom.append_child(container, controls);
    (controls, prev, next, dots)
}

impl Controller for TestimonialsCarousel {
    fn name(&self) -> &'static str {
        "carousel"
    }

    fn bindings(&self) -> Vec<Binding> {
        let mut bindings = vec![
            Binding::node(self.prev_button, EventKind::Click),
            Binding::node(self.next_button, EventKind::Click),
            Binding::node(self.container, EventKind::MouseEnter),
            Binding::node(self.container, EventKind::MouseLeave),
            Binding::node(self.container, EventKind::KeyDown),
        ];
        bindings.extend(
            self.dots
                .iter()
                .map(|dot| Binding::node(*dot, EventKind::Click)),
        );
        bindings
    }

    fn handle(&mut self, event: &PageEvent, ctx: &mut Ctx<'_>) -> Dispatch {
        if self.autoplay.is_none() {
            return Dispatch::default();
        }
        match event {
            PageEvent::Click { target } if *target == self.prev_button => self.prev(ctx.dom),
            PageEvent::Click { target } if *target == self.next_button => self.next(ctx.dom),
            PageEvent::Click { target } => {
                if let Some(index) = self.dots.iter().position(|dot| dot == target) {
                    self.go_to(index, ctx.dom);
                }
            }
            PageEvent::PointerEnter { target } if *target == self.container => self.pause(),
            PageEvent::PointerLeave { target } if *target == self.container => self.resume(),
            PageEvent::KeyDown {
                target: Target::Node(target),
                key,
            } if *target == self.container => match key {
                Key::ArrowLeft => self.prev(ctx.dom),
                Key::ArrowRight => self.next(ctx.dom),
                _ => {}
            },
            _ => {}
        }
        Dispatch::default()
    }

    fn on_timer(&mut self, id: TimerId, ctx: &mut Ctx<'_>) -> bool {
        if self.autoplay != Some(id) {
            return false;
        }
        if self.playing {
            self.next(ctx.dom);
        }
        true
    }

    fn teardown(&mut self, ctx: &mut Ctx<'_>) {
        if let Some(id) = self.autoplay.take() {
            ctx.timers.cancel(id);
        }
        ctx.dom.remove(self.controls);
        self.playing = false;
    }
}
