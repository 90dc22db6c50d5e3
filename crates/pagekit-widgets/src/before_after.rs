#![forbid(unsafe_code)]

//! Before/after image comparison slider.
//!
//! Two full-bleed layers are stacked inside a `.before-after` container and
//! clipped so that together they always tile the full width: "before" is
//! inset from the right by `100 - p` percent and "after" from the left by
//! `p` percent. A draggable `.slider` divider sits at `p`.
//!
//! Position changes are applied on the next animation frame; a burst of
//! pointer moves between two frames collapses to the latest position.

use pagekit_core::frame::FrameSlot;
use pagekit_core::{
    Binding, Ctx, Dispatch, Dom, EventKind, Key, Mount, NodeId, PageConfig, PageError, PageEvent,
    PointerSource, Target,
};

use crate::Controller;

pub const CONTAINER_SELECTOR: &str = ".before-after";
pub const BEFORE_SELECTOR: &str = ".before";
pub const AFTER_SELECTOR: &str = ".after";
pub const DIVIDER_SELECTOR: &str = ".slider";
pub const SLIDING_CLASS: &str = "sliding";

/// Clip insets, in percent, for one divider position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerClips {
    /// Right inset of the "before" layer.
    pub before_right: f64,
    /// Left inset of the "after" layer.
    pub after_left: f64,
}

impl LayerClips {
    /// Insets for `position`, clamped to `[0, 100]`.
    #[must_use]
    pub fn at(position: f64) -> Self {
        let position = clamp_position(position);
        Self {
            before_right: 100.0 - position,
            after_left: position,
        }
    }

    #[must_use]
    pub fn before_clip_path(&self) -> String {
        format!("inset(0 {}% 0 0)", self.before_right)
    }

    #[must_use]
    pub fn after_clip_path(&self) -> String {
        format!("inset(0 0 0 {}%)", self.after_left)
    }
}

/// Clamp to `[0, 100]`; non-finite input maps to `0`.
#[must_use]
pub fn clamp_position(position: f64) -> f64 {
    if position.is_finite() {
        position.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[derive(Debug)]
pub struct BeforeAfterSlider {
    container: NodeId,
    before: NodeId,
    after: NodeId,
    divider: NodeId,
    position: f64,
    dragging: bool,
    key_step: f64,
    frame: FrameSlot<f64>,
    torn_down: bool,
}

impl BeforeAfterSlider {
    /// Mount on every `.before-after` container in the page.
    pub fn mount_all(ctx: &mut Ctx<'_>, config: &PageConfig) -> Vec<Mount<Self>> {
        ctx.dom
            .query_all(CONTAINER_SELECTOR)
            .into_iter()
            .map(|container| Self::mount(ctx, container, config))
            .collect()
    }

    /// Mount on one container; inert if a layer or the divider is missing.
    pub fn mount(ctx: &mut Ctx<'_>, container: NodeId, config: &PageConfig) -> Mount<Self> {
        let found = Self::find_parts(ctx.dom, container);
        found
            .map(|(before, after, divider)| {
                let mut slider = Self {
                    container,
                    before,
                    after,
                    divider,
                    position: 0.0,
                    dragging: false,
                    key_step: config.slider_key_step,
                    frame: FrameSlot::new(),
                    torn_down: false,
                };
                slider.install(ctx, config.slider_initial_position);
                slider
            })
            .into()
    }

    fn find_parts(dom: &dyn Dom, container: NodeId) -> Result<(NodeId, NodeId, NodeId), PageError> {
        let find = |selector: &str| {
            dom.query_within(container, selector)
                .ok_or_else(|| PageError::missing("before-after", selector))
        };
        Ok((
            find(BEFORE_SELECTOR)?,
            find(AFTER_SELECTOR)?,
            find(DIVIDER_SELECTOR)?,
        ))
    }

    fn install(&mut self, ctx: &mut Ctx<'_>, initial: f64) {
        let dom = &mut *ctx.dom;
        dom.set_style(self.container, "position", "relative");
        for layer in [self.before, self.after] {
            for (property, value) in [
                ("position", "absolute"),
                ("top", "0"),
                ("left", "0"),
                ("width", "100%"),
                ("height", "100%"),
            ] {
                dom.set_style(layer, property, value);
            }
        }
        let initial = clamp_position(initial);
        for (name, value) in [
            ("role", "slider".to_owned()),
            ("aria-valuemin", "0".to_owned()),
            ("aria-valuemax", "100".to_owned()),
            ("aria-valuenow", format!("{}", initial.round())),
            ("tabindex", "0".to_owned()),
        ] {
            dom.set_attribute(self.divider, name, &value);
        }
        self.set_position(initial, ctx);
    }

    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub const fn container(&self) -> NodeId {
        self.container
    }

    /// Record a new position and schedule its visual update.
    pub fn set_position(&mut self, position: f64, ctx: &mut Ctx<'_>) {
        self.position = clamp_position(position);
        if self.frame.request(self.position) {
            ctx.request_frame();
        }
    }

    fn start(&mut self, client_x: f64, ctx: &mut Ctx<'_>) {
        self.dragging = true;
        ctx.dom.add_class(self.container, SLIDING_CLASS);
        self.track(client_x, ctx);
    }

    fn track(&mut self, client_x: f64, ctx: &mut Ctx<'_>) {
        if !self.dragging {
            return;
        }
        let rect = ctx.dom.bounding_rect(self.container);
        self.set_position(rect.horizontal_percent(client_x), ctx);
    }

    fn stop(&mut self, ctx: &mut Ctx<'_>) {
        if self.dragging {
            self.dragging = false;
            ctx.dom.remove_class(self.container, SLIDING_CLASS);
        }
    }

    fn apply(&self, position: f64, dom: &mut dyn Dom) {
        let clips = LayerClips::at(position);
        dom.set_style(self.before, "clip-path", &clips.before_clip_path());
        dom.set_style(self.after, "clip-path", &clips.after_clip_path());
        dom.set_style(self.divider, "left", &format!("{position}%"));
        dom.set_attribute(
            self.divider,
            "aria-valuenow",
            &format!("{}", position.round()),
        );
    }
}

impl Controller for BeforeAfterSlider {
    fn name(&self) -> &'static str {
        "before-after"
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::node(self.container, EventKind::MouseDown),
            Binding::node(self.container, EventKind::TouchStart),
            Binding::new(Target::Document, EventKind::MouseMove),
            Binding::new(Target::Document, EventKind::MouseUp),
            Binding::new(Target::Document, EventKind::TouchMove),
            Binding::new(Target::Document, EventKind::TouchEnd),
            Binding::node(self.divider, EventKind::KeyDown),
        ]
    }

    fn handle(&mut self, event: &PageEvent, ctx: &mut Ctx<'_>) -> Dispatch {
        if self.torn_down {
            return Dispatch::default();
        }
        match event {
            PageEvent::PointerDown {
                target,
                client_x,
                source,
            } if *target == self.container => {
                self.start(*client_x, ctx);
                return Dispatch {
                    prevent_default: *source == PointerSource::Touch,
                    ..Dispatch::default()
                };
            }
            PageEvent::PointerMove { client_x, .. } => self.track(*client_x, ctx),
            PageEvent::PointerUp { .. } => self.stop(ctx),
            PageEvent::KeyDown {
                target: Target::Node(target),
                key,
            } if *target == self.divider => match key {
                Key::ArrowLeft => self.set_position(self.position - self.key_step, ctx),
                Key::ArrowRight => self.set_position(self.position + self.key_step, ctx),
                _ => {}
            },
            _ => {}
        }
        Dispatch::default()
    }

    fn on_frame(&mut self, ctx: &mut Ctx<'_>) {
        if let Some(position) = self.frame.take() {
            self.apply(position, ctx.dom);
        }
    }

    fn teardown(&mut self, ctx: &mut Ctx<'_>) {
        self.stop(ctx);
        self.frame.clear();
        self.torn_down = true;
    }
}
