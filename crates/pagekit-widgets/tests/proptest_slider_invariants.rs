//! Property-based invariant tests for the before/after slider.
//!
//! 1. Any pointer position yields a divider position within [0, 100]
//! 2. The two clip insets always tile the full width
//! 3. Arrow-key steps never leave [0, 100]
//! 4. Pointer moves between two frames apply only the latest position

use pagekit_core::memory_dom::MemoryDom;
use pagekit_core::scroll_lock::ScrollLock;
use pagekit_core::{
    ClientRect, Ctx, Dom, Key, NodeId, PageConfig, PageEvent, PointerSource, Target, TimerQueue,
};
use pagekit_widgets::Controller;
use pagekit_widgets::before_after::{BeforeAfterSlider, LayerClips, clamp_position};
use proptest::prelude::*;
use web_time::Duration;

struct Page {
    dom: MemoryDom,
    timers: TimerQueue,
    lock: ScrollLock,
    container: NodeId,
    before: NodeId,
    divider: NodeId,
}

impl Page {
    fn new(left: f64, width: f64) -> Self {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let container = dom.append_with(body, "div", &[("class", "before-after")]);
        let before = dom.append_with(container, "img", &[("class", "before")]);
        dom.append_with(container, "img", &[("class", "after")]);
        let divider = dom.append_with(container, "div", &[("class", "slider")]);
        dom.set_rect(container, ClientRect::new(left, 0.0, width, 200.0));
        Self {
            dom,
            timers: TimerQueue::new(),
            lock: ScrollLock::new(),
            container,
            before,
            divider,
        }
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx::new(&mut self.dom, &mut self.timers, &mut self.lock, Duration::ZERO)
    }

    fn mount(&mut self) -> BeforeAfterSlider {
        let container = self.container;
        BeforeAfterSlider::mount(&mut self.ctx(), container, &PageConfig::default())
            .into_active()
            .expect("slider mounts")
    }

    fn send(&mut self, slider: &mut BeforeAfterSlider, event: PageEvent) {
        slider.handle(&event, &mut self.ctx());
    }

    fn frame(&mut self, slider: &mut BeforeAfterSlider) {
        slider.on_frame(&mut self.ctx());
    }
}

proptest! {
    #[test]
    fn pointer_positions_stay_in_range(
        left in -500.0f64..500.0,
        width in 1.0f64..2_000.0,
        xs in proptest::collection::vec(-3_000.0f64..3_000.0, 1..30),
    ) {
        let mut page = Page::new(left, width);
        let mut slider = page.mount();
        let container = page.container;
        page.send(&mut slider, PageEvent::PointerDown {
            target: container,
            client_x: xs[0],
            source: PointerSource::Mouse,
        });
        for x in &xs {
            page.send(&mut slider, PageEvent::PointerMove {
                client_x: *x,
                source: PointerSource::Mouse,
            });
            prop_assert!((0.0..=100.0).contains(&slider.position()));
        }
    }

    #[test]
    fn clips_tile_the_full_width(position in prop::num::f64::ANY) {
        let clips = LayerClips::at(position);
        prop_assert!((0.0..=100.0).contains(&clips.after_left));
        prop_assert!((clips.before_right + clips.after_left - 100.0).abs() < 1e-9);
        prop_assert_eq!(clamp_position(clamp_position(position)), clamp_position(position));
    }

    #[test]
    fn arrow_keys_stay_in_range(
        presses in proptest::collection::vec(any::<bool>(), 0..60),
    ) {
        let mut page = Page::new(0.0, 400.0);
        let mut slider = page.mount();
        let divider = page.divider;
        for right in presses {
            let key = if right { Key::ArrowRight } else { Key::ArrowLeft };
            page.send(&mut slider, PageEvent::KeyDown { target: Target::Node(divider), key });
            prop_assert!((0.0..=100.0).contains(&slider.position()));
        }
    }

    #[test]
    fn only_latest_move_reaches_the_frame(
        xs in proptest::collection::vec(0.0f64..400.0, 1..20),
    ) {
        let mut page = Page::new(0.0, 400.0);
        let mut slider = page.mount();
        page.frame(&mut slider);
        let container = page.container;
        page.send(&mut slider, PageEvent::PointerDown {
            target: container,
            client_x: xs[0],
            source: PointerSource::Touch,
        });
        for x in &xs {
            page.send(&mut slider, PageEvent::PointerMove {
                client_x: *x,
                source: PointerSource::Touch,
            });
        }
        page.frame(&mut slider);

        let last = ClientRect::new(0.0, 0.0, 400.0, 200.0).horizontal_percent(xs[xs.len() - 1]);
        let expected = LayerClips::at(last).before_clip_path();
        prop_assert_eq!(page.dom.style(page.before, "clip-path"), Some(expected));
    }
}
