//! Property-based invariant tests for the testimonial carousel.
//!
//! 1. Index arithmetic wraps in both directions
//! 2. After any navigation sequence exactly one slide is displayed
//! 3. Autoplay ticks advance only while playing

use pagekit_core::memory_dom::MemoryDom;
use pagekit_core::scroll_lock::ScrollLock;
use pagekit_core::{Ctx, Dom, Key, NodeId, PageConfig, PageEvent, Target, TimerQueue};
use pagekit_widgets::Controller;
use pagekit_widgets::carousel::{TestimonialsCarousel, next_index, prev_index};
use proptest::prelude::*;
use web_time::Duration;

#[derive(Debug, Clone)]
enum Step {
    Next,
    Prev,
    Dot(usize),
    Key(bool),
    Hover(bool),
    Tick,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Next),
        Just(Step::Prev),
        (0usize..16).prop_map(Step::Dot),
        any::<bool>().prop_map(Step::Key),
        any::<bool>().prop_map(Step::Hover),
        Just(Step::Tick),
    ]
}

struct Page {
    dom: MemoryDom,
    timers: TimerQueue,
    lock: ScrollLock,
    now: Duration,
    container: NodeId,
    slides: Vec<NodeId>,
}

impl Page {
    fn new(slides: usize) -> Self {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let container = dom.append_with(body, "div", &[("class", "testimonials-slider")]);
        let slides = (0..slides)
            .map(|_| dom.append_with(container, "blockquote", &[]))
            .collect();
        Self {
            dom,
            timers: TimerQueue::new(),
            lock: ScrollLock::new(),
            now: Duration::ZERO,
            container,
            slides,
        }
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx::new(&mut self.dom, &mut self.timers, &mut self.lock, self.now)
    }

    fn send(&mut self, carousel: &mut TestimonialsCarousel, event: PageEvent) {
        carousel.handle(&event, &mut self.ctx());
    }

    fn tick(&mut self, carousel: &mut TestimonialsCarousel) {
        self.now += PageConfig::default().autoplay_period_duration();
        while let Some(id) = self.timers.pop_due(self.now) {
            carousel.on_timer(id, &mut self.ctx());
        }
    }

    fn displayed(&self) -> Vec<usize> {
        self.slides
            .iter()
            .enumerate()
            .filter(|(_, slide)| self.dom.style(**slide, "display").as_deref() == Some("block"))
            .map(|(index, _)| index)
            .collect()
    }
}

proptest! {
    #[test]
    fn index_arithmetic_wraps(len in 1usize..64, current in 0usize..64) {
        let current = current % len;
        prop_assert!(next_index(current, len) < len);
        prop_assert!(prev_index(current, len) < len);
        prop_assert_eq!(prev_index(next_index(current, len), len), current);
        prop_assert_eq!(next_index(len - 1, len), 0);
        prop_assert_eq!(prev_index(0, len), len - 1);
    }

    #[test]
    fn exactly_one_slide_is_displayed(
        count in 2usize..8,
        steps in proptest::collection::vec(step(), 0..40),
    ) {
        let mut page = Page::new(count);
        let mut carousel = TestimonialsCarousel::mount(&mut page.ctx(), &PageConfig::default())
            .into_active()
            .expect("carousel mounts");
        let buttons = page.dom.query_all(".testimonial-nav");
        let (prev, next) = (buttons[0], buttons[1]);
        let dots = page.dom.query_all(".testimonial-dot");
        let container = page.container;
        let mut expected = 0usize;
        let mut playing = true;

        for step in steps {
            match step {
                Step::Next => {
                    page.send(&mut carousel, PageEvent::Click { target: next });
                    expected = next_index(expected, count);
                }
                Step::Prev => {
                    page.send(&mut carousel, PageEvent::Click { target: prev });
                    expected = prev_index(expected, count);
                }
                Step::Dot(i) => {
                    let i = i % count;
                    page.send(&mut carousel, PageEvent::Click { target: dots[i] });
                    expected = i;
                }
                Step::Key(right) => {
                    let key = if right { Key::ArrowRight } else { Key::ArrowLeft };
                    page.send(&mut carousel, PageEvent::KeyDown {
                        target: Target::Node(container),
                        key,
                    });
                    expected = if right {
                        next_index(expected, count)
                    } else {
                        prev_index(expected, count)
                    };
                }
                Step::Hover(enter) => {
                    let event = if enter {
                        PageEvent::PointerEnter { target: container }
                    } else {
                        PageEvent::PointerLeave { target: container }
                    };
                    page.send(&mut carousel, event);
                    playing = !enter;
                }
                Step::Tick => {
                    page.tick(&mut carousel);
                    if playing {
                        expected = next_index(expected, count);
                    }
                }
            }
            prop_assert_eq!(carousel.current_index(), expected);
            prop_assert_eq!(carousel.is_playing(), playing);
            prop_assert_eq!(page.displayed(), vec![expected]);
        }
    }
}
