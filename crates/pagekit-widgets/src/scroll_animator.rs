#![forbid(unsafe_code)]

//! One-shot fade-in on first viewport intersection.

use pagekit_core::{
    Binding, Ctx, Dispatch, Dom, Mount, NodeId, Observation, PageConfig, PageError, PageEvent,
};

use crate::Controller;

pub const SECTION_SELECTOR: &str = ".fade-in-section";
pub const VISIBLE_CLASS: &str = "is-visible";

#[derive(Debug)]
pub struct ScrollAnimator {
    pending: Vec<NodeId>,
    threshold: f64,
}

impl ScrollAnimator {
    pub fn mount(dom: &dyn Dom, config: &PageConfig) -> Mount<Self> {
        let pending = dom.query_all(SECTION_SELECTOR);
        if pending.is_empty() {
            return Mount::from(Err::<Self, _>(PageError::missing(
                "scroll-animator",
                SECTION_SELECTOR,
            )));
        }
        Mount::Active(Self {
            pending,
            threshold: config.reveal_threshold,
        })
    }

    /// Elements still waiting for their first intersection.
    #[must_use]
    pub fn pending(&self) -> &[NodeId] {
        &self.pending
    }
}

impl Controller for ScrollAnimator {
    fn name(&self) -> &'static str {
        "scroll-animator"
    }

    fn bindings(&self) -> Vec<Binding> {
        Vec::new()
    }

    fn observations(&self) -> Vec<Observation> {
        self.pending
            .iter()
            .map(|target| Observation {
                target: *target,
                threshold: self.threshold,
            })
            .collect()
    }

    fn handle(&mut self, event: &PageEvent, ctx: &mut Ctx<'_>) -> Dispatch {
        let PageEvent::Intersection {
            target,
            is_intersecting: true,
        } = event
        else {
            return Dispatch::default();
        };
        let Some(index) = self.pending.iter().position(|node| node == target) else {
            return Dispatch::default();
        };
        self.pending.remove(index);
        ctx.dom.add_class(*target, VISIBLE_CLASS);
        tracing::debug!(node = %target, "section revealed");
        Dispatch {
            unobserve: vec![*target],
            ..Dispatch::default()
        }
    }

    fn teardown(&mut self, _ctx: &mut Ctx<'_>) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use pretty_assertions::assert_eq;

    fn sections(h: &mut Harness, n: usize) -> Vec<NodeId> {
        let body = h.dom.body();
        (0..n)
            .map(|_| h.dom.append_with(body, "section", &[("class", "fade-in-section")]))
            .collect()
    }

    #[test]
    fn observes_every_section_at_threshold() {
        let mut h = Harness::new();
        let nodes = sections(&mut h, 3);
        let animator = ScrollAnimator::mount(&h.dom, &PageConfig::default())
            .into_active()
            .unwrap();
        let observed: Vec<_> = animator.observations().iter().map(|o| o.target).collect();
        assert_eq!(observed, nodes);
        assert!(animator.observations().iter().all(|o| o.threshold == 0.1));
    }

    #[test]
    fn first_intersection_reveals_and_unobserves() {
        let mut h = Harness::new();
        let nodes = sections(&mut h, 2);
        let mut animator = ScrollAnimator::mount(&h.dom, &PageConfig::default())
            .into_active()
            .unwrap();

        let out = h.dispatch(
            &mut animator,
            PageEvent::Intersection {
                target: nodes[1],
                is_intersecting: true,
            },
        );
        assert_eq!(out.unobserve, vec![nodes[1]]);
        assert!(h.dom.has_class(nodes[1], VISIBLE_CLASS));
        assert!(!h.dom.has_class(nodes[0], VISIBLE_CLASS));
        assert_eq!(animator.pending(), &[nodes[0]]);
    }

    #[test]
    fn leaving_and_reentering_changes_nothing() {
        let mut h = Harness::new();
        let nodes = sections(&mut h, 1);
        let mut animator = ScrollAnimator::mount(&h.dom, &PageConfig::default())
            .into_active()
            .unwrap();
        let enter = PageEvent::Intersection {
            target: nodes[0],
            is_intersecting: true,
        };
        h.dispatch(&mut animator, enter.clone());
        h.dispatch(
            &mut animator,
            PageEvent::Intersection {
                target: nodes[0],
                is_intersecting: false,
            },
        );
        let again = h.dispatch(&mut animator, enter);
        assert!(again.unobserve.is_empty());
        assert_eq!(h.dom.classes(nodes[0]), vec!["fade-in-section", VISIBLE_CLASS]);
    }

    #[test]
    fn non_intersecting_report_is_ignored() {
        let mut h = Harness::new();
        let nodes = sections(&mut h, 1);
        let mut animator = ScrollAnimator::mount(&h.dom, &PageConfig::default())
            .into_active()
            .unwrap();
        let out = h.dispatch(
            &mut animator,
            PageEvent::Intersection {
                target: nodes[0],
                is_intersecting: false,
            },
        );
        assert!(out.unobserve.is_empty());
        assert_eq!(animator.pending().len(), 1);
    }

    #[test]
    fn empty_page_is_inactive() {
        let h = Harness::new();
        assert!(!ScrollAnimator::mount(&h.dom, &PageConfig::default()).is_active());
    }
}
