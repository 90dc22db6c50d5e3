#![forbid(unsafe_code)]

//! Smooth scrolling for same-page fragment links.

use pagekit_core::{Binding, Ctx, Dispatch, Dom, EventKind, Mount, NodeId, PageEvent};

use crate::Controller;

/// Whether clicks on an anchor with this `href` are intercepted.
#[must_use]
pub fn is_fragment_link(href: &str) -> bool {
    href.starts_with('#')
}

/// Whether `href` names a section to scroll to. The bare `#` placeholder is
/// intercepted but never scrolls.
#[must_use]
pub fn has_scroll_target(href: &str) -> bool {
    href.len() > 1 && is_fragment_link(href)
}

#[derive(Debug)]
pub struct SmoothScroll {
    anchors: Vec<(NodeId, String)>,
}

impl SmoothScroll {
    /// Collect every fragment anchor present at mount time. Never inactive.
    pub fn mount(dom: &dyn Dom) -> Mount<Self> {
        let anchors = dom
            .query_all("a")
            .into_iter()
            .filter_map(|anchor| {
                let href = dom.attribute(anchor, "href")?;
                is_fragment_link(&href).then_some((anchor, href))
            })
            .collect();
        Mount::Active(Self { anchors })
    }

    #[must_use]
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

impl Controller for SmoothScroll {
    fn name(&self) -> &'static str {
        "smooth-scroll"
    }

    fn bindings(&self) -> Vec<Binding> {
        self.anchors
            .iter()
            .map(|(anchor, _)| Binding::node(*anchor, EventKind::Click))
            .collect()
    }

    fn handle(&mut self, event: &PageEvent, ctx: &mut Ctx<'_>) -> Dispatch {
        let PageEvent::Click { target } = event else {
            return Dispatch::default();
        };
        let Some((_, href)) = self.anchors.iter().find(|(anchor, _)| anchor == target) else {
            return Dispatch::default();
        };
        if has_scroll_target(href) {
            match ctx.dom.query(href) {
                Some(section) => ctx.dom.scroll_into_view(section),
                None => tracing::debug!(%href, "fragment target not found"),
            }
        }
        Dispatch {
            prevent_default: true,
            ..Dispatch::default()
        }
    }

    fn teardown(&mut self, _ctx: &mut Ctx<'_>) {
        self.anchors.clear();
    }
}
