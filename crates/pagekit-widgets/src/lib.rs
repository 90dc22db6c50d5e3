#![forbid(unsafe_code)]

//! Behaviour controllers for a brochure page.
//!
//! Each controller is mounted once against the page document, declares the
//! listeners it needs, and afterwards only reacts to the events, timers and
//! animation frames its host feeds it. Controllers never call each other.
//!
//! | Controller | Element contract |
//! |---|---|
//! | [`mobile_menu::MobileMenu`] | `#mobileMenuBtn`, `#navLinks`, `#menuOverlay` |
//! | [`before_after::BeforeAfterSlider`] | `.before-after` with `.before`, `.after`, `.slider` |
//! | [`carousel::TestimonialsCarousel`] | `.testimonials-slider` with two or more children |
//! | [`form::FormValidator`] | `#contactForm` |
//! | [`scroll_animator::ScrollAnimator`] | `.fade-in-section` elements |
//! | [`smooth_scroll::SmoothScroll`] | `a` elements whose `href` starts with `#` |

use pagekit_core::{Binding, Ctx, Dispatch, Observation, PageEvent, TimerId};

pub mod before_after;
pub mod carousel;
pub mod copyright_year;
pub mod form;
pub mod mobile_menu;
pub mod scroll_animator;
pub mod smooth_scroll;

#[cfg(test)]
pub(crate) mod test_support;

/// Shared interface of every page behaviour controller.
pub trait Controller {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Listeners the host must install for this controller.
    fn bindings(&self) -> Vec<Binding>;

    /// Elements the host must observe for viewport intersection.
    fn observations(&self) -> Vec<Observation> {
        Vec::new()
    }

    /// React to one page event. Events aimed at other controllers are ignored.
    fn handle(&mut self, event: &PageEvent, ctx: &mut Ctx<'_>) -> Dispatch;

    /// React to a fired timer. Returns `true` if the timer belonged to this
    /// controller.
    fn on_timer(&mut self, _id: TimerId, _ctx: &mut Ctx<'_>) -> bool {
        false
    }

    /// Apply deferred visual updates at an animation frame.
    fn on_frame(&mut self, _ctx: &mut Ctx<'_>) {}

    /// Cancel every timer and observation this controller created and give
    /// back shared resources. The controller is inert afterwards.
    fn teardown(&mut self, ctx: &mut Ctx<'_>);
}
