#![forbid(unsafe_code)]

//! Canonical page events pushed by the host.
//!
//! The host (browser glue on `wasm32`, a test harness elsewhere) listens to
//! the [`Binding`]s every controller declares and converts each native event
//! into one [`PageEvent`]. The element a listener was attached to is the
//! event target, matching `currentTarget` rather than `target`: a click on an
//! icon inside the menu button is reported as a click on the button.

use crate::dom::NodeId;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Window,
    Document,
    Node(NodeId),
}

/// Kind of native event a listener handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    MouseEnter,
    MouseLeave,
    Blur,
    Input,
    Submit,
    Resize,
    VisibilityChange,
}

impl EventKind {
    /// DOM event type name.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Blur => "blur",
            Self::Input => "input",
            Self::Submit => "submit",
            Self::Resize => "resize",
            Self::VisibilityChange => "visibilitychange",
        }
    }
}

/// One listener a controller needs the host to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub target: Target,
    pub kind: EventKind,
}

impl Binding {
    #[must_use]
    pub const fn new(target: Target, kind: EventKind) -> Self {
        Self { target, kind }
    }

    #[must_use]
    pub const fn node(node: NodeId, kind: EventKind) -> Self {
        Self::new(Target::Node(node), kind)
    }
}

/// Keyboard key, reduced to the keys controllers react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Input device behind a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// A normalized page event.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click {
        target: NodeId,
    },
    KeyDown {
        target: Target,
        key: Key,
    },
    /// Mouse down or first touch point on an element.
    PointerDown {
        target: NodeId,
        client_x: f64,
        source: PointerSource,
    },
    /// Document-level pointer movement.
    PointerMove {
        client_x: f64,
        source: PointerSource,
    },
    /// Document-level pointer release.
    PointerUp {
        source: PointerSource,
    },
    PointerEnter {
        target: NodeId,
    },
    PointerLeave {
        target: NodeId,
    },
    Blur {
        target: NodeId,
    },
    Input {
        target: NodeId,
    },
    Submit {
        target: NodeId,
    },
    /// Window resize with the new `innerWidth` in CSS pixels.
    Resize {
        width: f64,
    },
    VisibilityChange {
        hidden: bool,
    },
    /// Intersection observer entry for an observed element.
    Intersection {
        target: NodeId,
        is_intersecting: bool,
    },
}

/// Host-visible result of dispatching one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// The host must call `preventDefault()` on the native event.
    pub prevent_default: bool,
    /// Elements the host must stop observing for intersection.
    pub unobserve: Vec<NodeId>,
}

impl Dispatch {
    /// Fold another controller's result into this one.
    pub fn merge(&mut self, other: Self) {
        self.prevent_default |= other.prevent_default;
        self.unobserve.extend(other.unobserve);
    }
}

/// An element the host must watch for viewport intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub target: NodeId,
    /// Fraction of the element that must be visible, in `[0, 1]`.
    pub threshold: f64,
}
