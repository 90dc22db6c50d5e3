#![forbid(unsafe_code)]

//! Document abstraction used by every controller.
//!
//! Controllers never hold browser objects. They address elements through
//! opaque [`NodeId`] handles handed out by a [`Dom`] implementation, which
//! lets the same controller code run against the real browser document on
//! `wasm32` and against an in-memory tree in tests.
//!
//! Selectors accepted by [`Dom::query`] and friends are deliberately small:
//! a comma-separated list of compound selectors built from an optional tag
//! name, an optional `#id` and any number of `.class` parts.

use core::fmt;

/// Opaque handle for one element owned by a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap a raw handle value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Viewport-relative bounding box of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Horizontal position of `client_x` inside the box as a percentage,
    /// clamped to `[0, 100]`.
    ///
    /// A box with no usable width yields `0`.
    #[must_use]
    pub fn horizontal_percent(&self, client_x: f64) -> f64 {
        if !(self.width.is_finite() && self.width > 0.0) || !client_x.is_finite() {
            return 0.0;
        }
        ((client_x - self.left) / self.width * 100.0).clamp(0.0, 100.0)
    }
}

/// Mutable view of a page document.
///
/// Implementations must tolerate stale handles: any operation on a node
/// that no longer exists is a silent no-op (queries return empty results).
pub trait Dom {
    /// First element in document order matching `selector`.
    fn query(&self, selector: &str) -> Option<NodeId>;

    /// Every element in document order matching `selector`.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// First descendant of `root` matching `selector`.
    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId>;

    /// Every descendant of `root` matching `selector`, in document order.
    fn query_all_within(&self, root: NodeId, selector: &str) -> Vec<NodeId>;

    /// Direct element children of `node`.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Parent element of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// The `<body>` element.
    fn body(&self) -> NodeId;

    /// Lower-case tag name of `node`.
    fn tag_name(&self, node: NodeId) -> String;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Insert `child` into `parent` right before `reference`.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId);

    /// Detach `node` (and its subtree) from the document.
    fn remove(&mut self, node: NodeId);

    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Inline style property (`clip-path`, `left`, `display`, ...).
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    fn text(&self, node: NodeId) -> String;
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Current value of a form control (`input`, `textarea`, `select`).
    fn value(&self, node: NodeId) -> String;
    fn set_value(&mut self, node: NodeId, value: &str);

    /// Checked state of a checkbox or radio input.
    fn is_checked(&self, node: NodeId) -> bool;

    /// Restore every control of `form` to its initial (empty) value.
    fn reset_form(&mut self, form: NodeId);

    fn focus(&mut self, node: NodeId);

    /// The element currently holding focus.
    fn focused(&self) -> Option<NodeId>;

    fn bounding_rect(&self, node: NodeId) -> ClientRect;

    /// Smoothly scroll the viewport so the top edge of `node` is visible.
    fn scroll_into_view(&mut self, node: NodeId);
}

/// Compound selector: optional tag, optional id, any number of classes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl SimpleSelector {
    /// Parse one compound selector such as `button.testimonial-nav.prev`.
    ///
    /// Returns `None` for empty input.
    #[must_use]
    pub fn parse(source: &str) -> Option<Self> {
        let source = source.trim();
        if source.is_empty() {
            return None;
        }
        let mut selector = Self::default();
        let mut rest = source;
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            selector.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '#' => selector.id = Some(name.to_owned()),
                _ => selector.classes.push(name.to_owned()),
            }
            rest = &body[end..];
        }
        Some(selector)
    }

    /// Parse a comma-separated selector list.
    #[must_use]
    pub fn parse_list(source: &str) -> Vec<Self> {
        source.split(',').filter_map(Self::parse).collect()
    }

    /// Whether an element with the given tag, id and class list matches.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, tag: &str, id: Option<&str>, classes: &[S]) -> bool {
        if let Some(want) = &self.tag
            && !want.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(want) = &self.id
            && id != Some(want.as_str())
        {
            return false;
        }
        self.classes
            .iter()
            .all(|want| classes.iter().any(|have| have.as_ref() == want))
    }
}
