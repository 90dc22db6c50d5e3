#![forbid(unsafe_code)]

//! In-memory [`Dom`] for headless hosts and tests.
//!
//! Elements live in an arena indexed by [`NodeId`]; removed elements keep
//! their slot so stale handles stay harmless. Besides the [`Dom`] trait the
//! tree exposes a few builder and inspection helpers (`append`, `set_rect`,
//! `scroll_log`, ...) that tests use to stage a page and check outcomes.

use std::collections::BTreeMap;

use crate::dom::{ClientRect, Dom, NodeId, SimpleSelector};

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    rect: ClientRect,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MemoryDom {
    elements: Vec<Element>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    scrolled: Vec<NodeId>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document: `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            elements: Vec::new(),
            root: NodeId::new(0),
            body: NodeId::new(0),
            focused: None,
            scrolled: Vec::new(),
        };
        dom.root = dom.alloc("html");
        dom.body = dom.alloc("body");
        dom.link(dom.root, dom.body);
        dom
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId::new(self.elements.len() as u32);
        self.elements.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        });
        id
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.get() as usize)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(node.get() as usize)
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).and_then(|el| el.parent) else {
            return;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|child| *child != node);
        }
        if let Some(el) = self.get_mut(node) {
            el.parent = None;
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.get(node).and_then(|el| el.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .get(root)
            .map(|el| el.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(el) = self.get(node) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    fn matches_any(&self, node: NodeId, selectors: &[SimpleSelector]) -> bool {
        let Some(el) = self.get(node) else {
            return false;
        };
        let id = el.attributes.get("id").map(String::as_str);
        selectors
            .iter()
            .any(|sel| sel.matches(&el.tag, id, &el.classes))
    }

    fn select(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let selectors = SimpleSelector::parse_list(selector);
        self.descendants(root)
            .into_iter()
            .filter(|node| self.matches_any(*node, &selectors))
            .collect()
    }

    // --- builder helpers ---------------------------------------------------

    /// Create a `tag` element and append it to `parent`.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.append_child(parent, node);
        node
    }

    /// Create a `tag` element with attributes and append it to `parent`.
    ///
    /// A `class` attribute is split into the class list.
    pub fn append_with(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.append(parent, tag);
        for (name, value) in attrs {
            self.set_attribute(node, name, value);
        }
        node
    }

    /// Set the layout box reported by [`Dom::bounding_rect`].
    pub fn set_rect(&mut self, node: NodeId, rect: ClientRect) {
        if let Some(el) = self.get_mut(node) {
            el.rect = rect;
        }
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(el) = self.get_mut(node) {
            el.checked = checked;
        }
    }

    /// Elements passed to [`Dom::scroll_into_view`], oldest first.
    #[must_use]
    pub fn scroll_log(&self) -> &[NodeId] {
        &self.scrolled
    }

    /// Whether `node` is currently part of the document.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.is_ancestor(self.root, node)
    }

    /// Class list of `node` in insertion order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.get(node).map(|el| el.classes.clone()).unwrap_or_default()
    }
}

impl Dom for MemoryDom {
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.select(self.root, selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(self.root, selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.select(root, selector).into_iter().next()
    }

    fn query_all_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.select(root, selector)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node).map(|el| el.children.clone()).unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|el| el.parent)
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.get(node).map(|el| el.tag.clone()).unwrap_or_default()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || parent == child || self.is_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        self.link(parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if self.parent(reference) != Some(parent) || child == reference {
            self.append_child(parent, child);
            return;
        }
        if self.is_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            let index = el
                .children
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(el.children.len());
            el.children.insert(index, child);
        }
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.root || node == self.body {
            return;
        }
        if let Some(focused) = self.focused
            && (focused == node || self.is_ancestor(node, focused))
        {
            self.focused = None;
        }
        self.detach(node);
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node)
            && !el.classes.iter().any(|c| c == class)
        {
            el.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let el = self.get(node)?;
        if name == "class" {
            return (!el.classes.is_empty()).then(|| el.classes.join(" "));
        }
        el.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.get_mut(node) else {
            return;
        };
        if name == "class" {
            el.classes = value.split_whitespace().map(str::to_owned).collect();
        } else {
            el.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(el) = self.get_mut(node) else {
            return;
        };
        if name == "class" {
            el.classes.clear();
        } else {
            el.attributes.remove(name);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.get(node)?.styles.get(property).cloned()
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.styles.insert(property.to_owned(), value.to_owned());
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.get(node).map(|el| el.text.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.get_mut(node) {
            el.text = text.to_owned();
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.get(node).map(|el| el.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.value = value.to_owned();
        }
    }

    fn is_checked(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|el| el.checked)
    }

    fn reset_form(&mut self, form: NodeId) {
        for node in self.select(form, "input, textarea, select") {
            if let Some(el) = self.get_mut(node) {
                el.value = el.attributes.get("value").cloned().unwrap_or_default();
                el.checked = el.attributes.contains_key("checked");
            }
        }
    }

    fn focus(&mut self, node: NodeId) {
        if self.get(node).is_some() {
            self.focused = Some(node);
        }
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn bounding_rect(&self, node: NodeId) -> ClientRect {
        self.get(node).map(|el| el.rect).unwrap_or_default()
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        self.scrolled.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn queries_follow_document_order() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let section = dom.append_with(body, "section", &[("class", "fade-in-section")]);
        let inner = dom.append_with(section, "div", &[("class", "fade-in-section")]);
        let later = dom.append_with(body, "div", &[("class", "fade-in-section")]);

        assert_eq!(dom.query_all(".fade-in-section"), vec![section, inner, later]);
        assert_eq!(dom.query_within(section, ".fade-in-section"), Some(inner));
        assert_eq!(dom.query("#missing"), None);
    }

    #[test]
    fn detached_nodes_are_not_found() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let loose = dom.create_element("div");
        dom.set_attribute(loose, "id", "loose");
        assert_eq!(dom.query("#loose"), None);

        dom.append_child(body, loose);
        assert_eq!(dom.query("#loose"), Some(loose));

        dom.remove(loose);
        assert_eq!(dom.query("#loose"), None);
        assert!(!dom.is_attached(loose));
    }

    #[test]
    fn insert_before_places_sibling() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let a = dom.append(body, "p");
        let b = dom.append(body, "p");
        let banner = dom.create_element("div");
        dom.insert_before(body, banner, b);
        assert_eq!(dom.children(body), vec![a, banner, b]);
    }

    #[test]
    fn class_attribute_round_trips_through_class_list() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let node = dom.append_with(body, "button", &[("class", "testimonial-nav prev")]);
        assert!(dom.has_class(node, "prev"));
        dom.add_class(node, "active");
        dom.add_class(node, "active");
        assert_eq!(
            dom.attribute(node, "class").as_deref(),
            Some("testimonial-nav prev active")
        );
    }

    #[test]
    fn reset_form_restores_defaults() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let form = dom.append(body, "form");
        let name = dom.append_with(form, "input", &[("name", "name")]);
        let plan = dom.append_with(form, "input", &[("name", "plan"), ("value", "basic")]);
        dom.set_value(name, "Ada");
        dom.set_value(plan, "pro");
        dom.reset_form(form);
        assert_eq!(dom.value(name), "");
        assert_eq!(dom.value(plan), "basic");
    }

    #[test]
    fn removing_focused_subtree_clears_focus() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let nav = dom.append(body, "nav");
        let link = dom.append(nav, "a");
        dom.focus(link);
        dom.remove(nav);
        assert_eq!(dom.focused(), None);
    }
}
