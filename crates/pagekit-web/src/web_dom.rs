#![forbid(unsafe_code)]

//! [`Dom`] over the browser document via `web-sys`.
//!
//! Elements are interned in a registry the first time they cross the
//! boundary; a [`NodeId`] is an index into it. Each interned element carries
//! its index in a JS expando property, so looking an element up is one
//! property read rather than a scan. Removing an element releases its slot
//! and the slots of every interned descendant, so detached nodes can be
//! collected. Only compiled on `wasm32` targets.

use std::cell::RefCell;

use js_sys::Reflect;
use pagekit_core::{ClientRect, Dom, NodeId, PageError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, Node, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
};

/// Handle returned when the browser refuses to create an element. Every
/// operation on it is a no-op.
const DETACHED: NodeId = NodeId::new(u32::MAX);

/// Expando property holding an element's registry index.
const SLOT_KEY: &str = "__pagekitNode";

pub struct WebDom {
    document: Document,
    body: NodeId,
    nodes: RefCell<Vec<Option<Element>>>,
}

impl WebDom {
    /// Wrap `document`. Fails if the document has no `<body>`.
    pub fn new(document: Document) -> Result<Self, PageError> {
        let body: Element = document
            .body()
            .ok_or_else(|| PageError::missing("page", "body"))?
            .into();
        let dom = Self {
            document,
            body: NodeId::new(0),
            nodes: RefCell::new(Vec::new()),
        };
        dom.node_id(&body);
        Ok(dom)
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The element behind `node`, unless it was never interned or has been
    /// removed.
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node.get() as usize).cloned().flatten()
    }

    /// Number of elements currently held by the registry.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.nodes.borrow().iter().filter(|slot| slot.is_some()).count()
    }

    /// Id for `element`, interning it on first sight.
    ///
    /// Slots are never reused, so an id held for a removed element can not
    /// alias a newer one.
    pub fn node_id(&self, element: &Element) -> NodeId {
        let key = JsValue::from_str(SLOT_KEY);
        let stamped = Reflect::get(element, &key)
            .ok()
            .and_then(|value| value.as_f64())
            .filter(|index| *index >= 0.0 && *index < f64::from(u32::MAX))
            .map(|index| index as u32);
        let mut nodes = self.nodes.borrow_mut();
        if let Some(index) = stamped
            && nodes
                .get(index as usize)
                .is_some_and(|slot| slot.as_ref() == Some(element))
        {
            return NodeId::new(index);
        }
        let index = nodes.len() as u32;
        nodes.push(Some(element.clone()));
        let _ = Reflect::set(element, &key, &JsValue::from_f64(f64::from(index)));
        NodeId::new(index)
    }

    /// Drop `element` and every interned descendant from the registry.
    fn release(&self, element: &Element) {
        let key = JsValue::from_str(SLOT_KEY);
        for slot in self.nodes.borrow_mut().iter_mut() {
            let inside = slot.as_ref().is_some_and(|known| {
                let known: &Node = known;
                element.contains(Some(known))
            });
            if inside && let Some(known) = slot.take() {
                let _ = Reflect::delete_property(&known, &key);
            }
        }
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn collect(&self, list: &web_sys::NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.node_id(&element))
            .collect()
    }
}

impl Dom for WebDom {
    fn query(&self, selector: &str) -> Option<NodeId> {
        let element = self.document.query_selector(selector).ok().flatten()?;
        Some(self.node_id(&element))
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.document
            .query_selector_all(selector)
            .map(|list| self.collect(&list))
            .unwrap_or_default()
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let element = self.element(root)?.query_selector(selector).ok().flatten()?;
        Some(self.node_id(&element))
    }

    fn query_all_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.element(root)
            .and_then(|root| root.query_selector_all(selector).ok())
            .map(|list| self.collect(&list))
            .unwrap_or_default()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(element) = self.element(node) else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .map(|child| self.node_id(&child))
            .collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node)?.parent_element()?;
        Some(self.node_id(&parent))
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node)
            .map(|element| element.tag_name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        match self.document.create_element(tag) {
            Ok(element) => self.node_id(&element),
            Err(err) => {
                tracing::error!(tag, ?err, "create_element failed");
                DETACHED
            }
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            let _ = parent.append_child(&child);
        }
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            let reference = self.element(reference);
            let _ = parent.insert_before(&child, reference.as_deref());
        }
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        if let Some(element) = self.element(node) {
            element.remove();
            self.release(&element);
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.set_attribute(name, value);
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.remove_attribute(name);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.html(node)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.html(node) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|element| element.text_content())
            .unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.element(node) {
            element.set_text_content(Some(text));
        }
    }

    fn value(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        let Some(element) = self.element(node) else {
            return;
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        }
    }

    fn is_checked(&self, node: NodeId) -> bool {
        self.element(node)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            .is_some_and(|input| input.checked())
    }

    fn reset_form(&mut self, form: NodeId) {
        if let Some(form) = self
            .element(form)
            .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
        {
            form.reset();
        }
    }

    fn focus(&mut self, node: NodeId) {
        if let Some(element) = self.html(node) {
            let _ = element.focus();
        }
    }

    fn focused(&self) -> Option<NodeId> {
        let active = self.document.active_element()?;
        Some(self.node_id(&active))
    }

    fn bounding_rect(&self, node: NodeId) -> ClientRect {
        self.element(node)
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                ClientRect::new(rect.left(), rect.top(), rect.width(), rect.height())
            })
            .unwrap_or_default()
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        if let Some(element) = self.element(node) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            element.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}
