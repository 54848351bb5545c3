// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use patterns_core::{Dom, Selector};
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt, intern};
use web_sys::{
    Element, FocusOptions, HtmlElement, NodeList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollToOptions,
};

/// The live document.
///
/// Selectors are handed to the browser in their canonical form, so matching is done by the
/// browser's own selector engine.
#[derive(Clone, Debug)]
pub struct WebDom {
    document: web_sys::Document,
}

impl WebDom {
    /// The document of the current window.
    pub fn new() -> Self {
        Self::from_document(gloo::utils::document())
    }

    /// Wrap `document`.
    pub fn from_document(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The wrapped document.
    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }
}

impl Default for WebDom {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn report(result: Result<(), JsValue>, operation: &str) {
    if let Err(err) = result {
        tracing::warn!(operation, ?err, "DOM operation failed");
    }
}

fn elements(list: Result<NodeList, JsValue>, selector: &Selector) -> Vec<Element> {
    let list = match list {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(%selector, ?err, "selector rejected by the browser");
            return Vec::new();
        }
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Dom for WebDom {
    type Node = Element;

    fn body(&self) -> Element {
        self.document.body().unwrap_throw().into()
    }

    fn root(&self) -> Element {
        self.document.document_element().unwrap_throw()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        elements(
            self.document.query_selector_all(&selector.to_string()),
            selector,
        )
    }

    fn query_within(&self, node: &Element, selector: &Selector) -> Vec<Element> {
        elements(node.query_selector_all(&selector.to_string()), selector)
    }

    fn matches(&self, node: &Element, selector: &Selector) -> bool {
        node.matches(&selector.to_string()).unwrap_or_default()
    }

    fn closest(&self, node: &Element, selector: &Selector) -> Option<Element> {
        node.closest(&selector.to_string()).ok().flatten()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn tag_name(&self, node: &Element) -> String {
        node.tag_name()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(intern(name))
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        report(node.set_attribute(intern(name), value), "setAttribute");
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        report(node.remove_attribute(intern(name)), "removeAttribute");
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        report(node.class_list().add_1(class), "classList.add");
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        report(node.class_list().remove_1(class), "classList.remove");
    }

    fn toggle_class(&mut self, node: &Element, class: &str) -> bool {
        match node.class_list().toggle(class) {
            Ok(present) => present,
            Err(err) => {
                tracing::warn!(class, ?err, "classList.toggle failed");
                self.has_class(node, class)
            }
        }
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn focus(&mut self, node: &Element) -> bool {
        if !node.is_connected() {
            return false;
        }
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            tracing::trace!(tag = %node.tag_name(), "not focusable");
            return false;
        };
        let options = FocusOptions::new();
        options.set_prevent_scroll(true);
        report(element.focus_with_options(&options), "focus");
        true
    }

    fn scroll_into_view(&mut self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn scroll_into_view_within(&mut self, container: &Element, node: &Element) {
        let (Some(container), Some(item)) = (
            container.dyn_ref::<HtmlElement>(),
            node.dyn_ref::<HtmlElement>(),
        ) else {
            return;
        };
        let options = ScrollToOptions::new();
        options.set_left(f64::from(item.offset_left() - container.offset_left()));
        options.set_behavior(ScrollBehavior::Smooth);
        container.scroll_to_with_scroll_to_options(&options);
    }
}
