// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;

use crate::{History, Selector};

/// The document operations the pattern engine needs.
///
/// Implemented over `web_sys` in `patterns_web`, and by [`MemoryDocument`](crate::MemoryDocument)
/// for headless use and tests.
///
/// Implementations must be lenient: operations on nodes that were removed from the
/// document never panic, they either do nothing or report `false` / `None`.
pub trait Dom {
    /// A cheap handle to an element.
    type Node: Clone + PartialEq + Debug;

    /// The `<body>` element.
    fn body(&self) -> Self::Node;

    /// The root (`<html>`) element.
    fn root(&self) -> Self::Node;

    /// The connected element whose `id` is `id`.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Every connected element matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<Self::Node>;

    /// Every descendant of `node` matching `selector`, in document order.
    fn query_within(&self, node: &Self::Node, selector: &Selector) -> Vec<Self::Node>;

    /// Whether `node` matches `selector`.
    fn matches(&self, node: &Self::Node, selector: &Selector) -> bool;

    /// The nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &Selector) -> Option<Self::Node>;

    /// The parent element of `node`.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// The upper case tag name, as `Element.tagName` reports it for HTML elements.
    fn tag_name(&self, node: &Self::Node) -> String;

    /// The value of attribute `name`.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Set attribute `name` to `value`.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Remove attribute `name`, if present.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// The text content of `node`.
    fn text(&self, node: &Self::Node) -> String;

    /// Replace the children of `node` with the text `text`.
    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Whether `class` is in the class list of `node`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Add `class` to the class list of `node`.
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Remove `class` from the class list of `node`.
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    /// Flip the presence of `class`, returning whether it is now present.
    fn toggle_class(&mut self, node: &Self::Node, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// Whether `node` is still part of the document.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Move keyboard focus to `node` without scrolling.
    ///
    /// Returns `false` and does nothing if the node is detached.
    fn focus(&mut self, node: &Self::Node) -> bool;

    /// Scroll the page so that `node` is visible.
    fn scroll_into_view(&mut self, node: &Self::Node);

    /// Horizontally scroll `container` so that `node` is at its leading edge.
    fn scroll_into_view_within(&mut self, container: &Self::Node, node: &Self::Node);

    /// The node referenced by a `#fragment` or a bare id, if it is connected.
    fn resolve_reference(&self, reference: &str) -> Option<Self::Node> {
        let id = reference.strip_prefix('#').unwrap_or(reference);
        if id.is_empty() {
            return None;
        }
        self.element_by_id(id)
    }
}

/// The page state handed to every engine operation and hook.
///
/// This bundles the document with the navigable history for the duration of one event dispatch.
pub struct PageCtx<'a, D: Dom> {
    /// The document.
    pub dom: &'a mut D,
    /// The browser history and address.
    pub history: &'a mut dyn History,
}

impl<'a, D: Dom> PageCtx<'a, D> {
    /// Bundle a document and a history.
    pub fn new(dom: &'a mut D, history: &'a mut dyn History) -> Self {
        Self { dom, history }
    }

    /// Reborrow for a nested call.
    pub fn reborrow(&mut self) -> PageCtx<'_, D> {
        PageCtx {
            dom: &mut *self.dom,
            history: &mut *self.history,
        }
    }
}

impl<D: Dom> Debug for PageCtx<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCtx")
            .field("hash", &self.history.hash())
            .finish_non_exhaustive()
    }
}
