// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory implementations of [`Dom`], [`History`] and [`Storage`].
//!
//! These are used to run the engine headlessly, most importantly in tests.
//! The document is an arena: elements are never deallocated, removing an element
//! only detaches it from its parent, so stale handles stay valid and simply report
//! themselves as disconnected.

use hashbrown::HashMap;
use url::form_urlencoded;

use crate::{Dom, History, Selector, SelectorSubject, Storage};

/// Handle to an element of a [`MemoryDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug)]
struct ElementData {
    /// Upper case.
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// A side effect the document recorded instead of performing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// An element received focus.
    Focus(ElementId),
    /// The page was scrolled to an element.
    ScrollIntoView(ElementId),
    /// A container was scrolled horizontally to one of its descendants.
    ScrollWithin {
        /// The scrolled container.
        container: ElementId,
        /// The element brought to the leading edge.
        node: ElementId,
    },
}

/// Description of an element to create, see [`MemoryDocument::append`].
#[derive(Clone, Debug)]
pub struct ElementTemplate {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
}

impl ElementTemplate {
    /// An element with tag `tag` and no attributes.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        set_attr(&mut self.attributes, name, value);
        self
    }

    /// Add a class.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let mut classes = class_list(&self.attributes);
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_owned());
        }
        set_attr(&mut self.attributes, "class", &classes.join(" "));
        self
    }

    /// Shorthand for `.attr("id", id)`.
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Set the text content.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        text.clone_into(&mut self.text);
        self
    }
}

fn set_attr(attributes: &mut Vec<(String, String)>, name: &str, value: &str) {
    match attributes.iter_mut().find(|(n, _)| n == name) {
        Some((_, v)) => *v = value.to_owned(),
        None => attributes.push((name.to_owned(), value.to_owned())),
    }
}

fn class_list(attributes: &[(String, String)]) -> Vec<String> {
    attributes
        .iter()
        .find(|(n, _)| n == "class")
        .map(|(_, v)| v.split_ascii_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

/// An arena-backed document tree with an `<html>` root and a `<body>`.
///
/// Removing the last class removes the `class` attribute, so toggling twice restores the
/// exact attribute set.
#[derive(Debug)]
pub struct MemoryDocument {
    elements: Vec<ElementData>,
    root: ElementId,
    body: ElementId,
    focused: Option<ElementId>,
    effects: Vec<Effect>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty document: `<html><body></body></html>`.
    pub fn new() -> Self {
        let mut doc = Self {
            elements: Vec::new(),
            root: ElementId(0),
            body: ElementId(0),
            focused: None,
            effects: Vec::new(),
        };
        let root = doc.create(ElementTemplate::new("html"));
        let body = doc.append(root, ElementTemplate::new("body"));
        doc.root = root;
        doc.body = body;
        doc
    }

    /// Create a detached element.
    pub fn create(&mut self, template: ElementTemplate) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(ElementData {
            tag: template.tag,
            attributes: template.attributes,
            text: template.text,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create an element and append it as the last child of `parent`.
    pub fn append(&mut self, parent: ElementId, template: ElementTemplate) -> ElementId {
        let id = self.create(template);
        self.append_child(parent, id);
        id
    }

    /// Move `child` to be the last child of `parent`.
    ///
    /// Does nothing if that would create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(data) = self.elements.get_mut(parent.0) {
            data.children.push(child);
        }
        if let Some(data) = self.elements.get_mut(child.0) {
            data.parent = Some(parent);
        }
    }

    /// Detach `node` (and its subtree) from the document.
    pub fn detach(&mut self, node: ElementId) {
        let Some(parent) = self.elements.get(node.0).and_then(|data| data.parent) else {
            return;
        };
        self.elements[parent.0].children.retain(|&c| c != node);
        self.elements[node.0].parent = None;
        if self
            .focused
            .is_some_and(|focused| self.is_inclusive_ancestor(node, focused))
        {
            self.focused = None;
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: ElementId, mut node: ElementId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.elements.get(node.0).and_then(|data| data.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// The element that currently has focus.
    pub fn active_element(&self) -> Option<ElementId> {
        self.focused
    }

    /// Drain the recorded focus and scroll effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// The class list of `node`, in order.
    pub fn classes(&self, node: ElementId) -> Vec<String> {
        self.elements
            .get(node.0)
            .map(|data| class_list(&data.attributes))
            .unwrap_or_default()
    }

    /// All attributes of `node`, sorted by name so that snapshots compare structurally.
    pub fn attributes(&self, node: ElementId) -> Vec<(String, String)> {
        let mut attributes = self
            .elements
            .get(node.0)
            .map(|data| data.attributes.clone())
            .unwrap_or_default();
        attributes.sort();
        attributes
    }

    fn subject(&self, id: ElementId) -> Subject<'_> {
        Subject { doc: self, id }
    }

    fn data(&self, id: ElementId) -> Option<&ElementData> {
        self.elements.get(id.0)
    }

    /// Descendants of `node` in document (pre-)order, excluding `node` itself.
    fn descendants(&self, node: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self
            .data(node)
            .map(|data| data.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(data) = self.data(id) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        out
    }
}

#[derive(Clone, Copy)]
struct Subject<'a> {
    doc: &'a MemoryDocument,
    id: ElementId,
}

impl SelectorSubject for Subject<'_> {
    fn tag_name(&self) -> &str {
        self.doc.data(self.id).map_or("", |data| data.tag.as_str())
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.doc
            .data(self.id)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.doc.data(self.id)?.parent?;
        Some(self.doc.subject(parent))
    }
}

impl Dom for MemoryDocument {
    type Node = ElementId;

    fn body(&self) -> ElementId {
        self.body
    }

    fn root(&self) -> ElementId {
        self.root
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&node| self.subject(node).attribute("id") == Some(id))
    }

    fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&node| selector.matches(&self.subject(node)))
            .collect()
    }

    fn query_within(&self, node: &ElementId, selector: &Selector) -> Vec<ElementId> {
        self.descendants(*node)
            .into_iter()
            .filter(|&child| selector.matches(&self.subject(child)))
            .collect()
    }

    fn matches(&self, node: &ElementId, selector: &Selector) -> bool {
        self.data(*node).is_some() && selector.matches(&self.subject(*node))
    }

    fn closest(&self, node: &ElementId, selector: &Selector) -> Option<ElementId> {
        let mut current = Some(*node);
        while let Some(id) = current {
            if self.matches(&id, selector) {
                return Some(id);
            }
            current = self.data(id)?.parent;
        }
        None
    }

    fn parent(&self, node: &ElementId) -> Option<ElementId> {
        self.data(*node)?.parent
    }

    fn tag_name(&self, node: &ElementId) -> String {
        self.data(*node)
            .map(|data| data.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: &ElementId, name: &str) -> Option<String> {
        self.subject(*node).attribute(name).map(str::to_owned)
    }

    fn set_attribute(&mut self, node: &ElementId, name: &str, value: &str) {
        if let Some(data) = self.elements.get_mut(node.0) {
            set_attr(&mut data.attributes, name, value);
        }
    }

    fn remove_attribute(&mut self, node: &ElementId, name: &str) {
        if let Some(data) = self.elements.get_mut(node.0) {
            data.attributes.retain(|(n, _)| n != name);
        }
    }

    fn text(&self, node: &ElementId) -> String {
        std::iter::once(*node)
            .chain(self.descendants(*node))
            .filter_map(|id| self.data(id))
            .map(|data| data.text.as_str())
            .collect()
    }

    fn set_text(&mut self, node: &ElementId, text: &str) {
        let Some(data) = self.elements.get_mut(node.0) else {
            return;
        };
        text.clone_into(&mut data.text);
        for child in std::mem::take(&mut data.children) {
            self.elements[child.0].parent = None;
        }
        if self
            .focused
            .is_some_and(|focused| !self.is_inclusive_ancestor(self.root, focused))
        {
            self.focused = None;
        }
    }

    fn has_class(&self, node: &ElementId, class: &str) -> bool {
        self.classes(*node).iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: &ElementId, class: &str) {
        let mut classes = self.classes(*node);
        if classes.iter().any(|c| c == class) {
            return;
        }
        classes.push(class.to_owned());
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn remove_class(&mut self, node: &ElementId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let mut classes = self.classes(*node);
        classes.retain(|c| c != class);
        if classes.is_empty() {
            self.remove_attribute(node, "class");
        } else {
            self.set_attribute(node, "class", &classes.join(" "));
        }
    }

    fn is_connected(&self, node: &ElementId) -> bool {
        self.data(*node).is_some() && self.is_inclusive_ancestor(self.root, *node)
    }

    fn focus(&mut self, node: &ElementId) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        self.focused = Some(*node);
        self.effects.push(Effect::Focus(*node));
        true
    }

    fn scroll_into_view(&mut self, node: &ElementId) {
        if self.is_connected(node) {
            self.effects.push(Effect::ScrollIntoView(*node));
        }
    }

    fn scroll_into_view_within(&mut self, container: &ElementId, node: &ElementId) {
        if self.is_connected(node) && self.is_inclusive_ancestor(*container, *node) {
            self.effects.push(Effect::ScrollWithin {
                container: *container,
                node: *node,
            });
        }
    }
}

// --- MARK: HISTORY ---

/// A parsed same-document location: path, query and fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// The path, always starting with `/`.
    pub path: String,
    /// Query parameters in order.
    pub query: Vec<(String, String)>,
    /// The fragment without `#`, empty if absent.
    pub hash: String,
}

impl Location {
    /// Parse `path?query#hash`. The query is decoded like `URLSearchParams` does.
    pub fn parse(url: &str) -> Self {
        let (rest, hash) = url.split_once('#').unwrap_or((url, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let query = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self {
            path: if path.is_empty() { "/".to_owned() } else { path.to_owned() },
            query,
            hash: hash.to_owned(),
        }
    }

    /// The location as `path?query#hash`, omitting empty parts.
    pub fn href(&self) -> String {
        let mut href = self.path.clone();
        if !self.query.is_empty() {
            href.push('?');
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            href.push_str(&query);
        }
        if !self.hash.is_empty() {
            href.push('#');
            href.push_str(&self.hash);
        }
        href
    }
}

/// A session history stack for a single document.
///
/// [`back`](Self::back) and [`forward`](Self::forward) move through the entries the way the
/// browser buttons do; the caller is responsible for delivering the resulting `popstate`.
#[derive(Clone, Debug)]
pub struct MemoryHistory {
    entries: Vec<Location>,
    index: usize,
}

impl MemoryHistory {
    /// A history with a single entry for `url`.
    pub fn new(url: &str) -> Self {
        Self {
            entries: vec![Location::parse(url)],
            index: 0,
        }
    }

    /// The current entry.
    pub fn location(&self) -> &Location {
        &self.entries[self.index]
    }

    /// Number of entries in the session history.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`, a history has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Go back one entry. Returns `false` at the start of the history.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Go forward one entry. Returns `false` at the end of the history.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index += 1;
    }
}

impl History for MemoryHistory {
    fn path(&self) -> String {
        self.location().path.clone()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.location()
            .query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn hash(&self) -> Option<String> {
        let hash = &self.location().hash;
        (!hash.is_empty()).then(|| hash.clone())
    }

    fn push_hash(&mut self, hash: &str) {
        let mut location = self.location().clone();
        location.hash = hash.trim_start_matches('#').to_owned();
        self.push(location);
    }

    fn replace_hash(&mut self, hash: &str) {
        self.entries[self.index].hash = hash.trim_start_matches('#').to_owned();
    }

    fn reset_fragment(&mut self) {
        let mut location = self.location().clone();
        location.hash.clear();
        self.push(location);
    }

    fn remove_query_param(&mut self, name: &str) {
        self.entries[self.index].query.retain(|(k, _)| k != name);
    }

    fn href(&self) -> String {
        self.location().href()
    }
}

// --- MARK: STORAGE ---

/// A [`Storage`] backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    /// An empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`Storage::set`] was called.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.writes += 1;
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_elements_are_lenient() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let panel = doc.append(body, ElementTemplate::new("div").id("panel"));
        let button = doc.append(panel, ElementTemplate::new("button"));
        assert_eq!(doc.element_by_id("panel"), Some(panel));
        doc.detach(panel);
        assert_eq!(doc.element_by_id("panel"), None);
        assert!(!doc.is_connected(&button));
        assert!(!doc.focus(&button));
        assert!(doc.take_effects().is_empty());
    }

    #[test]
    fn append_child_rejects_cycles() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let outer = doc.append(body, ElementTemplate::new("div"));
        let inner = doc.append(outer, ElementTemplate::new("div"));
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(&outer), Some(body));
        assert_eq!(doc.parent(&inner), Some(outer));
    }

    #[test]
    fn query_is_in_document_order() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let first = doc.append(body, ElementTemplate::new("section").attr("data-step", "a"));
        let nested = doc.append(first, ElementTemplate::new("section").attr("data-step", "b"));
        let last = doc.append(body, ElementTemplate::new("section").attr("data-step", "c"));
        let selector = Selector::parse("[data-step]").unwrap();
        assert_eq!(doc.query_all(&selector), vec![first, nested, last]);
        assert_eq!(doc.query_within(&first, &selector), vec![nested]);
    }

    #[test]
    fn location_round_trip() {
        let location = Location::parse("/steps?step=s2&lang=es#intro");
        assert_eq!(location.path, "/steps");
        assert_eq!(location.query.len(), 2);
        assert_eq!(location.hash, "intro");
        assert_eq!(location.href(), "/steps?step=s2&lang=es#intro");
        assert_eq!(Location::parse("").href(), "/");
    }

    #[test]
    fn location_query_is_percent_decoded() {
        let location = Location::parse("/wizard?step=s%31&q=a+b%26c");
        assert_eq!(
            location.query,
            [
                ("step".to_owned(), "s1".to_owned()),
                ("q".to_owned(), "a b&c".to_owned()),
            ]
        );
        assert_eq!(location.href(), "/wizard?step=s1&q=a+b%26c");
    }

    #[test]
    fn history_push_truncates_forward_entries() {
        let mut history = MemoryHistory::new("/");
        history.push_hash("a");
        history.push_hash("#b");
        assert!(history.back());
        history.push_hash("c");
        assert!(!history.forward());
        assert_eq!(history.len(), 3);
        assert_eq!(history.hash().as_deref(), Some("c"));
    }
}
