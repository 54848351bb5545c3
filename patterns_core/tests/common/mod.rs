// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, reason = "Not every test file uses every helper")]

use patterns_core::*;

/// A document together with its session history.
pub(crate) struct Page {
    pub dom: MemoryDocument,
    pub history: MemoryHistory,
}

impl Page {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            dom: MemoryDocument::new(),
            history: MemoryHistory::new(url),
        }
    }

    pub(crate) fn cx(&mut self) -> PageCtx<'_, MemoryDocument> {
        PageCtx::new(&mut self.dom, &mut self.history)
    }

    pub(crate) fn body(&self) -> ElementId {
        self.dom.body()
    }

    pub(crate) fn append(&mut self, parent: ElementId, template: ElementTemplate) -> ElementId {
        self.dom.append(parent, template)
    }

    pub(crate) fn attr(&self, node: ElementId, name: &str) -> Option<String> {
        self.dom.attribute(&node, name)
    }

    pub(crate) fn has_class(&self, node: ElementId, class: &str) -> bool {
        self.dom.has_class(&node, class)
    }

    pub(crate) fn click(
        &mut self,
        engine: &mut ToggleEngine<MemoryDocument>,
        node: ElementId,
    ) -> Vec<(BindingId, ToggleOutcome<ElementId>)> {
        let mut cx = PageCtx::new(&mut self.dom, &mut self.history);
        engine.dispatch(&mut cx, &TriggerEvent::click(node))
    }

    /// Every attribute of every element, for comparing whole-document states.
    pub(crate) fn snapshot(&self) -> Vec<Vec<(String, String)>> {
        let everything = Selector::parse("*").unwrap();
        self.dom
            .query_all(&everything)
            .into_iter()
            .map(|node| self.dom.attributes(node))
            .collect()
    }
}

/// A hidden panel `#{id}` with a link and a button inside.
pub(crate) fn panel(page: &mut Page, id: &str) -> ElementId {
    let body = page.body();
    let panel = page.append(
        body,
        ElementTemplate::new("div")
            .id(id)
            .class("hidden")
            .attr("aria-hidden", "true"),
    );
    page.append(
        panel,
        ElementTemplate::new("a")
            .attr("href", "/more")
            .attr("tabindex", "-1"),
    );
    page.append(panel, ElementTemplate::new("button").attr("tabindex", "-1"));
    panel
}

/// A `<button>` controlling `#{target}` through `aria-controls`.
pub(crate) fn button(page: &mut Page, js: &str, target: &str) -> ElementId {
    let body = page.body();
    page.append(
        body,
        ElementTemplate::new("button")
            .attr("data-js", js)
            .attr("aria-controls", target)
            .attr("aria-expanded", "false"),
    )
}

/// Steps `ids`, each with a focusable heading and a link to the next step.
pub(crate) fn steps(page: &mut Page, ids: &[&str]) -> Vec<ElementId> {
    let body = page.body();
    let mut nodes = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        let step = page.append(
            body,
            ElementTemplate::new("section").id(id).attr("data-step", id),
        );
        page.append(
            step,
            ElementTemplate::new("h2")
                .attr("data-step-focus", "")
                .text(&format!("Step {}", i + 1)),
        );
        if let Some(next) = ids.get(i + 1) {
            page.append(
                step,
                ElementTemplate::new("a")
                    .attr("href", &format!("#{next}"))
                    .attr("data-step-go-to", next),
            );
        }
        nodes.push(step);
    }
    nodes
}

/// The `a[data-step-go-to]` inside `step`.
pub(crate) fn step_link(page: &Page, step: ElementId) -> ElementId {
    let links = Selector::parse("[data-step-go-to]").unwrap();
    page.dom.query_within(&step, &links)[0]
}
