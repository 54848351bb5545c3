// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Tab order management for the focusable descendants of toggled elements.
//!
//! A hidden element's focusable descendants get `tabindex="-1"`. An explicit tabindex they carried
//! before is kept in the pattern's `data-{namespace}-tabindex` attribute. When the element becomes
//! visible again, that value is restored, or `tabindex` is removed if none was kept.

use crate::Dom;

const TABINDEX: &str = "tabindex";

/// Put every node into the tab order (`visible`) or take it out.
pub(crate) fn set_focusable<D: Dom>(
    dom: &mut D,
    nodes: &[D::Node],
    visible: bool,
    default_attribute: &str,
) {
    for node in nodes {
        let tabindex = dom.attribute(node, TABINDEX);
        let withdrawn = tabindex.as_deref() == Some("-1");
        match (visible, withdrawn) {
            (true, true) => restore(dom, node, default_attribute),
            (false, false) => withdraw(dom, node, tabindex, default_attribute),
            _ => {}
        }
    }
}

fn withdraw<D: Dom>(
    dom: &mut D,
    node: &D::Node,
    tabindex: Option<String>,
    default_attribute: &str,
) {
    if let Some(tabindex) = tabindex.filter(|tabindex| !tabindex.is_empty())
        && dom.attribute(node, default_attribute).is_none()
    {
        dom.set_attribute(node, default_attribute, &tabindex);
    }
    dom.set_attribute(node, TABINDEX, "-1");
}

fn restore<D: Dom>(dom: &mut D, node: &D::Node, default_attribute: &str) {
    match dom.attribute(node, default_attribute) {
        Some(default) if !default.is_empty() => dom.set_attribute(node, TABINDEX, &default),
        _ => dom.remove_attribute(node, TABINDEX),
    }
}
