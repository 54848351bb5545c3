// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the [`VisibilityObserver`] and [`ActiveNavigation`].

use std::{cell::RefCell, rc::Rc};

use patterns_core::*;

mod common;
use common::*;

fn entry(target: ElementId, is_intersecting: bool) -> IntersectionEntry<ElementId> {
    IntersectionEntry {
        target,
        is_intersecting,
        ratio: if is_intersecting { 0.5 } else { 0.0 },
    }
}

#[test]
fn triggers_see_the_previous_entry_of_the_batch() {
    let mut page = Page::new("/");
    let body = page.body();
    let a = page.append(body, ElementTemplate::new("section").id("a"));
    let b = page.append(body, ElementTemplate::new("section").id("b"));

    let calls = Rc::new(RefCell::new(Vec::new()));
    let sections = Selector::parse("section").unwrap();
    let mut observer: VisibilityObserver<MemoryDocument> =
        VisibilityObserver::new(ObserverOptions::default(), sections, {
            let calls = Rc::clone(&calls);
            move |_: &mut MemoryDocument,
                  entry: &IntersectionEntry<ElementId>,
                  previous: Option<&IntersectionEntry<ElementId>>| {
                calls
                    .borrow_mut()
                    .push((entry.target, previous.map(|p| p.target)));
            }
        });
    assert_eq!(observer.targets(&page.dom), vec![a, b]);

    // Batches are delivered in the order they were reported, not document order.
    observer.observe_batch(&mut page.dom, &[entry(b, true), entry(a, false)]);
    assert_eq!(*calls.borrow(), vec![(b, None), (a, Some(b))]);

    observer.observe_batch(&mut page.dom, &[entry(a, true)]);
    assert_eq!(calls.borrow().last(), Some(&(a, None)));
}

#[test]
fn default_options() {
    let options = ObserverOptions::default();
    assert_eq!(options.thresholds, vec![0.15]);
    assert_eq!(options.root_margin, "0px");
}

struct Navigation {
    page: Page,
    nav: ElementId,
    links: Vec<ElementId>,
    sections: Vec<ElementId>,
}

fn navigation(ids: &[&str]) -> Navigation {
    let mut page = Page::new("/guide");
    let body = page.body();
    let nav = page.append(
        body,
        ElementTemplate::new("nav").attr("data-js", "active-navigation"),
    );
    let links = ids
        .iter()
        .map(|id| {
            page.append(
                nav,
                ElementTemplate::new("a")
                    .attr("href", &format!("#{id}"))
                    .attr("data-active-navigation-tabindex", "0"),
            )
        })
        .collect();
    let sections = ids
        .iter()
        .map(|id| page.append(body, ElementTemplate::new("section").id(id)))
        .collect();
    Navigation {
        page,
        nav,
        links,
        sections,
    }
}

#[test]
fn intersecting_section_highlights_its_link() {
    let Navigation {
        mut page,
        nav,
        links,
        sections,
    } = navigation(&["intro", "usage", "api"]);
    let navigation = ActiveNavigation::new(NavigationConfig::DEFAULT).unwrap();
    let mut observer = navigation.observer(&page.dom, ObserverOptions::default());
    assert_eq!(observer.targets(&page.dom), sections);

    observer.observe_batch(
        &mut page.dom,
        &[entry(sections[0], false), entry(sections[1], true)],
    );
    assert!(page.has_class(links[1], "active"));
    assert!(!page.has_class(links[1], "no-underline"));
    assert_eq!(page.attr(links[1], "aria-current").as_deref(), Some("true"));
    for other in [links[0], links[2]] {
        assert!(!page.has_class(other, "active"));
        assert!(page.has_class(other, "no-underline"));
        assert_eq!(page.attr(other, "aria-current"), None);
    }
    assert_eq!(
        page.dom.take_effects(),
        vec![Effect::ScrollWithin {
            container: nav,
            node: links[1]
        }]
    );

    observer.observe_batch(&mut page.dom, &[entry(sections[2], true)]);
    assert!(page.has_class(links[2], "active"));
    assert!(!page.has_class(links[1], "active"));
    assert_eq!(page.attr(links[1], "aria-current"), None);
}

#[test]
fn leaving_sections_change_nothing() {
    let Navigation {
        mut page, sections, ..
    } = navigation(&["intro", "usage"]);
    let navigation = ActiveNavigation::new(NavigationConfig::DEFAULT).unwrap();
    let mut observer = navigation.observer(&page.dom, ObserverOptions::default());

    let before = page.snapshot();
    observer.observe_batch(
        &mut page.dom,
        &[entry(sections[0], false), entry(sections[1], false)],
    );
    assert_eq!(page.snapshot(), before);
}

#[test]
fn highlight_restores_link_focusability() {
    let Navigation {
        mut page, links, ..
    } = navigation(&["intro", "usage"]);
    for link in &links {
        page.dom.set_attribute(link, "tabindex", "-1");
    }
    let navigation = ActiveNavigation::new(NavigationConfig::DEFAULT).unwrap();

    assert!(navigation.highlight(&mut page.dom, "usage"));
    for link in &links {
        assert_eq!(page.attr(*link, "tabindex").as_deref(), Some("0"));
    }
    assert!(!navigation.highlight(&mut page.dom, "missing"));
}

#[test]
fn pages_without_navigation_observe_nothing() {
    let page = Page::new("/");
    let navigation = ActiveNavigation::new(NavigationConfig::DEFAULT).unwrap();
    let observer = navigation.observer(&page.dom, ObserverOptions::default());
    assert!(observer.targets(&page.dom).is_empty());
}
