// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the [`ToggleEngine`] through the in-memory document.

use std::{cell::RefCell, rc::Rc};

use patterns_core::*;

mod common;
use common::*;

fn engine() -> (ToggleEngine<MemoryDocument>, BindingId) {
    let mut engine = ToggleEngine::new();
    let toggle = Toggle::bind(&mut engine, &ToggleOverrides::default()).unwrap();
    (engine, toggle.binding())
}

#[test]
fn toggling_twice_restores_the_document() {
    let mut page = Page::new("/");
    panel(&mut page, "menu");
    let trigger = button(&mut page, "toggle", "menu");
    let (mut engine, _) = engine();

    let before = page.snapshot();
    page.click(&mut engine, trigger);
    assert_ne!(page.snapshot(), before);
    page.click(&mut engine, trigger);
    assert_eq!(page.snapshot(), before);
}

#[test]
fn classes_and_aria_agree() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let trigger = button(&mut page, "toggle", "menu");
    let (mut engine, binding) = engine();

    for _ in 0..3 {
        let outcomes = page.click(&mut engine, trigger);
        let [(id, ToggleOutcome::Toggled { target, active })] = outcomes.as_slice() else {
            panic!("unexpected outcomes {outcomes:?}");
        };
        assert_eq!(*id, binding);
        assert_eq!(*target, menu);
        assert_eq!(page.has_class(menu, "active"), *active);
        assert_eq!(page.has_class(menu, "hidden"), !*active);
        assert_eq!(
            page.attr(menu, "aria-hidden").as_deref(),
            Some(if *active { "false" } else { "true" })
        );
        assert_eq!(
            page.attr(trigger, "aria-expanded").as_deref(),
            Some(if *active { "true" } else { "false" })
        );
        assert_eq!(engine.is_active(&page.dom, binding, &menu), *active);
    }
}

#[test]
fn other_controllers_follow() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let first = button(&mut page, "toggle", "menu");
    let second = button(&mut page, "toggle", "menu");
    let body = page.body();
    let link = page.append(
        body,
        ElementTemplate::new("a")
            .attr("href", "#menu")
            .attr("aria-pressed", "false"),
    );
    let (mut engine, _) = engine();

    page.click(&mut engine, first);
    for node in [first, second] {
        assert!(page.has_class(node, "active"));
        assert_eq!(page.attr(node, "aria-expanded").as_deref(), Some("true"));
    }
    assert!(page.has_class(link, "active"));
    assert_eq!(page.attr(link, "aria-pressed").as_deref(), Some("true"));

    page.click(&mut engine, second);
    for node in [first, second, link] {
        assert!(!page.has_class(node, "active"));
    }
    assert!(!page.has_class(menu, "active"));
}

#[test]
fn fragment_link_jumps_into_target() {
    let mut page = Page::new("/docs?lang=en");
    let body = page.body();
    let panel = page.append(body, ElementTemplate::new("div").id("panel").class("hidden"));
    let link = page.append(
        body,
        ElementTemplate::new("a")
            .attr("data-js", "toggle")
            .attr("href", "#panel")
            .attr("aria-expanded", "false"),
    );
    let (mut engine, _) = engine();

    page.click(&mut engine, link);
    assert!(page.has_class(panel, "active"));
    assert!(!page.has_class(panel, "hidden"));
    assert_eq!(page.attr(link, "aria-expanded").as_deref(), Some("true"));
    assert_eq!(page.history.location().href(), "/docs?lang=en#panel");
    assert_eq!(page.attr(panel, "tabindex").as_deref(), Some("0"));
    assert_eq!(page.dom.active_element(), Some(panel));

    page.click(&mut engine, link);
    assert!(!page.has_class(panel, "active"));
    assert_eq!(page.history.hash(), None);
    assert_eq!(page.attr(panel, "tabindex"), None);
    assert_eq!(page.history.len(), 3);
}

#[test]
fn disabled_jump_leaves_the_address_alone() {
    let mut page = Page::new("/");
    let body = page.body();
    let panel = page.append(body, ElementTemplate::new("div").id("panel"));
    let link = page.append(
        body,
        ElementTemplate::new("a")
            .attr("data-js", "accordion")
            .attr("href", "#panel"),
    );
    let mut engine = ToggleEngine::new();
    Accordion::bind(&mut engine, &ToggleOverrides::default()).unwrap();

    page.click(&mut engine, link);
    assert!(page.has_class(panel, "active"));
    assert_eq!(page.history.len(), 1);
    assert_eq!(page.dom.active_element(), None);
}

#[test]
fn missing_target_is_a_no_op() {
    let mut page = Page::new("/");
    let trigger = button(&mut page, "toggle", "nowhere");
    let (mut engine, binding) = engine();

    let before = page.snapshot();
    let outcomes = page.click(&mut engine, trigger);
    assert_eq!(outcomes, vec![(binding, ToggleOutcome::NoTarget)]);
    assert_eq!(page.snapshot(), before);
}

#[test]
fn validator_vetoes_before_any_mutation() {
    let mut page = Page::new("/");
    panel(&mut page, "menu");
    let trigger = button(&mut page, "toggle", "menu");
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut engine = ToggleEngine::new();
    let hooks = FnHooks::<MemoryDocument>::new()
        .valid(|_, _| false)
        .before({
            let calls = Rc::clone(&calls);
            move |_, _| calls.borrow_mut().push("before")
        })
        .after({
            let calls = Rc::clone(&calls);
            move |_, _| calls.borrow_mut().push("after")
        });
    let toggle =
        Toggle::bind_with_hooks(&mut engine, &ToggleOverrides::default(), hooks).unwrap();

    let before = page.snapshot();
    let outcomes = page.click(&mut engine, trigger);
    assert_eq!(outcomes, vec![(toggle.binding(), ToggleOutcome::Vetoed)]);
    assert_eq!(page.snapshot(), before);
    assert!(calls.borrow().is_empty());
}

#[test]
fn hooks_run_around_the_mutations() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let trigger = button(&mut page, "toggle", "menu");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut engine = ToggleEngine::new();
    let hooks = FnHooks::<MemoryDocument>::new()
        .before({
            let seen = Rc::clone(&seen);
            move |cx: &mut PageCtx<'_, MemoryDocument>, toggled: &Toggled<ElementId>| {
                let active = cx.dom.has_class(&toggled.target, "active");
                seen.borrow_mut().push(("before", active));
            }
        })
        .after({
            let seen = Rc::clone(&seen);
            move |cx: &mut PageCtx<'_, MemoryDocument>, toggled: &Toggled<ElementId>| {
                let active = cx.dom.has_class(&toggled.target, "active");
                seen.borrow_mut().push(("after", active));
            }
        });
    Toggle::bind_with_hooks(&mut engine, &ToggleOverrides::default(), hooks).unwrap();

    page.click(&mut engine, trigger);
    assert!(page.has_class(menu, "active"));
    assert_eq!(*seen.borrow(), vec![("before", false), ("after", true)]);
}

#[test]
fn binding_a_selector_twice_is_idempotent() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let trigger = button(&mut page, "toggle", "menu");
    let mut engine = ToggleEngine::new();
    let first = engine.bind(&ToggleConfig::DEFAULT, ()).unwrap();
    let respelled = ToggleConfig {
        selector: "[data-js*='toggle']".into(),
        ..ToggleConfig::DEFAULT
    };
    let second = engine.bind(&respelled, ()).unwrap();
    assert!(first.is_new());
    assert_eq!(second, BindOutcome::AlreadyBound(first.id()));
    assert_eq!(engine.registry().len(), 1);

    let outcomes = page.click(&mut engine, trigger);
    assert_eq!(outcomes.len(), 1);
    assert!(page.has_class(menu, "active"));
}

#[test]
fn focusable_descendants_follow_the_target() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let trigger = button(&mut page, "toggle", "menu");
    let (mut engine, _) = engine();
    let focusable = Selector::parse(FOCUSABLE_ELEMENTS).unwrap();
    let inside = page.dom.query_within(&menu, &focusable);
    assert_eq!(inside.len(), 2);

    page.click(&mut engine, trigger);
    for node in &inside {
        assert_eq!(page.attr(*node, "tabindex"), None);
    }
    page.click(&mut engine, trigger);
    for node in &inside {
        assert_eq!(page.attr(*node, "tabindex").as_deref(), Some("-1"));
    }
}

#[test]
fn undeclared_tab_order_follows_the_target() {
    let mut page = Page::new("/");
    let body = page.body();
    let menu = page.append(
        body,
        ElementTemplate::new("div")
            .id("menu")
            .class("hidden")
            .attr("aria-hidden", "true"),
    );
    let link = page.append(menu, ElementTemplate::new("a").attr("href", "/x"));
    let custom = page.append(menu, ElementTemplate::new("div").attr("tabindex", "0"));
    let trigger = button(&mut page, "toggle", "menu");
    let (mut engine, _) = engine();

    page.click(&mut engine, trigger);
    assert!(page.has_class(menu, "active"));
    assert_eq!(page.attr(link, "tabindex"), None);
    assert_eq!(page.attr(custom, "tabindex").as_deref(), Some("0"));

    page.click(&mut engine, trigger);
    assert_eq!(page.attr(link, "tabindex").as_deref(), Some("-1"));
    assert_eq!(page.attr(custom, "tabindex").as_deref(), Some("-1"));

    page.click(&mut engine, trigger);
    assert_eq!(page.attr(link, "tabindex"), None);
    assert_eq!(page.attr(custom, "tabindex").as_deref(), Some("0"));
}

#[test]
fn undo_reverses_once() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let body = page.body();
    let trigger = page.append(
        body,
        ElementTemplate::new("button")
            .attr("data-js", "toggle")
            .attr("aria-controls", "menu")
            .attr("data-toggle-undo", "#undo"),
    );
    let undo = page.append(body, ElementTemplate::new("button").id("undo"));
    let icon = page.append(undo, ElementTemplate::new("span"));
    let (mut engine, binding) = engine();

    page.click(&mut engine, trigger);
    assert!(page.has_class(menu, "active"));
    assert!(engine.is_undo_armed(&undo));

    let outcomes = page.click(&mut engine, icon);
    assert_eq!(
        outcomes,
        vec![(
            binding,
            ToggleOutcome::Undone {
                target: menu,
                active: false
            }
        )]
    );
    assert!(!page.has_class(menu, "active"));
    assert!(!engine.is_undo_armed(&undo));
    assert!(page.click(&mut engine, undo).is_empty());
    assert!(!page.has_class(menu, "active"));
}

#[test]
fn events_are_filtered_by_element_type() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let body = page.body();
    let select = page.append(
        body,
        ElementTemplate::new("select")
            .attr("data-js", "toggle")
            .attr("aria-controls", "menu"),
    );
    let (mut engine, binding) = engine();

    assert_eq!(
        page.click(&mut engine, select),
        vec![(binding, ToggleOutcome::Ignored)]
    );
    assert!(!page.has_class(menu, "active"));

    let mut cx = page.cx();
    let outcomes = engine.dispatch(&mut cx, &TriggerEvent::change(select));
    assert_eq!(
        outcomes,
        vec![(
            binding,
            ToggleOutcome::Toggled {
                target: menu,
                active: true
            }
        )]
    );
}

#[test]
fn clicks_inside_a_trigger_reach_it() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let trigger = button(&mut page, "toggle", "menu");
    let label = page.append(trigger, ElementTemplate::new("span").text("Menu"));
    let (mut engine, _) = engine();

    page.click(&mut engine, label);
    assert!(page.has_class(menu, "active"));
    assert!(page.has_class(trigger, "active"));
}

#[test]
fn configuration_from_attributes() {
    let mut page = Page::new("/");
    let body = page.body();
    let host = page.append(
        body,
        ElementTemplate::new("div")
            .attr("data-toggle-active-class", "is-open")
            .attr("data-toggle-inactive-class", "")
            .attr("data-toggle-jump", "false"),
    );
    let menu = page.append(body, ElementTemplate::new("nav").id("menu"));
    let trigger = button(&mut page, "toggle", "menu");
    let overrides =
        ToggleOverrides::from_attributes("toggle", |name| page.attr(host, name)).unwrap();
    let mut engine = ToggleEngine::new();
    Toggle::bind(&mut engine, &overrides).unwrap();

    page.click(&mut engine, trigger);
    assert!(page.has_class(menu, "is-open"));
    assert!(!page.has_class(menu, "active"));
    assert_eq!(page.dom.classes(menu), vec!["is-open".to_owned()]);
}
