// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the ready-made widgets, routed through [`Patterns`].

use patterns_core::{widgets::SCROLL_LOCK_CLASS, *};

mod common;
use common::*;

fn patterns(page: &mut Page, web_share: bool) -> Patterns<MemoryDocument> {
    Patterns::bind(&mut page.cx(), Capabilities { web_share }).unwrap()
}

fn click(
    page: &mut Page,
    patterns: &mut Patterns<MemoryDocument>,
    node: ElementId,
) -> Handled<ElementId> {
    patterns.handle(&mut page.cx(), &TriggerEvent::click(node))
}

#[test]
fn dialog_locks_scrolling_and_returns_focus() {
    let mut page = Page::new("/");
    let dialog = panel(&mut page, "dialog");
    let open = button(&mut page, "dialog", "dialog");
    let mut patterns = patterns(&mut page, false);
    let root = page.dom.root();

    let handled = click(&mut page, &mut patterns, open);
    assert!(handled.claimed());
    assert!(page.has_class(dialog, "active"));
    assert!(page.has_class(root, SCROLL_LOCK_CLASS));
    assert_eq!(page.dom.active_element(), Some(dialog));
    assert_eq!(page.attr(dialog, "tabindex").as_deref(), Some("-1"));
    assert_eq!(page.history.len(), 1);
    assert!(patterns.dialog().is_some_and(Dialog::is_open));

    assert!(patterns.on_escape(&mut page.cx()));
    assert!(!page.has_class(dialog, "active"));
    assert!(!page.has_class(root, SCROLL_LOCK_CLASS));
    assert_eq!(page.dom.active_element(), Some(open));
    assert!(!patterns.on_escape(&mut page.cx()));
}

#[test]
fn dialog_close_button_inside_the_dialog() {
    let mut page = Page::new("/");
    let dialog = panel(&mut page, "dialog");
    let open = button(&mut page, "dialog", "dialog");
    let close = page.append(
        dialog,
        ElementTemplate::new("button")
            .attr("data-js", "dialog")
            .attr("aria-controls", "dialog"),
    );
    let mut patterns = patterns(&mut page, false);
    let root = page.dom.root();

    click(&mut page, &mut patterns, open);
    click(&mut page, &mut patterns, close);
    assert!(!page.has_class(dialog, "active"));
    assert!(!page.has_class(root, SCROLL_LOCK_CLASS));
    assert!(!page.has_class(open, "active"));
    assert_eq!(page.attr(dialog, "aria-hidden").as_deref(), Some("true"));
    assert_eq!(page.dom.active_element(), Some(open));
}

#[test]
fn one_popover_at_a_time() {
    let mut page = Page::new("/");
    let first = panel(&mut page, "first");
    let second = panel(&mut page, "second");
    let open_first = button(&mut page, "popover", "first");
    let open_second = button(&mut page, "popover", "second");
    let mut patterns = patterns(&mut page, false);

    click(&mut page, &mut patterns, open_first);
    assert!(page.has_class(first, "active"));

    click(&mut page, &mut patterns, open_second);
    assert!(page.has_class(second, "active"));
    assert!(!page.has_class(first, "active"));
    assert!(!page.has_class(open_first, "active"));
    assert_eq!(
        page.attr(open_first, "aria-expanded").as_deref(),
        Some("false")
    );
    assert_eq!(
        patterns.popover().map(Popover::open_targets),
        Some(vec![second])
    );
    assert_eq!(page.history.len(), 1);
}

#[test]
fn popovers_close_on_outside_click_and_escape() {
    let mut page = Page::new("/");
    let popover = panel(&mut page, "tip");
    let trigger = button(&mut page, "popover", "tip");
    let body = page.body();
    let elsewhere = page.append(body, ElementTemplate::new("p"));
    let mut patterns = patterns(&mut page, false);
    let inside = page.dom.query_within(&popover, &Selector::parse("a").unwrap())[0];

    click(&mut page, &mut patterns, trigger);
    let handled = click(&mut page, &mut patterns, inside);
    assert!(!handled.claimed());
    assert_eq!(patterns.on_outside_click(&mut page.cx(), &inside), 0);
    assert!(page.has_class(popover, "active"));

    assert_eq!(patterns.on_outside_click(&mut page.cx(), &elsewhere), 1);
    assert!(!page.has_class(popover, "active"));

    click(&mut page, &mut patterns, trigger);
    assert!(patterns.on_escape(&mut page.cx()));
    assert!(!page.has_class(popover, "active"));

    click(&mut page, &mut patterns, trigger);
    let handled = click(&mut page, &mut patterns, elsewhere);
    assert!(!handled.claimed());
    assert!(!page.has_class(popover, "active"));
}

#[test]
fn ignored_events_are_not_claimed() {
    let mut page = Page::new("/");
    let menu = panel(&mut page, "menu");
    let body = page.body();
    let select = page.append(
        body,
        ElementTemplate::new("select")
            .attr("data-js", "toggle")
            .attr("aria-controls", "menu"),
    );
    let mut patterns = patterns(&mut page, false);

    let handled = click(&mut page, &mut patterns, select);
    assert_eq!(handled.outcomes.len(), 1);
    assert!(!handled.claimed());

    let handled = patterns.handle(&mut page.cx(), &TriggerEvent::change(select));
    assert!(handled.claimed());
    assert!(page.has_class(menu, "active"));
}

fn share_button(page: &mut Page) -> (ElementId, ElementId) {
    let fallback = panel(page, "share-fallback");
    let body = page.body();
    let trigger = page.append(
        body,
        ElementTemplate::new("button")
            .attr("data-js", "web-share")
            .attr("aria-controls", "share-fallback")
            .attr("data-web-share-title", "Patterns")
            .attr("data-web-share-text", "Accessible page patterns"),
    );
    (trigger, fallback)
}

#[test]
fn native_share_is_requested() {
    let mut page = Page::new("/docs?lang=en#install");
    let (trigger, fallback) = share_button(&mut page);
    let mut patterns = patterns(&mut page, true);

    let handled = click(&mut page, &mut patterns, trigger);
    assert!(handled.claimed());
    assert_eq!(
        handled.share,
        vec![ShareData {
            title: Some("Patterns".into()),
            text: Some("Accessible page patterns".into()),
            url: "/docs?lang=en#install".into(),
        }]
    );
    assert!(!page.has_class(fallback, "active"));
}

#[test]
fn share_falls_back_to_a_toggle() {
    let mut page = Page::new("/");
    let (trigger, fallback) = share_button(&mut page);
    let mut patterns = patterns(&mut page, false);

    let handled = click(&mut page, &mut patterns, trigger);
    assert!(handled.share.is_empty());
    assert!(matches!(
        handled.outcomes.as_slice(),
        [(_, ToggleOutcome::Toggled { active: true, .. })]
    ));
    assert!(page.has_class(fallback, "active"));
}

#[test]
fn step_clicks_schedule_focus() {
    let mut page = Page::new("/wizard?step=s1");
    let nodes = steps(&mut page, &["s0", "s1", "s2"]);
    let mut patterns = patterns(&mut page, false);
    assert_eq!(page.history.location().href(), "/wizard#s1");
    assert_eq!(
        patterns.steps().and_then(StepByStep::active_step).as_deref(),
        Some("s1")
    );

    let link = step_link(&page, nodes[1]);
    let handled = click(&mut page, &mut patterns, link);
    let pending = handled.pending_focus.expect("activation schedules focus");
    assert_eq!(pending.step, nodes[2]);
    assert!(patterns.settle_focus(&mut page.dom, &pending));

    assert!(page.history.back());
    let pending = patterns.on_popstate(&mut page.cx()).expect("s1 is a step");
    assert_eq!(pending.step, nodes[1]);
    assert_eq!(page.history.hash().as_deref(), Some("s1"));
}

#[test]
fn accordion_and_toggle_share_the_page() {
    let mut page = Page::new("/");
    let section = panel(&mut page, "faq-1");
    let menu = panel(&mut page, "menu");
    let accordion = button(&mut page, "accordion", "faq-1");
    let toggle = button(&mut page, "toggle", "menu");
    let mut patterns = patterns(&mut page, false);

    let handled = click(&mut page, &mut patterns, accordion);
    assert_eq!(handled.outcomes.len(), 1);
    assert_eq!(handled.outcomes[0].0, patterns.accordion().binding());
    assert!(page.has_class(section, "active"));
    assert!(!page.has_class(menu, "active"));

    let handled = click(&mut page, &mut patterns, toggle);
    assert_eq!(handled.outcomes[0].0, patterns.toggle().binding());
    assert!(page.has_class(menu, "active"));
}

#[test]
fn newsletter_messages() {
    let mut page = Page::new("/");
    let body = page.body();
    let form = page.append(
        body,
        ElementTemplate::new("form")
            .attr("data-js", "newsletter")
            .attr("action", "https://example.us1.list-manage.com/subscribe/post?u=a&id=b"),
    );
    let input = page.append(form, ElementTemplate::new("input").attr("name", "EMAIL"));
    let alert = page.append(
        form,
        ElementTemplate::new("div")
            .attr("data-js-newsletter", "alert")
            .class("hidden")
            .attr("aria-hidden", "true"),
    );
    let newsletter = Newsletter::new(NewsletterConfig::DEFAULT).unwrap();

    assert_eq!(newsletter.form_for(&page.dom, &input), Some(form));
    let response = NewsletterResponse::from_json(
        r#"{"result":"error","msg":"reader@example.org is already subscribed to list News"}"#,
    )
    .unwrap();
    assert!(newsletter.show(&mut page.dom, &form, Reply::classify(&response)));
    assert_eq!(
        page.dom.text(&alert),
        NewsletterConfig::DEFAULT
            .strings
            .message(Reply::AlreadySubscribed)
    );
    assert!(!page.has_class(alert, "hidden"));
    assert_eq!(
        page.attr(alert, "data-newsletter-status").as_deref(),
        Some("error")
    );

    newsletter.reset(&mut page.dom, &form);
    assert!(page.has_class(alert, "hidden"));
    assert_eq!(page.attr(alert, "data-newsletter-status"), None);

    assert!(newsletter.show(&mut page.dom, &form, Reply::Success));
    assert_eq!(
        page.attr(alert, "data-newsletter-status").as_deref(),
        Some("success")
    );
}

#[test]
fn preferences_round_trip_through_storage() {
    let mut page = Page::new("/");
    let mut storage = MemoryStorage::new();
    let all = [Preference::THEME, Preference::DIRECTION];
    let mut preferences = Preferences::load(&mut page.dom, &storage, &all);
    preferences
        .set(&mut page.dom, &mut storage, &Preference::DIRECTION, "rtl")
        .unwrap();
    preferences.cycle(&mut page.dom, &mut storage, &Preference::THEME);

    let mut reloaded = Page::new("/");
    let preferences = Preferences::load(&mut reloaded.dom, &storage, &all);
    let root = reloaded.dom.root();
    assert_eq!(preferences.get(&Preference::THEME), Some("dark"));
    assert_eq!(reloaded.attr(root, "data-theme").as_deref(), Some("dark"));
    assert_eq!(reloaded.attr(root, "dir").as_deref(), Some("rtl"));
}
