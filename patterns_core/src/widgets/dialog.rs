// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt::Debug};

use crate::{
    BindingId, ConfigError, Dom, EventKind, PageCtx, ToggleConfig, ToggleEngine, ToggleHooks,
    ToggleOverrides, ToggleOutcome, Toggled,
};

use super::OpenSet;

/// Class on the root element while any dialog is open.
pub const SCROLL_LOCK_CLASS: &str = "overflow-hidden";

impl ToggleConfig {
    /// Modal dialogs. Focus is managed by the dialog hooks, so there is no jump.
    pub const DIALOG: Self = Self {
        selector: Cow::Borrowed(r#"[data-js*="dialog"]"#),
        namespace: Cow::Borrowed("dialog"),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("hidden")),
        focusable: true,
        jump: false,
        events: Cow::Borrowed(&[EventKind::Click]),
    };
}

struct DialogHooks<N> {
    active_class: String,
    open: OpenSet<N>,
}

impl<D: Dom> ToggleHooks<D> for DialogHooks<D::Node> {
    fn after(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) {
        let dom = &mut *cx.dom;
        let opened = dom.has_class(&toggled.target, &self.active_class);
        let opener = self.open.opener(&toggled.target);
        let any_open = self.open.update(&toggled.trigger, &toggled.target, opened);

        let root = dom.root();
        if any_open {
            dom.add_class(&root, SCROLL_LOCK_CLASS);
        } else {
            dom.remove_class(&root, SCROLL_LOCK_CLASS);
        }

        if opened {
            if dom.attribute(&toggled.target, "tabindex").is_none() {
                dom.set_attribute(&toggled.target, "tabindex", "-1");
            }
            dom.focus(&toggled.target);
        } else {
            let opener = opener.unwrap_or_else(|| toggled.trigger.clone());
            if !dom.focus(&opener) {
                tracing::trace!(?opener, "dialog opener is gone");
            }
        }
    }
}

/// Modal dialogs that lock page scrolling while open.
///
/// Opening a dialog moves focus into it; closing it returns focus to the trigger that opened it.
#[derive(Debug)]
pub struct Dialog<N> {
    binding: BindingId,
    open: OpenSet<N>,
}

impl<N: Clone + PartialEq + Debug + 'static> Dialog<N> {
    /// Bind [`ToggleConfig::DIALOG`] merged with `overrides`.
    ///
    /// Returns `None` if the selector is already bound.
    pub fn bind<D: Dom<Node = N>>(
        engine: &mut ToggleEngine<D>,
        overrides: &ToggleOverrides,
    ) -> Result<Option<Self>, ConfigError> {
        let config = ToggleConfig::DIALOG.with_overrides(overrides);
        let open = OpenSet::new();
        let hooks = DialogHooks {
            active_class: config.active_class.to_string(),
            open: open.clone(),
        };
        let outcome = engine.bind(&config, hooks)?;
        Ok(outcome.is_new().then(|| Self {
            binding: outcome.id(),
            open,
        }))
    }

    /// The engine binding.
    pub fn binding(&self) -> BindingId {
        self.binding
    }

    /// Whether any dialog of this binding is open.
    pub fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    /// Close the most recently opened dialog, as if its trigger was clicked again.
    pub fn dismiss<D: Dom<Node = N>>(
        &self,
        engine: &mut ToggleEngine<D>,
        cx: &mut PageCtx<'_, D>,
    ) -> Option<ToggleOutcome<N>> {
        let last = self.open.last()?;
        if !cx.dom.is_connected(&last.target) {
            if !self.open.update(&last.trigger, &last.target, false) {
                let root = cx.dom.root();
                cx.dom.remove_class(&root, SCROLL_LOCK_CLASS);
            }
            return Some(ToggleOutcome::NoTarget);
        }
        Some(engine.toggle(cx, self.binding, &last.trigger))
    }
}
