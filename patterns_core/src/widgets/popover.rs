// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt::Debug};

use crate::{
    BindingId, ConfigError, Dom, EventKind, PageCtx, ToggleConfig, ToggleEngine, ToggleHooks,
    ToggleOutcome, ToggleOverrides, Toggled,
};

use super::OpenSet;

impl ToggleConfig {
    /// Popovers anchored to their trigger.
    pub const POPOVER: Self = Self {
        selector: Cow::Borrowed(r#"[data-js*="popover"]"#),
        namespace: Cow::Borrowed("popover"),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("hidden")),
        focusable: true,
        jump: false,
        events: Cow::Borrowed(&[EventKind::Click]),
    };
}

struct PopoverHooks<N> {
    active_class: String,
    open: OpenSet<N>,
}

impl<D: Dom> ToggleHooks<D> for PopoverHooks<D::Node> {
    fn after(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) {
        let opened = cx.dom.has_class(&toggled.target, &self.active_class);
        self.open.update(&toggled.trigger, &toggled.target, opened);
    }
}

/// Popovers, at most one of which is open at a time.
#[derive(Debug)]
pub struct Popover<N> {
    binding: BindingId,
    open: OpenSet<N>,
}

impl<N: Clone + PartialEq + Debug + 'static> Popover<N> {
    /// Bind [`ToggleConfig::POPOVER`] merged with `overrides`.
    ///
    /// Returns `None` if the selector is already bound.
    pub fn bind<D: Dom<Node = N>>(
        engine: &mut ToggleEngine<D>,
        overrides: &ToggleOverrides,
    ) -> Result<Option<Self>, ConfigError> {
        let config = ToggleConfig::POPOVER.with_overrides(overrides);
        let open = OpenSet::new();
        let hooks = PopoverHooks {
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

    /// The open popovers, oldest first.
    pub fn open_targets(&self) -> Vec<N> {
        self.open.snapshot().into_iter().map(|o| o.target).collect()
    }

    /// Close every open popover except `keep`.
    ///
    /// Call this after a dispatch opened `keep`. Returns how many popovers were closed.
    pub fn close_others<D: Dom<Node = N>>(
        &self,
        engine: &mut ToggleEngine<D>,
        cx: &mut PageCtx<'_, D>,
        keep: Option<&N>,
    ) -> usize {
        let mut closed = 0;
        for opened in self.open.snapshot() {
            if Some(&opened.target) == keep {
                continue;
            }
            if !cx.dom.is_connected(&opened.target) {
                self.open.update(&opened.trigger, &opened.target, false);
                continue;
            }
            if engine.toggle(cx, self.binding, &opened.trigger).changed() {
                closed += 1;
            }
        }
        closed
    }

    /// Close every open popover, e.g. on <kbd>Escape</kbd> or a click outside.
    pub fn dismiss_all<D: Dom<Node = N>>(
        &self,
        engine: &mut ToggleEngine<D>,
        cx: &mut PageCtx<'_, D>,
    ) -> usize {
        self.close_others(engine, cx, None)
    }

    /// Enforce a single open popover after `outcome` was produced for this binding.
    pub fn settle<D: Dom<Node = N>>(
        &self,
        engine: &mut ToggleEngine<D>,
        cx: &mut PageCtx<'_, D>,
        outcome: &ToggleOutcome<N>,
    ) -> usize {
        match outcome {
            ToggleOutcome::Toggled {
                target,
                active: true,
            } => self.close_others(engine, cx, Some(target)),
            _ => 0,
        }
    }
}
