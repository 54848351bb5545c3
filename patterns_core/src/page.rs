// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Routing of page events to every bound pattern.

use std::fmt::Debug;

use crate::{
    Accordion, BindingId, ConfigError, Dialog, Dom, EventKind, PageCtx, PendingFocus, PopOutcome,
    Popover, ShareData, StepByStep, StepConfig, StepError, Toggle, ToggleEngine, ToggleOutcome,
    ToggleOverrides, TriggerEvent, WebShare,
};

/// What the browser supports, detected once at start-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `navigator.share` exists.
    pub web_share: bool,
}

/// The result of [`Patterns::handle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handled<N> {
    /// Outcome per binding the event concerned, in registration order.
    pub outcomes: Vec<(BindingId, ToggleOutcome<N>)>,
    /// Native share requests queued by the event.
    pub share: Vec<ShareData>,
    /// A step activation waiting for [`STEP_FOCUS_DELAY`](crate::STEP_FOCUS_DELAY).
    pub pending_focus: Option<PendingFocus<N>>,
}

impl<N> Handled<N> {
    /// Whether any binding claimed the event, so its default action should be prevented.
    ///
    /// Triggers that ignore the event type (a `click` on a `<select>`) do not claim it.
    pub fn claimed(&self) -> bool {
        !self.share.is_empty()
            || self
                .outcomes
                .iter()
                .any(|(_, outcome)| !matches!(outcome, ToggleOutcome::Ignored))
    }
}

/// Every pattern of a page, bound to one [`ToggleEngine`].
pub struct Patterns<D: Dom> {
    engine: ToggleEngine<D>,
    toggle: Toggle,
    accordion: Accordion,
    dialog: Option<Dialog<D::Node>>,
    popover: Option<Popover<D::Node>>,
    share: Option<WebShare>,
    steps: Option<StepByStep<D::Node>>,
}

impl<D: Dom> Debug for Patterns<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patterns")
            .field("engine", &self.engine)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Why [`Patterns::bind`] failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// A toggle configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The step sequence is malformed.
    #[error(transparent)]
    Steps(#[from] StepError),
}

impl<D: Dom> Patterns<D>
where
    D::Node: 'static,
{
    /// Bind every pattern with its default configuration and pick the initial step.
    pub fn bind(cx: &mut PageCtx<'_, D>, capabilities: Capabilities) -> Result<Self, BindError> {
        let mut engine = ToggleEngine::new();
        let defaults = ToggleOverrides::default();
        let toggle = Toggle::bind(&mut engine, &defaults)?;
        let accordion = Accordion::bind(&mut engine, &defaults)?;
        let dialog = Dialog::bind(&mut engine, &defaults)?;
        let popover = Popover::bind(&mut engine, &defaults)?;
        let share = WebShare::bind(&mut engine, capabilities.web_share, &defaults)?;
        let steps = StepByStep::bind(&mut engine, cx, StepConfig::DEFAULT)?;
        tracing::debug!(bindings = engine.registry().len(), "patterns bound");
        Ok(Self {
            engine,
            toggle,
            accordion,
            dialog,
            popover,
            share,
            steps,
        })
    }

    /// The engine, for binding further patterns.
    pub fn engine_mut(&mut self) -> &mut ToggleEngine<D> {
        &mut self.engine
    }

    /// The engine.
    pub fn engine(&self) -> &ToggleEngine<D> {
        &self.engine
    }

    /// The generic toggle binding.
    pub fn toggle(&self) -> Toggle {
        self.toggle
    }

    /// The accordion binding.
    pub fn accordion(&self) -> Accordion {
        self.accordion
    }

    /// The dialogs.
    pub fn dialog(&self) -> Option<&Dialog<D::Node>> {
        self.dialog.as_ref()
    }

    /// The popovers.
    pub fn popover(&self) -> Option<&Popover<D::Node>> {
        self.popover.as_ref()
    }

    /// The step-by-step wizard, if the page has steps.
    pub fn steps(&self) -> Option<&StepByStep<D::Node>> {
        self.steps.as_ref()
    }

    /// Handle a delegated `click` or `change`.
    ///
    /// A click no popover trigger claimed also closes the popovers it landed outside of.
    pub fn handle(
        &mut self,
        cx: &mut PageCtx<'_, D>,
        event: &TriggerEvent<D::Node>,
    ) -> Handled<D::Node> {
        let outcomes = self.engine.dispatch(cx, event);
        let mut popover_claimed = false;
        if let Some(popover) = &self.popover {
            for (binding, outcome) in &outcomes {
                if *binding == popover.binding() {
                    popover_claimed = true;
                    popover.settle(&mut self.engine, cx, outcome);
                }
            }
        }
        if event.kind == EventKind::Click && !popover_claimed {
            self.on_outside_click(cx, &event.origin);
        }
        let share = self
            .share
            .as_ref()
            .map(WebShare::take_requests)
            .unwrap_or_default();
        let pending_focus = self.steps.as_ref().and_then(StepByStep::take_pending_focus);
        Handled {
            outcomes,
            share,
            pending_focus,
        }
    }

    /// Replay back/forward navigation into the step-by-step wizard.
    pub fn on_popstate(&mut self, cx: &mut PageCtx<'_, D>) -> Option<PendingFocus<D::Node>> {
        match self.steps.as_ref()?.on_popstate(cx) {
            PopOutcome::Activated(pending) => Some(pending),
            PopOutcome::Suppressed | PopOutcome::Unknown => None,
        }
    }

    /// Perform a focus move scheduled by a step activation.
    pub fn settle_focus(&self, dom: &mut D, pending: &PendingFocus<D::Node>) -> bool {
        self.steps
            .as_ref()
            .is_some_and(|steps| steps.settle_focus(dom, pending))
    }

    /// <kbd>Escape</kbd>: close the most recent dialog, or else every popover.
    pub fn on_escape(&mut self, cx: &mut PageCtx<'_, D>) -> bool {
        if let Some(dialog) = self.dialog.as_ref().filter(|dialog| dialog.is_open()) {
            return dialog
                .dismiss(&mut self.engine, cx)
                .is_some_and(|outcome| outcome.changed());
        }
        self.popover
            .as_ref()
            .is_some_and(|popover| popover.dismiss_all(&mut self.engine, cx) > 0)
    }

    /// A click that no popover trigger claimed: close every popover the click is outside of.
    pub fn on_outside_click(&mut self, cx: &mut PageCtx<'_, D>, origin: &D::Node) -> usize {
        let Some(popover) = &self.popover else {
            return 0;
        };
        let inside = popover.open_targets().iter().any(|target| {
            let mut node = Some(origin.clone());
            while let Some(current) = node {
                if current == *target {
                    return true;
                }
                node = cx.dom.parent(&current);
            }
            false
        });
        if inside {
            0
        } else {
            popover.dismiss_all(&mut self.engine, cx)
        }
    }
}
