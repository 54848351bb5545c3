// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, cell::RefCell, fmt::Debug, rc::Rc};

use crate::{
    BindingId, Dom, EventKind, HistorySync, PageCtx, PendingFocus, PopOutcome, StartSource,
    StepConfig, StepError, ToggleConfig, ToggleEngine, ToggleHooks, Toggled,
};

impl ToggleConfig {
    /// Step links. The address is managed by [`HistorySync`], so there is no jump.
    pub const STEP_BY_STEP: Self = Self {
        selector: Cow::Borrowed("[data-step-go-to]"),
        namespace: Cow::Borrowed("step"),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("hidden")),
        focusable: true,
        jump: false,
        events: Cow::Borrowed(&[EventKind::Click]),
    };
}

struct StepHooks<N> {
    sync: Rc<RefCell<HistorySync<N>>>,
    generation: Option<u64>,
}

impl<D: Dom> ToggleHooks<D> for StepHooks<D::Node> {
    /// Only links to an inactive step go anywhere.
    fn valid(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) -> bool {
        let sync = self.sync.borrow();
        match sync.step_id(cx.dom, &toggled.target) {
            Some(id) => sync.active_step() != Some(id.as_str()),
            None => false,
        }
    }

    fn before(&mut self, _cx: &mut PageCtx<'_, D>, _toggled: &Toggled<D::Node>) {
        self.generation = Some(self.sync.borrow_mut().begin());
    }

    fn after(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) {
        let mut sync = self.sync.borrow_mut();
        if let Some(id) = sync.step_id(cx.dom, &toggled.target) {
            sync.activate(cx.dom, &id);
            cx.history.push_hash(&id);
        }
        if let Some(generation) = self.generation.take() {
            sync.finish(generation);
        }
    }
}

/// A linear wizard whose current step lives in the address hash.
///
/// Links carrying `data-step-go-to` and an `href="#step-id"` move to a step; back and forward
/// navigation is replayed through [`on_popstate`](Self::on_popstate).
#[derive(Debug)]
pub struct StepByStep<N> {
    binding: BindingId,
    sync: Rc<RefCell<HistorySync<N>>>,
}

impl<N: Clone + PartialEq + Debug + 'static> StepByStep<N> {
    /// Validate the document's steps, pick the initial step and bind the step links.
    ///
    /// Returns `Ok(None)` if the page has no steps or the step links are already bound.
    pub fn bind<D: Dom<Node = N>>(
        engine: &mut ToggleEngine<D>,
        cx: &mut PageCtx<'_, D>,
        config: StepConfig,
    ) -> Result<Option<Self>, StepError> {
        let toggle = ToggleConfig {
            selector: Cow::Owned(format!("[{}]", config.go_to_attribute)),
            ..ToggleConfig::STEP_BY_STEP
        };
        let mut sync = HistorySync::new(&*cx.dom, config)?;
        let Some(source) = sync.init(cx) else {
            return Ok(None);
        };
        if source == StartSource::Query {
            tracing::debug!("migrated step query parameter into the hash");
        }
        let sync = Rc::new(RefCell::new(sync));
        let hooks = StepHooks {
            sync: Rc::clone(&sync),
            generation: None,
        };
        let outcome = engine.bind(&toggle, hooks)?;
        Ok(outcome.is_new().then(|| Self {
            binding: outcome.id(),
            sync,
        }))
    }

    /// The engine binding.
    pub fn binding(&self) -> BindingId {
        self.binding
    }

    /// The identifier of the active step.
    pub fn active_step(&self) -> Option<String> {
        self.sync.borrow().active_step().map(str::to_owned)
    }

    /// Whether a click-triggered activation is running.
    pub fn is_in_flight(&self) -> bool {
        self.sync.borrow().is_in_flight()
    }

    /// Go to `step_id` and record it in the history, as a step link would.
    pub fn go_to<D: Dom<Node = N>>(
        &self,
        cx: &mut PageCtx<'_, D>,
        step_id: &str,
    ) -> Option<PendingFocus<N>> {
        let mut sync = self.sync.borrow_mut();
        if sync.active_step() == Some(step_id) {
            return None;
        }
        let generation = sync.begin();
        let pending = sync.activate(cx.dom, step_id);
        if pending.is_some() {
            cx.history.push_hash(step_id);
        }
        sync.finish(generation);
        pending
    }

    /// Replay back/forward navigation.
    pub fn on_popstate<D: Dom<Node = N>>(&self, cx: &mut PageCtx<'_, D>) -> PopOutcome<N> {
        self.sync.borrow_mut().on_popstate(cx)
    }

    /// The focus move scheduled by the latest activation.
    pub fn take_pending_focus(&self) -> Option<PendingFocus<N>> {
        self.sync.borrow_mut().take_pending_focus()
    }

    /// Perform a scheduled focus move, see [`HistorySync::settle_focus`].
    pub fn settle_focus<D: Dom<Node = N>>(&self, dom: &mut D, pending: &PendingFocus<N>) -> bool {
        self.sync.borrow().settle_focus(dom, pending)
    }
}
