// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Keeping exactly one step of a step sequence active, and mirrored into the address hash.

use std::{borrow::Cow, fmt::Debug, time::Duration};

use thiserror::Error;

use crate::{
    ConfigError, Dom, FOCUSABLE_ELEMENTS, PageCtx, Selector, SelectorError, focus::set_focusable,
};

type CowStr = Cow<'static, str>;

/// The navigable history and address of the page.
///
/// Hashes are passed and returned without the leading `#`; implementations strip one if given.
pub trait History {
    /// `location.pathname`
    fn path(&self) -> String;

    /// The value of query parameter `name`.
    fn query_param(&self, name: &str) -> Option<String>;

    /// The fragment, `None` if empty.
    fn hash(&self) -> Option<String>;

    /// Add a history entry for the current address with fragment `hash`, given with or without
    /// its leading `#`.
    fn push_hash(&mut self, hash: &str);

    /// Change the fragment of the current entry.
    fn replace_hash(&mut self, hash: &str);

    /// Add a history entry for the current path and query, with no state and no fragment.
    fn reset_fragment(&mut self);

    /// Remove query parameter `name` from the current entry.
    fn remove_query_param(&mut self, name: &str);

    /// The full same-document address, `path?query#hash`.
    fn href(&self) -> String;
}

/// How long a newly activated step waits for layout before it takes focus.
pub const STEP_FOCUS_DELAY: Duration = Duration::from_millis(200);

/// Markup contract of a step sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepConfig {
    /// Attribute carrying a step's identifier.
    pub step_attribute: CowStr,
    /// Attribute on links naming the step they go to.
    pub go_to_attribute: CowStr,
    /// Selector for the descendant of a step that receives focus.
    pub focus_target: CowStr,
    /// Class of the active step.
    pub active_class: CowStr,
    /// Class of inactive steps, if any.
    pub inactive_class: Option<CowStr>,
    /// Legacy query parameter addressing a step.
    pub query_param: CowStr,
    /// Attribute declaring the restored tabindex of focusable descendants.
    pub tabindex_attribute: CowStr,
}

impl StepConfig {
    /// `data-step` / `data-step-go-to` markup.
    pub const DEFAULT: Self = Self {
        step_attribute: Cow::Borrowed("data-step"),
        go_to_attribute: Cow::Borrowed("data-step-go-to"),
        focus_target: Cow::Borrowed("[data-step-focus]"),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("hidden")),
        query_param: Cow::Borrowed("step"),
        tabindex_attribute: Cow::Borrowed("data-step-tabindex"),
    };
}

impl Default for StepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Why a step sequence could not be set up.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StepError {
    /// Two steps share an identifier.
    #[error("duplicate step id {0:?}")]
    DuplicateStep(String),
    /// A step has an empty identifier.
    #[error("step without an id")]
    EmptyStep,
    /// A configured selector does not parse.
    #[error("invalid selector {selector:?}")]
    Selector {
        /// The selector as configured.
        selector: String,
        /// The parse error.
        #[source]
        source: SelectorError,
    },
    /// The binding driving the sequence was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One step of a [`StepSequence`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step<N> {
    /// The step identifier, also its address hash.
    pub id: String,
    /// The step element.
    pub node: N,
}

/// The steps of a page in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepSequence<N> {
    steps: Vec<Step<N>>,
}

impl<N> StepSequence<N> {
    /// Every element carrying the step attribute, in document order.
    ///
    /// Duplicate or empty identifiers are errors.
    pub fn collect<D: Dom<Node = N>>(
        dom: &D,
        step_selector: &Selector,
        attribute: &str,
    ) -> Result<Self, StepError> {
        let mut steps: Vec<Step<N>> = Vec::new();
        for node in dom.query_all(step_selector) {
            let id = dom.attribute(&node, attribute).unwrap_or_default();
            if id.is_empty() {
                return Err(StepError::EmptyStep);
            }
            if steps.iter().any(|step| step.id == id) {
                return Err(StepError::DuplicateStep(id));
            }
            steps.push(Step { id, node });
        }
        Ok(Self { steps })
    }

    /// The step with identifier `id`.
    pub fn get(&self, id: &str) -> Option<&Step<N>> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// The first step.
    pub fn first(&self) -> Option<&Step<N>> {
        self.steps.first()
    }

    /// Steps in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Step<N>> {
        self.steps.iter()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Where the initial step came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartSource {
    /// The address hash named a step.
    Hash,
    /// The legacy query parameter named a step; it was migrated into the hash.
    Query,
    /// Neither did, the first step was used.
    Default,
}

/// The re-entrancy guard of a [`HistorySync`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No activation in progress.
    Idle,
    /// A click-triggered activation is running; `popstate` is suppressed until it finishes.
    Activating {
        /// Identifies the activation so only its own [`HistorySync::finish`] ends it.
        generation: u64,
    },
}

/// A focus move scheduled by an activation, to be performed after [`STEP_FOCUS_DELAY`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFocus<N> {
    /// The activated step element.
    pub step: N,
    activation: u64,
}

/// The result of [`HistorySync::on_popstate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PopOutcome<N> {
    /// The step named by the new hash was activated.
    Activated(PendingFocus<N>),
    /// An activation was in flight; the event was dropped.
    Suppressed,
    /// The hash names no step; nothing changed.
    Unknown,
}

/// Synchronizes the active step of a step sequence with the address hash.
///
/// Steps are looked up in the document on every operation, so steps inserted or removed
/// after initialization are picked up.
#[derive(Debug)]
pub struct HistorySync<N> {
    config: StepConfig,
    step_selector: Selector,
    focus_selector: Selector,
    focusable_selector: Selector,
    active: Option<String>,
    phase: Phase,
    generation: u64,
    activation: u64,
    pending_focus: Option<PendingFocus<N>>,
}

impl<N: Clone + PartialEq + Debug> HistorySync<N> {
    /// Validate `config` and the document's steps.
    pub fn new<D: Dom<Node = N>>(dom: &D, config: StepConfig) -> Result<Self, StepError> {
        let parse = |selector: &str| {
            Selector::parse(selector).map_err(|source| StepError::Selector {
                selector: selector.to_owned(),
                source,
            })
        };
        let step_selector = Selector::has_attribute(config.step_attribute.to_string());
        let focus_selector = parse(&config.focus_target)?;
        let focusable_selector = parse(FOCUSABLE_ELEMENTS)?;
        StepSequence::collect(dom, &step_selector, &config.step_attribute)?;
        Ok(Self {
            config,
            step_selector,
            focus_selector,
            focusable_selector,
            active: None,
            phase: Phase::Idle,
            generation: 0,
            activation: 0,
            pending_focus: None,
        })
    }

    /// The markup contract.
    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    /// The identifier of the active step.
    pub fn active_step(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The current guard state.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a click-triggered activation is in progress.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::Activating { .. })
    }

    /// The steps currently in the document.
    pub fn steps<D: Dom<Node = N>>(&self, dom: &D) -> StepSequence<N> {
        StepSequence::collect(dom, &self.step_selector, &self.config.step_attribute)
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "step sequence changed shape");
                StepSequence { steps: Vec::new() }
            })
    }

    /// The step identifier of `node`, if it is a step.
    pub fn step_id<D: Dom<Node = N>>(&self, dom: &D, node: &N) -> Option<String> {
        dom.attribute(node, &self.config.step_attribute)
            .filter(|id| !id.is_empty())
    }

    /// Pick and activate the initial step.
    ///
    /// Precedence is hash, then the legacy query parameter, then the first step. A query
    /// parameter match is migrated: the parameter is removed and its value becomes the hash.
    /// Returns `None` if the page has no steps.
    pub fn init<D: Dom<Node = N>>(&mut self, cx: &mut PageCtx<'_, D>) -> Option<StartSource> {
        let steps = self.steps(cx.dom);
        let from_hash = cx.history.hash().filter(|hash| steps.get(hash).is_some());
        let (id, source) = if let Some(hash) = from_hash {
            (hash, StartSource::Hash)
        } else if let Some(query) = cx
            .history
            .query_param(&self.config.query_param)
            .filter(|query| steps.get(query).is_some())
        {
            cx.history.remove_query_param(&self.config.query_param);
            cx.history.replace_hash(&query);
            (query, StartSource::Query)
        } else {
            (steps.first()?.id.clone(), StartSource::Default)
        };
        tracing::debug!(step = %id, ?source, "initial step");
        self.activate(cx.dom, &id);
        // Loading the page does not move focus.
        self.pending_focus = None;
        Some(source)
    }

    /// Make `step_id` the only active step.
    ///
    /// Every other step loses the active class, gains the inactive class, gets
    /// `aria-hidden="true"` and has its focusable descendants withdrawn from the tab order; the
    /// addressed step gets the opposite. Unknown identifiers change nothing.
    pub fn activate<D: Dom<Node = N>>(
        &mut self,
        dom: &mut D,
        step_id: &str,
    ) -> Option<PendingFocus<N>> {
        let steps = self.steps(dom);
        let target = steps.get(step_id)?.node.clone();
        for step in steps.iter() {
            let visible = step.node == target;
            let focusable = dom.query_within(&step.node, &self.focusable_selector);
            if visible {
                dom.add_class(&step.node, &self.config.active_class);
                if let Some(inactive) = &self.config.inactive_class {
                    dom.remove_class(&step.node, inactive);
                }
                dom.set_attribute(&step.node, "aria-hidden", "false");
            } else {
                dom.remove_class(&step.node, &self.config.active_class);
                if let Some(inactive) = &self.config.inactive_class {
                    dom.add_class(&step.node, inactive);
                }
                dom.set_attribute(&step.node, "aria-hidden", "true");
            }
            set_focusable(dom, &focusable, visible, &self.config.tabindex_attribute);
        }
        self.active = Some(step_id.to_owned());
        self.activation += 1;
        let pending = PendingFocus {
            step: target,
            activation: self.activation,
        };
        self.pending_focus = Some(pending.clone());
        Some(pending)
    }

    /// Enter the in-flight phase for a click-triggered activation.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.phase = Phase::Activating {
            generation: self.generation,
        };
        self.generation
    }

    /// Leave the in-flight phase started by [`begin`](Self::begin) with `generation`.
    ///
    /// A stale generation is ignored.
    pub fn finish(&mut self, generation: u64) {
        if self.phase == (Phase::Activating { generation }) {
            self.phase = Phase::Idle;
        }
    }

    /// Handle back/forward navigation.
    pub fn on_popstate<D: Dom<Node = N>>(&mut self, cx: &mut PageCtx<'_, D>) -> PopOutcome<N> {
        if self.is_in_flight() {
            tracing::trace!("popstate during activation");
            return PopOutcome::Suppressed;
        }
        let Some(hash) = cx.history.hash() else {
            return PopOutcome::Unknown;
        };
        match self.activate(cx.dom, &hash) {
            Some(pending) => PopOutcome::Activated(pending),
            None => PopOutcome::Unknown,
        }
    }

    /// Take the focus move scheduled by the latest activation.
    pub fn take_pending_focus(&mut self) -> Option<PendingFocus<N>> {
        self.pending_focus.take()
    }

    /// Scroll the step into view and focus its focus target.
    ///
    /// The focus target gets a temporary `tabindex="-1"` that is removed once it has focus,
    /// unless it already declared a tabindex. Does nothing and returns `false` if another
    /// activation happened since `pending` was created or the step is gone.
    pub fn settle_focus<D: Dom<Node = N>>(&self, dom: &mut D, pending: &PendingFocus<N>) -> bool {
        if pending.activation != self.activation || !dom.is_connected(&pending.step) {
            return false;
        }
        dom.scroll_into_view(&pending.step);
        let Some(focus_target) = dom
            .query_within(&pending.step, &self.focus_selector)
            .into_iter()
            .next()
        else {
            return true;
        };
        let temporary = dom.attribute(&focus_target, "tabindex").is_none();
        if temporary {
            dom.set_attribute(&focus_target, "tabindex", "-1");
        }
        dom.focus(&focus_target);
        if temporary {
            dom.remove_attribute(&focus_target, "tabindex");
        }
        true
    }
}
