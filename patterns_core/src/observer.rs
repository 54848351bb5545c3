// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Batched viewport intersection events and the triggers they drive.

use std::fmt;

use crate::{Dom, Selector};

/// Configuration of the underlying viewport intersection primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Visible ratios at which entries are reported.
    pub thresholds: Vec<f64>,
    /// CSS margin around the viewport.
    pub root_margin: String,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![0.15],
            root_margin: "0px".to_owned(),
        }
    }
}

/// One intersection change, as reported by the browser.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<N> {
    /// The observed element.
    pub target: N,
    /// Whether it intersects the viewport now.
    pub is_intersecting: bool,
    /// The visible fraction of the element.
    pub ratio: f64,
}

/// Reacts to intersection entries.
///
/// Each call sees the entry before it in the same batch, which is enough to implement
/// directional or debounced behavior without querying the document again.
pub trait ObserverTrigger<D: Dom> {
    /// Handle `entry`; `previous` is the entry preceding it in the batch.
    fn trigger(
        &mut self,
        dom: &mut D,
        entry: &IntersectionEntry<D::Node>,
        previous: Option<&IntersectionEntry<D::Node>>,
    );
}

impl<D, F> ObserverTrigger<D> for F
where
    D: Dom,
    F: FnMut(&mut D, &IntersectionEntry<D::Node>, Option<&IntersectionEntry<D::Node>>),
{
    fn trigger(
        &mut self,
        dom: &mut D,
        entry: &IntersectionEntry<D::Node>,
        previous: Option<&IntersectionEntry<D::Node>>,
    ) {
        self(dom, entry, previous);
    }
}

/// Drives an [`ObserverTrigger`] from batches of intersection entries.
pub struct VisibilityObserver<D: Dom> {
    options: ObserverOptions,
    targets: Selector,
    trigger: Box<dyn ObserverTrigger<D>>,
}

impl<D: Dom> fmt::Debug for VisibilityObserver<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityObserver")
            .field("options", &self.options)
            .field("targets", &self.targets.to_string())
            .finish_non_exhaustive()
    }
}

impl<D: Dom> VisibilityObserver<D> {
    /// Observe every element matching `targets`.
    pub fn new(
        options: ObserverOptions,
        targets: Selector,
        trigger: impl ObserverTrigger<D> + 'static,
    ) -> Self {
        Self {
            options,
            targets,
            trigger: Box::new(trigger),
        }
    }

    /// The options to create the browser observer with.
    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// The elements to observe.
    pub fn targets(&self, dom: &D) -> Vec<D::Node> {
        dom.query_all(&self.targets)
    }

    /// Feed one batch of entries to the trigger, in the order they were reported.
    pub fn observe_batch(&mut self, dom: &mut D, entries: &[IntersectionEntry<D::Node>]) {
        let mut previous = None;
        for entry in entries {
            self.trigger.trigger(dom, entry, previous);
            previous = Some(entry);
        }
    }
}
