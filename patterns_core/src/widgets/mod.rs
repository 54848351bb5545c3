// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Ready-made patterns composed from the [`ToggleEngine`](crate::ToggleEngine).
//!
//! Each widget is a preset [`ToggleConfig`](crate::ToggleConfig) plus the hooks that give it its
//! behavior. Stateful widgets share that state between their hooks and the handle returned from
//! `bind`, so they bind at most once per selector: binding a selector that is already bound
//! returns `None` and leaves the first widget in charge.

use std::{cell::RefCell, rc::Rc};

mod accordion;
mod dialog;
mod newsletter;
mod popover;
mod share;
mod step_by_step;
mod toggle;

pub use accordion::Accordion;
pub use dialog::{Dialog, SCROLL_LOCK_CLASS};
pub use newsletter::{
    Newsletter, NewsletterConfig, NewsletterError, NewsletterResponse, NewsletterStrings, Reply,
    validate_email,
};
pub use popover::Popover;
pub use share::{ShareData, ShareRoute, WebShare};
pub use step_by_step::StepByStep;
pub use toggle::Toggle;

/// A target a widget currently shows, with the trigger that opened it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Opened<N> {
    pub(crate) trigger: N,
    pub(crate) target: N,
}

/// Open targets in the order they were opened, shared between hooks and widget handle.
#[derive(Debug)]
pub(crate) struct OpenSet<N>(Rc<RefCell<Vec<Opened<N>>>>);

impl<N> Clone for OpenSet<N> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<N: Clone + PartialEq> OpenSet<N> {
    pub(crate) fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    /// Record the new state of `target`; returns whether anything is open afterwards.
    pub(crate) fn update(&self, trigger: &N, target: &N, open: bool) -> bool {
        let mut opened = self.0.borrow_mut();
        opened.retain(|o| o.target != *target);
        if open {
            opened.push(Opened {
                trigger: trigger.clone(),
                target: target.clone(),
            });
        }
        !opened.is_empty()
    }

    /// A copy of the open targets, oldest first.
    pub(crate) fn snapshot(&self) -> Vec<Opened<N>> {
        self.0.borrow().clone()
    }

    /// The trigger that opened `target`, if it is open.
    pub(crate) fn opener(&self, target: &N) -> Option<N> {
        self.0
            .borrow()
            .iter()
            .find(|o| o.target == *target)
            .map(|o| o.trigger.clone())
    }

    pub(crate) fn last(&self) -> Option<Opened<N>> {
        self.0.borrow().last().cloned()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
