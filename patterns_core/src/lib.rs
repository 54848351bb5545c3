// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

// https://linebender.org/blog/doc-include
//! <!-- This license link is in a .rustdoc-hidden section, but we may as well give the correct link -->
//! [LICENSE]: https://github.com/patterns-rs/patterns/blob/main/LICENSE
//!
//! [`Dom`]: crate::Dom
//! [`History`]: crate::History
//! [`ToggleEngine`]: crate::ToggleEngine
//! [`HistorySync`]: crate::HistorySync
//! [`VisibilityObserver`]: crate::VisibilityObserver
//! [`MemoryDocument`]: crate::MemoryDocument
//!
//! <style>
//! .rustdoc-hidden { display: none; }
//! </style>
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET

mod config;
mod dom;
mod focus;
mod history;
mod memory;
mod navigation;
mod observer;
mod page;
mod preferences;
mod registry;
mod selector;
mod toggle;

pub mod widgets;

pub use config::{
    ConfigError, EventKind, FOCUSABLE_ELEMENTS, TARGET_ARIA_ATTRIBUTES, TRIGGER_ARIA_ATTRIBUTES,
    ToggleConfig, ToggleOverrides, ValidatedConfig,
};
pub use dom::{Dom, PageCtx};
pub use history::{
    History, HistorySync, PendingFocus, Phase, PopOutcome, STEP_FOCUS_DELAY, StartSource, Step,
    StepConfig, StepError, StepSequence,
};
pub use memory::{
    Effect, ElementId, ElementTemplate, Location, MemoryDocument, MemoryHistory, MemoryStorage,
};
pub use navigation::{ActiveNavigation, NavigationConfig};
pub use observer::{IntersectionEntry, ObserverOptions, ObserverTrigger, VisibilityObserver};
pub use page::{BindError, Capabilities, Handled, Patterns};
pub use preferences::{
    PREFERENCE_CONTROL_ATTRIBUTE, Preference, PreferenceError, Preferences, Storage,
};
pub use registry::{BindOutcome, Binding, BindingId, BindingRegistry};
pub use selector::{Selector, SelectorError, SelectorSubject};
pub use toggle::{
    FnHooks, ToggleEngine, ToggleHooks, ToggleOutcome, Toggled, TriggerEvent, resolve_target,
};
pub use widgets::{
    Accordion, Dialog, Newsletter, NewsletterConfig, NewsletterError, NewsletterResponse, Popover,
    Reply, ShareData, ShareRoute, StepByStep, Toggle, WebShare,
};
