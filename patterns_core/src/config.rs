// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed toggle configuration.
//!
//! Every pattern starts from an immutable default ([`ToggleConfig::DEFAULT`] or a widget's own
//! constant), which is merged with caller supplied [`ToggleOverrides`] and validated exactly once
//! when the binding is registered.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Selector, SelectorError};

type CowStr = Cow<'static, str>;

/// ARIA attributes flipped on the trigger and every other controller of the same target.
pub const TRIGGER_ARIA_ATTRIBUTES: [&str; 2] = ["aria-pressed", "aria-expanded"];

/// ARIA attributes flipped on the target.
pub const TARGET_ARIA_ATTRIBUTES: [&str; 1] = ["aria-hidden"];

/// Descendants of a target whose tab order follows the target's visibility.
pub const FOCUSABLE_ELEMENTS: &str = "a, button, input, select, textarea, object, embed, form, \
     fieldset, legend, label, area, audio, video, iframe, svg, details, table, [tabindex], \
     [contenteditable], [usemap]";

/// The DOM events a binding listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// `click`, accepted on `A` and `BUTTON` triggers.
    Click,
    /// `change`, accepted on `SELECT`, `INPUT` and `TEXTAREA` triggers.
    Change,
}

impl EventKind {
    /// The DOM event type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Change => "change",
        }
    }

    /// Parse a DOM event type.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "click" => Some(Self::Click),
            "change" => Some(Self::Change),
            _ => None,
        }
    }

    /// Whether a trigger with tag `tag` can toggle on this event.
    pub fn accepts_tag(self, tag: &str) -> bool {
        let accepted: &[&str] = match self {
            Self::Click => &["A", "BUTTON"],
            Self::Change => &["SELECT", "INPUT", "TEXTAREA"],
        };
        accepted.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// The configuration of one toggle pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleConfig {
    /// Selector identifying triggers.
    pub selector: CowStr,
    /// Namespace for the pattern's own `data-{namespace}-*` attributes.
    pub namespace: CowStr,
    /// Class flipped on the trigger, the target and the other controllers.
    pub active_class: CowStr,
    /// Class flipped on the target only, if any.
    pub inactive_class: Option<CowStr>,
    /// Whether focusable descendants of the target follow its visibility.
    pub focusable: bool,
    /// Whether fragment-link triggers move focus into the target and update the address.
    pub jump: bool,
    /// Events the binding listens to.
    pub events: Cow<'static, [EventKind]>,
}

impl ToggleConfig {
    /// The generic `[data-js*="toggle"]` pattern.
    pub const DEFAULT: Self = Self {
        selector: Cow::Borrowed(r#"[data-js*="toggle"]"#),
        namespace: Cow::Borrowed("toggle"),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("hidden")),
        focusable: true,
        jump: true,
        events: Cow::Borrowed(&[EventKind::Click, EventKind::Change]),
    };

    /// Merge `overrides` over this configuration, leaving `self` untouched.
    #[must_use]
    pub fn with_overrides(&self, overrides: &ToggleOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(selector) = &overrides.selector {
            merged.selector = Cow::Owned(selector.clone());
        }
        if let Some(namespace) = &overrides.namespace {
            merged.namespace = Cow::Owned(namespace.clone());
        }
        if let Some(active_class) = &overrides.active_class {
            merged.active_class = Cow::Owned(active_class.clone());
        }
        if let Some(inactive_class) = &overrides.inactive_class {
            merged.inactive_class =
                (!inactive_class.is_empty()).then(|| Cow::Owned(inactive_class.clone()));
        }
        if let Some(focusable) = overrides.focusable {
            merged.focusable = focusable;
        }
        if let Some(jump) = overrides.jump {
            merged.jump = jump;
        }
        if let Some(events) = &overrides.events {
            merged.events = Cow::Owned(events.clone());
        }
        merged
    }

    /// Check the configuration and precompute everything the engine needs per event.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let selector = Selector::parse(&self.selector).map_err(|source| ConfigError::Selector {
            selector: self.selector.to_string(),
            source,
        })?;
        if self.namespace.is_empty()
            || !self
                .namespace
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ConfigError::Namespace(self.namespace.to_string()));
        }
        check_class(&self.active_class)?;
        if let Some(inactive_class) = &self.inactive_class {
            check_class(inactive_class)?;
        }
        if self.events.is_empty() {
            return Err(ConfigError::NoEvents);
        }
        let focusable = Selector::parse(FOCUSABLE_ELEMENTS).map_err(|source| {
            ConfigError::Selector {
                selector: FOCUSABLE_ELEMENTS.to_owned(),
                source,
            }
        })?;
        Ok(ValidatedConfig {
            undo_attribute: format!("data-{}-undo", self.namespace),
            tabindex_attribute: format!("data-{}-tabindex", self.namespace),
            config: self.clone(),
            selector,
            focusable,
        })
    }
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn check_class(class: &str) -> Result<(), ConfigError> {
    if class.is_empty() || class.chars().any(char::is_whitespace) {
        return Err(ConfigError::ClassName(class.to_owned()));
    }
    Ok(())
}

/// A [`ToggleConfig`] that passed validation, with its selectors parsed.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    config: ToggleConfig,
    selector: Selector,
    focusable: Selector,
    undo_attribute: String,
    tabindex_attribute: String,
}

impl ValidatedConfig {
    /// The configuration as given.
    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }

    /// The parsed trigger selector.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The parsed focusable-descendant selector.
    pub fn focusable_selector(&self) -> &Selector {
        &self.focusable
    }

    /// `data-{namespace}-undo`
    pub fn undo_attribute(&self) -> &str {
        &self.undo_attribute
    }

    /// `data-{namespace}-tabindex`
    pub fn tabindex_attribute(&self) -> &str {
        &self.tabindex_attribute
    }

    /// Whether the binding listens to `kind`.
    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.config.events.contains(&kind)
    }
}

/// Caller overrides for a [`ToggleConfig`]; `None` keeps the default.
///
/// An empty `inactive_class` disables the inactive class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ToggleOverrides {
    /// See [`ToggleConfig::selector`].
    pub selector: Option<String>,
    /// See [`ToggleConfig::namespace`].
    pub namespace: Option<String>,
    /// See [`ToggleConfig::active_class`].
    pub active_class: Option<String>,
    /// See [`ToggleConfig::inactive_class`].
    pub inactive_class: Option<String>,
    /// See [`ToggleConfig::focusable`].
    pub focusable: Option<bool>,
    /// See [`ToggleConfig::jump`].
    pub jump: Option<bool>,
    /// See [`ToggleConfig::events`].
    pub events: Option<Vec<EventKind>>,
}

#[derive(Clone, Copy, Debug)]
enum Field {
    Selector,
    ActiveClass,
    InactiveClass,
    Focusable,
    Jump,
    Events,
}

/// Attribute suffixes (after `data-{namespace}-`) that may configure a binding.
const ATTRIBUTE_TABLE: [(&str, Field); 6] = [
    ("selector", Field::Selector),
    ("active-class", Field::ActiveClass),
    ("inactive-class", Field::InactiveClass),
    ("focusable", Field::Focusable),
    ("jump", Field::Jump),
    ("events", Field::Events),
];

impl ToggleOverrides {
    /// Parse overrides from a JSON object such as `{"activeClass": "is-open", "jump": false}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))
    }

    /// Read overrides from `data-{namespace}-*` attributes through `attribute`.
    ///
    /// `attribute` is usually a closure over [`Dom::attribute`](crate::Dom::attribute) for a
    /// configuration host element.
    pub fn from_attributes(
        namespace: &str,
        attribute: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut overrides = Self::default();
        for (suffix, field) in ATTRIBUTE_TABLE {
            let name = format!("data-{namespace}-{suffix}");
            let Some(value) = attribute(&name) else {
                continue;
            };
            match field {
                Field::Selector => overrides.selector = Some(value),
                Field::ActiveClass => overrides.active_class = Some(value),
                Field::InactiveClass => overrides.inactive_class = Some(value),
                Field::Focusable => overrides.focusable = Some(parse_bool(&name, &value)?),
                Field::Jump => overrides.jump = Some(parse_bool(&name, &value)?),
                Field::Events => {
                    let events = value
                        .split_ascii_whitespace()
                        .map(|event| {
                            EventKind::from_name(event).ok_or_else(|| ConfigError::Attribute {
                                name: name.clone(),
                                value: value.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    overrides.events = Some(events);
                }
            }
        }
        Ok(overrides)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::Attribute {
            name: name.to_owned(),
            value: value.to_owned(),
        }),
    }
}

/// Why a configuration was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The trigger selector does not parse.
    #[error("invalid selector {selector:?}")]
    Selector {
        /// The selector as given.
        selector: String,
        /// The parse error.
        #[source]
        source: SelectorError,
    },
    /// Namespaces are lower case ASCII letters, digits and `-`.
    #[error("invalid namespace {0:?}")]
    Namespace(String),
    /// Class names are non-empty and contain no whitespace.
    #[error("invalid class name {0:?}")]
    ClassName(String),
    /// A binding has to listen to at least one event.
    #[error("binding listens to no events")]
    NoEvents,
    /// A configuration attribute has a value of the wrong shape.
    #[error("invalid value {value:?} for attribute {name}")]
    Attribute {
        /// The attribute name.
        name: String,
        /// The attribute value.
        value: String,
    },
    /// JSON overrides failed to deserialize.
    #[error("invalid configuration JSON: {0}")]
    Json(String),
}
