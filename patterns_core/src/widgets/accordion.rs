// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use crate::{BindingId, ConfigError, Dom, EventKind, ToggleConfig, ToggleEngine, ToggleOverrides};

impl ToggleConfig {
    /// Accordion sections: toggled in place, without moving focus or touching the address.
    pub const ACCORDION: Self = Self {
        selector: Cow::Borrowed(r#"[data-js*="accordion"]"#),
        namespace: Cow::Borrowed("accordion"),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("hidden")),
        focusable: true,
        jump: false,
        events: Cow::Borrowed(&[EventKind::Click]),
    };
}

/// Expandable sections headed by a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accordion {
    binding: BindingId,
}

impl Accordion {
    /// Bind [`ToggleConfig::ACCORDION`] merged with `overrides`.
    pub fn bind<D: Dom>(
        engine: &mut ToggleEngine<D>,
        overrides: &ToggleOverrides,
    ) -> Result<Self, ConfigError> {
        let outcome = engine.bind(&ToggleConfig::ACCORDION.with_overrides(overrides), ())?;
        Ok(Self {
            binding: outcome.id(),
        })
    }

    /// The engine binding.
    pub fn binding(self) -> BindingId {
        self.binding
    }
}
