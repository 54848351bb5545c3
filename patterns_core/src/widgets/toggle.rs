// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    BindingId, ConfigError, Dom, ToggleConfig, ToggleEngine, ToggleHooks, ToggleOverrides,
};

/// The generic `[data-js*="toggle"]` pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Toggle {
    binding: BindingId,
}

impl Toggle {
    /// Bind [`ToggleConfig::DEFAULT`] merged with `overrides`.
    pub fn bind<D: Dom>(
        engine: &mut ToggleEngine<D>,
        overrides: &ToggleOverrides,
    ) -> Result<Self, ConfigError> {
        Self::bind_with_hooks(engine, overrides, ())
    }

    /// Like [`bind`](Self::bind), with custom hooks.
    ///
    /// If the selector is already bound, `hooks` are dropped.
    pub fn bind_with_hooks<D: Dom>(
        engine: &mut ToggleEngine<D>,
        overrides: &ToggleOverrides,
        hooks: impl ToggleHooks<D> + 'static,
    ) -> Result<Self, ConfigError> {
        let outcome = engine.bind(&ToggleConfig::DEFAULT.with_overrides(overrides), hooks)?;
        Ok(Self {
            binding: outcome.id(),
        })
    }

    /// The engine binding.
    pub fn binding(self) -> BindingId {
        self.binding
    }
}
