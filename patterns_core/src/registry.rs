// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Toggle bindings, deduplicated by their canonical trigger selector.

use std::fmt;

use hashbrown::HashMap;

use crate::{ConfigError, Dom, ToggleConfig, ToggleHooks, ValidatedConfig};

/// Identifies a binding within its [`BindingRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(usize);

impl BindingId {
    /// Position of the binding in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The result of [`BindingRegistry::bind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindOutcome {
    /// A new binding was registered; the caller should install its listeners.
    Bound(BindingId),
    /// A binding with the same trigger selector exists already; nothing changed.
    AlreadyBound(BindingId),
}

impl BindOutcome {
    /// The binding owning the selector, new or existing.
    pub fn id(self) -> BindingId {
        match self {
            Self::Bound(id) | Self::AlreadyBound(id) => id,
        }
    }

    /// Whether this call registered the binding.
    pub fn is_new(self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

/// A validated configuration together with its hooks.
pub struct Binding<D: Dom> {
    id: BindingId,
    config: ValidatedConfig,
    pub(crate) hooks: Box<dyn ToggleHooks<D>>,
}

impl<D: Dom> Binding<D> {
    /// This binding's id.
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// The validated configuration.
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }
}

impl<D: Dom> fmt::Debug for Binding<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("selector", &self.config.selector().to_string())
            .finish_non_exhaustive()
    }
}

/// The set of bindings of one page, keyed by trigger selector.
///
/// Owned by the application root. At most one binding exists per selector, which keeps a
/// trigger from being toggled twice by one physical event.
pub struct BindingRegistry<D: Dom> {
    bindings: Vec<Binding<D>>,
    by_selector: HashMap<String, BindingId>,
}

impl<D: Dom> Default for BindingRegistry<D> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            by_selector: HashMap::new(),
        }
    }
}

impl<D: Dom> fmt::Debug for BindingRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.bindings).finish()
    }
}

impl<D: Dom> BindingRegistry<D> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config` and register it with `hooks`.
    ///
    /// Selectors are compared in canonical form, so differently quoted spellings of the same
    /// selector are duplicates. Registering a duplicate returns [`BindOutcome::AlreadyBound`] and
    /// drops `hooks`.
    pub fn bind(
        &mut self,
        config: &ToggleConfig,
        hooks: impl ToggleHooks<D> + 'static,
    ) -> Result<BindOutcome, ConfigError> {
        let config = config.validate()?;
        let key = config.selector().to_string();
        if let Some(&existing) = self.by_selector.get(&key) {
            tracing::debug!(selector = %key, "selector already bound");
            return Ok(BindOutcome::AlreadyBound(existing));
        }
        let id = BindingId(self.bindings.len());
        self.by_selector.insert(key, id);
        self.bindings.push(Binding {
            id,
            config,
            hooks: Box::new(hooks),
        });
        Ok(BindOutcome::Bound(id))
    }

    /// The binding `id`.
    pub fn get(&self, id: BindingId) -> Option<&Binding<D>> {
        self.bindings.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: BindingId) -> Option<&mut Binding<D>> {
        self.bindings.get_mut(id.index())
    }

    /// The binding owning `selector`, if any.
    pub fn find(&self, selector: &crate::Selector) -> Option<BindingId> {
        self.by_selector.get(&selector.to_string()).copied()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = BindingId> + '_ {
        self.bindings.iter().map(|binding| binding.id)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
