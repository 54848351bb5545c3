// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! The toggle engine: maps a trigger to its target and keeps classes, ARIA state and tab order
//! of the trigger, the target and every other controller of the target in lockstep.

use std::fmt;

use crate::{
    BindOutcome, BindingId, BindingRegistry, ConfigError, Dom, EventKind, PageCtx, Selector,
    TARGET_ARIA_ATTRIBUTES, TRIGGER_ARIA_ATTRIBUTES, ToggleConfig, ValidatedConfig,
    focus::set_focusable,
};

/// A delegated event as seen by the engine: its type and the element it originated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerEvent<N> {
    /// The event type.
    pub kind: EventKind,
    /// `event.target`
    pub origin: N,
}

impl<N> TriggerEvent<N> {
    /// A `click` on `origin`.
    pub fn click(origin: N) -> Self {
        Self {
            kind: EventKind::Click,
            origin,
        }
    }

    /// A `change` on `origin`.
    pub fn change(origin: N) -> Self {
        Self {
            kind: EventKind::Change,
            origin,
        }
    }
}

/// Everything a toggle touches, resolved when the event is handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toggled<N> {
    /// The binding handling the toggle.
    pub binding: BindingId,
    /// The element the user interacted with.
    pub trigger: N,
    /// The element being shown or hidden.
    pub target: N,
    /// Every other element referencing the target via `href` or `aria-controls`.
    pub others: Vec<N>,
    /// Focusable descendants of the target.
    pub focusable: Vec<N>,
}

/// Extension points a composing pattern can hook into.
///
/// All methods have no-op defaults. The hooks are called in the order
/// [`valid`](Self::valid), [`before`](Self::before), mutations, [`after`](Self::after).
pub trait ToggleHooks<D: Dom> {
    /// Return `false` to abort the toggle before anything changes.
    fn valid(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) -> bool {
        let _ = (cx, toggled);
        true
    }

    /// Runs after validation, before any mutation.
    fn before(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) {
        let _ = (cx, toggled);
    }

    /// Runs after every mutation.
    fn after(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) {
        let _ = (cx, toggled);
    }
}

impl<D: Dom> ToggleHooks<D> for () {}

type ValidFn<D> = Box<dyn FnMut(&mut PageCtx<'_, D>, &Toggled<<D as Dom>::Node>) -> bool>;
type HookFn<D> = Box<dyn FnMut(&mut PageCtx<'_, D>, &Toggled<<D as Dom>::Node>)>;

/// [`ToggleHooks`] built from closures.
pub struct FnHooks<D: Dom> {
    valid: Option<ValidFn<D>>,
    before: Option<HookFn<D>>,
    after: Option<HookFn<D>>,
}

impl<D: Dom> Default for FnHooks<D> {
    fn default() -> Self {
        Self {
            valid: None,
            before: None,
            after: None,
        }
    }
}

impl<D: Dom> fmt::Debug for FnHooks<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHooks")
            .field("valid", &self.valid.is_some())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

impl<D: Dom> FnHooks<D> {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validator.
    #[must_use]
    pub fn valid(
        mut self,
        f: impl FnMut(&mut PageCtx<'_, D>, &Toggled<D::Node>) -> bool + 'static,
    ) -> Self {
        self.valid = Some(Box::new(f));
        self
    }

    /// Set the before hook.
    #[must_use]
    pub fn before(
        mut self,
        f: impl FnMut(&mut PageCtx<'_, D>, &Toggled<D::Node>) + 'static,
    ) -> Self {
        self.before = Some(Box::new(f));
        self
    }

    /// Set the after hook.
    #[must_use]
    pub fn after(
        mut self,
        f: impl FnMut(&mut PageCtx<'_, D>, &Toggled<D::Node>) + 'static,
    ) -> Self {
        self.after = Some(Box::new(f));
        self
    }
}

impl<D: Dom> ToggleHooks<D> for FnHooks<D> {
    fn valid(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) -> bool {
        self.valid.as_mut().is_none_or(|valid| valid(cx, toggled))
    }

    fn before(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) {
        if let Some(before) = &mut self.before {
            before(cx, toggled);
        }
    }

    fn after(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) {
        if let Some(after) = &mut self.after {
            after(cx, toggled);
        }
    }
}

/// What handling an event did for one binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome<N> {
    /// The target was toggled; `active` is its new state.
    Toggled {
        /// The toggled element.
        target: N,
        /// Whether the target now has the active class.
        active: bool,
    },
    /// An armed undo control reversed an earlier toggle.
    Undone {
        /// The toggled element.
        target: N,
        /// Whether the target now has the active class.
        active: bool,
    },
    /// The trigger does not reference a connected element.
    NoTarget,
    /// The binding's validator rejected the toggle.
    Vetoed,
    /// The trigger matched, but its element type does not toggle on this event.
    Ignored,
}

impl<N> ToggleOutcome<N> {
    /// Whether anything was mutated.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Toggled { .. } | Self::Undone { .. })
    }
}

#[derive(Debug)]
struct ArmedUndo<N> {
    binding: BindingId,
    control: N,
    trigger: N,
    target: N,
}

/// Owns the page's [`BindingRegistry`] and applies toggles.
pub struct ToggleEngine<D: Dom> {
    registry: BindingRegistry<D>,
    undo: Vec<ArmedUndo<D::Node>>,
}

impl<D: Dom> Default for ToggleEngine<D> {
    fn default() -> Self {
        Self {
            registry: BindingRegistry::new(),
            undo: Vec::new(),
        }
    }
}

impl<D: Dom> fmt::Debug for ToggleEngine<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleEngine")
            .field("registry", &self.registry)
            .field("armed_undo", &self.undo.len())
            .finish()
    }
}

impl<D: Dom> ToggleEngine<D> {
    /// An engine without bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding, see [`BindingRegistry::bind`].
    pub fn bind(
        &mut self,
        config: &ToggleConfig,
        hooks: impl ToggleHooks<D> + 'static,
    ) -> Result<BindOutcome, ConfigError> {
        self.registry.bind(config, hooks)
    }

    /// The registry.
    pub fn registry(&self) -> &BindingRegistry<D> {
        &self.registry
    }

    /// The validated configuration of `binding`.
    pub fn config(&self, binding: BindingId) -> Option<&ValidatedConfig> {
        self.registry.get(binding).map(|b| b.config())
    }

    /// Whether `node` carries the active class of `binding`.
    pub fn is_active(&self, dom: &D, binding: BindingId, node: &D::Node) -> bool {
        self.config(binding)
            .is_some_and(|config| dom.has_class(node, &config.config().active_class))
    }

    /// The trigger of `binding` that `origin` belongs to, if the binding listens to `kind`.
    pub fn trigger_for(
        &self,
        dom: &D,
        binding: BindingId,
        kind: EventKind,
        origin: &D::Node,
    ) -> Option<D::Node> {
        let config = self.config(binding)?;
        if !config.listens_to(kind) {
            return None;
        }
        dom.closest(origin, config.selector())
    }

    /// Handle a delegated event for every binding, in registration order.
    ///
    /// Bindings whose selector does not match the event origin are not part of the result.
    /// A click on an armed undo control is consumed by the undo and reaches no binding.
    pub fn dispatch(
        &mut self,
        cx: &mut PageCtx<'_, D>,
        event: &TriggerEvent<D::Node>,
    ) -> Vec<(BindingId, ToggleOutcome<D::Node>)> {
        if event.kind == EventKind::Click {
            if let Some(undone) = self.undo(cx, &event.origin) {
                return vec![undone];
            }
        }
        let ids: Vec<BindingId> = self.registry.ids().collect();
        ids.into_iter()
            .filter_map(|id| {
                self.dispatch_one(cx, id, event)
                    .map(|outcome| (id, outcome))
            })
            .collect()
    }

    /// Handle a delegated event for one binding.
    ///
    /// Returns `None` if the event does not concern `binding`.
    pub fn dispatch_one(
        &mut self,
        cx: &mut PageCtx<'_, D>,
        binding: BindingId,
        event: &TriggerEvent<D::Node>,
    ) -> Option<ToggleOutcome<D::Node>> {
        let trigger = self.trigger_for(cx.dom, binding, event.kind, &event.origin)?;
        if !event.kind.accepts_tag(&cx.dom.tag_name(&trigger)) {
            return Some(ToggleOutcome::Ignored);
        }
        Some(self.toggle(cx, binding, &trigger))
    }

    /// Toggle the target referenced by `trigger`.
    ///
    /// The target is resolved from the trigger's `href` fragment, falling back to its
    /// `aria-controls` reference. An unresolvable reference is a silent no-op.
    pub fn toggle(
        &mut self,
        cx: &mut PageCtx<'_, D>,
        binding: BindingId,
        trigger: &D::Node,
    ) -> ToggleOutcome<D::Node> {
        let Some(target) = resolve_target(cx.dom, trigger) else {
            tracing::trace!(?trigger, "toggle without target");
            return ToggleOutcome::NoTarget;
        };
        let Some(binding_ref) = self.registry.get_mut(binding) else {
            return ToggleOutcome::NoTarget;
        };
        let outcome = element_toggle(binding_ref, cx, trigger.clone(), target.clone());

        if outcome.changed() {
            let undo_attribute = binding_ref.config().undo_attribute().to_owned();
            self.arm_undo(cx.dom, binding, &undo_attribute, trigger, &target);
        }
        outcome
    }

    fn arm_undo(
        &mut self,
        dom: &D,
        binding: BindingId,
        undo_attribute: &str,
        trigger: &D::Node,
        target: &D::Node,
    ) {
        let Some(reference) = dom.attribute(trigger, undo_attribute) else {
            return;
        };
        let control = match Selector::parse(&reference) {
            Ok(selector) => dom.query_all(&selector).into_iter().next(),
            Err(err) => {
                tracing::warn!(%reference, %err, "invalid undo selector");
                None
            }
        };
        let Some(control) = control else {
            return;
        };
        self.undo.retain(|armed| armed.control != control);
        self.undo.push(ArmedUndo {
            binding,
            control,
            trigger: trigger.clone(),
            target: target.clone(),
        });
    }

    /// Replay and disarm the undo whose control contains `origin`.
    fn undo(
        &mut self,
        cx: &mut PageCtx<'_, D>,
        origin: &D::Node,
    ) -> Option<(BindingId, ToggleOutcome<D::Node>)> {
        let position = self.undo.iter().position(|armed| {
            let mut node = Some(origin.clone());
            while let Some(current) = node {
                if current == armed.control {
                    return true;
                }
                node = cx.dom.parent(&current);
            }
            false
        })?;
        let armed = self.undo.remove(position);
        let binding = self.registry.get_mut(armed.binding)?;
        if !cx.dom.is_connected(&armed.target) {
            return Some((armed.binding, ToggleOutcome::NoTarget));
        }
        let outcome = match element_toggle(binding, cx, armed.trigger, armed.target) {
            ToggleOutcome::Toggled { target, active } => ToggleOutcome::Undone { target, active },
            other => other,
        };
        Some((armed.binding, outcome))
    }

    /// Whether an undo control is armed for `node`.
    pub fn is_undo_armed(&self, node: &D::Node) -> bool {
        self.undo.iter().any(|armed| &armed.control == node)
    }
}

/// The element referenced by `trigger`'s `href` fragment, or else by its `aria-controls`.
pub fn resolve_target<D: Dom>(dom: &D, trigger: &D::Node) -> Option<D::Node> {
    dom.attribute(trigger, "href")
        .filter(|href| href.starts_with('#'))
        .and_then(|href| dom.resolve_reference(&href))
        .or_else(|| {
            dom.attribute(trigger, "aria-controls")
                .and_then(|id| dom.resolve_reference(&id))
        })
}

/// Every element referencing `target` by `href="#id"` or `aria-controls="id"`, except `trigger`.
fn other_controllers<D: Dom>(dom: &D, trigger: &D::Node, target: &D::Node) -> Vec<D::Node> {
    let Some(id) = dom.attribute(target, "id").filter(|id| !id.is_empty()) else {
        return Vec::new();
    };
    let selector = Selector::attribute_equals("href", format!("#{id}"))
        .or(Selector::attribute_equals("aria-controls", id));
    dom.query_all(&selector)
        .into_iter()
        .filter(|node| node != trigger)
        .collect()
}

/// Flip a boolean ARIA attribute. Absent or empty attributes are not booleans and stay untouched.
fn flip_aria<D: Dom>(dom: &mut D, node: &D::Node, attribute: &str) {
    if let Some(value) = dom.attribute(node, attribute).filter(|v| !v.is_empty()) {
        let flipped = if value == "true" { "false" } else { "true" };
        dom.set_attribute(node, attribute, flipped);
    }
}

fn element_toggle<D: Dom>(
    binding: &mut crate::Binding<D>,
    cx: &mut PageCtx<'_, D>,
    trigger: D::Node,
    target: D::Node,
) -> ToggleOutcome<D::Node> {
    let config = binding.config().clone();
    let settings = config.config();
    let toggled = Toggled {
        binding: binding.id(),
        others: other_controllers(cx.dom, &trigger, &target),
        focusable: cx.dom.query_within(&target, config.focusable_selector()),
        trigger,
        target,
    };

    if !binding.hooks.valid(cx, &toggled) {
        tracing::debug!(binding = ?toggled.binding, target = ?toggled.target, "toggle vetoed");
        return ToggleOutcome::Vetoed;
    }
    binding.hooks.before(cx, &toggled);

    let dom = &mut *cx.dom;
    dom.toggle_class(&toggled.trigger, &settings.active_class);
    let active = dom.toggle_class(&toggled.target, &settings.active_class);
    for other in &toggled.others {
        dom.toggle_class(other, &settings.active_class);
    }
    if let Some(inactive_class) = &settings.inactive_class {
        dom.toggle_class(&toggled.target, inactive_class);
    }

    for attribute in TARGET_ARIA_ATTRIBUTES {
        flip_aria(dom, &toggled.target, attribute);
    }
    for attribute in TRIGGER_ARIA_ATTRIBUTES {
        flip_aria(dom, &toggled.trigger, attribute);
        for other in &toggled.others {
            flip_aria(dom, other, attribute);
        }
    }

    if settings.focusable {
        set_focusable(dom, &toggled.focusable, active, config.tabindex_attribute());
    }

    if settings.jump {
        if let Some(href) = dom
            .attribute(&toggled.trigger, "href")
            .filter(|href| href.starts_with('#'))
        {
            jump_to(cx, &toggled.target, &href, active);
        }
    }

    binding.hooks.after(cx, &toggled);
    tracing::debug!(binding = ?toggled.binding, target = ?toggled.target, active, "toggled");
    ToggleOutcome::Toggled {
        target: toggled.target,
        active,
    }
}

/// Clear the fragment from the address, then, if the target opened, put the fragment back and
/// move focus into the target with a temporary `tabindex="0"`.
fn jump_to<D: Dom>(cx: &mut PageCtx<'_, D>, target: &D::Node, href: &str, active: bool) {
    cx.history.reset_fragment();
    if active {
        cx.history.replace_hash(href);
        cx.dom.set_attribute(target, "tabindex", "0");
        if !cx.dom.focus(target) {
            tracing::trace!(?target, "jump target is detached");
        }
    } else {
        cx.dom.remove_attribute(target, "tabindex");
    }
}
