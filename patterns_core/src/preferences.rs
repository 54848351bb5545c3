// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Persistent reader preferences (color theme and reading direction).
//!
//! Each preference is a single string in [`Storage`], read once when the page starts and written
//! on every change. The value is mirrored into an attribute of the root element, where the
//! stylesheet picks it up.

use thiserror::Error;

use crate::{Dom, Selector};

/// Attribute naming the preference a control cycles when clicked, e.g. `data-preference="theme"`.
pub const PREFERENCE_CONTROL_ATTRIBUTE: &str = "data-preference";

/// A string key-value store, `localStorage` in the browser.
pub trait Storage {
    /// The value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: &str);
}

/// A preference with a closed set of values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preference {
    /// Storage key.
    pub key: &'static str,
    /// Attribute of the root element mirroring the value.
    pub attribute: &'static str,
    /// Accepted values; the first one is the default.
    pub values: &'static [&'static str],
}

impl Preference {
    /// `data-theme` on the root element, `light` or `dark`.
    pub const THEME: Self = Self {
        key: "theme",
        attribute: "data-theme",
        values: &["light", "dark"],
    };

    /// `dir` on the root element, `ltr` or `rtl`.
    pub const DIRECTION: Self = Self {
        key: "direction",
        attribute: "dir",
        values: &["ltr", "rtl"],
    };

    /// The default value.
    pub fn default_value(&self) -> &'static str {
        self.values.first().copied().unwrap_or_default()
    }

    fn accepts(&self, value: &str) -> Option<&'static str> {
        self.values.iter().copied().find(|v| *v == value)
    }

    /// The value after `current` in cyclic order.
    pub fn next(&self, current: &str) -> &'static str {
        let position = self.values.iter().position(|v| *v == current);
        match position {
            Some(i) => self.values[(i + 1) % self.values.len()],
            None => self.default_value(),
        }
    }
}

/// A value outside a preference's accepted set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{value:?} is not a valid {key} preference")]
pub struct PreferenceError {
    /// The preference's storage key.
    pub key: &'static str,
    /// The rejected value.
    pub value: String,
}

/// The current values of a set of preferences.
#[derive(Clone, Debug)]
pub struct Preferences {
    current: Vec<(Preference, &'static str)>,
}

impl Preferences {
    /// Read every preference from `storage` and apply it to the root element.
    ///
    /// Missing or unknown stored values fall back to the default without being written back.
    pub fn load<D: Dom>(dom: &mut D, storage: &dyn Storage, preferences: &[Preference]) -> Self {
        let root = dom.root();
        let current = preferences
            .iter()
            .map(|preference| {
                let value = storage
                    .get(preference.key)
                    .and_then(|stored| preference.accepts(&stored))
                    .unwrap_or_else(|| preference.default_value());
                dom.set_attribute(&root, preference.attribute, value);
                (*preference, value)
            })
            .collect();
        let preferences = Self { current };
        for (preference, value) in &preferences.current {
            sync_controls(dom, preference, value);
        }
        preferences
    }

    /// The current value of `preference`.
    pub fn get(&self, preference: &Preference) -> Option<&'static str> {
        self.current
            .iter()
            .find(|(p, _)| p.key == preference.key)
            .map(|(_, value)| *value)
    }

    /// Change `preference` to `value`, applying and storing it.
    pub fn set<D: Dom>(
        &mut self,
        dom: &mut D,
        storage: &mut dyn Storage,
        preference: &Preference,
        value: &str,
    ) -> Result<(), PreferenceError> {
        let value = preference.accepts(value).ok_or_else(|| PreferenceError {
            key: preference.key,
            value: value.to_owned(),
        })?;
        dom.set_attribute(&dom.root(), preference.attribute, value);
        storage.set(preference.key, value);
        match self.current.iter_mut().find(|(p, _)| p.key == preference.key) {
            Some((_, current)) => *current = value,
            None => self.current.push((*preference, value)),
        }
        tracing::debug!(key = preference.key, value, "preference changed");
        Ok(())
    }

    /// Advance `preference` to its next value, returning it.
    pub fn cycle<D: Dom>(
        &mut self,
        dom: &mut D,
        storage: &mut dyn Storage,
        preference: &Preference,
    ) -> &'static str {
        let current = self.get(preference).unwrap_or_else(|| preference.default_value());
        let next = preference.next(current);
        // `next` always returns an accepted value.
        let _ = self.set(dom, storage, preference, next);
        sync_controls(dom, preference, next);
        next
    }

    /// Cycle the preference named by the closest `[data-preference]` control around `origin`.
    ///
    /// Returns the new value, or `None` if the click was not on a control of a loaded preference.
    pub fn on_click<D: Dom>(
        &mut self,
        dom: &mut D,
        storage: &mut dyn Storage,
        origin: &D::Node,
    ) -> Option<&'static str> {
        let controls = Selector::has_attribute(PREFERENCE_CONTROL_ATTRIBUTE);
        let control = dom.closest(origin, &controls)?;
        let key = dom.attribute(&control, PREFERENCE_CONTROL_ATTRIBUTE)?;
        let preference = self
            .current
            .iter()
            .map(|(preference, _)| *preference)
            .find(|preference| preference.key == key)?;
        Some(self.cycle(dom, storage, &preference))
    }
}

/// Controls of `preference` are pressed while it is not at its default.
fn sync_controls<D: Dom>(dom: &mut D, preference: &Preference, value: &str) {
    let pressed = if value == preference.default_value() {
        "false"
    } else {
        "true"
    };
    let controls = Selector::attribute_equals(PREFERENCE_CONTROL_ATTRIBUTE, preference.key);
    for control in dom.query_all(&controls) {
        dom.set_attribute(&control, "aria-pressed", pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementTemplate, MemoryDocument, MemoryStorage};

    #[test]
    fn load_falls_back_without_writing() {
        let mut dom = MemoryDocument::new();
        let mut storage = MemoryStorage::new();
        storage.set("theme", "sepia");
        storage.set("direction", "rtl");
        let before = storage.writes();
        let preferences = Preferences::load(
            &mut dom,
            &storage,
            &[Preference::THEME, Preference::DIRECTION],
        );
        assert_eq!(preferences.get(&Preference::THEME), Some("light"));
        assert_eq!(preferences.get(&Preference::DIRECTION), Some("rtl"));
        let root = dom.root();
        assert_eq!(dom.attribute(&root, "dir").as_deref(), Some("rtl"));
        assert_eq!(dom.attribute(&root, "data-theme").as_deref(), Some("light"));
        assert_eq!(storage.writes(), before);
    }

    #[test]
    fn cycle_writes_every_change() {
        let mut dom = MemoryDocument::new();
        let mut storage = MemoryStorage::new();
        let mut preferences = Preferences::load(&mut dom, &storage, &[Preference::THEME]);
        assert_eq!(preferences.cycle(&mut dom, &mut storage, &Preference::THEME), "dark");
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
        assert_eq!(preferences.cycle(&mut dom, &mut storage, &Preference::THEME), "light");
        assert_eq!(storage.writes(), 2);
        assert_eq!(
            preferences.set(&mut dom, &mut storage, &Preference::THEME, "neon"),
            Err(PreferenceError {
                key: "theme",
                value: "neon".into()
            })
        );
    }

    #[test]
    fn controls_cycle_their_preference() {
        let mut dom = MemoryDocument::new();
        let mut storage = MemoryStorage::new();
        let body = dom.body();
        let control = dom.append(
            body,
            ElementTemplate::new("button").attr(PREFERENCE_CONTROL_ATTRIBUTE, "direction"),
        );
        let icon = dom.append(control, ElementTemplate::new("svg"));
        let unrelated = dom.append(body, ElementTemplate::new("button"));
        let mut preferences = Preferences::load(&mut dom, &storage, &[Preference::DIRECTION]);
        assert_eq!(dom.attribute(&control, "aria-pressed").as_deref(), Some("false"));

        assert_eq!(preferences.on_click(&mut dom, &mut storage, &icon), Some("rtl"));
        assert_eq!(dom.attribute(&dom.root(), "dir").as_deref(), Some("rtl"));
        assert_eq!(dom.attribute(&control, "aria-pressed").as_deref(), Some("true"));
        assert_eq!(preferences.on_click(&mut dom, &mut storage, &unrelated), None);
        assert_eq!(storage.get("direction").as_deref(), Some("rtl"));
    }
}
