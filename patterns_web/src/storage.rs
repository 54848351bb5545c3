// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use patterns_core::Storage;

/// `window.localStorage`.
///
/// Where storage is disabled, reads find nothing and writes are dropped.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    /// The local storage of the current window.
    pub fn new() -> Self {
        let storage = gloo::utils::window().local_storage().ok().flatten();
        if storage.is_none() {
            tracing::warn!("localStorage is unavailable, preferences will not persist");
        }
        Self { storage }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(err) = storage.set_item(key, value) {
            tracing::warn!(key, ?err, "couldn't store preference");
        }
    }
}
