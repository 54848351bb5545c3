// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use patterns_core::History;
use wasm_bindgen::{JsValue, UnwrapThrowExt};
use web_sys::UrlSearchParams;

use crate::dom::report;

/// `window.history` and `window.location`.
///
/// Entries are added with `pushState`, so changing the fragment never fires `hashchange` or
/// scrolls the page.
#[derive(Clone, Debug)]
pub struct WebHistory {
    location: web_sys::Location,
    history: web_sys::History,
}

impl WebHistory {
    /// The history of the current window.
    pub fn new() -> Self {
        let window = gloo::utils::window();
        Self {
            location: window.location(),
            history: window.history().unwrap_throw(),
        }
    }

    fn search(&self) -> String {
        self.location.search().unwrap_or_default()
    }

    fn push(&self, url: &str) {
        report(
            self.history
                .push_state_with_url(&JsValue::NULL, "", Some(url)),
            "pushState",
        );
    }

    fn replace(&self, url: &str) {
        report(
            self.history
                .replace_state_with_url(&JsValue::NULL, "", Some(url)),
            "replaceState",
        );
    }
}

impl Default for WebHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for WebHistory {
    fn path(&self) -> String {
        self.location.pathname().unwrap_or_default()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        UrlSearchParams::new_with_str(&self.search()).ok()?.get(name)
    }

    fn hash(&self) -> Option<String> {
        let hash = self.location.hash().ok()?;
        let hash = hash.strip_prefix('#').unwrap_or(&hash);
        (!hash.is_empty()).then(|| hash.to_owned())
    }

    fn push_hash(&mut self, hash: &str) {
        self.push(&format!("#{}", hash.trim_start_matches('#')));
    }

    fn replace_hash(&mut self, hash: &str) {
        self.replace(&format!("#{}", hash.trim_start_matches('#')));
    }

    fn reset_fragment(&mut self) {
        self.push(&format!("{}{}", self.path(), self.search()));
    }

    fn remove_query_param(&mut self, name: &str) {
        let Ok(params) = UrlSearchParams::new_with_str(&self.search()) else {
            return;
        };
        params.delete(name);
        let query = String::from(params.to_string());
        let query = if query.is_empty() {
            query
        } else {
            format!("?{query}")
        };
        let hash = self.location.hash().unwrap_or_default();
        self.replace(&format!("{}{query}{hash}", self.path()));
    }

    fn href(&self) -> String {
        let hash = self.location.hash().unwrap_or_default();
        format!("{}{}{hash}", self.path(), self.search())
    }
}
