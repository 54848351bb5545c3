// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use patterns_core::{Dom, IntersectionEntry, VisibilityObserver};
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, js_sys};

use crate::WebDom;

/// A [`VisibilityObserver`] fed by a browser `IntersectionObserver`.
///
/// The targets are collected once, when the watcher is created. Dropping the watcher
/// disconnects the observer.
pub struct IntersectionWatcher {
    #[allow(dead_code, reason = "Retained so it can be called by the browser")]
    callback: Closure<dyn FnMut(js_sys::Array)>,
    observer: IntersectionObserver,
    targets: usize,
}

impl fmt::Debug for IntersectionWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionWatcher")
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

impl IntersectionWatcher {
    /// Observe the targets of `observer` in `dom`.
    pub fn new(dom: &WebDom, mut observer: VisibilityObserver<WebDom>) -> Result<Self, JsValue> {
        let targets = observer.targets(dom);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&observer.options().root_margin);
        let thresholds: js_sys::Array = observer
            .options()
            .thresholds
            .iter()
            .map(|threshold| JsValue::from_f64(*threshold))
            .collect();
        init.set_threshold(&thresholds);

        let mut dom = dom.clone();
        let callback: Closure<dyn FnMut(js_sys::Array)> =
            Closure::new(move |entries: js_sys::Array| {
                let entries: Vec<_> = entries
                    .iter()
                    .map(|entry| {
                        let entry: IntersectionObserverEntry = entry.unchecked_into();
                        IntersectionEntry {
                            target: entry.target(),
                            is_intersecting: entry.is_intersecting(),
                            ratio: entry.intersection_ratio(),
                        }
                    })
                    .filter(|entry| dom.is_connected(&entry.target))
                    .collect();
                observer.observe_batch(&mut dom, &entries);
            });

        let intersection =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for target in &targets {
            intersection.observe(target);
        }
        tracing::debug!(targets = targets.len(), "observing sections");
        Ok(Self {
            callback,
            observer: intersection,
            targets: targets.len(),
        })
    }
}

impl Drop for IntersectionWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
