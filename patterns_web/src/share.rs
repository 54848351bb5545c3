// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use patterns_core::ShareData;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Function, Object, Promise, Reflect};

/// Whether `navigator.share` exists.
pub fn web_share_supported() -> bool {
    let navigator = gloo::utils::window().navigator();
    Reflect::has(&navigator, &JsValue::from_str("share")).unwrap_or(false)
}

/// Open the native share sheet for `data`.
///
/// A share the reader dismissed is not an error.
pub async fn share(data: ShareData) -> Result<(), JsValue> {
    let navigator = gloo::utils::window().navigator();
    let share: Function = Reflect::get(&navigator, &JsValue::from_str("share"))?.dyn_into()?;

    let payload = Object::new();
    let fields = [
        ("title", data.title.as_deref()),
        ("text", data.text.as_deref()),
        ("url", Some(data.url.as_str())),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            Reflect::set(&payload, &JsValue::from_str(name), &JsValue::from_str(value))?;
        }
    }

    let promise: Promise = share.call1(&navigator, &payload)?.dyn_into()?;
    match JsFuture::from(promise).await {
        Ok(_) => Ok(()),
        Err(err) if error_name(&err).as_deref() == Some("AbortError") => {
            tracing::debug!("share dismissed");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn error_name(err: &JsValue) -> Option<String> {
    Reflect::get(err, &JsValue::from_str("name"))
        .ok()?
        .as_string()
}
