// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::{cell::Cell, rc::Rc};

use gloo::events::EventListener;
use patterns_core::{
    Dom, Newsletter, NewsletterResponse, Reply, Selector, widgets::validate_email,
};
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};
use web_sys::{
    Element, HtmlFormElement, HtmlInputElement,
    js_sys::{JSON, Reflect},
};

use crate::{WebDom, dom::report};

/// Name of the field carrying the address.
pub const EMAIL_FIELD: &str = "EMAIL";

/// Newsletter forms submitted through a JSONP `<script>`.
#[derive(Debug)]
pub struct WebNewsletter {
    newsletter: Rc<Newsletter>,
    submissions: Cell<u32>,
}

impl WebNewsletter {
    /// Submit the forms described by `newsletter`.
    pub fn new(newsletter: Newsletter) -> Self {
        Self {
            newsletter: Rc::new(newsletter),
            submissions: Cell::new(0),
        }
    }

    /// The form contract.
    pub fn newsletter(&self) -> &Newsletter {
        &self.newsletter
    }

    /// Handle a delegated `submit` from `origin`.
    ///
    /// Returns whether `origin` is a newsletter form, whose native submission must then be
    /// prevented.
    pub fn on_submit(&self, dom: &mut WebDom, origin: &Element) -> bool {
        let Some(form) = self.newsletter.form_for(dom, origin) else {
            return false;
        };
        self.newsletter.reset(dom, &form);

        let fields = form_fields(dom, &form);
        let email = fields
            .iter()
            .find(|(name, _)| name == EMAIL_FIELD)
            .map_or("", |(_, value)| value.as_str());
        if let Err(err) = validate_email(email) {
            tracing::debug!(%err, "newsletter submission rejected");
            self.newsletter.show(dom, &form, Reply::InvalidEmail);
            return true;
        }

        let action = match form.dyn_ref::<HtmlFormElement>() {
            Some(form) => form.action(),
            None => dom.attribute(&form, "action").unwrap_or_default(),
        };
        let submission = self.submissions.get();
        self.submissions.set(submission.wrapping_add(1));
        let callback = format!("patterns_newsletter_{submission}");
        match Newsletter::jsonp_url(&action, &fields, &callback) {
            Ok(url) => self.load(dom, form, url.as_str(), callback),
            Err(err) => {
                tracing::warn!(%err, "cannot submit newsletter form");
                self.newsletter.show(dom, &form, Reply::Generic);
            }
        }
        true
    }

    fn load(&self, dom: &mut WebDom, form: Element, src: &str, callback: String) {
        let script = match dom.document().create_element("script") {
            Ok(script) => script,
            Err(err) => {
                tracing::warn!(?err, "cannot create script element");
                self.newsletter.show(dom, &form, Reply::Generic);
                return;
            }
        };

        let on_reply = {
            let newsletter = Rc::clone(&self.newsletter);
            let mut dom = dom.clone();
            let form = form.clone();
            let script = script.clone();
            let callback = callback.clone();
            Closure::once_into_js(move |response: JsValue| {
                finish(&script, &callback);
                let reply = JSON::stringify(&response)
                    .map(String::from)
                    .ok()
                    .and_then(|json| match NewsletterResponse::from_json(&json) {
                        Ok(response) => Some(response),
                        Err(err) => {
                            tracing::warn!(%err, "unexpected newsletter response");
                            None
                        }
                    })
                    .map_or(Reply::Generic, |response| Reply::classify(&response));
                newsletter.show(&mut dom, &form, reply);
            })
        };
        let window = gloo::utils::window();
        if let Err(err) = Reflect::set(&window, &JsValue::from_str(&callback), &on_reply) {
            tracing::warn!(?err, "cannot install newsletter callback");
            self.newsletter.show(dom, &form, Reply::Generic);
            return;
        }

        EventListener::once(&script, "error", {
            let newsletter = Rc::clone(&self.newsletter);
            let mut dom = dom.clone();
            let script = script.clone();
            move |_| {
                finish(&script, &callback);
                tracing::warn!("newsletter endpoint unreachable");
                newsletter.show(&mut dom, &form, Reply::Generic);
            }
        })
        .forget();

        report(script.set_attribute("src", src), "setAttribute");
        let body = gloo::utils::body();
        if let Err(err) = body.append_child(&script) {
            tracing::warn!(?err, "cannot load newsletter script");
        }
    }
}

fn finish(script: &Element, callback: &str) {
    script.remove();
    let window = gloo::utils::window();
    if Reflect::delete_property(&window, &JsValue::from_str(callback)).is_err() {
        tracing::trace!(callback, "callback already gone");
    }
}

/// Named inputs of `form` that would be submitted, in document order.
fn form_fields(dom: &WebDom, form: &Element) -> Vec<(String, String)> {
    dom.query_within(form, &Selector::has_attribute("name"))
        .into_iter()
        .filter_map(|element| element.dyn_into::<HtmlInputElement>().ok())
        .filter(|input| match input.type_().as_str() {
            "submit" | "button" | "reset" | "image" | "file" => false,
            "checkbox" | "radio" => input.checked(),
            _ => true,
        })
        .map(|input| (input.name(), input.value()))
        .collect()
}
