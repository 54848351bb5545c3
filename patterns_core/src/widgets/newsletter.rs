// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Newsletter sign-up through a Mailchimp-style JSONP endpoint.
//!
//! The browser layer submits the form by injecting a `<script>` whose `src` is built by
//! [`Newsletter::jsonp_url`]; the endpoint answers by calling the named callback with a
//! [`NewsletterResponse`], which is classified into a [`Reply`] and shown in the form's message
//! panel.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{Dom, Selector, SelectorError};

type CowStr = Cow<'static, str>;

/// Why a submission could not be sent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NewsletterError {
    /// The address does not look like an email address.
    #[error("{0:?} is not an email address")]
    InvalidEmail(String),
    /// The form action is not an absolute URL.
    #[error("invalid form action {action:?}")]
    Action {
        /// The action as given.
        action: String,
        /// The parse error.
        #[source]
        source: url::ParseError,
    },
    /// The form action does not end in `/post`.
    #[error("form action {0:?} is not a subscribe endpoint")]
    Endpoint(String),
    /// The endpoint answered with something other than a response object.
    #[error("malformed response: {0}")]
    Response(String),
    /// A configured selector does not parse.
    #[error("invalid selector {selector:?}")]
    Selector {
        /// The selector as configured.
        selector: String,
        /// The parse error.
        #[source]
        source: SelectorError,
    },
}

/// The body the endpoint passes to the JSONP callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterResponse {
    /// `"success"` or `"error"`.
    pub result: String,
    /// A human readable message, possibly containing markup.
    #[serde(default)]
    pub msg: String,
}

impl NewsletterResponse {
    /// Parse the callback argument, serialized as JSON.
    pub fn from_json(json: &str) -> Result<Self, NewsletterError> {
        serde_json::from_str(json).map_err(|err| NewsletterError::Response(err.to_string()))
    }
}

/// The outcome of a submission, as shown to the reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Subscribed; a confirmation email is on its way.
    Success,
    /// The address is on the list already.
    AlreadySubscribed,
    /// The endpoint rejected the address.
    InvalidEmail,
    /// The endpoint is rate limiting this address.
    TooManyAttempts,
    /// Anything else, including network failures.
    Generic,
}

impl Reply {
    /// Classify an endpoint response by its result and message text.
    pub fn classify(response: &NewsletterResponse) -> Self {
        if response.result == "success" {
            return Self::Success;
        }
        let msg = response.msg.to_ascii_lowercase();
        if msg.contains("already subscribed") {
            Self::AlreadySubscribed
        } else if msg.contains("too many") {
            Self::TooManyAttempts
        } else if msg.contains("valid email") || msg.contains("enter a value") {
            Self::InvalidEmail
        } else {
            Self::Generic
        }
    }

    /// Whether the panel shows a success or an error.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// The message shown for each [`Reply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsletterStrings {
    /// [`Reply::Success`]
    pub success: CowStr,
    /// [`Reply::AlreadySubscribed`]
    pub already_subscribed: CowStr,
    /// [`Reply::InvalidEmail`]
    pub invalid_email: CowStr,
    /// [`Reply::TooManyAttempts`]
    pub too_many_attempts: CowStr,
    /// [`Reply::Generic`]
    pub generic: CowStr,
}

impl NewsletterStrings {
    /// English messages.
    pub const DEFAULT: Self = Self {
        success: Cow::Borrowed(
            "Thank you for subscribing! Please check your email to confirm your subscription.",
        ),
        already_subscribed: Cow::Borrowed("This email address is already subscribed."),
        invalid_email: Cow::Borrowed("Please enter a valid email address."),
        too_many_attempts: Cow::Borrowed(
            "Too many subscribe attempts for this address. Please try again in a few minutes.",
        ),
        generic: Cow::Borrowed("Something went wrong. Please try again later."),
    };

    /// The message for `reply`.
    pub fn message(&self, reply: Reply) -> &str {
        match reply {
            Reply::Success => &self.success,
            Reply::AlreadySubscribed => &self.already_subscribed,
            Reply::InvalidEmail => &self.invalid_email,
            Reply::TooManyAttempts => &self.too_many_attempts,
            Reply::Generic => &self.generic,
        }
    }
}

impl Default for NewsletterStrings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Markup contract of a newsletter form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsletterConfig {
    /// Selector of the forms.
    pub form: CowStr,
    /// Selector of the message panel inside a form.
    pub message: CowStr,
    /// Class hiding the message panel.
    pub hidden_class: CowStr,
    /// Attribute on the panel reflecting `success` or `error`.
    pub status_attribute: CowStr,
    /// Messages per reply.
    pub strings: NewsletterStrings,
}

impl NewsletterConfig {
    /// `[data-js*="newsletter"]` forms with a `[data-js-newsletter*="alert"]` panel.
    pub const DEFAULT: Self = Self {
        form: Cow::Borrowed(r#"[data-js*="newsletter"]"#),
        message: Cow::Borrowed(r#"[data-js-newsletter*="alert"]"#),
        hidden_class: Cow::Borrowed("hidden"),
        status_attribute: Cow::Borrowed("data-newsletter-status"),
        strings: NewsletterStrings::DEFAULT,
    };
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A pragmatic shape check: one `@`, a non-empty local part, a dotted domain, no whitespace.
pub fn validate_email(email: &str) -> Result<(), NewsletterError> {
    let invalid = || NewsletterError::InvalidEmail(email.to_owned());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());
    if well_formed { Ok(()) } else { Err(invalid()) }
}

/// Newsletter forms of a page.
#[derive(Clone, Debug)]
pub struct Newsletter {
    config: NewsletterConfig,
    form: Selector,
    message: Selector,
}

impl Newsletter {
    /// Parse the selectors of `config`.
    pub fn new(config: NewsletterConfig) -> Result<Self, NewsletterError> {
        let parse = |selector: &str| {
            Selector::parse(selector).map_err(|source| NewsletterError::Selector {
                selector: selector.to_owned(),
                source,
            })
        };
        Ok(Self {
            form: parse(&config.form)?,
            message: parse(&config.message)?,
            config,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &NewsletterConfig {
        &self.config
    }

    /// The form `origin` belongs to.
    pub fn form_for<D: Dom>(&self, dom: &D, origin: &D::Node) -> Option<D::Node> {
        dom.closest(origin, &self.form)
    }

    /// The address the browser layer loads as a script to submit `fields`.
    ///
    /// The form `action` path `…/post` becomes `…/post-json`, its existing query is kept, then
    /// `fields` and the callback name `c` are appended.
    pub fn jsonp_url(
        action: &str,
        fields: &[(String, String)],
        callback: &str,
    ) -> Result<Url, NewsletterError> {
        let mut url = Url::parse(action).map_err(|source| NewsletterError::Action {
            action: action.to_owned(),
            source,
        })?;
        let Some(prefix) = url.path().strip_suffix("/post") else {
            return Err(NewsletterError::Endpoint(action.to_owned()));
        };
        let path = format!("{prefix}/post-json");
        url.set_path(&path);
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in fields {
                query.append_pair(name, value);
            }
            query.append_pair("c", callback);
        }
        Ok(url)
    }

    /// Show the message for `reply` in the panel of `form`.
    ///
    /// Returns `false` if the form has no message panel.
    pub fn show<D: Dom>(&self, dom: &mut D, form: &D::Node, reply: Reply) -> bool {
        let Some(panel) = dom.query_within(form, &self.message).into_iter().next() else {
            tracing::warn!(?form, "newsletter form without message panel");
            return false;
        };
        dom.set_text(&panel, self.config.strings.message(reply));
        dom.remove_class(&panel, &self.config.hidden_class);
        dom.set_attribute(&panel, "aria-hidden", "false");
        let status = if reply.is_success() { "success" } else { "error" };
        dom.set_attribute(&panel, &self.config.status_attribute, status);
        tracing::debug!(?reply, "newsletter reply");
        true
    }

    /// Hide the message panel of `form`, before a new submission.
    pub fn reset<D: Dom>(&self, dom: &mut D, form: &D::Node) {
        for panel in dom.query_within(form, &self.message) {
            dom.add_class(&panel, &self.config.hidden_class);
            dom.set_attribute(&panel, "aria-hidden", "true");
            dom.remove_attribute(&panel, &self.config.status_attribute);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(validate_email("reader@example.org").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co").is_ok());
        let rejected = [
            "",
            "reader",
            "@example.org",
            "reader@",
            "reader@example",
            "a b@c.de",
            "a@b@c.de",
            "a@.de",
        ];
        for bad in rejected {
            assert_eq!(
                validate_email(bad),
                Err(NewsletterError::InvalidEmail(bad.to_owned())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn jsonp_url_rewrites_endpoint() {
        let url = Newsletter::jsonp_url(
            "https://example.us1.list-manage.com/subscribe/post?u=abc&id=123",
            &[("EMAIL".to_owned(), "reader+news@example.org".to_owned())],
            "newsletter_callback_0",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.us1.list-manage.com/subscribe/post-json?u=abc&id=123\
             &EMAIL=reader%2Bnews%40example.org&c=newsletter_callback_0"
        );
    }

    #[test]
    fn jsonp_url_rejects_other_actions() {
        assert!(matches!(
            Newsletter::jsonp_url("/subscribe/post", &[], "cb"),
            Err(NewsletterError::Action { .. })
        ));
        assert_eq!(
            Newsletter::jsonp_url("https://example.org/subscribe", &[], "cb"),
            Err(NewsletterError::Endpoint("https://example.org/subscribe".into()))
        );
    }

    #[test]
    fn replies() {
        let response = |result: &str, msg: &str| NewsletterResponse {
            result: result.into(),
            msg: msg.into(),
        };
        let cases = [
            (response("success", "Almost finished..."), Reply::Success),
            (
                response("error", "reader@example.org is already subscribed to list News."),
                Reply::AlreadySubscribed,
            ),
            (
                response("error", "Recipient has too many recent signup requests"),
                Reply::TooManyAttempts,
            ),
            (
                response("error", "0 - Please enter a value"),
                Reply::InvalidEmail,
            ),
            (
                response("error", "This email cannot be added to this list."),
                Reply::Generic,
            ),
        ];
        for (response, reply) in cases {
            assert_eq!(Reply::classify(&response), reply, "{response:?}");
        }
        assert_eq!(
            NewsletterResponse::from_json(r#"{"result":"success","msg":"ok"}"#)
                .map(|r| Reply::classify(&r)),
            Ok(Reply::Success)
        );
        assert!(NewsletterResponse::from_json("[]").is_err());
    }
}
