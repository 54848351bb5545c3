// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, cell::RefCell, rc::Rc};

use crate::{
    BindingId, ConfigError, Dom, EventKind, PageCtx, ToggleConfig, ToggleEngine, ToggleHooks,
    ToggleOverrides, Toggled,
};

impl ToggleConfig {
    /// Share buttons. Without the Web Share API they toggle their fallback panel.
    pub const WEB_SHARE: Self = Self {
        selector: Cow::Borrowed(r#"[data-js*="web-share"]"#),
        namespace: Cow::Borrowed("web-share"),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("hidden")),
        focusable: true,
        jump: false,
        events: Cow::Borrowed(&[EventKind::Click]),
    };
}

/// What to hand to `navigator.share()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShareData {
    /// `data-web-share-title`
    pub title: Option<String>,
    /// `data-web-share-text`
    pub text: Option<String>,
    /// `data-web-share-url`, or the current address.
    pub url: String,
}

impl ShareData {
    /// Read the share payload from the `data-web-share-*` attributes of `trigger`.
    pub fn from_trigger<D: Dom>(dom: &D, trigger: &D::Node, current_url: &str) -> Self {
        let read = |name: &str| dom.attribute(trigger, name).filter(|v| !v.is_empty());
        Self {
            title: read("data-web-share-title"),
            text: read("data-web-share-text"),
            url: read("data-web-share-url").unwrap_or_else(|| current_url.to_owned()),
        }
    }
}

/// How a share trigger is handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareRoute {
    /// The Web Share API is available; share this.
    Native(ShareData),
    /// It is not; toggle the fallback panel instead.
    Fallback,
}

struct ShareHooks {
    native: bool,
    requests: Rc<RefCell<Vec<ShareData>>>,
}

impl<D: Dom> ToggleHooks<D> for ShareHooks {
    fn valid(&mut self, cx: &mut PageCtx<'_, D>, toggled: &Toggled<D::Node>) -> bool {
        match route(self.native, cx, &toggled.trigger) {
            ShareRoute::Native(data) => {
                tracing::debug!(url = %data.url, "native share");
                self.requests.borrow_mut().push(data);
                false
            }
            ShareRoute::Fallback => true,
        }
    }
}

fn route<D: Dom>(native: bool, cx: &PageCtx<'_, D>, trigger: &D::Node) -> ShareRoute {
    if native {
        ShareRoute::Native(ShareData::from_trigger(
            &*cx.dom,
            trigger,
            &cx.history.href(),
        ))
    } else {
        ShareRoute::Fallback
    }
}

/// Share buttons using the Web Share API where the browser has it.
///
/// With native sharing the toggle is vetoed and a [`ShareData`] request is queued for the
/// browser layer to pass to `navigator.share()`; otherwise the button is a plain toggle.
#[derive(Debug)]
pub struct WebShare {
    binding: BindingId,
    native: bool,
    requests: Rc<RefCell<Vec<ShareData>>>,
}

impl WebShare {
    /// Bind [`ToggleConfig::WEB_SHARE`] merged with `overrides`.
    ///
    /// `native` is the result of the capability check for `navigator.share`. Returns `None` if
    /// the selector is already bound.
    pub fn bind<D: Dom>(
        engine: &mut ToggleEngine<D>,
        native: bool,
        overrides: &ToggleOverrides,
    ) -> Result<Option<Self>, ConfigError> {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let hooks = ShareHooks {
            native,
            requests: Rc::clone(&requests),
        };
        let outcome = engine.bind(&ToggleConfig::WEB_SHARE.with_overrides(overrides), hooks)?;
        if !native {
            tracing::debug!("Web Share API unavailable, using the fallback toggle");
        }
        Ok(outcome.is_new().then(|| Self {
            binding: outcome.id(),
            native,
            requests,
        }))
    }

    /// The engine binding.
    pub fn binding(&self) -> BindingId {
        self.binding
    }

    /// How `trigger` would be handled.
    pub fn route<D: Dom>(&self, cx: &PageCtx<'_, D>, trigger: &D::Node) -> ShareRoute {
        route(self.native, cx, trigger)
    }

    /// Drain the queued native share requests.
    pub fn take_requests(&self) -> Vec<ShareData> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }
}
