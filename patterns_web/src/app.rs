// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, rc::Rc};

use gloo::{
    events::{EventListener, EventListenerOptions},
    timers::callback::Timeout,
};
use patterns_core::{
    ActiveNavigation, BindError, Capabilities, Handled, NavigationConfig, Newsletter,
    NewsletterConfig, NewsletterError, ObserverOptions, PageCtx, Patterns, PendingFocus,
    Preference, Preferences, STEP_FOCUS_DELAY, SelectorError, TriggerEvent,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, EventTarget, KeyboardEvent};

use crate::{IntersectionWatcher, LocalStorage, WebDom, WebHistory, WebNewsletter, share};

/// What [`PatternLibrary::new`] sets up besides the toggle patterns.
#[derive(Clone, Debug)]
pub struct LibraryOptions {
    /// Preferences restored from local storage and cycled by `[data-preference]` controls.
    pub preferences: Vec<Preference>,
    /// Scroll-driven highlighting of navigation links, if any.
    pub navigation: Option<NavigationConfig>,
    /// Options of the navigation's intersection observer.
    pub observer: ObserverOptions,
    /// Newsletter forms, if any.
    pub newsletter: Option<NewsletterConfig>,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            preferences: vec![Preference::THEME, Preference::DIRECTION],
            navigation: Some(NavigationConfig::DEFAULT),
            observer: ObserverOptions::default(),
            newsletter: Some(NewsletterConfig::DEFAULT),
        }
    }
}

/// Why [`PatternLibrary::new`] failed.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    /// A pattern could not be bound.
    #[error(transparent)]
    Bind(#[from] BindError),
    /// The navigation configuration is invalid.
    #[error("invalid navigation selector")]
    Navigation(#[source] SelectorError),
    /// The newsletter configuration is invalid.
    #[error(transparent)]
    Newsletter(#[from] NewsletterError),
    /// The browser refused to create the intersection observer.
    #[error("cannot observe sections: {0:?}")]
    Observer(JsValue),
}

/// Every pattern of the page, wired to the browser's events.
pub struct PatternLibrary(Rc<RefCell<LibraryInner>>);

struct LibraryInner {
    dom: WebDom,
    history: WebHistory,
    storage: LocalStorage,
    patterns: Patterns<WebDom>,
    preferences: Preferences,
    newsletter: Option<WebNewsletter>,
    watcher: Option<IntersectionWatcher>,
    listeners: Vec<EventListener>,
}

impl Clone for PatternLibrary {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl std::fmt::Debug for PatternLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("PatternLibrary")
            .field("patterns", &inner.patterns)
            .field("preferences", &inner.preferences)
            .field("watcher", &inner.watcher)
            .field("listeners", &inner.listeners.len())
            .finish_non_exhaustive()
    }
}

impl PatternLibrary {
    /// Bind every pattern of the current document.
    ///
    /// This picks the initial step of a step-by-step wizard and applies stored preferences right
    /// away; events are only handled once the library [runs](Self::run).
    pub fn new(options: LibraryOptions) -> Result<Self, StartError> {
        let mut dom = WebDom::new();
        let mut history = WebHistory::new();
        let storage = LocalStorage::new();
        let capabilities = Capabilities {
            web_share: share::web_share_supported(),
        };

        let patterns = Patterns::bind(&mut PageCtx::new(&mut dom, &mut history), capabilities)?;
        let preferences = Preferences::load(&mut dom, &storage, &options.preferences);
        let watcher = match options.navigation {
            Some(config) => {
                let navigation = ActiveNavigation::new(config).map_err(StartError::Navigation)?;
                let observer = navigation.observer(&dom, options.observer);
                Some(IntersectionWatcher::new(&dom, observer).map_err(StartError::Observer)?)
            }
            None => None,
        };
        let newsletter = options
            .newsletter
            .map(Newsletter::new)
            .transpose()?
            .map(WebNewsletter::new);
        tracing::info!(?capabilities, "pattern library ready");

        Ok(Self(Rc::new(RefCell::new(LibraryInner {
            dom,
            history,
            storage,
            patterns,
            preferences,
            newsletter,
            watcher,
            listeners: Vec::new(),
        }))))
    }

    /// Run `f` with the patterns and the page, e.g. to bind further patterns to the engine.
    pub fn with_page<R>(
        &self,
        f: impl FnOnce(&mut Patterns<WebDom>, &mut PageCtx<'_, WebDom>) -> R,
    ) -> R {
        let mut inner = self.0.borrow_mut();
        let inner = &mut *inner;
        f(
            &mut inner.patterns,
            &mut PageCtx::new(&mut inner.dom, &mut inner.history),
        )
    }

    /// Install the delegated event listeners.
    ///
    /// Because we don't want to block the render thread, we return immediately here. The library
    /// is forgotten, and will continue to respond to events in the background.
    pub fn run(self) {
        let body: EventTarget = gloo::utils::body().into();
        let document: EventTarget = gloo::utils::document().into();
        let window: EventTarget = gloo::utils::window().into();
        let listeners = vec![
            self.listen(&body, "click", true, Self::on_click),
            self.listen(&body, "change", false, Self::on_change),
            self.listen(&body, "submit", true, Self::on_submit),
            self.listen(&document, "keydown", false, Self::on_keydown),
            self.listen(&window, "popstate", false, Self::on_popstate),
        ];
        self.0.borrow_mut().listeners = listeners;
        // The listeners keep the library alive as well.
        std::mem::forget(self);
    }

    fn listen(
        &self,
        target: &EventTarget,
        event: &'static str,
        prevent_default: bool,
        handler: fn(&Self, &Event),
    ) -> EventListener {
        let library = self.clone();
        let options = if prevent_default {
            EventListenerOptions::enable_prevent_default()
        } else {
            EventListenerOptions::default()
        };
        EventListener::new_with_options(target, event, options, move |event| {
            handler(&library, event);
        })
    }

    fn on_click(&self, event: &Event) {
        let Some(origin) = event_origin(event) else {
            return;
        };
        let handled = {
            let mut inner = self.0.borrow_mut();
            let inner = &mut *inner;
            let preference = inner
                .preferences
                .on_click(&mut inner.dom, &mut inner.storage, &origin);
            if let Some(value) = preference {
                tracing::debug!(value, "preference control");
                return;
            }
            inner.patterns.handle(
                &mut PageCtx::new(&mut inner.dom, &mut inner.history),
                &TriggerEvent::click(origin),
            )
        };
        if handled.claimed() {
            event.prevent_default();
        }
        self.settle(handled);
    }

    fn on_change(&self, event: &Event) {
        let Some(origin) = event_origin(event) else {
            return;
        };
        let handled = {
            let mut inner = self.0.borrow_mut();
            let inner = &mut *inner;
            inner.patterns.handle(
                &mut PageCtx::new(&mut inner.dom, &mut inner.history),
                &TriggerEvent::change(origin),
            )
        };
        self.settle(handled);
    }

    fn on_submit(&self, event: &Event) {
        let Some(origin) = event_origin(event) else {
            return;
        };
        let mut inner = self.0.borrow_mut();
        let inner = &mut *inner;
        let Some(newsletter) = &inner.newsletter else {
            return;
        };
        if newsletter.on_submit(&mut inner.dom, &origin) {
            event.prevent_default();
        }
    }

    fn on_keydown(&self, event: &Event) {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if event.key() != "Escape" {
            return;
        }
        let mut inner = self.0.borrow_mut();
        let inner = &mut *inner;
        let dismissed = inner
            .patterns
            .on_escape(&mut PageCtx::new(&mut inner.dom, &mut inner.history));
        tracing::trace!(dismissed, "escape");
    }

    fn on_popstate(&self, _: &Event) {
        let pending = {
            let mut inner = self.0.borrow_mut();
            let inner = &mut *inner;
            inner
                .patterns
                .on_popstate(&mut PageCtx::new(&mut inner.dom, &mut inner.history))
        };
        if let Some(pending) = pending {
            self.schedule_focus(pending);
        }
    }

    /// Perform what a handled event left for the browser: native shares and delayed focus.
    fn settle(&self, handled: Handled<Element>) {
        for data in handled.share {
            spawn_local(async move {
                if let Err(err) = share::share(data).await {
                    tracing::warn!(?err, "share failed");
                }
            });
        }
        if let Some(pending) = handled.pending_focus {
            self.schedule_focus(pending);
        }
    }

    fn schedule_focus(&self, pending: PendingFocus<Element>) {
        let library = self.clone();
        let millis = u32::try_from(STEP_FOCUS_DELAY.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            let mut inner = library.0.borrow_mut();
            let inner = &mut *inner;
            if !inner.patterns.settle_focus(&mut inner.dom, &pending) {
                tracing::trace!(step = ?pending.step, "focus superseded");
            }
        })
        .forget();
    }
}

/// The element an event was dispatched to, or the parent of a text node.
fn event_origin(event: &Event) -> Option<Element> {
    let target = event.target()?;
    match target.dyn_into::<Element>() {
        Ok(element) => Some(element),
        Err(target) => target.dyn_into::<web_sys::Node>().ok()?.parent_element(),
    }
}
