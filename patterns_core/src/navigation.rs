// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! Highlighting the navigation link of the section currently in view.

use std::borrow::Cow;

use crate::{
    Dom, IntersectionEntry, ObserverOptions, ObserverTrigger, Selector, SelectorError,
    VisibilityObserver, focus::set_focusable,
};

type CowStr = Cow<'static, str>;

/// Markup contract of an active navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationConfig {
    /// Selector of the (horizontally scrollable) navigation containers.
    pub container: CowStr,
    /// Selector of the in-page links inside a container.
    pub links: CowStr,
    /// Class of the link for the section in view.
    pub active_class: CowStr,
    /// Class of every other link, if any.
    pub inactive_class: Option<CowStr>,
    /// Attribute declaring the restored tabindex of links.
    pub tabindex_attribute: CowStr,
}

impl NavigationConfig {
    /// `[data-js*="active-navigation"]` containers of `a[href^="#"]` links.
    pub const DEFAULT: Self = Self {
        container: Cow::Borrowed(r#"[data-js*="active-navigation"]"#),
        links: Cow::Borrowed(r##"a[href^="#"]"##),
        active_class: Cow::Borrowed("active"),
        inactive_class: Some(Cow::Borrowed("no-underline")),
        tabindex_attribute: Cow::Borrowed("data-active-navigation-tabindex"),
    };
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An [`ObserverTrigger`] marking the navigation link of an intersecting section as active.
#[derive(Clone, Debug)]
pub struct ActiveNavigation {
    config: NavigationConfig,
    container: Selector,
    links: Selector,
}

impl ActiveNavigation {
    /// Parse the selectors of `config`.
    pub fn new(config: NavigationConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            container: Selector::parse(&config.container)?,
            links: Selector::parse(&config.links)?,
            config,
        })
    }

    /// A [`VisibilityObserver`] watching every section an active navigation links to.
    pub fn observer<D: Dom>(self, dom: &D, options: ObserverOptions) -> VisibilityObserver<D> {
        let mut sections: Option<Selector> = None;
        for container in dom.query_all(&self.container) {
            for link in dom.query_within(&container, &self.links) {
                let Some(id) = link_section_id(dom, &link) else {
                    continue;
                };
                let section = Selector::attribute_equals("id", id);
                sections = Some(match sections {
                    Some(sections) => sections.or(section),
                    None => section,
                });
            }
        }
        // A selector nothing has, so the observer simply has no targets.
        let targets =
            sections.unwrap_or_else(|| Selector::has_attribute("data-active-navigation-none"));
        VisibilityObserver::new(options, targets, self)
    }

    /// Mark the link to `section_id` active in every navigation container.
    ///
    /// Returns whether any container links to the section.
    pub fn highlight<D: Dom>(&self, dom: &mut D, section_id: &str) -> bool {
        let mut found = false;
        for container in dom.query_all(&self.container) {
            let links = dom.query_within(&container, &self.links);
            let Some(current) = links
                .iter()
                .find(|link| link_section_id(dom, link).as_deref() == Some(section_id))
                .cloned()
            else {
                continue;
            };
            found = true;
            dom.scroll_into_view_within(&container, &current);
            set_focusable(dom, &links, true, &self.config.tabindex_attribute);
            for link in &links {
                if *link == current {
                    dom.add_class(link, &self.config.active_class);
                    if let Some(inactive) = &self.config.inactive_class {
                        dom.remove_class(link, inactive);
                    }
                    dom.set_attribute(link, "aria-current", "true");
                } else {
                    dom.remove_class(link, &self.config.active_class);
                    if let Some(inactive) = &self.config.inactive_class {
                        dom.add_class(link, inactive);
                    }
                    dom.remove_attribute(link, "aria-current");
                }
            }
        }
        found
    }
}

fn link_section_id<D: Dom>(dom: &D, link: &D::Node) -> Option<String> {
    dom.attribute(link, "href")?
        .strip_prefix('#')
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

impl<D: Dom> ObserverTrigger<D> for ActiveNavigation {
    fn trigger(
        &mut self,
        dom: &mut D,
        entry: &IntersectionEntry<D::Node>,
        _previous: Option<&IntersectionEntry<D::Node>>,
    ) {
        if !entry.is_intersecting {
            return;
        }
        let Some(id) = dom.attribute(&entry.target, "id") else {
            return;
        };
        if !self.highlight(dom, &id) {
            tracing::trace!(section = %id, "no navigation link for section");
        }
    }
}
