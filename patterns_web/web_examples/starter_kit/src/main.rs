// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! A static page using every pattern of the library.
//!
//! Besides the default patterns, the page binds a "menu" toggle configured from the
//! `data-menu-*` attributes of `#menu-config`.

use patterns_web::{
    LibraryOptions, PatternLibrary, WebDom,
    core::{ConfigError, Dom, PageCtx, Patterns, Toggle, ToggleOverrides},
};

fn bind_menu(
    patterns: &mut Patterns<WebDom>,
    cx: &mut PageCtx<'_, WebDom>,
) -> Result<(), ConfigError> {
    let Some(host) = cx.dom.element_by_id("menu-config") else {
        return Ok(());
    };
    let mut overrides =
        ToggleOverrides::from_attributes("menu", |name| cx.dom.attribute(&host, name))?;
    overrides.namespace = Some("menu".into());
    let menu = Toggle::bind(patterns.engine_mut(), &overrides)?;
    tracing::debug!(binding = ?menu.binding(), "menu bound");
    Ok(())
}

pub fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let library = match PatternLibrary::new(LibraryOptions::default()) {
        Ok(library) => library,
        Err(err) => {
            tracing::error!(%err, "patterns are disabled");
            return;
        }
    };
    if let Err(err) = library.with_page(bind_menu) {
        tracing::error!(%err, "menu is disabled");
    }
    library.run();
}
