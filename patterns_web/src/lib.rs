// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

// https://linebender.org/blog/doc-include
//! <!-- This license link is in a .rustdoc-hidden section, but we may as well give the correct link -->
//! [LICENSE]: https://github.com/patterns-rs/patterns/blob/main/LICENSE
//!
//! [`PatternLibrary`]: crate::PatternLibrary
//! [`WebDom`]: crate::WebDom
//! [`WebHistory`]: crate::WebHistory
//! [`LocalStorage`]: crate::LocalStorage
//! [`IntersectionWatcher`]: crate::IntersectionWatcher
//!
//! <style>
//! .rustdoc-hidden { display: none; }
//! </style>
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET

mod app;
mod dom;
mod history;
mod newsletter;
mod observer;
mod share;
mod storage;

pub use patterns_core as core;

pub use app::{LibraryOptions, PatternLibrary, StartError};
pub use dom::WebDom;
pub use history::WebHistory;
pub use newsletter::{EMAIL_FIELD, WebNewsletter};
pub use observer::IntersectionWatcher;
pub use share::{share, web_share_supported};
pub use storage::LocalStorage;
