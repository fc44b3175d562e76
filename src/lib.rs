//! BrowserShell: the stateful core of a tabbed browser shell.
//!
//! Page rendering, networking and the windowing toolkit are external
//! collaborators (see [`host`]). This crate manages tabs, sessions,
//! bookmarks, history, tab groups, downloads and cross-window sync, and
//! exposes it all to the host binary.

pub mod app;
pub mod host;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod storage;
pub mod types;
pub mod url_utils;
