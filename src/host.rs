//! Collaborators a window talks to but does not own.
//!
//! [`UiHost`] is the windowing toolkit: tab surfaces, dialogs, notifications
//! and the file-save dialog. [`BrowserEngine`] is the embedded engine that
//! renders pages. The window only issues commands to them; the engine reports
//! back through the window's `on_*` hooks.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::types::download::DownloadEvent;
use crate::types::sync::SyncSnapshot;
use crate::types::tab::Tab;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Info,
    Warning,
    Error,
    /// Asks for a line of text; the answer is the dialog's return value.
    Prompt,
}

pub trait UiHost {
    fn create_tab_surface(&mut self, tab: &Tab);
    fn remove_tab_surface(&mut self, tab_id: &str);
    /// Shows a modal dialog. Only `Prompt` dialogs return text; `None` means
    /// the user dismissed it.
    fn show_dialog(&mut self, kind: DialogKind, title: &str, message: &str) -> Option<String>;
    fn notify(&mut self, title: &str, message: &str);
    /// File-save dialog. `None` cancels the download.
    fn choose_save_path(&mut self, suggested: &Path) -> Option<PathBuf>;

    /// Download progress for the status bar.
    fn download_event(&mut self, _event: &DownloadEvent) {}

    /// Bookmarks, history or homepage changed through sync.
    fn refresh(&mut self, _snapshot: &SyncSnapshot) {}
}

pub trait BrowserEngine {
    fn navigate(&mut self, tab_id: &str, url: &str);
    fn go_back(&mut self, tab_id: &str);
    fn go_forward(&mut self, tab_id: &str);
    fn reload(&mut self, tab_id: &str);
}
