// BrowserShell state managers
// Managers own the mutable per-window state: tabs, groups, sessions, bookmarks, history, downloads.

pub mod bookmark_manager;
pub mod download_manager;
pub mod history_manager;
pub mod session_manager;
pub mod tab_group_manager;
pub mod tab_manager;
