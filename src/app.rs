//! Browser window core.
//!
//! [`BrowserWindow`] owns the state of one application window and is driven
//! from a single control thread. Callbacks arriving on other threads go
//! through a [`ControlHandle`]; their [`WindowCommand`]s run inside
//! [`BrowserWindow::process_pending`], together with download events and
//! snapshots broadcast by other windows.
//!
//! No operation returns an error to the shell. Storage and sync failures are
//! logged, validation failures are shown in a dialog, and download failures
//! end in a terminal state plus a notification.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::host::{BrowserEngine, DialogKind, UiHost};
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait, HISTORY_MENU_LIMIT};
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::managers::tab_group_manager::{TabGroupManager, TabGroupManagerTrait};
use crate::managers::tab_manager::{TabManager, TabManagerTrait};
use crate::services::navigation_guard::{NavigationDecision, NavigationGuard, NavigationGuardTrait};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::sync_engine::{SyncEngine, SyncEngineTrait};
use crate::services::window_registry::WindowRegistry;
use crate::storage::{JsonStore, StorePaths};
use crate::types::download::{
    DownloadEvent, DownloadId, DownloadItem, DownloadOperation, DownloadState,
};
use crate::types::errors::{BookmarkError, SessionError, TabError, TabGroupError};
use crate::types::history::HistoryEntry;
use crate::types::settings::BrowserSettings;
use crate::types::sync::{SyncSnapshot, WindowId};
use crate::types::tab::{Tab, TabId};
use crate::types::tab_group::TabGroup;
use crate::url_utils;

const INSECURE_WARNING: &str = "Warning: This site is not secure (HTTP). Proceed with caution.";

/// Work handed to a window from another thread.
pub enum WindowCommand {
    NewTab { url: Option<String>, incognito: bool },
    CloseTab(TabId),
    LoadUrl(String),
    NavigationCompleted { tab_id: TabId, url: String, title: String },
    DownloadStarting { operation: Arc<dyn DownloadOperation>, suggested: PathBuf },
    PauseDownload(DownloadId),
    ResumeDownload(DownloadId),
    CancelDownload(DownloadId),
    Sync,
}

/// Cloneable sender that redispatches work onto the window's control thread.
#[derive(Clone)]
pub struct ControlHandle {
    window: WindowId,
    tx: UnboundedSender<WindowCommand>,
}

impl ControlHandle {
    pub fn window_id(&self) -> &str {
        &self.window
    }

    /// Queues `command`. Returns `false` once the window is gone.
    pub fn send(&self, command: WindowCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn navigation_completed(&self, tab_id: &str, url: &str, title: &str) -> bool {
        self.send(WindowCommand::NavigationCompleted {
            tab_id: tab_id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
        })
    }

    pub fn download_starting(&self, operation: Arc<dyn DownloadOperation>, suggested: PathBuf) -> bool {
        self.send(WindowCommand::DownloadStarting { operation, suggested })
    }
}

pub struct BrowserWindow {
    id: WindowId,
    settings: SettingsEngine,
    home_page: String,
    tabs: TabManager,
    bookmarks: BookmarkManager,
    history: HistoryManager,
    groups: TabGroupManager,
    session: SessionManager,
    downloads: DownloadManager,
    sync: SyncEngine,
    registry: Arc<dyn WindowRegistry>,
    sync_inbox: Option<UnboundedReceiver<SyncSnapshot>>,
    guard: NavigationGuard,
    ui: Box<dyn UiHost>,
    engine: Box<dyn BrowserEngine>,
    commands_tx: UnboundedSender<WindowCommand>,
    commands_rx: UnboundedReceiver<WindowCommand>,
    open: bool,
}

impl BrowserWindow {
    /// Builds a closed window. `settings` should already be loaded; call
    /// [`open`](Self::open) to read the stores and restore the session.
    pub fn new(
        paths: &StorePaths,
        settings: SettingsEngine,
        registry: Arc<dyn WindowRegistry>,
        ui: Box<dyn UiHost>,
        engine: Box<dyn BrowserEngine>,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let current = settings.get_settings();
        let home_page = current.general.home_page.clone();
        let guard = NavigationGuard::new(&current.privacy);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        Self {
            sync: SyncEngine::new(paths.sync(), &id, Arc::clone(&registry)),
            id,
            settings,
            home_page,
            tabs: TabManager::new(),
            bookmarks: BookmarkManager::new(JsonStore::new(paths.bookmarks())),
            history: HistoryManager::new(JsonStore::new(paths.history())),
            groups: TabGroupManager::new(JsonStore::new(paths.tab_groups())),
            session: SessionManager::new(JsonStore::new(paths.session())),
            downloads: DownloadManager::new(),
            registry,
            sync_inbox: None,
            guard,
            ui,
            engine,
            commands_tx,
            commands_rx,
            open: false,
        }
    }

    /// Registers the window, loads the stores and restores the last session.
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.sync_inbox = Some(self.registry.register(&self.id));
        self.open = true;

        let bookmarks = self.bookmarks.load().len();
        let visits = self.history.load();
        let groups = self.groups.load();
        debug!(window = %self.id, bookmarks, visits, groups, "stores loaded");

        for tab in self.session.restore(&self.home_page) {
            self.add_tab(&tab.url, false, tab.is_pinned, tab.group.as_deref());
        }
        if self.tabs.tab_count() == 0 {
            let home = self.home_page.clone();
            self.add_tab(&home, false, false, None);
        }
        info!(window = %self.id, tabs = self.tabs.tab_count(), "window opened");
    }

    fn add_tab(&mut self, url: &str, incognito: bool, pinned: bool, group: Option<&str>) -> Option<TabId> {
        match self.tabs.open_tab(url, incognito, pinned, group) {
            Ok(id) => {
                if let Some(tab) = self.tabs.get_tab(&id) {
                    self.ui.create_tab_surface(tab);
                }
                self.engine.navigate(&id, url);
                Some(id)
            }
            Err(e) => {
                warn!(window = %self.id, error = %e, "tab not created");
                None
            }
        }
    }

    fn active_tab_id(&self) -> Option<TabId> {
        self.tabs.active_tab().map(|t| t.id.clone())
    }

    fn show_error(&mut self, message: &str) {
        self.ui.show_dialog(DialogKind::Error, "Error", message);
    }

    /// Opens a tab on `url`, or on the homepage when `url` is `None`.
    pub fn new_tab(&mut self, url: Option<&str>, incognito: bool) -> Option<TabId> {
        let url = url.map_or_else(|| self.home_page.clone(), str::to_string);
        if !url_utils::is_valid_url(&url) {
            self.show_error(&format!("Invalid URL: {}", url));
            return None;
        }
        self.add_tab(&url, incognito, false, None)
    }

    /// Closes a tab. The last tab and pinned tabs stay open.
    pub fn close_tab(&mut self, tab_id: &str) -> bool {
        match self.tabs.close_tab(tab_id) {
            Ok(tab) => {
                self.ui.remove_tab_surface(&tab.id);
                true
            }
            Err(TabError::LastTab) => {
                debug!(window = %self.id, "refusing to close the last tab");
                false
            }
            Err(e) => {
                info!(window = %self.id, error = %e, "tab not closed");
                false
            }
        }
    }

    pub fn switch_tab(&mut self, tab_id: &str) -> bool {
        self.tabs.switch_tab(tab_id).is_ok()
    }

    /// Navigates the active tab to the address-bar text. Bare words become a
    /// search, host-like text gets `https://`.
    pub fn load_url(&mut self, text: &str) -> Option<String> {
        let search_url = self.settings.get_settings().general.search_url.clone();
        let url = match url_utils::normalize_input(text, &search_url) {
            Ok(Some(url)) => url,
            Ok(None) => return None,
            Err(e) => {
                warn!(window = %self.id, input = text, "rejected address bar input");
                self.show_error(&format!("Error loading URL: {}", e));
                return None;
            }
        };
        let tab_id = self.active_tab_id()?;
        self.engine.navigate(&tab_id, &url);
        Some(url)
    }

    pub fn go_back(&mut self) {
        if let Some(tab_id) = self.active_tab_id() {
            self.engine.go_back(&tab_id);
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(tab_id) = self.active_tab_id() {
            self.engine.go_forward(&tab_id);
        }
    }

    pub fn reload(&mut self) {
        if let Some(tab_id) = self.active_tab_id() {
            self.engine.reload(&tab_id);
        }
    }

    pub fn go_home(&mut self) {
        if let Some(tab_id) = self.active_tab_id() {
            let home = self.home_page.clone();
            self.engine.navigate(&tab_id, &home);
        }
    }

    /// Bookmarks the active tab's page. Returns `true` if it was new.
    pub fn add_bookmark(&mut self) -> bool {
        let Some(url) = self.tabs.active_tab().map(|t| t.url.clone()) else {
            return false;
        };
        match self.bookmarks.add(&url) {
            Ok(true) => {
                self.sync_quietly();
                self.ui.show_dialog(DialogKind::Info, "Success", "Bookmark added!");
                true
            }
            Ok(false) => false,
            Err(BookmarkError::InvalidUrl(url)) => {
                self.show_error(&format!("Cannot bookmark {}", url));
                false
            }
            Err(e) => {
                // Kept in memory; the next successful save or sync persists it.
                error!(window = %self.id, error = %e, "error saving bookmarks");
                self.sync_quietly();
                true
            }
        }
    }

    pub fn remove_bookmark(&mut self, url: &str) -> bool {
        match self.bookmarks.remove(url) {
            Ok(()) => {
                self.sync_quietly();
                true
            }
            Err(BookmarkError::NotFound(_)) => false,
            Err(e) => {
                error!(window = %self.id, error = %e, "error saving bookmarks");
                self.sync_quietly();
                true
            }
        }
    }

    /// Asks for a group name and adds the active tab's page to that group.
    pub fn add_current_to_group(&mut self) -> Option<String> {
        let name = self
            .ui
            .show_dialog(DialogKind::Prompt, "New Tab Group", "Enter group name:")?;
        self.add_active_to_group(&name)
    }

    /// Adds the active tab's page to the group `name`.
    pub fn add_active_to_group(&mut self, name: &str) -> Option<String> {
        let (tab_id, url) = self.tabs.active_tab().map(|t| (t.id.clone(), t.url.clone()))?;
        match self.groups.add_to_group(name, &url) {
            Ok(()) => {}
            Err(TabGroupError::EmptyName) => return None,
            Err(e) => error!(window = %self.id, error = %e, "error saving tab groups"),
        }
        let name = name.trim().to_string();
        if let Err(e) = self.tabs.set_group(&tab_id, Some(&name)) {
            warn!(window = %self.id, error = %e, "group not recorded on tab");
        }
        Some(name)
    }

    /// Returns the new pinned flag.
    pub fn toggle_pin(&mut self, tab_id: &str) -> Option<bool> {
        match self.tabs.toggle_pin(tab_id) {
            Ok(pinned) => Some(pinned),
            Err(e) => {
                warn!(window = %self.id, error = %e, "pin not toggled");
                None
            }
        }
    }

    /// Saves the homepage and tab limit, evicting unpinned tabs over the limit.
    pub fn apply_settings(&mut self, home_page: &str, max_tabs: usize) -> bool {
        if !url_utils::is_valid_url(home_page) {
            self.show_error("Invalid homepage URL or settings.");
            return false;
        }

        for (key, value) in [
            ("general.home_page", json!(home_page)),
            ("general.max_tabs", json!(max_tabs)),
        ] {
            if let Err(e) = self.settings.set_value(key, value) {
                error!(window = %self.id, key, error = %e, "error saving settings");
                // Only writes that reached disk are applied.
                self.home_page = self.settings.get_settings().general.home_page.clone();
                self.show_error("Invalid homepage URL or settings.");
                return false;
            }
        }
        self.home_page = home_page.to_string();

        if max_tabs > 0 {
            for tab in self.tabs.enforce_limit(max_tabs) {
                info!(window = %self.id, url = %tab.url, "tab evicted by tab limit");
                self.ui.remove_tab_surface(&tab.id);
            }
        }

        self.sync_quietly();
        self.ui.show_dialog(DialogKind::Info, "Success", "Settings saved!");
        true
    }

    /// Changes any other setting by dot-separated key, e.g. `privacy.ad_blocking`.
    pub fn update_setting(&mut self, key: &str, value: serde_json::Value) -> bool {
        if let Err(e) = self.settings.set_value(key, value) {
            self.show_error(&e.to_string());
            return false;
        }
        let privacy = self.settings.get_settings().privacy.clone();
        self.guard.configure(&privacy);
        true
    }

    fn local_snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            bookmarks: self.bookmarks.list().to_vec(),
            history: self.history.entries().to_vec(),
            home_page: self.home_page.clone(),
        }
    }

    /// Replaces bookmarks, history and homepage with a reconciled snapshot.
    fn adopt_snapshot(&mut self, snapshot: SyncSnapshot) {
        self.bookmarks.replace_all(snapshot.bookmarks.clone());
        self.history.replace_all(snapshot.history.clone());
        self.home_page = snapshot.home_page.clone();
        if let Err(e) = self.bookmarks.save() {
            error!(window = %self.id, error = %e, "error saving bookmarks");
        }
        if let Err(e) = self.history.save() {
            error!(window = %self.id, error = %e, "error saving history");
        }
        self.ui.refresh(&snapshot);
    }

    fn sync_quietly(&mut self) -> bool {
        let mut snapshot = self.local_snapshot();
        if self.sync.sync(&mut snapshot) {
            self.adopt_snapshot(snapshot);
            true
        } else {
            false
        }
    }

    /// Publishes this window's state and adopts the shared snapshot.
    pub fn sync_now(&mut self) -> bool {
        let synced = self.sync_quietly();
        if !synced {
            self.show_error("Error syncing data");
        }
        synced
    }

    /// Engine hook, called before a tab navigates.
    pub fn on_navigation_starting(&mut self, tab_id: &str, url: &str) -> NavigationDecision {
        let Some(incognito) = self.tabs.get_tab(tab_id).map(|t| t.is_incognito) else {
            warn!(window = %self.id, tab_id, "navigation for unknown tab");
            return NavigationDecision::default();
        };
        let decision = self.guard.check(url, incognito);
        if decision.insecure {
            self.ui
                .show_dialog(DialogKind::Warning, "Security Warning", INSECURE_WARNING);
        }
        decision
    }

    /// Engine hook, called when a tab finished loading.
    pub fn on_navigation_completed(&mut self, tab_id: &str, url: &str, title: &str) {
        let Some(incognito) = self.tabs.get_tab(tab_id).map(|t| t.is_incognito) else {
            warn!(window = %self.id, tab_id, "completion for unknown tab");
            return;
        };
        if let Err(e) = self.tabs.update_url(tab_id, url) {
            warn!(window = %self.id, error = %e, "tab url not updated");
            return;
        }
        if let Err(e) = self.tabs.update_title(tab_id, title) {
            warn!(window = %self.id, error = %e, "tab title not updated");
        }

        if incognito {
            return;
        }
        if let Err(e) = self.history.record_visit(url, title, Utc::now()) {
            error!(window = %self.id, error = %e, "error saving history");
        }
        self.sync_quietly();
    }

    /// Engine hook, called when the engine begins a download.
    ///
    /// Asks the user where to save; declining cancels the operation.
    pub fn on_download_starting(
        &mut self,
        operation: Arc<dyn DownloadOperation>,
        suggested: &Path,
    ) -> Option<DownloadId> {
        let Some(save_path) = self.ui.choose_save_path(suggested) else {
            info!(window = %self.id, "download declined");
            operation.cancel();
            return None;
        };

        let file_name = save_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| save_path.display().to_string());

        match self
            .downloads
            .start_download(Arc::clone(&operation), save_path)
        {
            Ok(id) => {
                self.ui
                    .notify("Download", &format!("Downloading {}", file_name));
                Some(id)
            }
            Err(e) => {
                error!(window = %self.id, error = %e, "download not started");
                operation.cancel();
                self.ui
                    .notify("Download Failed", &format!("{} could not be downloaded.", file_name));
                None
            }
        }
    }

    pub fn pause_download(&mut self, id: &str) -> bool {
        self.downloads
            .pause_download(id)
            .map_err(|e| warn!(window = %self.id, error = %e, "pause rejected"))
            .is_ok()
    }

    pub fn resume_download(&mut self, id: &str) -> bool {
        self.downloads
            .resume_download(id)
            .map_err(|e| warn!(window = %self.id, error = %e, "resume rejected"))
            .is_ok()
    }

    pub fn cancel_download(&mut self, id: &str) -> bool {
        self.downloads
            .cancel_download(id)
            .map_err(|e| warn!(window = %self.id, error = %e, "cancel rejected"))
            .is_ok()
    }

    /// Runs queued commands, download events and incoming sync snapshots.
    /// Returns how many items were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;

        while let Ok(command) = self.commands_rx.try_recv() {
            self.execute(command);
            handled += 1;
        }

        for event in self.downloads.drain_events() {
            self.forward_download_event(&event);
            handled += 1;
        }

        let mut incoming = Vec::new();
        if let Some(inbox) = self.sync_inbox.as_mut() {
            while let Ok(snapshot) = inbox.try_recv() {
                incoming.push(snapshot);
            }
        }
        for snapshot in incoming {
            debug!(window = %self.id, "adopting snapshot from another window");
            self.adopt_snapshot(snapshot);
            handled += 1;
        }

        handled
    }

    fn execute(&mut self, command: WindowCommand) {
        match command {
            WindowCommand::NewTab { url, incognito } => {
                self.new_tab(url.as_deref(), incognito);
            }
            WindowCommand::CloseTab(tab_id) => {
                self.close_tab(&tab_id);
            }
            WindowCommand::LoadUrl(text) => {
                self.load_url(&text);
            }
            WindowCommand::NavigationCompleted { tab_id, url, title } => {
                self.on_navigation_completed(&tab_id, &url, &title)
            }
            WindowCommand::DownloadStarting { operation, suggested } => {
                self.on_download_starting(operation, &suggested);
            }
            WindowCommand::PauseDownload(id) => {
                self.pause_download(&id);
            }
            WindowCommand::ResumeDownload(id) => {
                self.resume_download(&id);
            }
            WindowCommand::CancelDownload(id) => {
                self.cancel_download(&id);
            }
            WindowCommand::Sync => {
                self.sync_now();
            }
        }
    }

    fn forward_download_event(&mut self, event: &DownloadEvent) {
        self.ui.download_event(event);
        if let DownloadEvent::Finished {
            state, file_name, ..
        } = event
        {
            match state {
                DownloadState::Completed => self
                    .ui
                    .notify("Download Complete", &format!("{} downloaded.", file_name)),
                _ => self
                    .ui
                    .notify("Download Interrupted", &format!("{} was interrupted.", file_name)),
            }
        }
    }

    /// Saves the session, leaves the registry and publishes a final snapshot.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }

        match self.session.save(self.tabs.tabs(), &self.groups) {
            Ok(saved) => debug!(window = %self.id, saved, "session saved on close"),
            Err(SessionError::NothingToSave) => {}
            Err(e) => error!(window = %self.id, error = %e, "error saving session"),
        }
        if let Err(e) = self.groups.save() {
            error!(window = %self.id, error = %e, "error saving tab groups");
        }

        self.registry.unregister(&self.id);
        self.sync_inbox = None;
        self.open = false;

        let mut snapshot = self.local_snapshot();
        if let Err(e) = self.sync.publish(&snapshot) {
            error!(window = %self.id, error = %e, "error publishing final snapshot");
        } else if let Err(e) = self.sync.reconcile(&mut snapshot) {
            warn!(window = %self.id, error = %e, "final reconcile failed");
        }
        info!(window = %self.id, "window closed");
    }

    pub fn control_handle(&self) -> ControlHandle {
        ControlHandle {
            window: self.id.clone(),
            tx: self.commands_tx.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn home_page(&self) -> &str {
        &self.home_page
    }

    pub fn settings(&self) -> &BrowserSettings {
        self.settings.get_settings()
    }

    pub fn tabs(&self) -> &[Tab] {
        self.tabs.tabs()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.active_tab()
    }

    pub fn bookmarks(&self) -> &[String] {
        self.bookmarks.list()
    }

    /// History for the menu, most recent first.
    pub fn recent_history(&self) -> Vec<HistoryEntry> {
        self.history
            .recent(HISTORY_MENU_LIMIT)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn groups(&self) -> &[TabGroup] {
        self.groups.groups()
    }

    pub fn downloads(&self) -> Vec<DownloadItem> {
        self.downloads.list_downloads()
    }

    pub fn download(&self, id: &str) -> Option<DownloadItem> {
        self.downloads.get_download(id)
    }

    pub fn blocked_count(&self) -> u64 {
        self.guard.blocked_count()
    }
}

impl Drop for BrowserWindow {
    fn drop(&mut self) {
        if self.open {
            self.registry.unregister(&self.id);
        }
    }
}
