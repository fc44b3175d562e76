//! RPC method handler for the BrowserShell JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches one call to the window held by an
//! [`RpcSession`]. Everything the window asks of its UI and engine
//! collaborators is turned into `{"event": ...}` lines through an
//! [`EventSink`], which the server writes to stdout between responses.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{json, Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::app::BrowserWindow;
use crate::host::{BrowserEngine, DialogKind, UiHost};
use crate::platform;
use crate::services::settings_engine::SettingsEngine;
use crate::services::window_registry::WindowRegistry;
use crate::storage::StorePaths;
use crate::types::download::{
    DownloadEvent, DownloadId, DownloadOperation, OperationSnapshot, OperationState,
};
use crate::types::sync::SyncSnapshot;
use crate::types::tab::Tab;

/// Outgoing channel for unsolicited event lines.
#[derive(Clone)]
pub struct EventSink {
    tx: UnboundedSender<Value>,
}

impl EventSink {
    pub fn new() -> (Self, UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Sends `{"event": name, ..fields}`. Non-object payloads go under `data`.
    pub fn emit(&self, name: &str, payload: Value) {
        let mut line = Map::new();
        line.insert("event".to_string(), json!(name));
        match payload {
            Value::Object(fields) => line.extend(fields),
            Value::Null => {}
            other => {
                line.insert("data".to_string(), other);
            }
        }
        // The reader is gone only while the server shuts down.
        let _ = self.tx.send(Value::Object(line));
    }
}

/// UI collaborator that forwards every request to the host process.
///
/// Prompts cannot be answered synchronously over the pipe, so they return
/// `None`; the host passes the answer as a method parameter instead. The
/// host has already chosen the save path when it reports a download.
pub struct HostUi {
    sink: EventSink,
}

impl HostUi {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

impl UiHost for HostUi {
    fn create_tab_surface(&mut self, tab: &Tab) {
        self.sink.emit("tab.create", json!({ "tab": tab }));
    }

    fn remove_tab_surface(&mut self, tab_id: &str) {
        self.sink.emit("tab.remove", json!({ "tab_id": tab_id }));
    }

    fn show_dialog(&mut self, kind: DialogKind, title: &str, message: &str) -> Option<String> {
        self.sink.emit(
            "dialog",
            json!({ "kind": kind, "title": title, "message": message }),
        );
        None
    }

    fn notify(&mut self, title: &str, message: &str) {
        self.sink
            .emit("notification", json!({ "title": title, "message": message }));
    }

    fn choose_save_path(&mut self, suggested: &Path) -> Option<PathBuf> {
        Some(suggested.to_path_buf())
    }

    fn download_event(&mut self, event: &DownloadEvent) {
        let payload = match event {
            DownloadEvent::StateChanged { id, state } => json!({ "id": id, "state": state }),
            DownloadEvent::Progress {
                id,
                bytes_received,
                total_bytes,
                percentage,
            } => json!({
                "id": id,
                "bytes_received": bytes_received,
                "total_bytes": total_bytes,
                "percentage": percentage,
            }),
            DownloadEvent::Finished { id, state, file_name } => {
                json!({ "id": id, "state": state, "file_name": file_name })
            }
            DownloadEvent::Dismiss { id } => json!({ "id": id, "dismiss": true }),
        };
        self.sink.emit("download.status", payload);
    }

    fn refresh(&mut self, snapshot: &SyncSnapshot) {
        self.sink.emit(
            "sync.refresh",
            json!({ "bookmarks": snapshot.bookmarks.len(), "home_page": snapshot.home_page }),
        );
    }
}

/// Engine collaborator living in the host process.
pub struct HostEngine {
    sink: EventSink,
}

impl HostEngine {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

impl BrowserEngine for HostEngine {
    fn navigate(&mut self, tab_id: &str, url: &str) {
        self.sink
            .emit("engine.navigate", json!({ "tab_id": tab_id, "url": url }));
    }

    fn go_back(&mut self, tab_id: &str) {
        self.sink.emit("engine.back", json!({ "tab_id": tab_id }));
    }

    fn go_forward(&mut self, tab_id: &str) {
        self.sink.emit("engine.forward", json!({ "tab_id": tab_id }));
    }

    fn reload(&mut self, tab_id: &str) {
        self.sink.emit("engine.reload", json!({ "tab_id": tab_id }));
    }
}

/// A download running in the host's engine.
///
/// The host pushes counters with `download.update`; the controller polls the
/// last pushed value. Control requests are sent back as events.
pub struct RemoteDownloadOperation {
    engine_id: String,
    last: Mutex<OperationSnapshot>,
    sink: EventSink,
}

impl RemoteDownloadOperation {
    pub fn new(engine_id: &str, sink: EventSink) -> Self {
        Self {
            engine_id: engine_id.to_string(),
            last: Mutex::new(OperationSnapshot {
                bytes_received: 0,
                total_bytes: None,
                state: OperationState::InProgress,
            }),
            sink,
        }
    }

    pub fn engine_id(&self) -> &str {
        &self.engine_id
    }

    pub fn update(&self, snapshot: OperationSnapshot) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    fn request(&self, event: &str) {
        self.sink.emit(event, json!({ "engine_id": self.engine_id }));
    }
}

impl DownloadOperation for RemoteDownloadOperation {
    fn snapshot(&self) -> OperationSnapshot {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pause(&self) {
        self.request("download.pause");
    }

    fn resume(&self) {
        self.request("download.resume");
    }

    fn cancel(&self) {
        self.request("download.cancel");
    }
}

/// A remote download and the controller id the window gave it.
struct RemoteDownload {
    id: DownloadId,
    operation: Arc<RemoteDownloadOperation>,
}

/// The window served by one host process plus its remote downloads.
pub struct RpcSession {
    pub window: BrowserWindow,
    sink: EventSink,
    /// Keyed by the host's engine id; only downloads the window still tracks.
    operations: HashMap<String, RemoteDownload>,
}

impl RpcSession {
    /// Builds and opens a window whose collaborators report through `sink`.
    pub fn open(
        paths: &StorePaths,
        settings: SettingsEngine,
        registry: Arc<dyn WindowRegistry>,
        sink: EventSink,
    ) -> Self {
        let mut window = BrowserWindow::new(
            paths,
            settings,
            registry,
            Box::new(HostUi::new(sink.clone())),
            Box::new(HostEngine::new(sink.clone())),
        );
        window.open();
        Self {
            window,
            sink,
            operations: HashMap::new(),
        }
    }

    pub fn operation(&self, engine_id: &str) -> Option<&Arc<RemoteDownloadOperation>> {
        self.operations.get(engine_id).map(|d| &d.operation)
    }

    /// Runs the window's queued work and forgets dismissed downloads.
    pub fn process_pending(&mut self) -> usize {
        let handled = self.window.process_pending();
        self.prune_operations();
        handled
    }

    fn prune_operations(&mut self) {
        let window = &self.window;
        self.operations.retain(|engine_id, d| {
            let tracked = window.download(&d.id).is_some();
            if !tracked {
                debug!(engine_id = %engine_id, id = %d.id, "remote download released");
            }
            tracked
        });
    }

    /// True while the engine id belongs to a download that has not finished.
    fn is_running(&self, engine_id: &str) -> bool {
        self.operations
            .get(engine_id)
            .and_then(|d| self.window.download(&d.id))
            .is_some_and(|item| !item.state.is_terminal())
    }

    fn forget_download(&mut self, id: &str) {
        self.operations.retain(|_, d| d.id != id);
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

/// Bare file names land in the platform download directory.
fn resolve_save_path(raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        platform::get_download_dir().join(path)
    }
}

fn ok(done: bool) -> Value {
    json!({ "ok": done })
}

/// Dispatch a JSON-RPC method call to the window.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(session: &Mutex<RpcSession>, method: &str, params: &Value) -> Result<Value, String> {
    let mut guard = session.lock().map_err(|e| e.to_string())?;
    let s = &mut *guard;
    s.prune_operations();
    let w = &mut s.window;

    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Tabs ───
        "tab.new" => {
            let url = params.get("url").and_then(|v| v.as_str());
            let incognito = params.get("incognito").and_then(|v| v.as_bool()).unwrap_or(false);
            let id = w.new_tab(url, incognito).ok_or("tab not created")?;
            Ok(json!({"id": id}))
        }
        "tab.close" => {
            let id = str_param(params, "id")?;
            Ok(ok(w.close_tab(id)))
        }
        "tab.switch" => {
            let id = str_param(params, "id")?;
            Ok(ok(w.switch_tab(id)))
        }
        "tab.pin" => {
            let id = str_param(params, "id")?;
            let pinned = w.toggle_pin(id).ok_or("tab not found")?;
            Ok(json!({"pinned": pinned}))
        }
        "tab.list" => {
            let active = w.active_tab().map(|t| t.id.clone());
            Ok(json!({"tabs": w.tabs(), "active": active}))
        }

        // ─── Navigation ───
        "navigate" => {
            let text = str_param(params, "text")?;
            Ok(json!({"url": w.load_url(text)}))
        }
        "navigate.back" => {
            w.go_back();
            Ok(ok(true))
        }
        "navigate.forward" => {
            w.go_forward();
            Ok(ok(true))
        }
        "navigate.reload" => {
            w.reload();
            Ok(ok(true))
        }
        "navigate.home" => {
            w.go_home();
            Ok(ok(true))
        }
        "navigation.starting" => {
            let tab_id = str_param(params, "tab_id")?;
            let url = str_param(params, "url")?;
            let decision = w.on_navigation_starting(tab_id, url);
            Ok(json!({"cancel": decision.cancel, "insecure": decision.insecure}))
        }
        "navigation.completed" => {
            let tab_id = str_param(params, "tab_id")?;
            let url = str_param(params, "url")?;
            let title = params.get("title").and_then(|v| v.as_str()).unwrap_or("");
            w.on_navigation_completed(tab_id, url, title);
            Ok(ok(true))
        }

        // ─── Bookmarks ───
        "bookmark.add" => Ok(json!({"added": w.add_bookmark()})),
        "bookmark.remove" => {
            let url = str_param(params, "url")?;
            Ok(ok(w.remove_bookmark(url)))
        }
        "bookmark.list" => Ok(json!(w.bookmarks())),

        // ─── History ───
        "history.recent" => {
            let arr: Vec<Value> = w
                .recent_history()
                .iter()
                .map(|h| json!({"url": h.url, "title": h.title, "time": h.time.to_rfc3339()}))
                .collect();
            Ok(json!(arr))
        }

        // ─── Tab groups ───
        "group.add" => {
            let name = str_param(params, "name")?;
            let group = w.add_active_to_group(name).ok_or("group not created")?;
            Ok(json!({"group": group}))
        }
        "group.list" => {
            let arr: Vec<Value> = w
                .groups()
                .iter()
                .map(|g| json!({"name": g.name, "urls": g.urls}))
                .collect();
            Ok(json!(arr))
        }

        // ─── Settings ───
        "settings.get" => serde_json::to_value(w.settings()).map_err(|e| e.to_string()),
        "settings.apply" => {
            let home_page = str_param(params, "home_page")?;
            let max_tabs = match params.get("max_tabs") {
                None => 0,
                Some(v) => v
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or("invalid max_tabs")?,
            };
            Ok(ok(w.apply_settings(home_page, max_tabs)))
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            Ok(ok(w.update_setting(key, value)))
        }

        // ─── Sync ───
        "sync" => Ok(ok(w.sync_now())),

        // ─── Downloads ───
        "download.start" => {
            let engine_id = str_param(params, "engine_id")?.to_string();
            if s.is_running(&engine_id) {
                return Err(format!("download already started: {}", engine_id));
            }
            let save_path = resolve_save_path(str_param(params, "save_path")?);
            let operation = Arc::new(RemoteDownloadOperation::new(&engine_id, s.sink.clone()));
            let id = s
                .window
                .on_download_starting(operation.clone(), &save_path)
                .ok_or("download not started")?;
            s.operations.insert(
                engine_id,
                RemoteDownload {
                    id: id.clone(),
                    operation,
                },
            );
            Ok(json!({"id": id}))
        }
        "download.update" => {
            let engine_id = str_param(params, "engine_id")?;
            let operation = s.operation(engine_id).ok_or("unknown download")?;
            let state: OperationState = match params.get("state") {
                Some(v) => serde_json::from_value(v.clone()).map_err(|e| e.to_string())?,
                None => OperationState::InProgress,
            };
            operation.update(OperationSnapshot {
                bytes_received: params.get("bytes_received").and_then(|v| v.as_u64()).unwrap_or(0),
                total_bytes: params.get("total_bytes").and_then(|v| v.as_u64()),
                state,
            });
            Ok(ok(true))
        }
        "download.pause" => {
            let id = str_param(params, "id")?;
            Ok(ok(w.pause_download(id)))
        }
        "download.resume" => {
            let id = str_param(params, "id")?;
            Ok(ok(w.resume_download(id)))
        }
        "download.cancel" => {
            let id = str_param(params, "id")?;
            let cancelled = w.cancel_download(id);
            if cancelled {
                s.forget_download(id);
            }
            Ok(ok(cancelled))
        }
        "download.list" => Ok(json!(w.downloads())),

        // ─── Window ───
        "window.close" => {
            w.close();
            Ok(ok(true))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
