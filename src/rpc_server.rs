//! BrowserShell host: JSON-RPC over stdin/stdout for the UI process.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"tab.new", "params":{"url":"https://..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"engine.navigate", "tab_id":"...", "url":"..."}

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use browsershell::logging;
use browsershell::rpc_handler::{handle_method, EventSink, RpcSession};
use browsershell::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use browsershell::services::window_registry::ProcessWindowRegistry;
use browsershell::storage::StorePaths;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

/// How often queued window work runs when no request arrives.
const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn write_line(value: &Value) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", value).and_then(|_| out.flush()).is_err() {
        error!("stdout closed");
    }
}

fn flush_events(events: &mut UnboundedReceiver<Value>) {
    while let Ok(event) = events.try_recv() {
        write_line(&event);
    }
}

/// Prefer BROWSERSHELL_DATA_DIR, fall back to the platform data directory.
fn store_paths() -> StorePaths {
    match std::env::var("BROWSERSHELL_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => StorePaths::new(PathBuf::from(dir)),
        _ => StorePaths::platform_default(),
    }
}

#[tokio::main]
async fn main() {
    logging::init();

    let paths = store_paths();
    let settings_path = std::env::var_os("BROWSERSHELL_DATA_DIR")
        .map(|_| paths.settings().to_string_lossy().into_owned());
    let mut settings = SettingsEngine::new(settings_path);
    settings.load_or_default();

    let (sink, mut events) = EventSink::new();
    let registry = Arc::new(ProcessWindowRegistry::new());
    let session = Mutex::new(RpcSession::open(&paths, settings, registry, sink));
    info!(data_dir = %paths.data_dir().display(), "host ready");

    // Signal ready
    write_line(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    flush_events(&mut events);

    // Max 200 RPC requests per second
    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pump = time::interval(PUMP_INTERVAL);
    pump.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() { continue; }

                let req: Value = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        write_line(&json!({"id": null, "error": format!("parse error: {}", e)}));
                        continue;
                    }
                };

                let id = req.get("id").cloned().unwrap_or(Value::Null);
                if !rate_limiter.check() {
                    write_line(&json!({"id": id, "error": "rate limit exceeded"}));
                    continue;
                }

                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));

                let response = match handle_method(&session, method, &params) {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => json!({"id": id, "error": err}),
                };
                flush_events(&mut events);
                write_line(&response);

                if method == "window.close" {
                    break;
                }
            }
            _ = pump.tick() => {
                if let Ok(mut s) = session.lock() {
                    s.process_pending();
                }
                flush_events(&mut events);
            }
        }
    }

    if let Ok(mut s) = session.lock() {
        s.window.close();
    }
    flush_events(&mut events);
    info!("host stopped");
}
