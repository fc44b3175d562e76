// BrowserShell services
// Services that are not tied to one persisted list: settings, navigation checks, cross-window sync.

pub mod navigation_guard;
pub mod settings_engine;
pub mod sync_engine;
pub mod window_registry;
