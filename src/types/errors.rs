use std::fmt;

// === StoreError ===

/// Errors raised by the JSON persistence layer.
#[derive(Debug)]
pub enum StoreError {
    /// Reading, writing, or creating the parent directory failed.
    Io(String),
    /// The stored document could not be parsed.
    Corrupt(String),
    /// The in-memory value could not be serialized.
    Serialization(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Store I/O error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "Store file is corrupt: {}", msg),
            StoreError::Serialization(msg) => {
                write!(f, "Store serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// === ValidationError ===

/// User input that was rejected before any state was touched.
#[derive(Debug, PartialEq)]
pub enum ValidationError {
    /// The text is not an absolute http(s) URL.
    InvalidUrl(String),
    /// A required field was left empty.
    EmptyInput(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            ValidationError::EmptyInput(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

// === TabError ===

/// Errors related to tab management operations.
#[derive(Debug)]
pub enum TabError {
    /// Tab with the given ID was not found.
    NotFound(String),
    /// The URL for a new or updated tab was rejected.
    InvalidUrl(String),
    /// The last remaining tab of a window cannot be closed.
    LastTab,
    /// Pinned tabs must be unpinned before closing.
    Pinned(String),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
            TabError::InvalidUrl(url) => write!(f, "Invalid tab URL: {}", url),
            TabError::LastTab => write!(f, "Cannot close the last tab"),
            TabError::Pinned(id) => write!(f, "Tab is pinned: {}", id),
        }
    }
}

impl std::error::Error for TabError {}

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// The bookmark URL was rejected.
    InvalidUrl(String),
    /// No bookmark with this URL exists.
    NotFound(String),
    /// Persisting the bookmark list failed.
    Storage(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::InvalidUrl(url) => write!(f, "Invalid bookmark URL: {}", url),
            BookmarkError::NotFound(url) => write!(f, "Bookmark not found: {}", url),
            BookmarkError::Storage(msg) => write!(f, "Bookmark storage error: {}", msg),
        }
    }
}

impl std::error::Error for BookmarkError {}

// === HistoryError ===

/// Errors related to browsing history operations.
#[derive(Debug)]
pub enum HistoryError {
    /// Persisting the history log failed.
    Storage(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Storage(msg) => write!(f, "History storage error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

// === TabGroupError ===

/// Errors related to tab group operations.
#[derive(Debug)]
pub enum TabGroupError {
    /// Group names must be non-empty.
    EmptyName,
    /// No group with this name exists.
    NotFound(String),
    /// Persisting the group registry failed.
    Storage(String),
}

impl fmt::Display for TabGroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabGroupError::EmptyName => write!(f, "Tab group name cannot be empty"),
            TabGroupError::NotFound(name) => write!(f, "Tab group not found: {}", name),
            TabGroupError::Storage(msg) => write!(f, "Tab group storage error: {}", msg),
        }
    }
}

impl std::error::Error for TabGroupError {}

// === SessionError ===

/// Errors related to session management operations.
#[derive(Debug)]
pub enum SessionError {
    /// There were no tabs to save; the previous session was kept.
    NothingToSave,
    /// Writing the session file failed.
    Storage(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NothingToSave => write!(f, "No tabs to save in session"),
            SessionError::Storage(msg) => write!(f, "Session storage error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

// === DownloadError ===

/// Errors related to download control operations.
#[derive(Debug, PartialEq)]
pub enum DownloadError {
    /// Download with the given ID was not found.
    NotFound(String),
    /// The requested control action is not valid in the current state.
    InvalidTransition { action: &'static str, state: String },
    /// The download already reached a terminal state.
    AlreadyFinished(String),
    /// Polling needs a tokio runtime and none is running.
    NoRuntime,
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::NotFound(id) => write!(f, "Download not found: {}", id),
            DownloadError::InvalidTransition { action, state } => {
                write!(f, "Cannot {} a download that is {}", action, state)
            }
            DownloadError::AlreadyFinished(id) => {
                write!(f, "Download already finished: {}", id)
            }
            DownloadError::NoRuntime => write!(f, "No async runtime available for download polling"),
        }
    }
}

impl std::error::Error for DownloadError {}

// === SyncError ===

/// Errors related to cross-window synchronization.
#[derive(Debug)]
pub enum SyncError {
    /// Reading or writing the shared sync file failed.
    Io(String),
    /// The shared sync file could not be parsed.
    Parse(String),
    /// The shared sync file holds `null`.
    Empty,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Io(msg) => write!(f, "Sync I/O error: {}", msg),
            SyncError::Parse(msg) => write!(f, "Sync snapshot parse error: {}", msg),
            SyncError::Empty => write!(f, "Sync snapshot is empty"),
        }
    }
}

impl std::error::Error for SyncError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<StoreError> for BookmarkError {
    fn from(e: StoreError) -> Self {
        BookmarkError::Storage(e.to_string())
    }
}

impl From<StoreError> for HistoryError {
    fn from(e: StoreError) -> Self {
        HistoryError::Storage(e.to_string())
    }
}

impl From<StoreError> for TabGroupError {
    fn from(e: StoreError) -> Self {
        TabGroupError::Storage(e.to_string())
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Storage(e.to_string())
    }
}
