//! Durable storage layer.
//!
//! Every persisted record is a single JSON document in the window's data
//! directory. Missing or corrupt files fall back to a default value.
//!
//! # Usage
//!
//! ```no_run
//! use browsershell::storage::{JsonStore, StorePaths};
//!
//! let paths = StorePaths::new("/tmp/browsershell");
//! let store: JsonStore<Vec<String>> = JsonStore::new(paths.bookmarks());
//!
//! // Missing file -> empty list
//! let bookmarks = store.load_or_default();
//! store.save(&bookmarks).expect("failed to write bookmarks");
//! ```

pub mod json_store;
pub mod paths;

pub use json_store::JsonStore;
pub use paths::StorePaths;
