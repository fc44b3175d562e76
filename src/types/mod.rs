// Shared type definitions
// Each submodule defines types used across the crate.

pub mod download;
pub mod errors;
pub mod history;
pub mod session;
pub mod settings;
pub mod sync;
pub mod tab;
pub mod tab_group;
