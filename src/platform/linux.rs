// Platform paths for Linux
// Config:    $XDG_CONFIG_HOME/browsershell or ~/.config/browsershell
// Data:      $XDG_DATA_HOME/browsershell or ~/.local/share/browsershell
// Downloads: $XDG_DOWNLOAD_DIR or ~/Downloads

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns `$XDG_CONFIG_HOME/browsershell`, or `~/.config/browsershell`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("browsershell"),
        _ => home_dir().join(".config").join("browsershell"),
    }
}

/// Returns `$XDG_DATA_HOME/browsershell`, or `~/.local/share/browsershell`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("browsershell"),
        _ => home_dir().join(".local").join("share").join("browsershell"),
    }
}

pub fn get_download_dir() -> PathBuf {
    match env::var("XDG_DOWNLOAD_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join("Downloads"),
    }
}
