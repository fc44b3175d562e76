use serde::{Deserialize, Serialize};

/// Top-level browser settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BrowserSettings {
    pub general: GeneralSettings,
    pub privacy: PrivacySettings,
    pub appearance: AppearanceSettings,
}

/// General browser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    /// Homepage used for new tabs and for the default restored tab.
    pub home_page: String,
    /// Search endpoint for address-bar input that is not a URL.
    pub search_url: String,
    /// Maximum number of open tabs per window; 0 means unlimited.
    pub max_tabs: usize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            home_page: "https://www.google.com".to_string(),
            search_url: "https://www.google.com/search".to_string(),
            max_tabs: 0,
        }
    }
}

/// Privacy-related settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrivacySettings {
    pub ad_blocking: bool,
    /// Substring patterns; a navigation whose URL contains one is cancelled.
    pub blocked_hosts: Vec<String>,
    /// Warn before loading plain-http pages in regular tabs.
    pub insecure_warning: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            ad_blocking: true,
            blocked_hosts: vec![
                "ads.".to_string(),
                "doubleclick.net".to_string(),
                "adserver.".to_string(),
            ],
            insecure_warning: true,
        }
    }
}

/// Appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppearanceSettings {
    pub dark_theme: bool,
}
