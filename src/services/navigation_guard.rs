//! Navigation Guard.
//!
//! Decides, for each navigation the engine is about to start, whether it is
//! cancelled as an ad request and whether the user should be warned that the
//! page is not served over HTTPS. Incognito tabs bypass both checks.

use tracing::{debug, info};

use crate::types::settings::PrivacySettings;

/// Answer to the engine's navigation-starting hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationDecision {
    pub cancel: bool,
    /// The page loads, but over plain HTTP.
    pub insecure: bool,
}

/// Trait defining navigation guard operations.
pub trait NavigationGuardTrait {
    /// Counts the navigation as blocked when `cancel` is returned.
    fn check(&mut self, url: &str, incognito: bool) -> NavigationDecision;
    fn is_blocked(&self, url: &str) -> bool;
    /// Rebuilds the rules after the privacy settings changed.
    fn configure(&mut self, privacy: &PrivacySettings);
    fn blocked_count(&self) -> u64;
}

pub struct NavigationGuard {
    enabled: bool,
    insecure_warning: bool,
    patterns: Vec<String>,
    #[cfg(feature = "adblock")]
    engine: Option<adblock::engine::Engine>,
    blocked: u64,
}

impl NavigationGuard {
    pub fn new(privacy: &PrivacySettings) -> Self {
        let mut guard = Self {
            enabled: false,
            insecure_warning: false,
            patterns: Vec::new(),
            #[cfg(feature = "adblock")]
            engine: None,
            blocked: 0,
        };
        guard.configure(privacy);
        guard
    }

    fn matches_pattern(&self, url: &str) -> bool {
        let url_lower = url.to_lowercase();
        self.patterns.iter().any(|p| url_lower.contains(p.as_str()))
    }

    #[cfg(feature = "adblock")]
    fn matches_engine(&self, url: &str) -> bool {
        let Some(engine) = &self.engine else {
            return false;
        };
        match adblock::request::Request::new(url, url, "document") {
            Ok(request) => engine.check_network_request(&request).matched,
            Err(e) => {
                debug!(url, error = ?e, "url not understood by filter engine");
                false
            }
        }
    }

    #[cfg(not(feature = "adblock"))]
    fn matches_engine(&self, _url: &str) -> bool {
        false
    }
}

/// Host-anchored filter rules for the patterns that name a whole domain.
///
/// Prefix patterns such as `ads.` have no domain form and stay substring-only.
pub fn host_rules(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim().trim_matches('.'))
        .filter(|p| p.contains('.') && !p.contains('/'))
        .map(|host| format!("||{}^", host))
        .collect()
}

#[cfg(feature = "adblock")]
fn build_engine(patterns: &[String]) -> Option<adblock::engine::Engine> {
    let rules = host_rules(patterns);
    if rules.is_empty() {
        return None;
    }
    let mut filter_set = adblock::lists::FilterSet::new(true);
    filter_set.add_filters(&rules, adblock::lists::ParseOptions::default());
    Some(adblock::engine::Engine::from_filter_set(filter_set, true))
}

impl NavigationGuardTrait for NavigationGuard {
    fn check(&mut self, url: &str, incognito: bool) -> NavigationDecision {
        if incognito {
            return NavigationDecision::default();
        }

        if self.is_blocked(url) {
            self.blocked += 1;
            info!(url, blocked = self.blocked, "navigation blocked");
            return NavigationDecision {
                cancel: true,
                insecure: false,
            };
        }

        let insecure = self.insecure_warning
            && url::Url::parse(url).map_or(false, |u| u.scheme() != "https");
        NavigationDecision {
            cancel: false,
            insecure,
        }
    }

    fn is_blocked(&self, url: &str) -> bool {
        self.enabled && (self.matches_pattern(url) || self.matches_engine(url))
    }

    fn configure(&mut self, privacy: &PrivacySettings) {
        self.enabled = privacy.ad_blocking;
        self.insecure_warning = privacy.insecure_warning;
        self.patterns = privacy
            .blocked_hosts
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        #[cfg(feature = "adblock")]
        {
            self.engine = if self.enabled {
                build_engine(&self.patterns)
            } else {
                None
            };
        }
        debug!(
            enabled = self.enabled,
            patterns = self.patterns.len(),
            "navigation guard configured"
        );
    }

    fn blocked_count(&self) -> u64 {
        self.blocked
    }
}
