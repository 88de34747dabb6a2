//! Connectivity as last reported by the platform observer

use serde::{Deserialize, Serialize};

/// Link state; the offline fallback activates on the transition down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Online,
    Offline,
}

impl LinkState {
    /// Offline means the fallback navigator is the active surface
    pub fn is_offline(&self) -> bool {
        matches!(self, LinkState::Offline)
    }

    /// Get emoji for link state
    pub fn emoji(&self) -> &'static str {
        match self {
            LinkState::Online => "🌐",
            LinkState::Offline => "📴",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LinkState::Online => "ONLINE",
            LinkState::Offline => "OFFLINE",
        };
        write!(f, "{}", name)
    }
}
