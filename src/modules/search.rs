// Search-engine resolution. Pure logic, no Tauri imports.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::Google
    }
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 3] = [Self::Google, Self::Bing, Self::DuckDuckGo];

    /// Maps a stored provider name to an engine.
    ///
    /// Only the exact names "Google" and "Bing" select those engines; every
    /// other value, "DuckDuckGo" included, lands on DuckDuckGo.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Google" => Self::Google,
            "Bing" => Self::Bing,
            _ => Self::DuckDuckGo,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }

    pub fn query_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            Self::Google => format!("https://www.google.com/search?q={}", q),
            Self::Bing => format!("https://www.bing.com/search?q={}", q),
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={}", q),
        }
    }
}

/// Builds the search URL for `query` on the provider named `provider`.
pub fn resolve(provider: &str, query: &str) -> String {
    SearchEngine::from_name(provider).query_url(query)
}
