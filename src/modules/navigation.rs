// Pure navigation logic - no Tauri imports allowed.
// Turns address-bar / search-box text into a URL and decides where it opens.

use serde::Serialize;

use crate::modules::tabs::ViewKind;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum NavigationAction {
    /// Load the URL in the active web view.
    NavigateInPlace { url: String },
    /// Open a fresh web view for the URL.
    OpenView { url: String },
}

impl NavigationAction {
    pub fn url(&self) -> &str {
        match self {
            Self::NavigateInPlace { url } | Self::OpenView { url } => url,
        }
    }
}

/// Logic for parsing input into a navigable URL.
///
/// This is plain string work: no DNS lookups, no reachability checks, no
/// prefetching. Whatever comes out is handed to the webview unchanged.
///
/// The "contains a dot" rule is deliberately naive. Inputs such as
/// `notes.txt` or `a.b c` are treated as hosts and will fail to load
/// rather than being searched for.
pub fn resolve_input(input: &str, settings: &Settings) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // 1. Explicit web scheme: use verbatim (surrounding whitespace is dropped above)
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }

    // 2. Dot implies domain
    if trimmed.contains('.') {
        return Some(format!("http://{}", trimmed));
    }

    // 3. Fallback to the configured search engine
    Some(settings.search_engine().query_url(trimmed))
}

/// Resolves `input` and picks where it goes: web views are reused, any
/// other active view (home, email, calendar) gets a new web view opened.
pub fn dispatch(input: &str, active: Option<ViewKind>, settings: &Settings) -> Option<NavigationAction> {
    let url = resolve_input(input, settings)?;
    let action = match active {
        Some(ViewKind::Web) => NavigationAction::NavigateInPlace { url },
        _ => NavigationAction::OpenView { url },
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn with_engine(name: &str) -> Settings {
        Settings {
            search_engine: name.to_string(),
            ..Settings::default()
        }
    }

    #[rstest]
    #[case("https://example.com")]
    #[case("http://example.com")]
    #[case("https://example.com/path?query=1#frag")]
    #[case("http://localhost:8080")]
    #[case("https://no-dots-here")]
    fn test_scheme_urls_are_verbatim(#[case] input: &str) {
        assert_eq!(resolve_input(input, &Settings::default()).as_deref(), Some(input));
    }

    #[rstest]
    #[case("https://example.com ", "https://example.com")]
    #[case("\thttp://example.com/a b\n", "http://example.com/a b")]
    fn test_scheme_urls_lose_only_surrounding_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(resolve_input(input, &Settings::default()).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("example.com", "http://example.com")]
    #[case("sub.domain.co.uk", "http://sub.domain.co.uk")]
    #[case("docs.rs/serde", "http://docs.rs/serde")]
    #[case("127.0.0.1:3000", "http://127.0.0.1:3000")]
    #[case("  example.com  ", "http://example.com")]
    // Known false positives of the dot heuristic
    #[case("notes.txt", "http://notes.txt")]
    #[case("a.b c", "http://a.b c")]
    fn test_dotted_input_gets_http_prefix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(resolve_input(input, &Settings::default()).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("example.com")]
    #[case("docs.rs/serde")]
    #[case("https://example.com")]
    fn test_prefixing_is_idempotent(#[case] input: &str) {
        let settings = Settings::default();
        let once = resolve_input(input, &settings).unwrap();
        let twice = resolve_input(&once, &settings).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.matches("http").count(), 1);
    }

    #[rstest]
    #[case("Google", "hello world", "https://www.google.com/search?q=hello%20world")]
    #[case("Bing", "hello world", "https://www.bing.com/search?q=hello%20world")]
    #[case("DuckDuckGo", "hello world", "https://duckduckgo.com/?q=hello%20world")]
    #[case("Bogus", "rust", "https://duckduckgo.com/?q=rust")]
    #[case("Google", "c++", "https://www.google.com/search?q=c%2B%2B")]
    fn test_search_fallback(#[case] engine: &str, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(resolve_input(input, &with_engine(engine)).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_empty_input_does_nothing(#[case] input: &str) {
        assert_eq!(resolve_input(input, &Settings::default()), None);
        assert_eq!(dispatch(input, Some(ViewKind::Web), &Settings::default()), None);
    }

    #[test]
    fn test_web_view_is_reused() {
        let action = dispatch("example.com", Some(ViewKind::Web), &Settings::default()).unwrap();
        assert_eq!(
            action,
            NavigationAction::NavigateInPlace {
                url: "http://example.com".to_string()
            }
        );
    }

    #[rstest]
    #[case(Some(ViewKind::Home))]
    #[case(Some(ViewKind::Email))]
    #[case(Some(ViewKind::Calendar))]
    #[case(None)]
    fn test_non_web_view_opens_new(#[case] active: Option<ViewKind>) {
        let action = dispatch("hello world", active, &with_engine("Bing")).unwrap();
        assert_eq!(
            action,
            NavigationAction::OpenView {
                url: "https://www.bing.com/search?q=hello%20world".to_string()
            }
        );
        assert_eq!(action.url(), "https://www.bing.com/search?q=hello%20world");
    }
}
