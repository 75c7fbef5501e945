//! Language negotiation middleware.
//!
//! Resolves the UI language for each request using a chain of negotiators.
//! Resolution order: `language` cookie → Accept-Language → default.
//! The result drives the `search` filter and localized ordering.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Cookie set by the language switcher.
pub const LANGUAGE_COOKIE: &str = "language";

/// The resolved language for the current request.
///
/// Stored in request extensions for per-request access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage(pub String);

/// Trait for language negotiation strategies.
///
/// Implementations inspect the request and return a language code if they
/// can determine the desired language. The middleware chains negotiators
/// by priority (highest first) and uses the first known match.
pub trait LanguageNegotiator: Send + Sync {
    /// Attempt to negotiate a language from the request.
    fn negotiate(&self, request: &Request<Body>) -> Option<String>;

    /// Priority of this negotiator (higher = checked first).
    fn priority(&self) -> i32;
}

/// Negotiates language from the `language` cookie.
pub struct CookieNegotiator {
    cookie_name: String,
}

impl CookieNegotiator {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    /// Find the cookie's value in one or more `Cookie` header values.
    fn find_cookie<'a>(&self, headers: impl Iterator<Item = &'a str>) -> Option<String> {
        headers
            .flat_map(|h| h.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| name.trim() == self.cookie_name)
            .map(|(_, value)| value.trim().trim_matches('"').to_lowercase())
            .filter(|value| !value.is_empty())
    }
}

impl Default for CookieNegotiator {
    fn default() -> Self {
        Self::new(LANGUAGE_COOKIE)
    }
}

impl LanguageNegotiator for CookieNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        let values = request
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok());
        self.find_cookie(values)
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Negotiates language from the Accept-Language HTTP header.
///
/// Parses quality values and returns the highest-quality language that
/// matches a known language.
pub struct AcceptLanguageNegotiator {
    known_languages: HashSet<String>,
}

impl AcceptLanguageNegotiator {
    pub fn new(known_languages: Vec<String>) -> Self {
        Self {
            known_languages: known_languages.into_iter().collect(),
        }
    }

    /// Parse Accept-Language header value into (language, quality) pairs,
    /// sorted by quality descending (stable sort preserves original order for ties).
    fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
        let mut langs: Vec<(String, f32)> = header
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return None;
                }

                let mut segments = part.split(';');
                let lang = segments.next()?.trim().to_lowercase();

                let quality = segments
                    .find_map(|s| {
                        let s = s.trim();
                        s.strip_prefix("q=")
                            .and_then(|q| q.trim().parse::<f32>().ok())
                    })
                    .unwrap_or(1.0)
                    .clamp(0.0, 1.0);

                Some((lang, quality))
            })
            .collect();

        langs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        langs
    }
}

impl LanguageNegotiator for AcceptLanguageNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        let header = request
            .headers()
            .get(header::ACCEPT_LANGUAGE)?
            .to_str()
            .ok()?;

        for (lang, quality) in Self::parse_accept_language(header) {
            if quality <= 0.0 {
                continue;
            }
            if self.known_languages.contains(&lang) {
                return Some(lang);
            }
            // Primary subtag: "pt-BR" → "pt"
            if let Some(primary) = lang.split('-').next()
                && self.known_languages.contains(primary)
            {
                return Some(primary.to_string());
            }
        }

        None
    }

    fn priority(&self) -> i32 {
        50
    }
}

/// Build the default negotiator chain, sorted by priority.
pub fn default_negotiators(known_languages: &[String]) -> Vec<Arc<dyn LanguageNegotiator>> {
    let mut negotiators: Vec<Arc<dyn LanguageNegotiator>> = vec![
        Arc::new(CookieNegotiator::default()),
        Arc::new(AcceptLanguageNegotiator::new(known_languages.to_vec())),
    ];
    negotiators.sort_by_key(|n| std::cmp::Reverse(n.priority()));
    negotiators
}

/// Middleware to negotiate the active language for each request.
pub async fn negotiate_language(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let language = if request.uri().path() == "/health" {
        state.default_language().to_string()
    } else {
        select_language(
            state.known_languages(),
            state.language_negotiators(),
            &request,
            state.default_language(),
        )
    };

    request.extensions_mut().insert(ResolvedLanguage(language));

    next.run(request).await
}

/// Select the active language (sync, testable).
///
/// Negotiator results are validated against the known languages; the
/// default is used when none match.
pub fn select_language(
    known_languages: &[String],
    negotiators: &[Arc<dyn LanguageNegotiator>],
    request: &Request<Body>,
    default_language: &str,
) -> String {
    for negotiator in negotiators {
        if let Some(lang) = negotiator.negotiate(request) {
            if known_languages.iter().any(|k| k == &lang) {
                return lang;
            }
            tracing::debug!(
                negotiator_language = %lang,
                "negotiator returned unknown language, ignoring"
            );
        }
    }

    default_language.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        vec!["pt".to_string(), "en".to_string()]
    }

    fn request_with(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    // --- CookieNegotiator tests ---

    #[test]
    fn cookie_negotiator_reads_language_cookie() {
        let negotiator = CookieNegotiator::default();
        let req = request_with(&[("cookie", "session=abc; language=pt; theme=dark")]);
        assert_eq!(negotiator.negotiate(&req), Some("pt".to_string()));
    }

    #[test]
    fn cookie_negotiator_ignores_similar_names() {
        let negotiator = CookieNegotiator::default();
        let req = request_with(&[("cookie", "preferred_language=pt; languages=en")]);
        assert_eq!(negotiator.negotiate(&req), None);
    }

    #[test]
    fn cookie_negotiator_handles_multiple_headers_and_quotes() {
        let negotiator = CookieNegotiator::default();
        let req = request_with(&[("cookie", "a=1"), ("cookie", "language=\"EN\"")]);
        assert_eq!(negotiator.negotiate(&req), Some("en".to_string()));
    }

    #[test]
    fn cookie_negotiator_empty_value() {
        let negotiator = CookieNegotiator::default();
        let req = request_with(&[("cookie", "language=")]);
        assert_eq!(negotiator.negotiate(&req), None);
    }

    // --- AcceptLanguageNegotiator tests ---

    #[test]
    fn accept_language_parses_quality_values() {
        let parsed =
            AcceptLanguageNegotiator::parse_accept_language("fr;q=0.9, en;q=1.0, de;q=0.5");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0, "en");
        assert_eq!(parsed[1].0, "fr");
        assert_eq!(parsed[2].0, "de");
    }

    #[test]
    fn accept_language_preserves_order_for_equal_quality() {
        let parsed = AcceptLanguageNegotiator::parse_accept_language("pt, en");
        assert_eq!(parsed[0].0, "pt");
        assert_eq!(parsed[1].0, "en");
    }

    #[test]
    fn accept_language_matches_primary_subtag() {
        let negotiator = AcceptLanguageNegotiator::new(known());
        let req = request_with(&[("accept-language", "de, pt-BR;q=0.9, en;q=0.8")]);
        assert_eq!(negotiator.negotiate(&req), Some("pt".to_string()));
    }

    #[test]
    fn accept_language_skips_zero_quality() {
        let negotiator = AcceptLanguageNegotiator::new(known());
        let req = request_with(&[("accept-language", "pt;q=0, en;q=0.1")]);
        assert_eq!(negotiator.negotiate(&req), Some("en".to_string()));
    }

    #[test]
    fn accept_language_no_match_returns_none() {
        let negotiator = AcceptLanguageNegotiator::new(known());
        let req = request_with(&[("accept-language", "ja, zh;q=0.9")]);
        assert_eq!(negotiator.negotiate(&req), None);
    }

    // --- select_language tests ---

    #[test]
    fn cookie_beats_accept_language() {
        let req = request_with(&[("cookie", "language=pt"), ("accept-language", "en")]);
        let result = select_language(&known(), &default_negotiators(&known()), &req, "en");
        assert_eq!(result, "pt");
    }

    #[test]
    fn unknown_cookie_falls_through_to_accept_language() {
        let req = request_with(&[("cookie", "language=xx"), ("accept-language", "pt")]);
        let result = select_language(&known(), &default_negotiators(&known()), &req, "en");
        assert_eq!(result, "pt");
    }

    #[test]
    fn default_fallback() {
        let req = request_with(&[]);
        let result = select_language(&known(), &default_negotiators(&known()), &req, "en");
        assert_eq!(result, "en");
    }

    #[test]
    fn default_negotiators_sorted_by_priority() {
        let priorities: Vec<i32> = default_negotiators(&known())
            .iter()
            .map(|n| n.priority())
            .collect();
        assert_eq!(priorities, [100, 50]);
    }
}
