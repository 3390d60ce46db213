//! Profile page fetcher - reqwest for HTTP, scraper for HTML parsing
//!
//! One GET per URL, sent with a desktop browser User-Agent. Pages the site
//! refuses to show us (HTTP 403 or an inline "not authorized" notice) come
//! back as `Ok(None)` so callers can tell "blocked" apart from "broken".
//! Everything else that is not a success is an error.
//!
//! No retries and no backoff: a failed URL is reported once and skipped.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use scraper::{Html, Node, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};

/// Desktop Chrome User-Agent; many firm sites reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Body text some sites serve with a 200 instead of a proper 403.
pub const NOT_AUTHORIZED_MARKER: &str = "You are not authorized";

/// Elements whose contents are never visible text.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Source of profile text.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetch one page and return its visible text.
    ///
    /// `Ok(None)` means the page is blocked for us and should be skipped.
    async fn fetch(&self, url: &str) -> FetchResult<Option<String>>;
}

/// HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher with the default User-Agent and a 30 second timeout.
    pub fn new() -> FetchResult<Self> {
        Self::with_options(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    pub fn with_options(user_agent: &str, timeout: Duration) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ProfileFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Option<String>> {
        let url = url.trim();
        debug!(url = %url, "Fetching profile page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!(url = %url, "Skipping page: HTTP 403");
            return Ok(None);
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        if html.contains(NOT_AUTHORIZED_MARKER) {
            warn!(url = %url, status = %status, "Skipping page: not authorized notice");
            return Ok(None);
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = visible_text(&html);
        debug!(url = %url, text_len = text.len(), "Profile page fetched");
        Ok(Some(text))
    }
}

/// Extract the visible text of a page's `<body>`.
///
/// Script, style and noscript subtrees are dropped. Each line is trimmed
/// with inner whitespace runs collapsed, and blank lines are removed, so the
/// same HTML always yields the same text.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            raw.push_str(text);
        }
    }

    normalize_whitespace(&raw)
}

fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PROFILE_HTML: &str = r#"<html>
        <head><title>Leslie Altus</title><style>.bio { color: red; }</style></head>
        <body>
            <script>window.tracker = "leslie-tracking-id";</script>
            <h1>Leslie   Altus</h1>
            <p>Leslie Altus is a partner in the Tax Department.</p>
            <noscript>Enable JavaScript</noscript>
        </body>
    </html>"#;

    #[test]
    fn test_visible_text_strips_scripts_and_styles() {
        let text = visible_text(PROFILE_HTML);

        assert_eq!(
            text,
            "Leslie Altus\nLeslie Altus is a partner in the Tax Department."
        );
        assert!(!text.contains("tracker"));
        assert!(!text.contains("color"));
        assert!(!text.contains("JavaScript"));
    }

    #[test]
    fn test_visible_text_decodes_entities() {
        let text = visible_text("<body><p>Mergers &amp; Acquisitions</p></body>");
        assert_eq!(text, "Mergers & Acquisitions");
    }

    #[test]
    fn test_visible_text_without_body_markup() {
        assert_eq!(visible_text("just text"), "just text");
        assert_eq!(visible_text(""), "");
    }

    #[tokio::test]
    async fn test_fetch_sends_configured_user_agent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lawyers/leslie-altus"))
            .and(header("user-agent", "LawyerSearchTest/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher =
            HttpFetcher::with_options("LawyerSearchTest/1.0", DEFAULT_TIMEOUT).unwrap();
        let text = fetcher
            .fetch(&format!("{}/lawyers/leslie-altus", server.uri()))
            .await
            .expect("fetch failed");

        assert!(text.unwrap().contains("partner in the Tax Department"));
    }

    #[tokio::test]
    async fn test_fetch_403_is_blocked_not_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/blocked"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch(&format!("{}/blocked", server.uri())).await;

        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_fetch_soft_403_body_is_blocked() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/soft"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><h2>You are not authorized to view this page.</h2></body></html>",
            ))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch(&format!("{}/soft", server.uri())).await;

        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_fetch_other_status_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PROFILE_HTML)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let fetcher =
            HttpFetcher::with_options(DEFAULT_USER_AGENT, Duration::from_millis(200)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_is_repeatable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stable"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
            .expect(2)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = format!("{}/stable", server.uri());
        let first = fetcher.fetch(&url).await.unwrap();
        let second = fetcher.fetch(&url).await.unwrap();

        assert_eq!(first, second);
    }
}
