//! HTTP page fetcher.
//!
//! Issues a single GET with the configured browser `User-Agent` and a fixed
//! timeout and classifies the result. Every failure is logged here with the
//! URL and cause, then handed back as a [`FetchOutcome`]; nothing is raised.
//!
//! | Response | Outcome | Log level |
//! |----------|---------|-----------|
//! | 2xx | [`FetchOutcome::Success`] | debug |
//! | 404 | [`FetchOutcome::NotFound`] | warn |
//! | other 4xx/5xx | [`FetchOutcome::TransportError`] | error |
//! | timeout, DNS, refused | [`FetchOutcome::TransportError`] | error |

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::models::RawPage;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

#[derive(Debug)]
pub enum FetchOutcome {
    Success(RawPage),
    NotFound,
    TransportError(ScrapeError),
}

/// Short-lived page fetcher, built fresh for each scraping call.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher from the configured identification header and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Client`] if the TLS backend cannot be initialized.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }

    /// Fetch `url` and classify the outcome.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the page to download
    ///
    /// # Returns
    ///
    /// [`FetchOutcome::Success`] with the body for any 2xx response,
    /// [`FetchOutcome::NotFound`] for a 404, and
    /// [`FetchOutcome::TransportError`] for every other status, timeout or
    /// connection failure. The failure is already logged when this returns.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.try_fetch(url).await {
            Ok(page) => {
                debug!(
                    %url,
                    bytes = page.body.len(),
                    preview = %truncate_for_log(page.body.trim(), 120),
                    "Fetched page"
                );
                FetchOutcome::Success(page)
            }
            Err(ScrapeError::NotFound { .. }) => {
                warn!(%url, "Page not found (404)");
                FetchOutcome::NotFound
            }
            Err(e) => {
                let timed_out = matches!(&e, ScrapeError::Transport { source, .. } if source.is_timeout());
                error!(%url, error = %e, timed_out, "Page fetch failed");
                FetchOutcome::TransportError(e)
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<RawPage, ScrapeError> {
        let transport = |source: reqwest::Error| ScrapeError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ScrapeError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        Ok(RawPage {
            url: url.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(&ScrapeConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn success_returns_body_and_sends_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_regex("user-agent", r"^Mozilla/5\.0 .*Chrome/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        match fetcher().fetch(&url).await {
            FetchOutcome::Success(page) => {
                assert_eq!(page.body, "<html>ok</html>");
                assert_eq!(page.url, url);
            }
            other => panic!("expected success, got {other:?}"),
        }

        // The header value contains commas, so compare the raw request too.
        let requests = server.received_requests().await.unwrap();
        let sent = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
        assert_eq!(sent, crate::config::DEFAULT_USER_AGENT);
    }

    #[tokio::test]
    async fn status_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = fetcher().fetch(&format!("{}/missing", server.uri())).await;
        assert!(matches!(outcome, FetchOutcome::NotFound));
    }

    #[tokio::test]
    async fn server_error_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = fetcher().fetch(&format!("{}/down", server.uri())).await;
        assert!(matches!(
            outcome,
            FetchOutcome::TransportError(ScrapeError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = ScrapeConfig {
            timeout_secs: 1,
            ..ScrapeConfig::default()
        };
        let outcome = Fetcher::new(&config)
            .unwrap()
            .fetch(&format!("{}/slow", server.uri()))
            .await;
        assert!(matches!(
            outcome,
            FetchOutcome::TransportError(ScrapeError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let outcome = fetcher().fetch("http://127.0.0.1:1/nothing").await;
        assert!(matches!(outcome, FetchOutcome::TransportError(_)));
    }
}
