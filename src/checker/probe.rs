// src/checker/probe.rs
// =============================================================================
// A single reachability probe against one URL.
//
// Key functionality:
// - Sends an HTTP HEAD request (no body download), following redirects
// - Asks intermediaries not to serve a cached answer
// - Enforces a hard timeout; the in-flight request is dropped when it fires
// - Measures the time until response headers arrive
//
// The `Prober` trait is the seam the retry logic is written against, so the
// retry/backoff tests can run with scripted outcomes instead of a network.
// =============================================================================

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use thiserror::Error;
use url::Url;

// Upper bound on redirect hops, same as browsers' fetch().
const MAX_REDIRECTS: usize = 20;

/// What a completed probe observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// true for a 2xx final status (after redirects)
    pub ok: bool,
    pub status: u16,
    pub time_ms: u64,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The request completed but the final status was not a success.
    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Transport(#[source] reqwest::Error),
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout(_))
    }
}

#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ProbeResponse, ProbeError>;
}

// reqwest-backed prober used by the binary.
// The client is built once and shared by every probe (connection pooling).
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let parsed = Url::parse(url).map_err(|source| ProbeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let start = Instant::now();

        // Dropping the send() future on timeout aborts the request.
        let response = tokio::time::timeout(self.timeout, self.client.head(parsed).send())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(self.timeout)
                } else {
                    ProbeError::Transport(e)
                }
            })?;

        let time_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        Ok(ProbeResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Serves every connection with the given raw HTTP response, or never
    // answers at all when `response` is None. Returns the base URL.
    async fn serve(response: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    match response {
                        Some(raw) => {
                            let _ = socket.write_all(raw.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        None => tokio::time::sleep(Duration::from_secs(30)).await,
                    }
                });
            }
        });

        format!("http://{addr}/")
    }

    fn prober(timeout_ms: u64) -> HttpProber {
        HttpProber::new(Duration::from_millis(timeout_ms), "test-agent").unwrap()
    }

    #[tokio::test]
    async fn test_probe_success() {
        let url = serve(Some("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")).await;
        let res = prober(5_000).probe(&url).await.unwrap();
        assert!(res.ok);
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn test_probe_non_success_status_is_not_an_error() {
        let url = serve(Some("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")).await;
        let res = prober(5_000).probe(&url).await.unwrap();
        assert!(!res.ok);
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let url = serve(None).await;
        let err = prober(200).probe(&url).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "request timed out after 200ms");
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        // bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = prober(5_000).probe(&format!("http://{addr}/")).await.unwrap_err();
        assert!(!err.is_timeout());
        assert!(matches!(err, ProbeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_probe_invalid_url() {
        let err = prober(5_000).probe("not a url").await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl { .. }));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_http_status_message() {
        assert_eq!(ProbeError::HttpStatus(503).to_string(), "HTTP 503");
    }
}
