// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest-backed [`Fetcher`] with size-window and timeout enforcement.

use std::time::Duration;

use async_trait::async_trait;
use reelgrab_config::model::{FetchConfig, SecurityConfig};
use reelgrab_core::{Fetcher, HttpMethod, HttpRequest, ReelgrabError, RequestBody};
use reelgrab_security::{PrivateAllowlist, build_client, validate_url_host};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// Accepted payload size window, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    pub min_bytes: usize,
    pub max_bytes: u64,
}

impl SizeLimits {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            min_bytes: config.min_bytes,
            max_bytes: config.max_bytes,
        }
    }
}

/// Fetches over a single `reqwest::Client`.
///
/// The client carries the browser user agent, so a request only sends its
/// own `User-Agent` header when it needs a different one.
pub struct HttpFetcher {
    client: reqwest::Client,
    limits: SizeLimits,
    default_timeout: Duration,
    /// `None` when private-network blocking is disabled.
    allowlist: Option<PrivateAllowlist>,
}

impl HttpFetcher {
    /// Builds a fetcher with a fresh hardened client.
    pub fn new(fetch: &FetchConfig, security: &SecurityConfig) -> Result<Self, ReelgrabError> {
        let client = build_client(fetch, security)?;
        let allowlist = security
            .block_private_networks
            .then(|| PrivateAllowlist::new(&security.allowed_private_ips));
        Ok(Self {
            client,
            limits: SizeLimits::from_config(fetch),
            default_timeout: Duration::from_secs(fetch.timeout_secs),
            allowlist,
        })
    }

    pub fn limits(&self) -> SizeLimits {
        self.limits
    }

    async fn send(&self, request: &HttpRequest) -> Result<reqwest::Response, ReelgrabError> {
        if let Some(allowlist) = &self.allowlist {
            validate_url_host(&request.url, allowlist)?;
        }
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| ReelgrabError::InvalidUrl(format!("{}: {e}", request.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ReelgrabError::InvalidUrl(format!(
                "unsupported scheme `{}` in {}",
                url.scheme(),
                request.url
            )));
        }

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                    .finish();
                builder
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(encoded)
            }
        };
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        builder = builder.timeout(timeout);

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, &request.url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %request.url, status = status.as_u16(), "non-success status");
            return Err(ReelgrabError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Reads the body, failing as soon as it grows past `max_bytes`.
    async fn read_capped(
        &self,
        mut response: reqwest::Response,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, ReelgrabError> {
        let max = self.limits.max_bytes;
        if let Some(declared) = response.content_length()
            && declared > max
        {
            debug!(url = %url, declared, max, "declared length above ceiling");
            return Err(ReelgrabError::PayloadTooLarge {
                size: declared,
                max,
            });
        }

        let mut body = Vec::with_capacity(
            response
                .content_length()
                .map(|n| n as usize)
                .unwrap_or_default(),
        );
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport_error(e, url, timeout))?
        {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > max {
                debug!(url = %url, max, "body grew past ceiling");
                return Err(ReelgrabError::PayloadTooLarge {
                    size: body.len() as u64,
                    max,
                });
            }
        }
        Ok(body)
    }
}

fn transport_error(e: reqwest::Error, url: &str, timeout: Duration) -> ReelgrabError {
    if e.is_timeout() {
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "request timed out");
        ReelgrabError::Timeout { duration: timeout }
    } else {
        debug!(url = %url, error = %e, "request failed");
        ReelgrabError::Http {
            message: format!("request to {url} failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_media(&self, request: &HttpRequest) -> Result<Vec<u8>, ReelgrabError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let response = self.send(request).await?;
        let body = self.read_capped(response, &request.url, timeout).await?;

        if body.len() < self.limits.min_bytes {
            debug!(
                url = %request.url,
                size = body.len(),
                min = self.limits.min_bytes,
                "payload below size floor"
            );
            return Err(ReelgrabError::PayloadTooSmall {
                size: body.len(),
                min: self.limits.min_bytes,
            });
        }

        debug!(url = %request.url, size = body.len(), "media fetched");
        Ok(body)
    }

    async fn fetch_text(&self, request: &HttpRequest) -> Result<String, ReelgrabError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let response = self.send(request).await?;
        let body = self.read_capped(response, &request.url, timeout).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn local_security() -> SecurityConfig {
        SecurityConfig {
            block_private_networks: true,
            allowed_private_ips: vec!["127.0.0.1".to_string()],
        }
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig::default(), &local_security()).unwrap()
    }

    fn jpeg(len: usize) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(len, 0x11);
        bytes
    }

    #[tokio::test]
    async fn accepts_payload_at_floor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/floor.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg(1024)))
            .mount(&server)
            .await;

        let bytes = fetcher()
            .fetch_media(&HttpRequest::get(format!("{}/floor.jpg", server.uri())))
            .await
            .unwrap();
        assert_eq!(bytes.len(), 1024);
    }

    #[tokio::test]
    async fn rejects_payload_below_floor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/small.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg(1023)))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch_media(&HttpRequest::get(format!("{}/small.jpg", server.uri())))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReelgrabError::PayloadTooSmall { size: 1023, min: 1024 }
        ));
    }

    #[tokio::test]
    async fn rejects_payload_above_ceiling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg(8192)))
            .mount(&server)
            .await;

        let fetch = FetchConfig {
            max_bytes: 4096,
            ..FetchConfig::default()
        };
        let fetcher = HttpFetcher::new(&fetch, &local_security()).unwrap();
        let err = fetcher
            .fetch_media(&HttpRequest::get(format!("{}/big.mp4", server.uri())))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelgrabError::PayloadTooLarge { max: 4096, .. }));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_bytes(jpeg(4096)))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch_media(&HttpRequest::get(format!("{}/gone.jpg", server.uri())))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelgrabError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(jpeg(2048))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let request = HttpRequest::get(format!("{}/slow.jpg", server.uri()))
            .timeout(Duration::from_millis(200));
        let err = fetcher().fetch_media(&request).await.unwrap_err();
        assert!(matches!(err, ReelgrabError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn sends_configured_user_agent_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "reelgrab-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetch = FetchConfig {
            user_agent: "reelgrab-test/1.0".to_string(),
            ..FetchConfig::default()
        };
        let text = HttpFetcher::new(&fetch, &local_security())
            .unwrap()
            .fetch_text(&HttpRequest::get(format!("{}/page", server.uri())))
            .await
            .unwrap();
        assert_eq!(text, "<html></html>");
    }

    #[tokio::test]
    async fn request_user_agent_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "com.zhiliaoapp.musically/2022600040"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::get(format!("{}/feed", server.uri()))
            .header("User-Agent", "com.zhiliaoapp.musically/2022600040");
        assert_eq!(fetcher().fetch_text(&request).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(serde_json::json!({"url": "https://pin.it/x"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::post_json(
            format!("{}/", server.uri()),
            serde_json::json!({"url": "https://pin.it/x"}),
        );
        assert_eq!(fetcher().fetch_text(&request).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn posts_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::post_form(
            format!("{}/api", server.uri()),
            vec![("q".to_string(), "https://tiktok.com/@a/video/1".to_string())],
        );
        assert_eq!(fetcher().fetch_text(&request).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn blocks_private_host_without_allowlist() {
        let fetcher = HttpFetcher::new(&FetchConfig::default(), &SecurityConfig::default()).unwrap();
        let err = fetcher
            .fetch_media(&HttpRequest::get("http://127.0.0.1:9/x.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelgrabError::Security(_)));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let err = fetcher()
            .fetch_text(&HttpRequest::get("file:///etc/passwd"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelgrabError::InvalidUrl(_)));
    }
}
