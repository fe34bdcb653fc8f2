use crate::domain::model::{RawResponse, RequestDescriptor};
use crate::domain::ports::Fetcher;
use crate::utils::error::{ForecastError, NetworkCause, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Single-attempt HTTP GET over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ForecastError::ConfigValidationError {
            field: "source.timeout_seconds".to_string(),
            message: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        tracing::debug!("GET {}", request.url().path());

        // The response owns the connection; every return below drops it.
        let response = self
            .client
            .get(request.url().clone())
            .send()
            .await
            .map_err(|e| ForecastError::network(NetworkCause::Connect, e.to_string()))?;

        let status = response.status();
        tracing::debug!("Forecast service responded with {}", status);
        if status != StatusCode::OK {
            return Err(ForecastError::network(
                NetworkCause::Status,
                format!("unexpected HTTP status {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ForecastError::network(NetworkCause::Read, e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::RequestTemplate;
    use crate::domain::ports::Units;
    use httpmock::prelude::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn request_for(base_url: String, location: &str) -> RequestDescriptor {
        RequestTemplate::new(base_url, "key", Units::Imperial, 16)
            .build(location)
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_ok() {
        let server = MockServer::start_async().await;
        let api_mock = server.mock_async(|when, then| {
            when.method(GET)
                .path("/forecast")
                .query_param("q", "Denver")
                .query_param("units", "imperial")
                .query_param("cnt", "16")
                .query_param("APPID", "key");
            then.status(200).body(r#"{"list":[]}"#);
        })
        .await;

        let fetcher = HttpFetcher::new(None).unwrap();
        let raw = fetcher
            .fetch(&request_for(server.url("/forecast"), "Denver"))
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, br#"{"list":[]}"#);
    }

    #[tokio::test]
    async fn test_fetch_non_ok_status_is_status_failure() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/forecast");
            then.status(401).body(r#"{"cod":401,"message":"Invalid API key"}"#);
        })
        .await;

        let fetcher = HttpFetcher::new(None).unwrap();
        let err = fetcher
            .fetch(&request_for(server.url("/forecast"), "Denver"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ForecastError::Network {
                cause: NetworkCause::Status,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_other_success_codes_are_rejected() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/forecast");
            then.status(204);
        })
        .await;

        let fetcher = HttpFetcher::new(None).unwrap();
        let err = fetcher
            .fetch(&request_for(server.url("/forecast"), "Denver"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ForecastError::Network {
                cause: NetworkCause::Status,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_connect_failure() {
        let fetcher = HttpFetcher::new(Some(Duration::from_secs(5))).unwrap();
        let err = fetcher
            .fetch(&request_for("http://127.0.0.1:1/forecast".to_string(), "Denver"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ForecastError::Network {
                cause: NetworkCause::Connect,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_timeout_before_headers_is_connect_failure() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .body(r#"{"list":[]}"#)
                .delay(Duration::from_millis(800));
        })
        .await;

        let fetcher = HttpFetcher::new(Some(Duration::from_millis(100))).unwrap();
        let err = fetcher
            .fetch(&request_for(server.url("/slow"), "Denver"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ForecastError::Network {
                cause: NetworkCause::Connect,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_truncated_body_is_read_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"list\":[",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let fetcher = HttpFetcher::new(None).unwrap();
        let err = fetcher
            .fetch(&request_for(format!("http://{}/forecast", addr), "Denver"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ForecastError::Network {
                cause: NetworkCause::Read,
                ..
            }
        ));
    }
}
