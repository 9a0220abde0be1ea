use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::OiSource;
use crate::shared::errors::FetchError;
use crate::shared::types::OiSnapshot;

/// Where and how to fetch OI figures
#[derive(Clone)]
pub struct OiEndpoint {
    pub url: String,
    pub api_key: String,
    /// Dotted path to the put OI value, e.g. `putOI` or `data.putOI`
    pub put_field: String,
    pub call_field: String,
    pub timeout: Duration,
}

impl fmt::Debug for OiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OiEndpoint")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("put_field", &self.put_field)
            .field("call_field", &self.call_field)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// REST client for the OI endpoint
pub struct HttpOiClient {
    http_client: Client,
    endpoint: OiEndpoint,
}

impl HttpOiClient {
    pub fn new(endpoint: OiEndpoint) -> Result<Self, FetchError> {
        let http_client = Client::builder().timeout(endpoint.timeout).build()?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &OiEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl OiSource for HttpOiClient {
    async fn fetch(&self) -> Result<OiSnapshot, FetchError> {
        debug!("Fetching OI data from {}", self.endpoint.url);

        let response = self
            .http_client
            .get(&self.endpoint.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.endpoint.api_key))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;

        Ok(OiSnapshot {
            put_value: extract_number(&body, &self.endpoint.put_field)?,
            call_value: extract_number(&body, &self.endpoint.call_field)?,
        })
    }
}

/// Walk a dotted path and read a number (or numeric string) at the end.
pub(crate) fn extract_number(body: &Value, path: &str) -> Result<f64, FetchError> {
    let value = path
        .split('.')
        .try_fold(body, |node, key| node.get(key))
        .ok_or_else(|| FetchError::MissingField(path.to_string()))?;

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| FetchError::NotNumeric {
            field: path.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        (format!("http://{}/oi", addr), handle)
    }

    fn endpoint(url: String) -> OiEndpoint {
        OiEndpoint {
            url,
            api_key: "test-key".to_string(),
            put_field: "putOI".to_string(),
            call_field: "callOI".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_fields_and_sends_auth_headers() {
        let (url, server) = serve_once("200 OK", r#"{"putOI": 1100, "callOI": 850.5}"#).await;
        let client = HttpOiClient::new(endpoint(url)).unwrap();

        let snapshot = client.fetch().await.unwrap();
        assert_eq!(snapshot, OiSnapshot::new(1100.0, 850.5));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /oi"));
        assert!(request.contains("authorization: bearer test-key"));
        assert!(request.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let mut endpoint = endpoint(format!("http://{}/oi", addr));
        endpoint.timeout = Duration::from_millis(50);
        let client = HttpOiClient::new(endpoint).unwrap();

        let started = std::time::Instant::now();
        let result = client.fetch().await;
        assert!(matches!(result, Err(FetchError::Http(ref e)) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (url, _server) = serve_once("503 Service Unavailable", r#"{"error":"down"}"#).await;
        let client = HttpOiClient::new(endpoint(url)).unwrap();

        match client.fetch().await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let (url, _server) = serve_once("200 OK", "<html>oops</html>").await;
        let client = HttpOiClient::new(endpoint(url)).unwrap();

        assert!(matches!(client.fetch().await, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpOiClient::new(endpoint(format!("http://{}/oi", addr))).unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::Http(_))));
    }

    #[test]
    fn test_extract_number_paths() {
        let body = json!({
            "putOI": "1200",
            "data": { "callOI": 900 },
            "label": "n/a",
        });

        assert_eq!(extract_number(&body, "putOI").unwrap(), 1200.0);
        assert_eq!(extract_number(&body, "data.callOI").unwrap(), 900.0);
        assert!(matches!(
            extract_number(&body, "data.missing"),
            Err(FetchError::MissingField(_))
        ));
        assert!(matches!(
            extract_number(&body, "label"),
            Err(FetchError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_endpoint_debug_hides_key() {
        let rendered = format!("{:?}", endpoint("http://localhost".to_string()));
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
