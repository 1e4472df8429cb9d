// ConsoleWatch - app/transport.rs
//
// Fetching console chunks from the device.
//
// `ConsoleTransport` is the seam between the poll loop and the network: the
// poller only needs "give me the chunk starting at this cursor". Tests swap
// in scripted transports; production uses `HttpTransport` over reqwest.
//
// Wire contract:
//   GET <url>?start=<cursor>
//   200 + {"start": n, "len": n, "text": "..."}   -> Some(chunk)
//   200 + empty body or `null`                    -> None (no new data)
//   anything else                                 -> TransportError

use crate::core::model::FetchResponse;
use crate::util::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Source of console chunks.
#[async_trait]
pub trait ConsoleTransport: Send + Sync {
    /// Request the chunk starting at `start`.
    async fn fetch(&self, start: u64) -> Result<Option<FetchResponse>, TransportError>;

    /// Human-readable endpoint description for logs and the status bar.
    fn endpoint(&self) -> &str;
}

/// HTTP console endpoint client.
pub struct HttpTransport {
    url: String,
    client: Client,
}

impl HttpTransport {
    /// Build a client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("consolewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::ClientBuild { source: e })?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl ConsoleTransport for HttpTransport {
    async fn fetch(&self, start: u64) -> Result<Option<FetchResponse>, TransportError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("start", start)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !resp.status().is_success() {
            return Err(TransportError::Status {
                url: self.url.clone(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.request_error(e))?;
        decode_chunk(&body).map_err(|e| TransportError::Decode {
            url: self.url.clone(),
            source: e,
        })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

impl HttpTransport {
    fn request_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                url: self.url.clone(),
            }
        } else {
            TransportError::Request {
                url: self.url.clone(),
                source: e,
            }
        }
    }
}

/// Decode a response body. Blank bodies and JSON `null` mean "nothing new".
pub fn decode_chunk(body: &str) -> Result<Option<FetchResponse>, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<FetchResponse>>(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_blank_body_is_no_data() {
        assert_eq!(decode_chunk("").unwrap(), None);
        assert_eq!(decode_chunk("  \r\n").unwrap(), None);
    }

    #[test]
    fn test_decode_null_is_no_data() {
        assert_eq!(decode_chunk("null").unwrap(), None);
    }

    #[test]
    fn test_decode_device_chunk() {
        let chunk = decode_chunk(r#"{"len":3, "start":17, "text": "a\"b"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk, FetchResponse::new(17, 3, "a\"b"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_chunk("<html>busy</html>").is_err());
    }

    #[test]
    fn test_http_transport_reports_endpoint() {
        let t = HttpTransport::new("http://192.168.4.1/console/text", Duration::from_secs(1))
            .unwrap();
        assert_eq!(t.endpoint(), "http://192.168.4.1/console/text");
    }
}
