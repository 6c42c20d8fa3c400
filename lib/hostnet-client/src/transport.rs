//! Call-and-decode transport seam between the managers and the service

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP-like verbs understood by the control service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("service returned status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Status code of a service-side rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single round-trip against the control service: send a method, resource
/// path, and optional JSON body; receive the raw response body.
///
/// Failures are never retried at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> std::result::Result<String, TransportError>;
}

/// Issues a call and decodes the response body into `R`.
pub(crate) async fn call_into<T, R>(
    transport: &T,
    method: Method,
    path: &str,
    body: Option<&str>,
) -> std::result::Result<R, TransportError>
where
    T: Transport + ?Sized,
    R: DeserializeOwned,
{
    let raw = transport.call(method, path, body).await?;
    let decoded = serde_json::from_str(&raw)?;
    Ok(decoded)
}

/// HTTP transport talking to the control service's REST endpoint.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the given base URL with a 30 second request
    /// timeout.
    pub fn new(base_url: impl Into<String>) -> std::result::Result<Self, TransportError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Connection(err.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { base_url, client })
    }

    /// Reads the service address from `HOSTNET_API_URL`.
    pub fn from_env() -> std::result::Result<Self, TransportError> {
        let url = std::env::var("HOSTNET_API_URL")
            .map_err(|_| TransportError::Connection("HOSTNET_API_URL is not set".to_string()))?;
        Self::new(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> std::result::Result<String, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|err| TransportError::Connection(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| TransportError::Connection(err.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(TransportError::Service {
                status,
                message: text,
            });
        }

        Ok(text)
    }
}
