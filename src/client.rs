use crate::error::ProbeError;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request};
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::time::Duration;

/// One outgoing request: built, printed, sent, discarded.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// What came back: inspected immediately, never stored.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ResponseRecord {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as JSON, if it parses as such.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Thin client wrapper: every call opens and completes independently
/// under one deadline. No retry, no backoff, no pooling assumptions.
pub struct HttpClient {
    client: LegacyClient<HttpConnector, Full<Bytes>>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: LegacyClient::builder(TokioExecutor::new()).build_http::<Full<Bytes>>(),
            timeout,
        }
    }

    pub async fn send(&self, desc: &RequestDescriptor) -> Result<ResponseRecord, ProbeError> {
        let mut builder = Request::builder().method(desc.method.clone()).uri(desc.url.as_str());
        for (name, value) in &desc.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let payload = desc.body.as_ref().map(Value::to_string).unwrap_or_default();
        let request = builder
            .body(Full::new(Bytes::from(payload)))
            .map_err(|e| ProbeError::InvalidRequest(e.to_string()))?;

        log::debug!("📤 {} {}", desc.method, desc.url);

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| ProbeError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|e| ProbeError::Transport(e.to_string()))?
                .to_bytes();

            Ok(ResponseRecord {
                status,
                headers,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                ProbeError::Timeout(format!("{} after {:?}", desc.url, self.timeout))
            })?
    }
}

/// Print the outgoing request the way the diagnostic reports read:
/// URL, headers, then the pretty-printed JSON payload if any.
pub fn print_request(desc: &RequestDescriptor) {
    println!("URL: {}", desc.url);
    println!("Headers: {}", format_headers(&desc.headers));
    if let Some(body) = &desc.body {
        let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        println!("Data: {}", pretty);
    }
}

/// Print the raw response: status line, headers, body text.
pub fn print_response(record: &ResponseRecord) {
    println!("Response Status: {}", record.status);
    println!("Response Headers: {}", format_headers(&record.headers));
    println!("Response Body: {}", record.body);
}

fn format_headers(headers: &[(String, String)]) -> String {
    let map: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(map).to_string()
}
