use super::Probe;
use crate::client::{HttpClient, RequestDescriptor, print_request, print_response};
use crate::error::ProbeError;
use async_trait::async_trait;
use hyper::Method;
use serde_json::json;
use std::time::Duration;

/// Exercise CIN creation through the project backend rather than the CSE
/// directly: one authorized POST to `/nodes/create-cin/{node}`, full
/// exchange printed.
pub struct BackendCinProbe {
    backend_url: String,
    node_id: String,
    token: String,
    content: String,
    timeout: Duration,
}

impl BackendCinProbe {
    pub fn new(backend_url: String, node_id: String, token: String, timeout: Duration) -> Self {
        Self {
            backend_url,
            node_id,
            token,
            content: "example".to_string(),
            timeout,
        }
    }

    /// Override the `tds` payload sent to the backend.
    pub fn content(mut self, content: String) -> Self {
        self.content = content;
        self
    }
}

#[async_trait]
impl Probe for BackendCinProbe {
    fn name(&self) -> &str {
        "backend-cin"
    }

    async fn run(&self) -> Result<(), ProbeError> {
        let url = format!(
            "{}/nodes/create-cin/{}",
            self.backend_url.trim_end_matches('/'),
            self.node_id
        );
        let desc = RequestDescriptor::new(Method::POST, url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(json!({ "tds": self.content }));

        println!("Testing CIN creation through the backend...");
        print_request(&desc);

        let client = HttpClient::new(self.timeout);
        match client.send(&desc).await {
            Ok(response) => {
                print_response(&response);
                if response.status == 200 {
                    println!("Success: {}", response.body);
                } else {
                    println!("Error: {} {}", response.status, response.body);
                }
            }
            Err(e) => println!("Error: {}", e),
        }
        Ok(())
    }
}
