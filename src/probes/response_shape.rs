use super::Probe;
use crate::client::{HttpClient, RequestDescriptor, ResponseRecord};
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::onem2m::{self, ContainerContent};
use async_trait::async_trait;
use hyper::Method;
use serde_json::Value;

/// Probe the retrieval shapes a Mobius CSE answers with: the AE itself,
/// the container bare and with `?rcn=4`, the `/la` latest child, and the
/// wrong-but-instructive `/latest` spelling. Each section prints the URL,
/// the status, and the JSON body; the `rcn=4` section additionally runs
/// the discriminated CIN parse and reports which path matched.
pub struct ResponseShapeProbe {
    config: ProbeConfig,
    vertical: String,
    node: String,
    container: String,
}

impl ResponseShapeProbe {
    pub fn new(config: ProbeConfig, vertical: String, node: String, container: String) -> Self {
        Self {
            config,
            vertical,
            node,
            container,
        }
    }

    fn banner(title: &str) {
        println!();
        println!("{}", "=".repeat(80));
        println!("{}", title);
        println!("{}", "=".repeat(80));
    }

    async fn get(&self, client: &HttpClient, url: &str) -> Option<ResponseRecord> {
        println!("URL: {}", url);
        let desc = RequestDescriptor::new(Method::GET, url).headers(onem2m::base_headers(
            &self.config.origin,
            &onem2m::request_id("probe"),
        ));
        match client.send(&desc).await {
            Ok(response) => {
                println!("Status Code: {}", response.status);
                match response.json() {
                    Some(body) if response.is_success() => {
                        println!("Response JSON:");
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&body)
                                .unwrap_or_else(|_| body.to_string())
                        );
                    }
                    _ => println!("Error: {}", response.body),
                }
                Some(response)
            }
            Err(e) => {
                println!("Error: {}", e);
                None
            }
        }
    }

    fn report_cin_parse(body: &Value) {
        println!();
        println!("{}", "-".repeat(80));
        println!("PARSING CINs:");
        println!("{}", "-".repeat(80));

        match onem2m::parse_container_read(body) {
            ContainerContent::ContentInstances(cins) => {
                let path = if body.get("m2m:cnt").is_some() {
                    "m2m:cnt -> m2m:cin"
                } else {
                    "m2m:rsp -> m2m:cin"
                };
                println!("✓ Found CINs via path: {}", path);
                println!("  Number of CINs: {}", cins.len());
                if let Some(first) = cins.first() {
                    println!("  First CIN sample:");
                    println!(
                        "{}",
                        serde_json::to_string_pretty(first)
                            .unwrap_or_else(|_| first.to_string())
                    );
                }
            }
            ContainerContent::Empty => {
                println!("✓ Container recognized but holds no CINs");
            }
            ContainerContent::Unrecognized(keys) => {
                println!("✗ No CINs found. Available keys:");
                println!("  Top level: {:?}", keys);
                if let Some(cnt) = body.get("m2m:cnt").and_then(Value::as_object) {
                    println!("  Inside m2m:cnt: {:?}", cnt.keys().collect::<Vec<_>>());
                }
            }
        }
    }
}

#[async_trait]
impl Probe for ResponseShapeProbe {
    fn name(&self) -> &str {
        "response"
    }

    async fn run(&self) -> Result<(), ProbeError> {
        let client = HttpClient::new(self.config.timeout);
        let vertical = self.vertical.as_str();
        let node = self.node.as_str();
        let container = self.container.as_str();

        println!("{}", "=".repeat(80));
        println!("TESTING MOBIUS RESPONSE STRUCTURES");
        println!("{}", "=".repeat(80));

        Self::banner(&format!("TEST 1: GET AE (Node) - /{}/{}", vertical, node));
        let url = self.config.resource_url(&[vertical, node]);
        self.get(&client, &url).await;

        Self::banner(&format!(
            "TEST 2: GET Data Container - /{}/{}/{}",
            vertical, node, container
        ));
        let url = self.config.resource_url(&[vertical, node, container]);
        self.get(&client, &url).await;

        Self::banner(&format!(
            "TEST 3: GET Data Container with rcn=4 - /{}/{}/{}?rcn=4",
            vertical, node, container
        ));
        let url = format!(
            "{}?rcn=4",
            self.config.resource_url(&[vertical, node, container])
        );
        if let Some(response) = self.get(&client, &url).await {
            if response.is_success() {
                if let Some(body) = response.json() {
                    Self::report_cin_parse(&body);
                }
            }
        }

        Self::banner(&format!(
            "TEST 4: GET Latest CIN - /{}/{}/{}/la",
            vertical, node, container
        ));
        let url = self.config.resource_url(&[vertical, node, container, "la"]);
        if let Some(response) = self.get(&client, &url).await {
            if response.is_success() {
                if let Some(body) = response.json() {
                    match onem2m::parse_latest(&body) {
                        Some(_) => println!("✓ /la returned a single CIN object"),
                        None => println!("✗ /la body did not carry a single m2m:cin object"),
                    }
                }
            }
        }

        Self::banner(&format!(
            "TEST 5: GET Latest CIN - /{}/{}/{}/latest (WRONG)",
            vertical, node, container
        ));
        let url = self
            .config
            .resource_url(&[vertical, node, container, "latest"]);
        self.get(&client, &url).await;

        println!();
        println!("{}", "=".repeat(80));
        println!("TESTS COMPLETE");
        println!("{}", "=".repeat(80));
        Ok(())
    }
}
