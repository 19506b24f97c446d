use super::Probe;
use crate::client::{HttpClient, RequestDescriptor, print_request, print_response};
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::onem2m::{self, ContentInstance, TY_CONTENT_INSTANCE};
use async_trait::async_trait;
use hyper::Method;

/// Create one CIN at an unstructured resource path (`/~/{cse-id}/{ri}`)
/// so that any subscription on that container fires. The callback itself
/// is somebody else's to observe; this probe only prints the exchange.
pub struct TriggerProbe {
    config: ProbeConfig,
    target: String,
    origin: String,
}

impl TriggerProbe {
    pub fn new(config: ProbeConfig, target: String, origin: String) -> Self {
        Self {
            config,
            target,
            origin,
        }
    }
}

#[async_trait]
impl Probe for TriggerProbe {
    fn name(&self) -> &str {
        "trigger"
    }

    async fn run(&self) -> Result<(), ProbeError> {
        let ts = onem2m::timestamp_suffix();
        let body = ContentInstance {
            rn: Some(format!("cin-test-noti-{}", ts)),
            con: format!("test notification content - {}", ts),
            lbl: None,
        }
        .into_body();

        let desc = RequestDescriptor::new(Method::POST, self.config.unstructured_url(&self.target))
            .headers(onem2m::base_headers(
                &self.origin,
                &format!("cin-test-{}", ts),
            ))
            .header(
                "Content-Type",
                onem2m::content_type(Some(TY_CONTENT_INSTANCE)),
            )
            .json(body);

        println!("Creating CIN to trigger notification...");
        print_request(&desc);

        let client = HttpClient::new(self.config.timeout);
        match client.send(&desc).await {
            Ok(response) => {
                print_response(&response);
                if response.is_success() {
                    match response.json().map(|body| body.get("m2m:cin").is_some()) {
                        Some(true) => println!("✅ Created CIN echoed under m2m:cin"),
                        _ => println!("❌ 2xx response without an m2m:cin echo"),
                    }
                }
            }
            Err(e) => println!("Error: {}", e),
        }
        Ok(())
    }
}
