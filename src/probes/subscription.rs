use super::Probe;
use crate::client::{HttpClient, RequestDescriptor};
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::listener::NotificationListener;
use crate::onem2m::{
    self, ContentInstance, EventNotificationCriteria, Subscription, TY_CONTENT_INSTANCE,
    TY_SUBSCRIPTION,
};
use async_trait::async_trait;
use hyper::Method;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;

/// Resource name used for the throwaway subscription; a stale one with
/// the same name is deleted best-effort before the create.
const SUBSCRIPTION_RN: &str = "test-sub-notification";

/// Pause between the subscription create and the triggering CIN, giving
/// the CSE time to register the subscription.
const SETTLE: Duration = Duration::from_secs(2);

/// Exercise the full asynchronous notification path: bind a local
/// callback listener, create a subscription pointing at it, create a CIN
/// in the subscribed container, and wait a bounded window for the CSE to
/// POST the notification back.
pub struct SubscriptionProbe {
    config: ProbeConfig,
    vertical: String,
    node: String,
    container: String,
    listen_port: u16,
    wait: Duration,
}

impl SubscriptionProbe {
    pub fn new(config: ProbeConfig, vertical: String, node: String, container: String) -> Self {
        Self {
            config,
            vertical,
            node,
            container,
            listen_port: 8888,
            wait: Duration::from_secs(3),
        }
    }

    /// Port the callback listener binds; 0 picks an ephemeral port.
    pub fn listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    /// How long to wait for the notification before declaring failure.
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Cleanup deletes are fire-and-forget: failures are logged, never
    /// propagated, and never end the sequence.
    async fn delete_subscription(&self, client: &HttpClient, url: &str, ri: &str) {
        let desc = RequestDescriptor::new(Method::DELETE, url)
            .headers(onem2m::base_headers(&self.config.origin, ri))
            .header("Content-Type", onem2m::content_type(None));
        match client.send(&desc).await {
            Ok(response) if response.is_success() => {
                log::info!("🧹 Deleted subscription {}", url)
            }
            Ok(response) => log::warn!(
                "Subscription delete answered {} (ignored): {}",
                response.status,
                response.body
            ),
            Err(e) => log::warn!("Subscription delete failed (ignored): {}", e),
        }
    }

    /// Run the round trip and return whatever notifications arrived
    /// within the wait window. `Err` only for local setup failures; every
    /// remote failure is printed and ends the sequence with an empty list.
    pub async fn execute(&self) -> Result<Vec<Value>, ProbeError> {
        let client = HttpClient::new(self.config.timeout);

        // Bind before subscribing so the nu URL carries the real port.
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.listen_port));
        let listener = NotificationListener::bind(addr, sender)
            .await
            .map_err(|e| ProbeError::Transport(format!("listener bind on {}: {}", addr, e)))?;
        let notify_url = listener.notify_url();
        let listener_task = tokio::spawn(listener.serve());

        println!();
        println!("{}", "=".repeat(80));
        println!("TESTING SUBSCRIPTION NOTIFICATION ROUND TRIP");
        println!("{}", "=".repeat(80));

        let container_url =
            self.config
                .resource_url(&[&self.vertical, &self.node, &self.container]);
        let subscription_url = format!("{}/{}", container_url, SUBSCRIPTION_RN);

        println!(
            "\n📝 Step 1: Creating subscription for {}/{}/{} container",
            self.vertical, self.node, self.container
        );
        self.delete_subscription(&client, &subscription_url, "delete-old-sub")
            .await;

        let sub_body = Subscription {
            rn: SUBSCRIPTION_RN.to_string(),
            nu: vec![notify_url.clone()],
            nct: 1,
            enc: EventNotificationCriteria {
                net: vec!["3".to_string()],
            },
        }
        .into_body();
        let desc = RequestDescriptor::new(Method::POST, container_url.as_str())
            .headers(onem2m::base_headers(&self.config.origin, "test-sub-notify"))
            .header("Content-Type", onem2m::content_type(Some(TY_SUBSCRIPTION)))
            .json(sub_body);

        match client.send(&desc).await {
            Ok(response) if response.status == 200 || response.status == 201 => {
                println!("Status: {}", response.status);
                println!("✅ Subscription created successfully");
                if let Some(body) = response.json() {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
                    );
                }
            }
            Ok(response) => {
                println!("Status: {}", response.status);
                println!("❌ Failed to create subscription: {}", response.body);
                listener_task.abort();
                return Ok(Vec::new());
            }
            Err(e) => {
                println!("❌ Failed to create subscription: {}", e);
                listener_task.abort();
                return Ok(Vec::new());
            }
        }

        println!("\n📝 Step 2: Creating CIN to trigger notification");
        tokio::time::sleep(SETTLE).await;

        let cin_body = ContentInstance {
            rn: None,
            con: "['50', 'test-notification', 'TEST-001', 'location-test', 'violation-test']"
                .to_string(),
            lbl: Some(
                ["polluters_count", "bindata", "vehicle_number", "lct", "violations"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        }
        .into_body();
        let desc = RequestDescriptor::new(Method::POST, container_url.as_str())
            .headers(onem2m::base_headers(&self.config.origin, "test-cin-create"))
            .header(
                "Content-Type",
                onem2m::content_type(Some(TY_CONTENT_INSTANCE)),
            )
            .json(cin_body);

        match client.send(&desc).await {
            Ok(response) if response.is_success() => {
                println!("Status: {}", response.status);
                println!("✅ CIN created successfully");
            }
            Ok(response) => {
                println!("Status: {}", response.status);
                println!("❌ Failed to create CIN: {}", response.body);
                listener_task.abort();
                return Ok(Vec::new());
            }
            Err(e) => {
                println!("❌ Failed to create CIN: {}", e);
                listener_task.abort();
                return Ok(Vec::new());
            }
        }

        println!(
            "\n📝 Step 3: Waiting up to {}s for notification...",
            self.wait.as_secs()
        );

        // Deadline-bounded drain of the listener channel; no fixed sleep.
        let deadline = tokio::time::Instant::now() + self.wait;
        let mut received = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, receiver.recv()).await {
                Ok(Some(notification)) => received.push(notification),
                Ok(None) | Err(_) => break,
            }
        }

        println!();
        println!("{}", "=".repeat(80));
        println!("RESULTS");
        println!("{}", "=".repeat(80));
        if received.is_empty() {
            println!("❌ FAILED! No notifications received");
            println!("\nTroubleshooting:");
            println!("1. Check the CSE logs for notification delivery errors");
            println!(
                "2. Verify the subscription exists: GET {} with X-M2M-Origin: {}",
                subscription_url, self.config.origin
            );
            println!("3. Check that {} is reachable from the CSE", notify_url);
        } else {
            println!("✅ SUCCESS! Received {} notification(s)", received.len());
            for (i, notification) in received.iter().enumerate() {
                println!("\nNotification #{}:", i + 1);
                println!(
                    "{}",
                    serde_json::to_string_pretty(notification)
                        .unwrap_or_else(|_| notification.to_string())
                );
            }
        }

        println!("\n📝 Cleanup: Deleting test subscription");
        self.delete_subscription(&client, &subscription_url, "cleanup-sub")
            .await;
        println!("✅ Cleanup complete");

        listener_task.abort();
        Ok(received)
    }
}

#[async_trait]
impl Probe for SubscriptionProbe {
    fn name(&self) -> &str {
        "subscription"
    }

    async fn run(&self) -> Result<(), ProbeError> {
        self.execute().await.map(|_| ())
    }
}
