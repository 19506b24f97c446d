//! End-to-end check of the subscription round trip against an in-process
//! stand-in for the CSE: it 404s the stale delete, accepts the
//! subscription create, and answers the CIN create by POSTing a
//! notification back to the registered nu URL.

use super::SubscriptionProbe;
use crate::config::ProbeConfig;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::rt::{TokioExecutor, TokioIo};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

struct FakeCse {
    /// nu URL captured from the subscription create.
    nu: Mutex<Option<String>>,
    /// When set, the subscription create answers 500.
    reject_subscription: bool,
}

impl FakeCse {
    fn new(reject_subscription: bool) -> Arc<Self> {
        Arc::new(Self {
            nu: Mutex::new(None),
            reject_subscription,
        })
    }
}

async fn spawn_fake_cse(state: Arc<FakeCse>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let state = state.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| handle(req, state.clone()));
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await;
            });
        }
    });

    addr
}

async fn handle(
    req: Request<hyper::body::Incoming>,
    state: Arc<FakeCse>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let content_type = req
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body: Value = req
        .into_body()
        .collect()
        .await
        .ok()
        .and_then(|collected| serde_json::from_slice(&collected.to_bytes()).ok())
        .unwrap_or(Value::Null);

    let (status, reply) = match method {
        Method::DELETE => (
            StatusCode::NOT_FOUND,
            json!({"m2m:dbg": "resource does not exist"}),
        ),
        Method::POST if content_type.contains("ty=23") => {
            if state.reject_subscription {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"m2m:dbg": "subscription rejected"}),
                )
            } else {
                let nu = body["m2m:sub"]["nu"][0].as_str().map(|s| s.to_string());
                *state.nu.lock().unwrap() = nu;
                (StatusCode::CREATED, body)
            }
        }
        Method::POST if content_type.contains("ty=4") => {
            let cin = body["m2m:cin"].clone();
            if let Some(nu) = state.nu.lock().unwrap().clone() {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    deliver_notification(&nu, cin).await;
                });
            }
            (StatusCode::CREATED, json!({"m2m:cin": {"rn": "cin-1"}}))
        }
        _ => (StatusCode::OK, json!({})),
    };

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(reply.to_string())))
        .unwrap())
}

async fn deliver_notification(nu: &str, cin: Value) {
    let client = LegacyClient::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();
    let notification = json!({
        "m2m:sgn": {
            "nev": {"rep": {"m2m:cin": cin}, "net": 3},
            "sur": "Mobius/AE-WM/WM01-0032-0001/Data/test-sub-notification"
        }
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri(nu)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(notification.to_string())))
        .unwrap();
    let _ = client.request(request).await;
}

fn probe_config(addr: SocketAddr) -> ProbeConfig {
    ProbeConfig {
        base_url: format!("http://{}", addr),
        cse_base: "Mobius".to_string(),
        origin: "SM".to_string(),
        timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn test_round_trip_delivers_notification_within_window() {
    let addr = spawn_fake_cse(FakeCse::new(false)).await;

    // The stale delete answers 404 here; the sequence must proceed past it.
    let probe = SubscriptionProbe::new(
        probe_config(addr),
        "AE-WM".to_string(),
        "WM01-0032-0001".to_string(),
        "Data".to_string(),
    )
    .listen_port(0)
    .wait(Duration::from_secs(3));

    let received = probe.execute().await.expect("local setup succeeds");
    assert!(
        !received.is_empty(),
        "at least one notification must arrive within the wait window"
    );
    let rep = &received[0]["m2m:sgn"]["nev"]["rep"]["m2m:cin"];
    assert!(rep.is_object(), "notification carries the created CIN");
}

#[tokio::test]
async fn test_rejected_subscription_ends_sequence_empty() {
    let state = FakeCse::new(true);
    let addr = spawn_fake_cse(state.clone()).await;

    let probe = SubscriptionProbe::new(
        probe_config(addr),
        "AE-WM".to_string(),
        "WM01-0032-0001".to_string(),
        "Data".to_string(),
    )
    .listen_port(0)
    .wait(Duration::from_secs(1));

    let received = probe.execute().await.expect("local setup succeeds");
    assert!(received.is_empty());
    assert!(
        state.nu.lock().unwrap().is_none(),
        "no nu registered when the create is rejected"
    );
}
