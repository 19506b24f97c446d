use super::web::NotificationListener;
use crate::client::{HttpClient, RequestDescriptor};
use hyper::Method;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

async fn start_listener() -> (
    String,
    mpsc::UnboundedReceiver<serde_json::Value>,
    tokio::task::JoinHandle<std::io::Result<()>>,
) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let listener = NotificationListener::bind("127.0.0.1:0".parse().unwrap(), sender)
        .await
        .expect("bind on an ephemeral port");
    let url = listener.notify_url();
    let handle = tokio::spawn(listener.serve());
    (url, receiver, handle)
}

#[tokio::test]
async fn test_listener_acknowledges_and_forwards_notification() {
    let (url, mut receiver, handle) = start_listener().await;
    let client = HttpClient::new(Duration::from_secs(2));

    let notification = json!({"m2m:sgn": {"nev": {"rep": {"m2m:cin": {"con": "x"}}}}});
    let desc = RequestDescriptor::new(Method::POST, url.as_str())
        .header("Content-Type", "application/json")
        .json(notification.clone());

    let response = client.send(&desc).await.expect("listener reachable");
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["status"], "ok");

    let received = timeout(Duration::from_secs(1), receiver.recv())
        .await
        .expect("notification forwarded within a second")
        .expect("channel open");
    assert_eq!(received, notification);

    handle.abort();
}

#[tokio::test]
async fn test_listener_survives_malformed_json() {
    let (url, mut receiver, handle) = start_listener().await;
    let client = HttpClient::new(Duration::from_secs(2));

    // Malformed body: still acknowledged with 200, nothing forwarded.
    let response = send_raw(&url, b"{not json").await;
    assert_eq!(response, 200);

    assert!(
        timeout(Duration::from_millis(300), receiver.recv())
            .await
            .is_err(),
        "malformed body must not be forwarded"
    );

    // Listener keeps serving afterwards.
    let desc = RequestDescriptor::new(Method::POST, url.as_str())
        .header("Content-Type", "application/json")
        .json(json!({"ok": true}));
    let response = client.send(&desc).await.expect("listener still serving");
    assert_eq!(response.status, 200);
    assert!(
        timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("delivered")
            .is_some()
    );

    handle.abort();
}

#[tokio::test]
async fn test_listener_rejects_non_post() {
    let (url, _receiver, handle) = start_listener().await;
    let client = HttpClient::new(Duration::from_secs(2));

    let desc = RequestDescriptor::new(Method::GET, url.as_str());
    let response = client.send(&desc).await.expect("listener reachable");
    assert_eq!(response.status, 404);

    handle.abort();
}

/// POST raw bytes that are not valid JSON (the descriptor only carries
/// JSON bodies) and return the status code.
async fn send_raw(url: &str, body: &'static [u8]) -> u16 {
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper_util::client::legacy::Client as LegacyClient;
    use hyper_util::rt::TokioExecutor;

    let client = LegacyClient::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();
    let request = hyper::Request::builder()
        .method(Method::POST)
        .uri(url)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from_static(body)))
        .unwrap();
    client.request(request).await.unwrap().status().as_u16()
}
