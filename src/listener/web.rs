use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, body::Bytes};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Single-endpoint notification receiver. Bound eagerly so the caller can
/// derive the `nu` URL from the real local address before the subscription
/// exists; served until the hosting task is dropped at process exit.
pub struct NotificationListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    sender: mpsc::UnboundedSender<serde_json::Value>,
}

impl NotificationListener {
    pub async fn bind(
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<serde_json::Value>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        log::info!("🎧 Notification listener started on http://{}", local_addr);
        Ok(Self {
            listener,
            local_addr,
            sender,
        })
    }

    #[allow(dead_code)]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The URL to register as the subscription's notification target.
    pub fn notify_url(&self) -> String {
        format!("http://127.0.0.1:{}/notify", self.local_addr.port())
    }

    /// Accept loop. Runs until the task hosting it is aborted; every
    /// connection is served on its own task.
    pub async fn serve(self) -> std::io::Result<()> {
        loop {
            let (stream, _) = self.listener.accept().await?;
            let sender = self.sender.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service =
                    service_fn(move |req| handle_notification(req, sender.clone()));

                if let Err(err) = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    log::error!("❌ Error serving notification connection: {:?}", err);
                }
            });
        }
    }
}

/// One handler, always 200 for POST. A body that fails to parse as JSON
/// is logged and dropped; the acknowledgment is sent regardless so the
/// CSE never sees the listener as broken.
async fn handle_notification(
    req: Request<hyper::body::Incoming>,
    sender: mpsc::UnboundedSender<serde_json::Value>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() != Method::POST {
        log::info!("❌ {} {} not handled", req.method(), req.uri().path());
        return Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from("Not Found")))
            .unwrap());
    }

    match req.into_body().collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(notification) => {
                    log::info!("✅ Notification received: {}", notification);
                    // Receiver gone means the probe stopped waiting; fine.
                    let _ = sender.send(notification);
                }
                Err(e) => log::error!("❌ Error parsing notification: {}", e),
            }
        }
        Err(e) => log::error!("❌ Error reading notification body: {}", e),
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(r#"{"status":"ok"}"#)))
        .unwrap())
}
