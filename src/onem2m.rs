use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

pub const HDR_ORIGIN: &str = "X-M2M-Origin";
pub const HDR_REQUEST_ID: &str = "X-M2M-RI";

/// oneM2M resource type codes carried in the Content-Type `ty` parameter.
pub const TY_CONTENT_INSTANCE: u8 = 4;
pub const TY_SUBSCRIPTION: u8 = 23;

/// Content-Type value for a plain request, or for a create of resource
/// type `ty` (e.g. `application/json; ty=4`).
pub fn content_type(ty: Option<u8>) -> String {
    match ty {
        Some(ty) => format!("application/json; ty={}", ty),
        None => "application/json".to_string(),
    }
}

/// Fresh X-M2M-RI value. The server uses it for correlation, so each
/// request gets its own.
pub fn request_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Timestamp suffix for generated resource names and payload content.
pub fn timestamp_suffix() -> i64 {
    Utc::now().timestamp()
}

/// The headers every oneM2M request carries.
pub fn base_headers(origin: &str, request_id: &str) -> Vec<(String, String)> {
    vec![
        ("Accept".to_string(), "application/json".to_string()),
        (HDR_ORIGIN.to_string(), origin.to_string()),
        (HDR_REQUEST_ID.to_string(), request_id.to_string()),
    ]
}

/// Attributes of a content instance create (`m2m:cin`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentInstance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rn: Option<String>,
    pub con: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lbl: Option<Vec<String>>,
}

impl ContentInstance {
    /// Wrap into the `m2m:cin` body the server expects.
    pub fn into_body(self) -> Value {
        json!({ "m2m:cin": self })
    }
}

/// Attributes of a subscription create (`m2m:sub`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub rn: String,
    /// Notification URIs; the CSE POSTs to these on matching events.
    pub nu: Vec<String>,
    /// Notification content type (1 = all attributes).
    pub nct: u8,
    pub enc: EventNotificationCriteria,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventNotificationCriteria {
    /// Subscribed event types; "3" is resource-child-created.
    pub net: Vec<String>,
}

impl Subscription {
    pub fn into_body(self) -> Value {
        json!({ "m2m:sub": self })
    }
}

/// Outcome of inspecting a container read done with `?rcn=4`
/// (attributes + child resources).
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerContent {
    /// One or more content instances, in server order.
    ContentInstances(Vec<Value>),
    /// A recognized container with no child content instances.
    Empty,
    /// Neither of the known wrappings matched; carries the top-level
    /// keys seen, for the diagnostic report.
    Unrecognized(Vec<String>),
}

/// Discriminate the shape of a `?rcn=4` container read. Mobius wraps
/// children as `m2m:cnt` -> `m2m:cin`; some older builds answered with
/// `m2m:rsp` -> `m2m:cin`. A lone `m2m:cin` child is normalized to a
/// one-element list.
pub fn parse_container_read(body: &Value) -> ContainerContent {
    for wrapper in ["m2m:cnt", "m2m:rsp"] {
        if let Some(inner) = body.get(wrapper) {
            return match inner.get("m2m:cin") {
                Some(Value::Array(cins)) if cins.is_empty() => ContainerContent::Empty,
                Some(Value::Array(cins)) => ContainerContent::ContentInstances(cins.clone()),
                Some(single) => ContainerContent::ContentInstances(vec![single.clone()]),
                None => ContainerContent::Empty,
            };
        }
    }
    let keys = match body {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    ContainerContent::Unrecognized(keys)
}

/// Extract the single content instance from a `/la` (latest) read.
/// The suffix addresses one resource, so a list here is a server bug;
/// `None` means the body did not carry `m2m:cin` as a single object.
pub fn parse_latest(body: &Value) -> Option<Value> {
    match body.get("m2m:cin") {
        Some(Value::Array(_)) | None => None,
        Some(cin) => Some(cin.clone()),
    }
}
