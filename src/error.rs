use std::fmt;

/// Flat failure taxonomy for the probes. Every variant ends up printed;
/// there is no retry and no transient/permanent distinction.
#[derive(Debug)]
pub enum ProbeError {
    /// Connection refused, DNS failure, broken transfer and friends.
    Transport(String),
    /// The per-request deadline elapsed before a response arrived.
    Timeout(String),
    /// The request could not even be constructed (bad URL, bad header).
    InvalidRequest(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Transport(msg) => write!(f, "transport error: {}", msg),
            ProbeError::Timeout(msg) => write!(f, "request timed out: {}", msg),
            ProbeError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}
