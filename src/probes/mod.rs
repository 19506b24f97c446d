//! The four diagnostic probes. Each one builds its requests, prints the
//! full exchange, and reports what it saw; failures are printed, never
//! retried.

use crate::error::ProbeError;
use async_trait::async_trait;

pub mod backend_cin;
pub mod response_shape;
pub mod subscription;
pub mod trigger;

#[cfg(test)]
mod test_integration;

pub use backend_cin::BackendCinProbe;
pub use response_shape::ResponseShapeProbe;
pub use subscription::SubscriptionProbe;
pub use trigger::TriggerProbe;

/// Base trait for all diagnostic probes.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used in the startup log line.
    fn name(&self) -> &str;

    /// Run the probe sequence to completion. An `Err` here is a
    /// transport-level failure on a step the probe cannot continue past;
    /// protocol-level failures (non-2xx) are printed and end the
    /// sequence with `Ok`.
    async fn run(&self) -> Result<(), ProbeError>;
}
