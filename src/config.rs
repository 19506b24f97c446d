use std::time::Duration;

/// Connection settings shared by every probe. Defaults mirror a stock
/// Mobius install (HTTP port 7599, CSE base "Mobius", admin origin "SM").
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Scheme, host and port of the CSE, without a trailing slash.
    pub base_url: String,
    /// Resource name of the CSE base (first path segment).
    pub cse_base: String,
    /// Value sent as X-M2M-Origin.
    pub origin: String,
    /// Per-request deadline; there is no retry behind it.
    pub timeout: Duration,
}

impl ProbeConfig {
    /// Absolute URL of a structured resource path under the CSE base.
    pub fn resource_url(&self, segments: &[&str]) -> String {
        let mut url = format!("{}/{}", self.base_url, self.cse_base);
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// Absolute URL of an unstructured (`/~/...`) target path.
    pub fn unstructured_url(&self, target: &str) -> String {
        format!("{}/{}", self.base_url, target.trim_start_matches('/'))
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7599".to_string(),
            cse_base: "Mobius".to_string(),
            origin: "SM".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}
