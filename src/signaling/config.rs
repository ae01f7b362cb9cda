//! HTTP signaling configuration

use std::time::Duration;

/// Default signaling base URL (server port 3000, `/signaling/` prefix)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/signaling/";

/// Configuration for [`HttpSignaling`](super::HttpSignaling)
#[derive(Debug, Clone)]
pub struct HttpSignalingConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Delay between the end of one `sync` poll and the start of the next
    pub poll_interval: Duration,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for HttpSignalingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl HttpSignalingConfig {
    /// Config pointing at `host:port` with the default path prefix
    pub fn with_host(host: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{}:{}/signaling/", host, port),
            ..Default::default()
        }
    }

    /// Set the base URL; a trailing `/` is added if missing
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL for an endpoint path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
