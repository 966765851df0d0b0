//! Publisher configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::EnvSource;

/// Settings shared by every publication a [`Publisher`](crate::Publisher) runs.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Parent of the default output location `{output_root}/{item_id}`.
    pub output_root: PathBuf,
    /// Per-request timeout for catalog calls. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            request_timeout: None,
        }
    }
}

impl PublisherConfig {
    /// Read `PUBLISH_OUTPUT_ROOT` and `STAC_REQUEST_TIMEOUT_SECS`.
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let mut config = Self::default();

        if let Some(root) = env.var("PUBLISH_OUTPUT_ROOT").filter(|v| !v.is_empty()) {
            config.output_root = PathBuf::from(root);
        }

        if let Some(secs) = env
            .var("STAC_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        config
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }
}
