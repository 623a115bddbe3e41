//! HTTP client for the remote resource endpoints
//!
//! Each [`ResourceKind`] maps to one HTTP-reachable endpoint; the dispatcher
//! sends the queued operation's payload verbatim as the request body. A
//! response counts as success if and only if it reports a 2xx status;
//! everything else, including transport failures, is a failed attempt.

use std::time::Duration;

use async_trait::async_trait;
use clubsync_domain::constants::DEFAULT_DISPATCH_TIMEOUT_SECS;
use clubsync_domain::{OperationKind, OperationRecord, RemoteConfig, ResourceKind};
use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::coordinator::OperationDispatcher;
use super::errors::SyncError;

/// Configuration for the remote endpoint client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the remote API (e.g., "https://api.clubsync.example/v1")
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.clubsync.example/v1".to_string(),
            timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
        }
    }
}

impl From<&RemoteConfig> for ApiClientConfig {
    fn from(config: &RemoteConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

/// Reqwest-backed implementation of the dispatch port.
pub struct HttpOperationDispatcher {
    client: reqwest::Client,
    config: ApiClientConfig,
}

impl HttpOperationDispatcher {
    /// Create a dispatcher with default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, SyncError> {
        Self::with_config(ApiClientConfig::default())
    }

    /// Create a dispatcher with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn with_config(config: ApiClientConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint_url(&self, resource: ResourceKind) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), resource_path(resource))
    }
}

/// URL path segment serving the given resource.
fn resource_path(resource: ResourceKind) -> &'static str {
    match resource {
        ResourceKind::CheckIn => "check-ins",
        ResourceKind::LeaveRequest => "leave-requests",
        ResourceKind::Attendance => "attendance",
    }
}

fn request_method(kind: OperationKind) -> Method {
    match kind {
        OperationKind::Create => Method::POST,
        OperationKind::Update => Method::PUT,
        OperationKind::Delete => Method::DELETE,
    }
}

#[async_trait]
impl OperationDispatcher for HttpOperationDispatcher {
    #[instrument(skip(self, record), fields(operation_id = %record.id, resource = %record.resource))]
    async fn dispatch(&self, record: &OperationRecord) -> Result<(), SyncError> {
        let url = self.endpoint_url(record.resource);
        let method = request_method(record.kind);

        debug!(url = %url, method = %method, "dispatching queued operation");

        let response = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/json")
            // The payload goes out exactly as enqueued.
            .body(record.payload_json.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::Network("request timed out".into())
                } else if e.is_connect() {
                    SyncError::Network("connection failure".into())
                } else {
                    SyncError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = %status, "remote endpoint accepted operation");
            return Ok(());
        }

        warn!(status = %status, "remote endpoint rejected operation");
        if status.is_server_error() {
            Err(SyncError::Server(format!("HTTP {status}")))
        } else {
            Err(SyncError::Client(format!("HTTP {status}")))
        }
    }
}
