//! Synchronization engine
//!
//! The coordinator drains the durable operation queue against the remote
//! endpoints, applying the retry/abandonment policy. Connectivity plumbing
//! and the HTTP dispatcher live alongside it.

pub mod api_client;
pub mod connectivity;
pub mod coordinator;
pub mod errors;

pub use api_client::{ApiClientConfig, HttpOperationDispatcher};
pub use connectivity::ConnectivityMonitor;
pub use coordinator::{
    OperationDispatcher, SyncCoordinator, SyncCoordinatorConfig, SyncOutcome, SyncReport,
};
pub use errors::SyncError;
