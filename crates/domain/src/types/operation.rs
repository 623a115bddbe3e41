//! Operation queue model types
//!
//! An [`OperationRecord`] is one queued mutation captured while the client
//! was offline (or while the remote endpoint was unreachable). Records are
//! immutable after enqueue apart from `retry_count`, which only the sync
//! coordinator touches.

use serde::{Deserialize, Serialize};

/// The mutation kind carried by a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

crate::impl_domain_string_conversions!(OperationKind {
    Create => "create",
    Update => "update",
    Delete => "delete"
});

/// The domain resource a queued operation targets.
///
/// Each variant maps to one remote endpoint (see the infra API client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    CheckIn,
    LeaveRequest,
    Attendance,
}

crate::impl_domain_string_conversions!(ResourceKind {
    CheckIn => "check_in",
    LeaveRequest => "leave_request",
    Attendance => "attendance"
});

/// One queued mutation, as persisted by the durable queue store.
///
/// `payload_json` is the business payload exactly as the caller handed it
/// over; it is dispatched to the remote endpoint byte-identical. `created_at`
/// is epoch milliseconds and defines FIFO processing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationRecord {
    pub id: String,
    pub kind: OperationKind,
    pub resource: ResourceKind,
    pub payload_json: String,
    pub created_at: i64,
    pub retry_count: i32,
}

/// Input for enqueueing a new operation.
///
/// The store assigns `id`, `created_at`, and `retry_count = 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOperation {
    pub kind: OperationKind,
    pub resource: ResourceKind,
    pub payload_json: String,
}

impl NewOperation {
    /// Create a new enqueue request from a kind, resource, and raw payload.
    pub fn new(kind: OperationKind, resource: ResourceKind, payload_json: impl Into<String>) -> Self {
        Self { kind, resource, payload_json: payload_json.into() }
    }
}

/// Binary connectivity state reported by the hosting environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    /// Whether the environment currently reports connectivity.
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}
