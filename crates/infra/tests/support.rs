//! Shared fixtures for infra integration tests.

use std::sync::Arc;

use clubsync_domain::{NewOperation, OperationKind, ResourceKind};
use clubsync_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Path of the underlying database file, for reopen scenarios.
    pub fn db_path(&self) -> std::path::PathBuf {
        self.manager.path().to_path_buf()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Utility helper for constructing enqueue inputs inside tests.
pub fn make_operation(kind: OperationKind, resource: ResourceKind, payload: &str) -> NewOperation {
    NewOperation::new(kind, resource, payload)
}
