//! Domain Ports - Core trait definitions for the information gatherer
//!
//! The dispatcher only talks to the storage system through [`ReadQuery`].
//! The REST client implements it; tests use in-memory fakes.

use crate::error::Result;
use async_trait::async_trait;

/// A single record returned by a storage system command.
///
/// Records are passed through untouched, so the field set is whatever
/// the endpoint reports.
pub type Record = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Read Query Port
// =============================================================================

/// Read-only access to a storage system's command interface
#[async_trait]
pub trait ReadQuery: Send + Sync {
    /// Execute a read-only command (e.g. `lsvdisk`) and return its records
    async fn execute_read_command(&self, command: &str) -> Result<Vec<Record>>;

    /// Identifier of the target system, used in logs and error reports
    fn cluster_name(&self) -> &str;
}
