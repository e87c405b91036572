use serde::Serialize;

use crate::snapshot::{Snapshot, SnapshotSource};

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub account: String,
    pub source: SnapshotSource,
    pub snapshot: Snapshot,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
