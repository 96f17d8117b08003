//! Bulk result ingestion: the upload orchestrator, its failure handling and
//! the companion delete workflow.
//!
//! An upload is three dependent remote writes (object, parent row, child
//! rows) with no transaction spanning them. What happens to the artifacts of
//! completed steps when a later one fails is decided by [`OrphanPolicy`].

mod anomalies;
mod delete;
mod saga;
mod upload;

pub use anomalies::{check_numeric_policy, scan_anomalies};
pub use delete::{delete_result_file, DeleteError, DeletionReport};
pub use saga::{Orphan, Saga};
pub use upload::{ResultsUploader, UploadReport};
pub(crate) use upload::storage_key;

use crate::store::StoreError;
use common::csv::RowAnomaly;
use common::gate::GateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What to do with the artifacts of completed steps after a later step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Leave them in place and report them.
    #[default]
    Keep,
    /// Undo them in reverse order; whatever cannot be undone is reported.
    Compensate,
}

/// Whether rows with a non-numeric or out-of-range mark/percentage are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Store them as they are, logging a warning.
    #[default]
    Accept,
    /// Refuse the whole batch before any remote call.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    ObjectUpload,
    ResultFileInsert,
    ResultsInsert,
    DocumentInsert,
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStep::ObjectUpload => "File upload",
            UploadStep::ResultFileInsert => "Saving result file details",
            UploadStep::ResultsInsert => "Saving student results",
            UploadStep::DocumentInsert => "Saving document details",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("You must be signed in to upload")]
    NotAuthenticated,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{}", describe_anomalies(.0))]
    NumericAnomalies(Vec<RowAnomaly>),

    #[error(transparent)]
    Gate(#[from] GateError),

    /// A remote write failed; `orphans` lists what was left behind.
    #[error("{step} failed: {source}")]
    Step {
        step: UploadStep,
        #[source]
        source: StoreError,
        orphans: Vec<Orphan>,
    },
}

impl IngestError {
    /// Artifacts a failed upload left in the stores.
    pub fn orphans(&self) -> &[Orphan] {
        match self {
            IngestError::Step { orphans, .. } => orphans,
            _ => &[],
        }
    }
}

fn describe_anomalies(anomalies: &[RowAnomaly]) -> String {
    match anomalies.first() {
        Some(first) => format!(
            "{} row(s) have invalid marks or percentages, first at row {} ({}): {}",
            anomalies.len(),
            first.row,
            first.candidate_id,
            first.reason
        ),
        None => "No invalid rows".to_string(),
    }
}
