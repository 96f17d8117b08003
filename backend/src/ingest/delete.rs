use crate::store::{ObjectStore, StoreError, TableStore};
use common::model::result_file::ResultFileRecord;
use log::{error, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("Result file '{0}' not found")]
    NotFound(String),

    #[error("Could not load the result file: {0}")]
    Lookup(#[source] StoreError),

    /// Nothing was removed.
    #[error("Deleting the student results failed: {0}")]
    ChildRows(#[source] StoreError),

    /// The results are gone but the file row and the stored object remain.
    #[error("Deleting the result file record failed: {0}")]
    ParentRow(#[source] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletionReport {
    pub removed_results: usize,
    /// Set when the metadata is gone but the stored object could not be removed.
    pub warning: Option<String>,
}

/// Removes a result file: child rows, then the file row, then the object.
///
/// Only the first two steps can fail the operation. Once the file row is gone
/// the batch no longer exists for the portal, so a failing object removal is
/// reported as a warning.
pub async fn delete_result_file(
    objects: &dyn ObjectStore,
    tables: &dyn TableStore,
    file: &ResultFileRecord,
) -> Result<DeletionReport, DeleteError> {
    let removed_results = tables
        .delete_results_for_file(&file.id)
        .await
        .map_err(|e| {
            error!("Deleting results of file {} failed: {}", file.id, e);
            DeleteError::ChildRows(e)
        })?;

    tables.delete_result_file(&file.id).await.map_err(|e| {
        error!("Deleting result file {} failed after removing its results: {}", file.id, e);
        DeleteError::ParentRow(e)
    })?;

    let warning = match objects.remove(std::slice::from_ref(&file.file_path)).await {
        Ok(()) => None,
        Err(e) => {
            warn!("Result file {} deleted but {} was not removed: {}", file.id, file.file_path, e);
            Some(format!(
                "The result records were deleted, but the stored file could not be removed: {}",
                e
            ))
        }
    };

    info!("Deleted result file {} with {} results", file.id, removed_results);
    Ok(DeletionReport {
        removed_results,
        warning,
    })
}
