//! Notices and study materials: a file in the object store plus one metadata
//! row. Same ordering rules as the results upload, without the child batch.

use crate::ingest::{storage_key, DeletionReport, IngestError, Orphan, OrphanPolicy, Saga, UploadStep};
use crate::store::{ObjectStore, StoreError, TableStore};
use common::model::document::{DocumentRecord, NewDocument};
use common::model::session::Session;
use common::requests::UploadDocumentMeta;
use log::{error, info, warn};

/// Stores `bytes` and publishes its metadata row.
pub async fn publish_document(
    objects: &dyn ObjectStore,
    tables: &dyn TableStore,
    policy: OrphanPolicy,
    session: Option<&Session>,
    meta: UploadDocumentMeta,
    file_name: &str,
    bytes: &[u8],
) -> Result<DocumentRecord, IngestError> {
    let session = session.ok_or(IngestError::NotAuthenticated)?;
    let title = meta.title.trim().to_string();
    if title.is_empty() {
        return Err(IngestError::InvalidInput("A title is required".to_string()));
    }
    if file_name.trim().is_empty() || bytes.is_empty() {
        return Err(IngestError::InvalidInput("Please choose a non-empty file".to_string()));
    }

    let mut saga = Saga::new(objects, tables, policy);
    let key = storage_key(meta.kind.storage_prefix(), file_name);
    if let Err(source) = objects.put(&key, bytes).await {
        error!("Upload of {} failed: {}", file_name, source);
        return Err(IngestError::Step {
            step: UploadStep::ObjectUpload,
            source,
            orphans: Vec::new(),
        });
    }
    saga.record(Orphan::Object(key.clone()));

    let new_document = NewDocument {
        kind: meta.kind,
        title,
        description: meta
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        file_name: file_name.to_string(),
        file_path: key,
        uploaded_by: session.user_id.clone(),
    };
    match tables.insert_document(new_document).await {
        Ok(document) => {
            info!("Published {} '{}' ({})", document.kind.as_str(), document.title, document.id);
            Ok(document)
        }
        Err(source) => {
            error!("Saving document row for {} failed: {}", file_name, source);
            Err(IngestError::Step {
                step: UploadStep::DocumentInsert,
                source,
                orphans: saga.abort().await,
            })
        }
    }
}

/// Removes the metadata row, then the stored file. A failure on the file is
/// only a warning.
pub async fn remove_document(
    objects: &dyn ObjectStore,
    tables: &dyn TableStore,
    document: &DocumentRecord,
) -> Result<DeletionReport, StoreError> {
    tables.delete_document(&document.id).await?;

    let warning = match objects.remove(std::slice::from_ref(&document.file_path)).await {
        Ok(()) => None,
        Err(e) => {
            warn!("Document {} deleted but {} was not removed: {}", document.id, document.file_path, e);
            Some(format!(
                "The document was unpublished, but the stored file could not be removed: {}",
                e
            ))
        }
    };
    Ok(DeletionReport {
        removed_results: 0,
        warning,
    })
}
