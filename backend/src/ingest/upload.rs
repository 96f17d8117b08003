use super::saga::{Orphan, Saga};
use super::{IngestError, OrphanPolicy, UploadStep};
use crate::store::{ObjectStore, TableStore};
use chrono::Utc;
use common::gate::ReleasedBatch;
use common::model::result_file::{NewResultFile, ResultFileRecord};
use common::model::session::Session;
use log::{error, info};
use md5::Context;
use std::path::Path;
use uuid::Uuid;

/// Outcome of a fully successful upload.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub file: ResultFileRecord,
    pub inserted: usize,
    pub public_url: String,
}

/// Persists a confirmed results batch: object, then parent row, then children.
///
/// Each step needs the previous one's output (the storage key, then the
/// parent id), so they run strictly in sequence. There is no retry; a failed
/// step ends the upload and the caller has to start over.
pub struct ResultsUploader<'a> {
    objects: &'a dyn ObjectStore,
    tables: &'a dyn TableStore,
    policy: OrphanPolicy,
}

impl<'a> ResultsUploader<'a> {
    pub fn new(objects: &'a dyn ObjectStore, tables: &'a dyn TableStore, policy: OrphanPolicy) -> Self {
        Self {
            objects,
            tables,
            policy,
        }
    }

    pub async fn upload(
        &self,
        session: Option<&Session>,
        batch: ReleasedBatch,
        bytes: &[u8],
    ) -> Result<UploadReport, IngestError> {
        let session = session.ok_or(IngestError::NotAuthenticated)?;
        if batch.records.is_empty() {
            return Err(IngestError::InvalidInput("The CSV contains no results".to_string()));
        }
        let total_results = u32::try_from(batch.records.len())
            .map_err(|_| IngestError::InvalidInput("Too many results in one file".to_string()))?;

        let mut saga = Saga::new(self.objects, self.tables, self.policy);

        // Step 1: object upload
        let key = storage_key("results", &batch.file_name);
        if let Err(source) = self.objects.put(&key, bytes).await {
            error!("Upload of {} failed: {}", batch.file_name, source);
            return Err(IngestError::Step {
                step: UploadStep::ObjectUpload,
                source,
                orphans: Vec::new(),
            });
        }
        saga.record(Orphan::Object(key.clone()));
        info!("Stored {} as {}", batch.file_name, key);

        // Step 2: parent row
        let new_file = NewResultFile {
            file_name: display_name(batch.exam_title.as_deref(), &batch.file_name),
            file_path: key.clone(),
            exam_id: batch.exam_id().to_string(),
            exam_date: batch.exam_date.unwrap_or_else(|| Utc::now().date_naive()),
            total_results,
            uploaded_by: session.user_id.clone(),
            content_md5: content_md5(bytes),
        };
        let file = match self.tables.insert_result_file(new_file).await {
            Ok(file) => file,
            Err(source) => {
                error!("Saving result file row for {} failed: {}", key, source);
                return Err(IngestError::Step {
                    step: UploadStep::ResultFileInsert,
                    source,
                    orphans: saga.abort().await,
                });
            }
        };
        saga.record(Orphan::ResultFile(file.id.clone()));

        // Step 3: child rows, one batch
        let inserted = match self.tables.insert_results(&file.id, &batch.records).await {
            Ok(inserted) => inserted,
            Err(source) => {
                error!("Saving {} results for file {} failed: {}", total_results, file.id, source);
                return Err(IngestError::Step {
                    step: UploadStep::ResultsInsert,
                    source,
                    orphans: saga.abort().await,
                });
            }
        };

        info!(
            "Uploaded {} results for exam {} (file {}) by {}",
            inserted, file.exam_id, file.id, session.email
        );
        Ok(UploadReport {
            public_url: self.objects.public_url(&key),
            file,
            inserted,
        })
    }
}

/// `<prefix>/<uuid v4>.<ext>`, keeping the original extension when it is a
/// plain alphanumeric one.
pub(crate) fn storage_key(prefix: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());
    match ext {
        Some(ext) => format!("{}/{}.{}", prefix, Uuid::new_v4(), ext),
        None => format!("{}/{}", prefix, Uuid::new_v4()),
    }
}

fn display_name(exam_title: Option<&str>, file_name: &str) -> String {
    match exam_title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{} - {}", title, file_name),
        None => file_name.to_string(),
    }
}

fn content_md5(bytes: &[u8]) -> String {
    let mut ctx = Context::new();
    ctx.consume(bytes);
    format!("{:x}", ctx.finalize())
}
