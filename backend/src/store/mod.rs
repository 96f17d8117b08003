//! Seams to the external collaborators: the object store holding uploaded
//! files and the relational tables holding their metadata.
//!
//! Every operation reports failure through [`StoreError`]; nothing panics on
//! a remote error. The workflows in `ingest` and `documents` only talk to
//! these traits, the concrete stores live in [`fs`] and [`sqlite`].

pub mod fs;
pub mod sqlite;

use async_trait::async_trait;
use common::model::document::{DocumentKind, DocumentRecord, NewDocument};
use common::model::result::{CandidateResult, StoredResult, StudentResultRecord};
use common::model::result_file::{NewResultFile, ResultFileRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    /// The store could not serve the request (lock poisoned, backend down).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// File storage keyed by slash separated paths such as `results/<uuid>.csv`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Removes every key. Keys that do not exist are not an error.
    async fn remove(&self, keys: &[String]) -> Result<(), StoreError>;

    /// Public download URL of `key`. Does not check that the object exists.
    fn public_url(&self, key: &str) -> String;
}

/// Typed access to the portal tables.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Inserts a result file row, generating its id and upload timestamp.
    async fn insert_result_file(&self, new: NewResultFile) -> Result<ResultFileRecord, StoreError>;

    /// Inserts all records under `result_file_id`, all or nothing.
    async fn insert_results(
        &self,
        result_file_id: &str,
        records: &[StudentResultRecord],
    ) -> Result<usize, StoreError>;

    async fn get_result_file(&self, id: &str) -> Result<Option<ResultFileRecord>, StoreError>;

    /// Newest uploads first.
    async fn list_result_files(&self) -> Result<Vec<ResultFileRecord>, StoreError>;

    async fn results_for_file(&self, result_file_id: &str) -> Result<Vec<StoredResult>, StoreError>;

    async fn results_for_candidate(
        &self,
        candidate_id: &str,
        exam_id: Option<&str>,
    ) -> Result<Vec<CandidateResult>, StoreError>;

    /// Returns the number of deleted rows.
    async fn delete_results_for_file(&self, result_file_id: &str) -> Result<usize, StoreError>;

    async fn delete_result_file(&self, id: &str) -> Result<(), StoreError>;

    async fn insert_document(&self, new: NewDocument) -> Result<DocumentRecord, StoreError>;

    async fn get_document(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError>;

    async fn list_documents(&self, kind: Option<DocumentKind>) -> Result<Vec<DocumentRecord>, StoreError>;

    async fn delete_document(&self, id: &str) -> Result<(), StoreError>;
}
