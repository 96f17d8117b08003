use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of one uploaded results batch.
///
/// A row is written once per successful upload and owns every
/// [`crate::model::result::StoredResult`] whose `result_file_id` equals `id`.
/// It is removed only by the admin delete workflow, children first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFileRecord {
    /// Generated by the table store on insert.
    pub id: String,
    /// Display name, optionally prefixed with the operator supplied exam title.
    pub file_name: String,
    /// Object store key of the uploaded CSV.
    pub file_path: String,
    pub exam_id: String,
    pub exam_date: NaiveDate,
    pub total_results: u32,
    /// User id of the uploading administrator.
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    /// Hex MD5 digest of the uploaded bytes.
    pub content_md5: String,
}

/// Everything needed to insert a [`ResultFileRecord`]; the store fills in
/// `id` and `uploaded_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResultFile {
    pub file_name: String,
    pub file_path: String,
    pub exam_id: String,
    pub exam_date: NaiveDate,
    pub total_results: u32,
    pub uploaded_by: String,
    pub content_md5: String,
}

/// A result file as listed in the admin back-office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFileView {
    #[serde(flatten)]
    pub file: ResultFileRecord,
    pub public_url: String,
}
