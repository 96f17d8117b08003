use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::document::DocumentKind;
use crate::model::result_file::ResultFileRecord;

/// The `json` part of a `POST /api/results/upload` multipart request.
///
/// `verified` carries the operator's confirmation checkbox. The server
/// refuses the batch unless it is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResultsMeta {
    #[serde(default)]
    pub exam_title: Option<String>,
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub verified: bool,
}

/// Response body of a successful results upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResultsResponse {
    pub file: ResultFileRecord,
    pub inserted: usize,
    pub public_url: String,
}

/// The `json` part of a `POST /api/documents/upload` multipart request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDocumentMeta {
    pub kind: DocumentKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response body of the delete endpoints. `warning` is set when the metadata
/// is gone but the stored file could not be removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    #[serde(default)]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultLookupQuery {
    pub candidate_id: String,
    #[serde(default)]
    pub exam_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListQuery {
    #[serde(default)]
    pub kind: Option<DocumentKind>,
}
