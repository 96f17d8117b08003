use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two kinds of downloadable documents the institute publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Notice,
    StudyMaterial,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Notice => "notice",
            DocumentKind::StudyMaterial => "study_material",
        }
    }

    /// Object store prefix under which files of this kind are kept.
    pub fn storage_prefix(self) -> &'static str {
        match self {
            DocumentKind::Notice => "notices",
            DocumentKind::StudyMaterial => "materials",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "notice" => Some(DocumentKind::Notice),
            "study_material" => Some(DocumentKind::StudyMaterial),
            _ => None,
        }
    }
}

/// A published notice or study material file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub kind: DocumentKind,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub uploaded_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: DocumentRecord,
    pub public_url: String,
}
