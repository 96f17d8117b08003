//! Human confirmation gate in front of the results upload.
//!
//! A parsed batch can only be released for upload after the operator ticks
//! the verification box, and only one release can be outstanding at a time.
//! Choosing another file always withdraws an earlier confirmation.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::model::result::StudentResultRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("No CSV file selected")]
    NoSelection,
    #[error("The selected file contains no results")]
    EmptyBatch,
    #[error("Please verify the results before uploading")]
    NotVerified,
    #[error("An upload is already in progress")]
    UploadInFlight,
}

/// What the operator is asked to confirm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub file_name: String,
    pub total_results: usize,
    /// Exam id of the first record; later records are not compared with it.
    pub exam_id: Option<String>,
    pub exam_title: Option<String>,
    pub exam_date: Option<NaiveDate>,
}

/// A confirmed batch handed over to the uploader.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasedBatch {
    pub file_name: String,
    pub records: Vec<StudentResultRecord>,
    pub exam_title: Option<String>,
    pub exam_date: Option<NaiveDate>,
}

impl ReleasedBatch {
    /// The batch's exam id, taken from its first record.
    pub fn exam_id(&self) -> &str {
        self.records.first().map(|r| r.exam_id.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Selection {
    file_name: String,
    records: Vec<StudentResultRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationGate {
    selection: Option<Selection>,
    verified: bool,
    uploading: bool,
    exam_title: Option<String>,
    exam_date: Option<NaiveDate>,
}

impl ValidationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current selection and withdraws any confirmation.
    pub fn select_file(&mut self, file_name: impl Into<String>, records: Vec<StudentResultRecord>) {
        self.selection = Some(Selection {
            file_name: file_name.into(),
            records,
        });
        self.verified = false;
    }

    /// Drops the selection and any confirmation but keeps the operator
    /// metadata. Used while a newly chosen file is still being read.
    pub fn deselect(&mut self) {
        self.selection = None;
        self.verified = false;
    }

    /// Drops the selection, the confirmation and the operator metadata.
    pub fn clear(&mut self) {
        self.selection = None;
        self.verified = false;
        self.exam_title = None;
        self.exam_date = None;
    }

    pub fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn set_exam_title(&mut self, title: Option<String>) {
        self.exam_title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    }

    pub fn set_exam_date(&mut self, date: Option<NaiveDate>) {
        self.exam_date = date;
    }

    pub fn records(&self) -> &[StudentResultRecord] {
        self.selection.as_ref().map(|s| s.records.as_slice()).unwrap_or_default()
    }

    pub fn summary(&self) -> Option<BatchSummary> {
        self.selection.as_ref().map(|s| BatchSummary {
            file_name: s.file_name.clone(),
            total_results: s.records.len(),
            exam_id: s.records.first().map(|r| r.exam_id.clone()),
            exam_title: self.exam_title.clone(),
            exam_date: self.exam_date,
        })
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        self.check().is_ok()
    }

    /// Hands out the confirmed batch and marks an upload as in flight.
    ///
    /// The selection stays in place until [`ValidationGate::finish`] so a
    /// failed upload can be retried without choosing the file again.
    pub fn release(&mut self) -> Result<ReleasedBatch, GateError> {
        self.check()?;
        let selection = self.selection.as_ref().ok_or(GateError::NoSelection)?;
        self.uploading = true;
        Ok(ReleasedBatch {
            file_name: selection.file_name.clone(),
            records: selection.records.clone(),
            exam_title: self.exam_title.clone(),
            exam_date: self.exam_date,
        })
    }

    /// Ends the in-flight upload. A successful one empties the gate.
    pub fn finish(&mut self, success: bool) {
        self.uploading = false;
        if success {
            self.clear();
        }
    }

    fn check(&self) -> Result<(), GateError> {
        if self.uploading {
            return Err(GateError::UploadInFlight);
        }
        let selection = self.selection.as_ref().ok_or(GateError::NoSelection)?;
        if selection.records.is_empty() {
            return Err(GateError::EmptyBatch);
        }
        if !self.verified {
            return Err(GateError::NotVerified);
        }
        Ok(())
    }
}
