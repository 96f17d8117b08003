use serde::{Deserialize, Serialize};

/// One data row of an uploaded results CSV.
///
/// Records are created by [`crate::csv::parse_results`] and live in memory
/// until the batch is either uploaded or discarded. `exam_mark` and
/// `percentage` hold `NaN` when the CSV cell was not a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResultRecord {
    pub candidate_id: String,
    pub exam_id: String,
    #[serde(with = "super::lenient_f64")]
    pub exam_mark: f64,
    pub exam_rank: String,
    #[serde(with = "super::lenient_f64")]
    pub percentage: f64,
}

/// A persisted [`StudentResultRecord`], owned by exactly one result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: String,
    /// Back-reference to [`crate::model::result_file::ResultFileRecord::id`].
    pub result_file_id: String,
    #[serde(flatten)]
    pub record: StudentResultRecord,
}

/// A stored result joined with the exam date of its batch, as shown to
/// students looking up their own marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    #[serde(flatten)]
    pub result: StoredResult,
    pub exam_date: chrono::NaiveDate,
}
