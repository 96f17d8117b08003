//! Parser for bulk exam-result CSV files.
//!
//! The accepted format is deliberately small: comma separated, the first line
//! is a header that must contain the five [`REQUIRED_HEADERS`] (any order, exact
//! casing), every other non-blank line is one result. There is no quoting, so a
//! comma inside a value splits it into two cells.
//!
//! With the default [`ColumnMapping::Positional`] the header is only checked
//! for presence and cells are then read in the fixed column order, whatever
//! order the header actually lists them in. [`ColumnMapping::ByHeader`] reads
//! each cell from the column its header names instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::result::StudentResultRecord;

pub const CANDIDATE_ID: &str = "Candidate ID";
pub const EXAM_ID: &str = "Exam ID";
pub const EXAM_MARK: &str = "Exam Mark";
pub const EXAM_RANK: &str = "Exam Rank";
pub const PERCENTAGE: &str = "Percentage";

/// Required header names, in the order cells are read positionally.
pub const REQUIRED_HEADERS: [&str; 5] = [CANDIDATE_ID, EXAM_ID, EXAM_MARK, EXAM_RANK, PERCENTAGE];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvFormatError {
    #[error("The file must end with .csv (got '{0}')")]
    NotCsv(String),
    #[error("The file is empty")]
    Empty,
    #[error("Invalid CSV format. Missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),
}

/// How data cells are matched to record fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMapping {
    /// Cell `i` goes to field `REQUIRED_HEADERS[i]`, ignoring the header order.
    #[default]
    Positional,
    /// Cells are looked up through the index of their header.
    ByHeader,
}

/// A parsed row whose numbers look wrong. `row` is the 1-based data row
/// number (the header is not counted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAnomaly {
    pub row: usize,
    pub candidate_id: String,
    pub reason: String,
}

/// Rejects file names that do not carry a `.csv` extension.
pub fn ensure_csv_extension(file_name: &str) -> Result<(), CsvFormatError> {
    let is_csv = file_name
        .rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        Ok(())
    } else {
        Err(CsvFormatError::NotCsv(file_name.to_string()))
    }
}

/// Checks the extension of `file_name` and parses `content` into records.
pub fn parse_results_file(
    file_name: &str,
    content: &str,
    mapping: ColumnMapping,
) -> Result<Vec<StudentResultRecord>, CsvFormatError> {
    ensure_csv_extension(file_name)?;
    parse_results(content, mapping)
}

/// Parses the whole text of a results CSV.
///
/// Fails without returning any record when a required header is missing.
/// Blank lines are skipped; malformed numbers become `NaN`.
pub fn parse_results(
    content: &str,
    mapping: ColumnMapping,
) -> Result<Vec<StudentResultRecord>, CsvFormatError> {
    let mut lines = content.split('\n');
    let header_line = lines.next().filter(|l| !l.trim().is_empty()).ok_or(CsvFormatError::Empty)?;
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|required| !headers.contains(required))
        .map(|h| h.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CsvFormatError::MissingHeaders(missing));
    }

    let indices = column_indices(&headers, mapping);

    Ok(lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            let cell = |field: usize| cells.get(indices[field]).copied().unwrap_or("");
            StudentResultRecord {
                candidate_id: cell(0).to_string(),
                exam_id: cell(1).to_string(),
                exam_mark: parse_number(cell(2)),
                exam_rank: cell(3).to_string(),
                percentage: parse_number(cell(4)),
            }
        })
        .collect())
}

/// Lists rows with a non-numeric mark or percentage, or a percentage outside
/// `0..=100`. The parser accepts these silently, callers decide what to do.
pub fn find_numeric_anomalies(records: &[StudentResultRecord]) -> Vec<RowAnomaly> {
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| row_anomaly(idx, record))
        .collect()
}

/// The anomaly of the record at zero-based `index`, if any. Rows are
/// reported one-based.
pub fn row_anomaly(index: usize, record: &StudentResultRecord) -> Option<RowAnomaly> {
    anomaly_reason(record).map(|reason| RowAnomaly {
        row: index + 1,
        candidate_id: record.candidate_id.clone(),
        reason,
    })
}

/// The reason a single record is anomalous, if it is.
///
/// Infinite values count as invalid: they cannot be stored and would come
/// back as empty marks.
pub fn anomaly_reason(record: &StudentResultRecord) -> Option<String> {
    if !record.exam_mark.is_finite() {
        Some(format!("'{}' is not a number", EXAM_MARK))
    } else if !record.percentage.is_finite() {
        Some(format!("'{}' is not a number", PERCENTAGE))
    } else if !(0.0..=100.0).contains(&record.percentage) {
        Some(format!("'{}' {} is outside 0-100", PERCENTAGE, record.percentage))
    } else {
        None
    }
}

/// Cell index for each field in `REQUIRED_HEADERS` order.
fn column_indices(headers: &[&str], mapping: ColumnMapping) -> [usize; 5] {
    let mut indices = [0, 1, 2, 3, 4];
    if mapping == ColumnMapping::ByHeader {
        for (field, required) in REQUIRED_HEADERS.iter().enumerate() {
            // presence was checked by the caller
            if let Some(pos) = headers.iter().position(|h| h == required) {
                indices[field] = pos;
            }
        }
    }
    indices
}

fn parse_number(cell: &str) -> f64 {
    cell.parse::<f64>().unwrap_or(f64::NAN)
}
