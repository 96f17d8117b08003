use super::{IngestError, NumericPolicy};
use common::csv::{find_numeric_anomalies, row_anomaly, RowAnomaly};
use common::model::result::StudentResultRecord;
use log::warn;
use rayon::prelude::*;

/// Finds every record with a suspicious mark or percentage, in row order.
pub fn scan_anomalies(records: &[StudentResultRecord]) -> Vec<RowAnomaly> {
    records
        .par_iter()
        .enumerate()
        .filter_map(|(idx, record)| row_anomaly(idx, record))
        .collect()
}

/// Applies `policy` to a parsed batch. Accepted anomalies are logged and
/// returned so the caller can report them.
pub fn check_numeric_policy(
    policy: NumericPolicy,
    records: &[StudentResultRecord],
) -> Result<Vec<RowAnomaly>, IngestError> {
    let anomalies = scan_anomalies(records);
    if anomalies.is_empty() {
        return Ok(anomalies);
    }
    match policy {
        NumericPolicy::Accept => {
            warn!(
                "Accepting {} result row(s) with invalid numbers, first at row {}",
                anomalies.len(),
                anomalies[0].row
            );
            Ok(anomalies)
        }
        NumericPolicy::Reject => Err(IngestError::NumericAnomalies(anomalies)),
    }
}
