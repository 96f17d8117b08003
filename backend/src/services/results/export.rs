use crate::error::ApiError;
use crate::identity::{require_admin, CurrentSession};
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use common::csv::REQUIRED_HEADERS;
use common::model::result::StoredResult;

/// `GET /api/results/files/{id}/export`: the stored rows of a batch as a CSV
/// with the upload header, so an export can be corrected and uploaded again.
pub(crate) async fn process(
    state: web::Data<AppState>,
    session: CurrentSession,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(session)?;
    let id = id.into_inner();
    let file = state
        .tables
        .get_result_file(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Result file '{}' not found", id)))?;
    let rows = state.tables.results_for_file(&id).await?;
    let body = write_results_csv(&rows)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format!("{}-results.csv", file.exam_id))],
        })
        .body(body))
}

fn write_results_csv(rows: &[StoredResult]) -> Result<Vec<u8>, ApiError> {
    let to_api = |e: csv::Error| ApiError::Upstream(format!("CSV export failed: {}", e));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REQUIRED_HEADERS).map_err(to_api)?;
    for row in rows {
        let r = &row.record;
        let mark = format_number(r.exam_mark);
        let percentage = format_number(r.percentage);
        writer
            .write_record([
                r.candidate_id.as_str(),
                r.exam_id.as_str(),
                mark.as_str(),
                r.exam_rank.as_str(),
                percentage.as_str(),
            ])
            .map_err(to_api)?;
    }
    writer
        .into_inner()
        .map_err(|e| ApiError::Upstream(format!("CSV export failed: {}", e)))
}

/// Blank for `NaN`, shortest form otherwise (`88`, `91.5`).
fn format_number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::csv::{parse_results, ColumnMapping};
    use common::model::result::StudentResultRecord;

    fn stored(candidate: &str, mark: f64) -> StoredResult {
        StoredResult {
            id: format!("r-{}", candidate),
            result_file_id: "f1".to_string(),
            record: StudentResultRecord {
                candidate_id: candidate.to_string(),
                exam_id: "EX1".to_string(),
                exam_mark: mark,
                exam_rank: "A".to_string(),
                percentage: 91.5,
            },
        }
    }

    #[test]
    fn export_can_be_parsed_again() {
        let bytes = write_results_csv(&[stored("C100", 88.0), stored("C101", f64::NAN)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("Candidate ID,Exam ID,Exam Mark,Exam Rank,Percentage\n"));
        assert!(text.contains("C100,EX1,88,A,91.5\n"));
        assert!(text.contains("C101,EX1,,A,91.5\n"));

        let parsed = parse_results(&text, ColumnMapping::Positional).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].exam_mark, 88.0);
        assert!(parsed[1].exam_mark.is_nan());
    }
}
