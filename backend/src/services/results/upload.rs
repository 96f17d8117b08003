use crate::error::ApiError;
use crate::identity::{require_admin, CurrentSession};
use crate::ingest::{check_numeric_policy, ResultsUploader};
use crate::services::multipart::read_upload_form;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::csv::{ensure_csv_extension, parse_results};
use common::gate::ValidationGate;
use common::requests::{UploadResultsMeta, UploadResultsResponse};
use log::info;

pub(crate) async fn process(
    state: web::Data<AppState>,
    session: CurrentSession,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let response = upload_results(&state, session, payload).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Runs the whole results upload for one request.
///
/// Input problems (extension, headers, encoding, missing confirmation) are
/// reported before the first remote write.
async fn upload_results(
    state: &AppState,
    session: CurrentSession,
    payload: Multipart,
) -> Result<UploadResultsResponse, ApiError> {
    let admin = require_admin(session)?;
    let form = read_upload_form::<UploadResultsMeta>(payload, state.max_upload_bytes).await?;

    ensure_csv_extension(&form.file_name)?;
    let text = std::str::from_utf8(&form.bytes)
        .map_err(|_| ApiError::BadRequest("The CSV file is not valid UTF-8".to_string()))?;
    // spreadsheet exports often start with a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let records = parse_results(text, state.ingest.column_mapping)?;
    let anomalies = check_numeric_policy(state.ingest.numeric_policy, &records)?;

    let mut gate = ValidationGate::new();
    gate.select_file(form.file_name.clone(), records);
    gate.set_exam_title(form.meta.exam_title);
    gate.set_exam_date(form.meta.exam_date);
    gate.set_verified(form.meta.verified);
    let batch = gate.release()?;

    let _slot = state.uploads.try_acquire(&admin.user_id).ok_or_else(|| {
        ApiError::Conflict("Another upload of yours is still in progress".to_string())
    })?;

    info!(
        "{} uploading {} ({} results, {} flagged)",
        admin.email,
        batch.file_name,
        batch.records.len(),
        anomalies.len()
    );
    let uploader = ResultsUploader::new(
        state.objects.as_ref(),
        state.tables.as_ref(),
        state.ingest.orphan_policy,
    );
    let outcome = uploader.upload(Some(&admin), batch, &form.bytes).await;
    gate.finish(outcome.is_ok());
    let report = outcome?;

    Ok(UploadResultsResponse {
        file: report.file,
        inserted: report.inserted,
        public_url: report.public_url,
    })
}
