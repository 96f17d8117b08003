use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::ResultLookupQuery;

/// `GET /api/results/lookup`: a candidate's results, newest exam first.
pub(crate) async fn process(
    state: web::Data<AppState>,
    query: web::Query<ResultLookupQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let candidate_id = query.candidate_id.trim();
    if candidate_id.is_empty() {
        return Err(ApiError::BadRequest("Candidate ID is required".to_string()));
    }
    let exam_id = query.exam_id.as_deref().map(str::trim).filter(|e| !e.is_empty());

    let results = state.tables.results_for_candidate(candidate_id, exam_id).await?;
    Ok(HttpResponse::Ok().json(results))
}
