use crate::error::ApiError;
use crate::identity::{require_admin, CurrentSession};
use crate::ingest::{delete_result_file, DeleteError};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::DeleteResponse;

/// `DELETE /api/results/files/{id}`
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
        .await
        .map_err(DeleteError::Lookup)?
        .ok_or_else(|| DeleteError::NotFound(id.clone()))?;

    let report = delete_result_file(state.objects.as_ref(), state.tables.as_ref(), &file).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse {
        deleted: true,
        warning: report.warning,
    }))
}
