use crate::error::ApiError;
use crate::identity::{require_admin, CurrentSession};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::result_file::ResultFileView;

/// `GET /api/results/files`
pub(crate) async fn files(
    state: web::Data<AppState>,
    session: CurrentSession,
) -> Result<HttpResponse, ApiError> {
    require_admin(session)?;
    let views: Vec<ResultFileView> = state
        .tables
        .list_result_files()
        .await?
        .into_iter()
        .map(|file| ResultFileView {
            public_url: state.objects.public_url(&file.file_path),
            file,
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

/// `GET /api/results/files/{id}/results`
pub(crate) async fn results(
    state: web::Data<AppState>,
    session: CurrentSession,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(session)?;
    let id = id.into_inner();
    if state.tables.get_result_file(&id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Result file '{}' not found", id)));
    }
    let rows = state.tables.results_for_file(&id).await?;
    Ok(HttpResponse::Ok().json(rows))
}
