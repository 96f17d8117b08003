//! Notices and study materials.
//!
//! - `GET /api/documents?kind=notice|study_material`: published documents with
//!   their download URLs, newest first. Public.
//! - `POST /api/documents/upload`: multipart `json` (`UploadDocumentMeta`) and
//!   `file` parts. Admin only.
//! - `DELETE /api/documents/{id}`: unpublishes and removes the stored file.
//!   Admin only.

use crate::documents::{publish_document, remove_document};
use crate::error::ApiError;
use crate::identity::{require_admin, CurrentSession};
use crate::services::multipart::read_upload_form;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::document::DocumentView;
use common::requests::{DeleteResponse, DocumentListQuery, UploadDocumentMeta};

const API_PATH: &str = "/api/documents";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/upload", post().to(upload))
        .route("/{id}", delete().to(remove))
}

async fn list(
    state: web::Data<AppState>,
    query: web::Query<DocumentListQuery>,
) -> Result<HttpResponse, ApiError> {
    let views: Vec<DocumentView> = state
        .tables
        .list_documents(query.kind)
        .await?
        .into_iter()
        .map(|document| DocumentView {
            public_url: state.objects.public_url(&document.file_path),
            document,
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

async fn upload(
    state: web::Data<AppState>,
    session: CurrentSession,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let admin = require_admin(session)?;
    let form = read_upload_form::<UploadDocumentMeta>(payload, state.max_upload_bytes).await?;

    let document = publish_document(
        state.objects.as_ref(),
        state.tables.as_ref(),
        state.ingest.orphan_policy,
        Some(&admin),
        form.meta,
        &form.file_name,
        &form.bytes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(DocumentView {
        public_url: state.objects.public_url(&document.file_path),
        document,
    }))
}

async fn remove(
    state: web::Data<AppState>,
    session: CurrentSession,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(session)?;
    let id = id.into_inner();
    let document = state
        .tables
        .get_document(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Document '{}' not found", id)))?;

    let report = remove_document(state.objects.as_ref(), state.tables.as_ref(), &document).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse {
        deleted: true,
        warning: report.warning,
    }))
}
