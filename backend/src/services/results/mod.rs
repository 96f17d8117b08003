//! Exam results: bulk CSV upload, the admin list, export and delete, and the
//! public candidate lookup.
//!
//! The provided routes are:
//! - `POST /api/results/upload`: multipart form with a `json` part
//!   (`UploadResultsMeta`: optional exam title and date, the operator's
//!   `verified` confirmation) and a `file` part holding the CSV. The CSV is
//!   parsed and checked before anything is written, then stored through the
//!   three-step upload (object, result file row, result rows).
//!
//! - `GET /api/results/files`: every uploaded batch with its download URL.
//!
//! - `GET /api/results/files/{id}/results`: the rows of one batch.
//!
//! - `GET /api/results/files/{id}/export`: the rows of one batch as CSV.
//!
//! - `DELETE /api/results/files/{id}`: removes rows, file record and stored
//!   file, in that order.
//!
//! - `GET /api/results/lookup?candidate_id=..&exam_id=..`: results of one
//!   candidate, open to students.
//!
//! Everything except the lookup requires an administrator session.

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

mod export;
mod list;
mod lookup;
mod remove;
mod upload;

const API_PATH: &str = "/api/results";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/files", get().to(list::files))
        .route("/files/{id}/results", get().to(list::results))
        .route("/files/{id}/export", get().to(export::process))
        .route("/files/{id}", delete().to(remove::process))
        .route("/lookup", get().to(lookup::process))
}
