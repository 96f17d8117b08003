use crate::identity::CurrentSession;
use actix_web::web::{get, scope};
use actix_web::{HttpResponse, Scope};

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/session", get().to(session))
}

/// `GET /api/auth/session`: the caller's session, or `null`.
async fn session(session: CurrentSession) -> HttpResponse {
    HttpResponse::Ok().json(session.0)
}
