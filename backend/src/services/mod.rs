pub mod auth;
pub mod documents;
pub mod results;

mod multipart;

use actix_web::web;

/// Registers every API scope. Shared by `main` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::configure_routes())
        .service(results::configure_routes())
        .service(documents::configure_routes());
}
