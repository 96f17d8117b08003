use actix_files::Files;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use common::model::session::{Role, Session};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;
use portal_backend::config::AppConfig;
use portal_backend::services;
use portal_backend::state::AppState;
use portal_backend::store::fs::FsObjectStore;
use portal_backend::store::sqlite::Database;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

fn to_io(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load().map_err(|e| {
        error!("{}", e);
        to_io(e)
    })?;
    let url = config.url();

    std::fs::create_dir_all(&config.storage_dir)?;
    let database = Database::open(&config.database_path).map_err(to_io)?;
    if let Some(admin) = &config.bootstrap_admin {
        let session = Session {
            user_id: format!("bootstrap:{}", admin.email),
            email: admin.email.clone(),
            role: Role::Admin,
        };
        database.upsert_session(&admin.token, &session).map_err(to_io)?;
        info!("Bootstrap admin session ready for {}", admin.email);
    }

    let database = Arc::new(database);
    let state = AppState::new(
        Arc::new(FsObjectStore::new(&config.storage_dir, &config.public_base_url)),
        database.clone(),
        database,
        config.ingest,
        config.max_upload_bytes,
    );

    if config.open_browser {
        let url_clone = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url_clone);
        });
    }

    info!(
        "Server running at {} (orphan policy {:?}, column mapping {:?})",
        url, config.ingest.orphan_policy, config.ingest.column_mapping
    );

    let storage_dir = config.storage_dir.clone();
    let payload_limit = config.max_upload_bytes + 64 * 1024;
    HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::new(payload_limit))
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
            .service(Files::new("/storage", &storage_dir))
            .default_service(web::route().to(serve_embedded))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
