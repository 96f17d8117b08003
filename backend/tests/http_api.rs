mod support;

use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::requests::{DeleteResponse, UploadResultsResponse};
use portal_backend::config::IngestSettings;
use portal_backend::services;
use portal_backend::state::AppState;
use portal_backend::store::sqlite::Database;
use serde_json::{json, Value};
use std::sync::Arc;
use support::{admin, student, MemoryObjects, HEADER};

const BOUNDARY: &str = "portal-test-boundary";
const ADMIN_TOKEN: &str = "Bearer admin-token";
const STUDENT_TOKEN: &str = "Bearer student-token";

fn state(objects: Arc<MemoryObjects>) -> AppState {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.upsert_session("admin-token", &admin()).unwrap();
    db.upsert_session("student-token", &student()).unwrap();
    AppState::new(objects, db.clone(), db, IngestSettings::default(), 1024 * 1024)
}

fn multipart_body(meta: &Value, file_name: &str, file: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"json\"\r\nContent-Type: application/json\r\n\r\n{meta}\r\n",
            b = BOUNDARY,
            meta = meta
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            name = file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(uri: &str, token: Option<&str>, meta: Value, file_name: &str, file: &[u8]) -> test::TestRequest {
    let mut req = test::TestRequest::post()
        .uri(uri)
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(&meta, file_name, file));
    if let Some(token) = token {
        req = req.insert_header((AUTHORIZATION, token));
    }
    req
}

fn results_csv() -> String {
    format!("{}\nC100,EX1,88,A,91\nC101,EX1,72.5,B,80\n", HEADER)
}

#[actix_web::test]
async fn upload_list_lookup_export_and_delete() {
    let objects = Arc::new(MemoryObjects::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(objects.clone())))
            .configure(services::configure),
    )
    .await;

    let csv = results_csv();
    let req = upload_request(
        "/api/results/upload",
        Some(ADMIN_TOKEN),
        json!({"exam_title": "Unit Test 3", "exam_date": "2026-10-01", "verified": true}),
        "results.csv",
        csv.as_bytes(),
    )
    .to_request();
    let uploaded: UploadResultsResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(uploaded.inserted, 2);
    assert_eq!(uploaded.file.file_name, "Unit Test 3 - results.csv");
    assert_eq!(uploaded.file.total_results, 2);
    assert_eq!(objects.keys().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/results/files")
        .insert_header((AUTHORIZATION, ADMIN_TOKEN))
        .to_request();
    let files: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(files.as_array().map(Vec::len), Some(1));
    assert_eq!(files[0]["id"], json!(uploaded.file.id));
    assert_eq!(files[0]["public_url"], json!(uploaded.public_url));

    let req = test::TestRequest::get()
        .uri("/api/results/lookup?candidate_id=C100")
        .to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["candidate_id"], json!("C100"));
    assert_eq!(found[0]["exam_date"], json!("2026-10-01"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/results/files/{}/export", uploaded.file.id))
        .insert_header((AUTHORIZATION, ADMIN_TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("C101,EX1,72.5,B,80"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/results/files/{}", uploaded.file.id))
        .insert_header((AUTHORIZATION, ADMIN_TOKEN))
        .to_request();
    let deleted: DeleteResponse = test::call_and_read_body_json(&app, req).await;
    assert!(deleted.deleted);
    assert_eq!(deleted.warning, None);
    assert!(objects.keys().is_empty());

    let req = test::TestRequest::get()
        .uri("/api/results/lookup?candidate_id=C100")
        .to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found, json!([]));
}

#[actix_web::test]
async fn writes_require_an_admin_session() {
    let objects = Arc::new(MemoryObjects::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(objects.clone())))
            .configure(services::configure),
    )
    .await;
    let csv = results_csv();

    for (token, status) in [
        (None, StatusCode::UNAUTHORIZED),
        (Some(STUDENT_TOKEN), StatusCode::FORBIDDEN),
        (Some("Bearer unknown"), StatusCode::UNAUTHORIZED),
    ] {
        let req = upload_request(
            "/api/results/upload",
            token,
            json!({"verified": true}),
            "results.csv",
            csv.as_bytes(),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status);
    }

    let req = test::TestRequest::delete()
        .uri("/api/results/files/anything")
        .insert_header((AUTHORIZATION, STUDENT_TOKEN))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    assert!(objects.keys().is_empty());
}

#[actix_web::test]
async fn bad_batches_are_refused_before_any_write() {
    let objects = Arc::new(MemoryObjects::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(objects.clone())))
            .configure(services::configure),
    )
    .await;
    let csv = results_csv();

    let cases: Vec<(Value, &str, Vec<u8>, &str)> = vec![
        (json!({"verified": false}), "results.csv", csv.clone().into_bytes(), "verify"),
        (json!({"verified": true}), "results.txt", csv.clone().into_bytes(), ".csv"),
        (
            json!({"verified": true}),
            "results.csv",
            b"Candidate ID,Exam Mark\nC100,88\n".to_vec(),
            "Exam ID",
        ),
        (json!({"verified": true}), "results.csv", format!("{}\n", HEADER).into_bytes(), "no results"),
    ];

    for (meta, name, bytes, needle) in cases {
        let req = upload_request("/api/results/upload", Some(ADMIN_TOKEN), meta, name, &bytes).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.starts_with("Error: "), "{}", body);
        assert!(body.contains(needle), "{}", body);
    }
    assert!(objects.keys().is_empty());
}

#[actix_web::test]
async fn byte_order_mark_is_ignored() {
    let objects = Arc::new(MemoryObjects::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(objects)))
            .configure(services::configure),
    )
    .await;
    let csv = format!("\u{feff}{}", results_csv());

    let req = upload_request(
        "/api/results/upload",
        Some(ADMIN_TOKEN),
        json!({"verified": true}),
        "results.csv",
        csv.as_bytes(),
    )
    .to_request();
    let uploaded: UploadResultsResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(uploaded.inserted, 2);
    assert_eq!(uploaded.file.exam_id, "EX1");
}

#[actix_web::test]
async fn second_upload_by_the_same_user_conflicts() {
    let objects = Arc::new(MemoryObjects::new());
    let state = state(objects.clone());
    let _running = state.uploads.try_acquire("admin-1").unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure),
    )
    .await;
    let csv = results_csv();

    let req = upload_request(
        "/api/results/upload",
        Some(ADMIN_TOKEN),
        json!({"verified": true}),
        "results.csv",
        csv.as_bytes(),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(objects.keys().is_empty());
}

#[actix_web::test]
async fn session_endpoint_reports_the_caller() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(Arc::new(MemoryObjects::new()))))
            .configure(services::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/auth/session")
        .insert_header((AUTHORIZATION, ADMIN_TOKEN))
        .to_request();
    let session: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(session["role"], json!("admin"));
    assert_eq!(session["user_id"], json!("admin-1"));

    let req = test::TestRequest::get().uri("/api/auth/session").to_request();
    let session: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(session, Value::Null);
}

#[actix_web::test]
async fn documents_are_published_and_listed() {
    let objects = Arc::new(MemoryObjects::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(objects.clone())))
            .configure(services::configure),
    )
    .await;

    let req = upload_request(
        "/api/documents/upload",
        Some(ADMIN_TOKEN),
        json!({"kind": "study_material", "title": "Algebra notes"}),
        "algebra.pdf",
        b"%PDF-1.4",
    )
    .to_request();
    let published: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(published["title"], json!("Algebra notes"));
    let id = published["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/documents?kind=study_material")
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert!(listed[0]["public_url"].as_str().unwrap().contains("materials/"));

    let req = test::TestRequest::get().uri("/api/documents?kind=notice").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/documents/{}", id))
        .insert_header((AUTHORIZATION, ADMIN_TOKEN))
        .to_request();
    let deleted: DeleteResponse = test::call_and_read_body_json(&app, req).await;
    assert!(deleted.deleted);
    assert!(objects.keys().is_empty());
}
