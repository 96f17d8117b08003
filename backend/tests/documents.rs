mod support;

use common::model::document::DocumentKind;
use common::requests::UploadDocumentMeta;
use portal_backend::documents::{publish_document, remove_document};
use portal_backend::ingest::{IngestError, Orphan, OrphanPolicy, UploadStep};
use portal_backend::store::TableStore;
use support::{admin, FlakyTables, MemoryObjects, TableOp};

fn notice(title: &str) -> UploadDocumentMeta {
    UploadDocumentMeta {
        kind: DocumentKind::Notice,
        title: title.to_string(),
        description: Some("  ".to_string()),
    }
}

#[actix_web::test]
async fn publishes_object_and_row() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();

    let document = publish_document(
        &objects,
        &tables,
        OrphanPolicy::Keep,
        Some(&admin()),
        notice("  Holiday on Friday "),
        "holiday.pdf",
        b"%PDF-1.4",
    )
    .await
    .unwrap();

    assert_eq!(document.title, "Holiday on Friday");
    assert_eq!(document.description, None);
    assert!(document.file_path.starts_with("notices/"));
    assert_eq!(objects.keys(), vec![document.file_path.clone()]);

    let notices = tables.list_documents(Some(DocumentKind::Notice)).await.unwrap();
    assert_eq!(notices.len(), 1);
    assert!(tables
        .list_documents(Some(DocumentKind::StudyMaterial))
        .await
        .unwrap()
        .is_empty());
}

#[actix_web::test]
async fn rejects_missing_title_and_session() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();

    let err = publish_document(
        &objects,
        &tables,
        OrphanPolicy::Keep,
        Some(&admin()),
        notice("   "),
        "holiday.pdf",
        b"%PDF-1.4",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, IngestError::InvalidInput(_)));

    let err = publish_document(
        &objects,
        &tables,
        OrphanPolicy::Keep,
        None,
        notice("Holiday"),
        "holiday.pdf",
        b"%PDF-1.4",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, IngestError::NotAuthenticated));
    assert!(objects.keys().is_empty());
}

#[actix_web::test]
async fn row_failure_reports_or_removes_the_object() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();
    tables.fail(TableOp::InsertDocument);

    let err = publish_document(
        &objects,
        &tables,
        OrphanPolicy::Keep,
        Some(&admin()),
        notice("Holiday"),
        "holiday.pdf",
        b"%PDF-1.4",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, IngestError::Step { step: UploadStep::DocumentInsert, .. }));
    let keys = objects.keys();
    assert_eq!(err.orphans(), &[Orphan::Object(keys[0].clone())]);

    let compensated = MemoryObjects::new();
    let err = publish_document(
        &compensated,
        &tables,
        OrphanPolicy::Compensate,
        Some(&admin()),
        notice("Holiday"),
        "holiday.pdf",
        b"%PDF-1.4",
    )
    .await
    .unwrap_err();
    assert!(err.orphans().is_empty());
    assert!(compensated.keys().is_empty());
}

#[actix_web::test]
async fn removal_warns_when_the_file_stays() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();
    let document = publish_document(
        &objects,
        &tables,
        OrphanPolicy::Keep,
        Some(&admin()),
        notice("Holiday"),
        "holiday.pdf",
        b"%PDF-1.4",
    )
    .await
    .unwrap();
    objects.fail_remove(true);

    let report = remove_document(&objects, &tables, &document).await.unwrap();

    assert!(report.warning.is_some());
    assert!(tables.get_document(&document.id).await.unwrap().is_none());
    assert_eq!(objects.keys().len(), 1);
}
