mod support;

use common::model::result_file::{NewResultFile, ResultFileRecord};
use portal_backend::ingest::{delete_result_file, DeleteError};
use portal_backend::store::{ObjectStore, TableStore};
use support::{record, FlakyTables, MemoryObjects, TableOp};

async fn seeded(objects: &MemoryObjects, tables: &FlakyTables) -> ResultFileRecord {
    let key = "results/0b7c3e1e-batch.csv".to_string();
    objects.put(&key, b"csv bytes").await.unwrap();
    let file = tables
        .insert_result_file(NewResultFile {
            file_name: "Unit Test 3 - batch.csv".to_string(),
            file_path: key,
            exam_id: "EX1".to_string(),
            exam_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            total_results: 2,
            uploaded_by: "admin-1".to_string(),
            content_md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
        })
        .await
        .unwrap();
    tables
        .insert_results(&file.id, &[record("C100", "EX1", 88.0), record("C101", "EX1", 71.0)])
        .await
        .unwrap();
    file
}

#[actix_web::test]
async fn removes_rows_then_record_then_object() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();
    let file = seeded(&objects, &tables).await;

    let report = delete_result_file(&objects, &tables, &file).await.unwrap();

    assert_eq!(report.removed_results, 2);
    assert_eq!(report.warning, None);
    assert!(tables.results_for_file(&file.id).await.unwrap().is_empty());
    assert!(tables.get_result_file(&file.id).await.unwrap().is_none());
    assert!(objects.keys().is_empty());
}

#[actix_web::test]
async fn object_removal_failure_is_only_a_warning() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();
    let file = seeded(&objects, &tables).await;
    objects.fail_remove(true);

    let report = delete_result_file(&objects, &tables, &file).await.unwrap();

    assert!(report.warning.is_some());
    assert!(tables.results_for_file(&file.id).await.unwrap().is_empty());
    assert!(tables.get_result_file(&file.id).await.unwrap().is_none());
    assert_eq!(objects.keys(), vec![file.file_path.clone()]);
}

#[actix_web::test]
async fn child_deletion_failure_keeps_everything() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();
    let file = seeded(&objects, &tables).await;
    tables.fail(TableOp::DeleteResults);

    let err = delete_result_file(&objects, &tables, &file).await.unwrap_err();

    assert!(matches!(err, DeleteError::ChildRows(_)));
    assert_eq!(tables.results_for_file(&file.id).await.unwrap().len(), 2);
    assert!(tables.get_result_file(&file.id).await.unwrap().is_some());
    assert_eq!(objects.keys().len(), 1);
}

#[actix_web::test]
async fn parent_deletion_failure_keeps_record_and_object() {
    let objects = MemoryObjects::new();
    let tables = FlakyTables::new();
    let file = seeded(&objects, &tables).await;
    tables.fail(TableOp::DeleteResultFile);

    let err = delete_result_file(&objects, &tables, &file).await.unwrap_err();

    assert!(matches!(err, DeleteError::ParentRow(_)));
    assert!(tables.results_for_file(&file.id).await.unwrap().is_empty());
    assert!(tables.get_result_file(&file.id).await.unwrap().is_some());
    assert_eq!(objects.keys().len(), 1);

    tables.heal(TableOp::DeleteResultFile);
    let report = delete_result_file(&objects, &tables, &file).await.unwrap();
    assert_eq!(report.removed_results, 0);
    assert!(objects.keys().is_empty());
}
