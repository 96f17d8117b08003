//! Test doubles for the store seams.
//!
//! `MemoryObjects` keeps objects in a map; `FlakyTables` delegates to an
//! in-memory SQLite `Database`. Both can be told to fail a given operation.

#![allow(dead_code)]

use async_trait::async_trait;
use common::model::document::{DocumentKind, DocumentRecord, NewDocument};
use common::model::result::{CandidateResult, StoredResult, StudentResultRecord};
use common::model::result_file::{NewResultFile, ResultFileRecord};
use common::model::session::{Role, Session};
use portal_backend::store::sqlite::Database;
use portal_backend::store::{ObjectStore, StoreError, TableStore};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

pub const HEADER: &str = "Candidate ID,Exam ID,Exam Mark,Exam Rank,Percentage";

pub fn admin() -> Session {
    Session {
        user_id: "admin-1".to_string(),
        email: "office@institute.test".to_string(),
        role: Role::Admin,
    }
}

pub fn student() -> Session {
    Session {
        user_id: "student-1".to_string(),
        email: "c100@institute.test".to_string(),
        role: Role::Student,
    }
}

pub fn record(candidate: &str, exam: &str, mark: f64) -> StudentResultRecord {
    StudentResultRecord {
        candidate_id: candidate.to_string(),
        exam_id: exam.to_string(),
        exam_mark: mark,
        exam_rank: "A".to_string(),
        percentage: 91.0,
    }
}

fn injected(op: &str) -> StoreError {
    StoreError::Unavailable(format!("injected failure in {}", op))
}

#[derive(Default)]
pub struct MemoryObjects {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_put: Mutex<bool>,
    fail_remove: Mutex<bool>,
}

impl MemoryObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_put(&self, fail: bool) {
        *self.fail_put.lock().unwrap() = fail;
    }

    pub fn fail_remove(&self, fail: bool) {
        *self.fail_remove.lock().unwrap() = fail;
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if *self.fail_put.lock().unwrap() {
            return Err(injected("put"));
        }
        self.objects.lock().unwrap().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StoreError> {
        if *self.fail_remove.lock().unwrap() {
            return Err(injected("remove"));
        }
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.institute.test/{}", key)
    }
}

/// Operations `FlakyTables` can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOp {
    InsertResultFile,
    InsertResults,
    DeleteResults,
    DeleteResultFile,
    InsertDocument,
    DeleteDocument,
}

pub struct FlakyTables {
    pub db: Database,
    failing: Mutex<HashSet<TableOp>>,
}

impl FlakyTables {
    pub fn new() -> Self {
        Self {
            db: Database::open_in_memory().expect("in-memory database"),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail(&self, op: TableOp) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: TableOp) {
        self.failing.lock().unwrap().remove(&op);
    }

    fn check(&self, op: TableOp) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(&op) {
            Err(injected(&format!("{:?}", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TableStore for FlakyTables {
    async fn insert_result_file(&self, new: NewResultFile) -> Result<ResultFileRecord, StoreError> {
        self.check(TableOp::InsertResultFile)?;
        self.db.insert_result_file(new).await
    }

    async fn insert_results(
        &self,
        result_file_id: &str,
        records: &[StudentResultRecord],
    ) -> Result<usize, StoreError> {
        self.check(TableOp::InsertResults)?;
        self.db.insert_results(result_file_id, records).await
    }

    async fn get_result_file(&self, id: &str) -> Result<Option<ResultFileRecord>, StoreError> {
        self.db.get_result_file(id).await
    }

    async fn list_result_files(&self) -> Result<Vec<ResultFileRecord>, StoreError> {
        self.db.list_result_files().await
    }

    async fn results_for_file(&self, result_file_id: &str) -> Result<Vec<StoredResult>, StoreError> {
        self.db.results_for_file(result_file_id).await
    }

    async fn results_for_candidate(
        &self,
        candidate_id: &str,
        exam_id: Option<&str>,
    ) -> Result<Vec<CandidateResult>, StoreError> {
        self.db.results_for_candidate(candidate_id, exam_id).await
    }

    async fn delete_results_for_file(&self, result_file_id: &str) -> Result<usize, StoreError> {
        self.check(TableOp::DeleteResults)?;
        self.db.delete_results_for_file(result_file_id).await
    }

    async fn delete_result_file(&self, id: &str) -> Result<(), StoreError> {
        self.check(TableOp::DeleteResultFile)?;
        self.db.delete_result_file(id).await
    }

    async fn insert_document(&self, new: NewDocument) -> Result<DocumentRecord, StoreError> {
        self.check(TableOp::InsertDocument)?;
        self.db.insert_document(new).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        self.db.get_document(id).await
    }

    async fn list_documents(&self, kind: Option<DocumentKind>) -> Result<Vec<DocumentRecord>, StoreError> {
        self.db.list_documents(kind).await
    }

    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        self.check(TableOp::DeleteDocument)?;
        self.db.delete_document(id).await
    }
}
