//! SQLite implementation of the portal tables and of the session lookup.
//!
//! A single connection is shared behind a mutex. Foreign keys are enabled, so
//! the database itself refuses a result row whose parent file does not exist
//! and a parent file that still has results.

use super::{StoreError, TableStore};
use crate::identity::IdentityProvider;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::model::document::{DocumentKind, DocumentRecord, NewDocument};
use common::model::result::{CandidateResult, StoredResult, StudentResultRecord};
use common::model::result_file::{NewResultFile, ResultFileRecord};
use common::model::session::{Role, Session};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS result_files (
        id            TEXT PRIMARY KEY,
        file_name     TEXT NOT NULL,
        file_path     TEXT NOT NULL,
        exam_id       TEXT NOT NULL,
        exam_date     TEXT NOT NULL,
        total_results INTEGER NOT NULL,
        uploaded_by   TEXT NOT NULL,
        uploaded_at   TEXT NOT NULL,
        content_md5   TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS student_results (
        id             TEXT PRIMARY KEY,
        result_file_id TEXT NOT NULL REFERENCES result_files(id),
        candidate_id   TEXT NOT NULL,
        exam_id        TEXT NOT NULL,
        exam_mark      REAL,
        exam_rank      TEXT NOT NULL,
        percentage     REAL
    );
    CREATE INDEX IF NOT EXISTS idx_student_results_file ON student_results(result_file_id);
    CREATE INDEX IF NOT EXISTS idx_student_results_candidate ON student_results(candidate_id);

    CREATE TABLE IF NOT EXISTS documents (
        id          TEXT PRIMARY KEY,
        kind        TEXT NOT NULL,
        title       TEXT NOT NULL,
        description TEXT,
        file_name   TEXT NOT NULL,
        file_path   TEXT NOT NULL,
        uploaded_by TEXT NOT NULL,
        uploaded_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sessions (
        token   TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        email   TEXT NOT NULL,
        role    TEXT NOT NULL
    );
";

const RESULT_FILE_COLUMNS: &str =
    "id, file_name, file_path, exam_id, exam_date, total_results, uploaded_by, uploaded_at, content_md5";

const DOCUMENT_COLUMNS: &str =
    "id, kind, title, description, file_name, file_path, uploaded_by, uploaded_at";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }

    /// Creates or replaces the session behind `token`.
    pub fn upsert_session(&self, token: &str, session: &Session) -> Result<(), StoreError> {
        self.lock()?.execute(
            "INSERT OR REPLACE INTO sessions (token, user_id, email, role) VALUES (?1, ?2, ?3, ?4)",
            params![token, session.user_id, session.email, session.role.as_str()],
        )?;
        Ok(())
    }
}

fn nan_to_null(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

fn result_file_from_row(row: &Row<'_>) -> rusqlite::Result<ResultFileRecord> {
    Ok(ResultFileRecord {
        id: row.get(0)?,
        file_name: row.get(1)?,
        file_path: row.get(2)?,
        exam_id: row.get(3)?,
        exam_date: row.get(4)?,
        total_results: row.get(5)?,
        uploaded_by: row.get(6)?,
        uploaded_at: row.get(7)?,
        content_md5: row.get(8)?,
    })
}

/// Reads `id, result_file_id, candidate_id, exam_id, exam_mark, exam_rank,
/// percentage` starting at column 0.
fn stored_result_from_row(row: &Row<'_>) -> rusqlite::Result<StoredResult> {
    Ok(StoredResult {
        id: row.get(0)?,
        result_file_id: row.get(1)?,
        record: StudentResultRecord {
            candidate_id: row.get(2)?,
            exam_id: row.get(3)?,
            exam_mark: row.get::<_, Option<f64>>(4)?.unwrap_or(f64::NAN),
            exam_rank: row.get(5)?,
            percentage: row.get::<_, Option<f64>>(6)?.unwrap_or(f64::NAN),
        },
    })
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    let kind: String = row.get(1)?;
    let kind = DocumentKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown document kind '{}'", kind).into(),
        )
    })?;
    Ok(DocumentRecord {
        id: row.get(0)?,
        kind,
        title: row.get(2)?,
        description: row.get(3)?,
        file_name: row.get(4)?,
        file_path: row.get(5)?,
        uploaded_by: row.get(6)?,
        uploaded_at: row.get(7)?,
    })
}

#[async_trait]
impl TableStore for Database {
    async fn insert_result_file(&self, new: NewResultFile) -> Result<ResultFileRecord, StoreError> {
        let record = ResultFileRecord {
            id: Uuid::new_v4().to_string(),
            file_name: new.file_name,
            file_path: new.file_path,
            exam_id: new.exam_id,
            exam_date: new.exam_date,
            total_results: new.total_results,
            uploaded_by: new.uploaded_by,
            uploaded_at: Utc::now(),
            content_md5: new.content_md5,
        };
        self.lock()?.execute(
            &format!(
                "INSERT INTO result_files ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                RESULT_FILE_COLUMNS
            ),
            params![
                record.id,
                record.file_name,
                record.file_path,
                record.exam_id,
                record.exam_date,
                record.total_results,
                record.uploaded_by,
                record.uploaded_at,
                record.content_md5,
            ],
        )?;
        Ok(record)
    }

    async fn insert_results(
        &self,
        result_file_id: &str,
        records: &[StudentResultRecord],
    ) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO student_results
                    (id, result_file_id, candidate_id, exam_id, exam_mark, exam_rank, percentage)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for record in records {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    result_file_id,
                    record.candidate_id,
                    record.exam_id,
                    nan_to_null(record.exam_mark),
                    record.exam_rank,
                    nan_to_null(record.percentage),
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    async fn get_result_file(&self, id: &str) -> Result<Option<ResultFileRecord>, StoreError> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM result_files WHERE id = ?1", RESULT_FILE_COLUMNS),
                params![id],
                result_file_from_row,
            )
            .optional()?;
        Ok(record)
    }

    async fn list_result_files(&self) -> Result<Vec<ResultFileRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM result_files ORDER BY uploaded_at DESC",
            RESULT_FILE_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], result_file_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn results_for_file(&self, result_file_id: &str) -> Result<Vec<StoredResult>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, result_file_id, candidate_id, exam_id, exam_mark, exam_rank, percentage
             FROM student_results WHERE result_file_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![result_file_id], stored_result_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn results_for_candidate(
        &self,
        candidate_id: &str,
        exam_id: Option<&str>,
    ) -> Result<Vec<CandidateResult>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.result_file_id, r.candidate_id, r.exam_id, r.exam_mark, r.exam_rank,
                    r.percentage, f.exam_date
             FROM student_results r
             JOIN result_files f ON f.id = r.result_file_id
             WHERE r.candidate_id = ?1 AND (?2 IS NULL OR r.exam_id = ?2)
             ORDER BY f.exam_date DESC, r.rowid",
        )?;
        let rows = stmt
            .query_map(params![candidate_id, exam_id], |row| {
                Ok(CandidateResult {
                    result: stored_result_from_row(row)?,
                    exam_date: row.get::<_, NaiveDate>(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn delete_results_for_file(&self, result_file_id: &str) -> Result<usize, StoreError> {
        let deleted = self.lock()?.execute(
            "DELETE FROM student_results WHERE result_file_id = ?1",
            params![result_file_id],
        )?;
        Ok(deleted)
    }

    async fn delete_result_file(&self, id: &str) -> Result<(), StoreError> {
        self.lock()?
            .execute("DELETE FROM result_files WHERE id = ?1", params![id])?;
        Ok(())
    }

    async fn insert_document(&self, new: NewDocument) -> Result<DocumentRecord, StoreError> {
        let record = DocumentRecord {
            id: Uuid::new_v4().to_string(),
            kind: new.kind,
            title: new.title,
            description: new.description,
            file_name: new.file_name,
            file_path: new.file_path,
            uploaded_by: new.uploaded_by,
            uploaded_at: Utc::now(),
        };
        self.lock()?.execute(
            &format!(
                "INSERT INTO documents ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                DOCUMENT_COLUMNS
            ),
            params![
                record.id,
                record.kind.as_str(),
                record.title,
                record.description,
                record.file_name,
                record.file_path,
                record.uploaded_by,
                record.uploaded_at,
            ],
        )?;
        Ok(record)
    }

    async fn get_document(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
                params![id],
                document_from_row,
            )
            .optional()?;
        Ok(record)
    }

    async fn list_documents(&self, kind: Option<DocumentKind>) -> Result<Vec<DocumentRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents WHERE (?1 IS NULL OR kind = ?1) ORDER BY uploaded_at DESC",
            DOCUMENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![kind.map(DocumentKind::as_str)], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        self.lock()?
            .execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for Database {
    async fn current_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT user_id, email, role FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.and_then(|(user_id, email, role)| match Role::parse(&role) {
            Some(role) => Some(Session { user_id, email, role }),
            None => {
                warn!("Ignoring session of {} with unknown role '{}'", user_id, role);
                None
            }
        }))
    }
}
