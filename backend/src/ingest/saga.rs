use super::OrphanPolicy;
use crate::store::{ObjectStore, TableStore};
use log::{info, warn};
use serde::Serialize;

/// Something a completed upload step wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Orphan {
    /// An object store key.
    Object(String),
    /// A result file row, possibly with some child rows.
    ResultFile(String),
    /// A notice or study material row.
    Document(String),
}

/// Log of the writes done so far by a multi-step upload.
///
/// Call [`Saga::record`] after each successful step. When a later step fails,
/// [`Saga::abort`] applies the configured [`OrphanPolicy`] and returns what is
/// left behind.
pub struct Saga<'a> {
    objects: &'a dyn ObjectStore,
    tables: &'a dyn TableStore,
    policy: OrphanPolicy,
    completed: Vec<Orphan>,
}

impl<'a> Saga<'a> {
    pub fn new(objects: &'a dyn ObjectStore, tables: &'a dyn TableStore, policy: OrphanPolicy) -> Self {
        Self {
            objects,
            tables,
            policy,
            completed: Vec::new(),
        }
    }

    pub fn record(&mut self, artifact: Orphan) {
        self.completed.push(artifact);
    }

    /// Undoes (or keeps) the completed steps, newest first. Compensation stops
    /// at the first step that cannot be undone.
    pub async fn abort(self) -> Vec<Orphan> {
        match self.policy {
            OrphanPolicy::Keep => {
                for orphan in &self.completed {
                    warn!("Upload aborted, leaving {:?} in place", orphan);
                }
                self.completed
            }
            OrphanPolicy::Compensate => {
                // Older steps stay in place once an undo fails: removing an
                // object still referenced by a surviving row would break it.
                let mut completed = self.completed;
                while let Some(artifact) = completed.pop() {
                    if Self::undo(self.objects, self.tables, &artifact).await {
                        info!("Compensated {:?}", artifact);
                    } else {
                        completed.push(artifact);
                        for orphan in &completed {
                            warn!("Compensation stopped, leaving {:?} in place", orphan);
                        }
                        return completed;
                    }
                }
                Vec::new()
            }
        }
    }

    async fn undo(objects: &dyn ObjectStore, tables: &dyn TableStore, artifact: &Orphan) -> bool {
        let outcome = match artifact {
            Orphan::Object(key) => objects.remove(std::slice::from_ref(key)).await,
            Orphan::ResultFile(id) => match tables.delete_results_for_file(id).await {
                Ok(_) => tables.delete_result_file(id).await,
                Err(e) => Err(e),
            },
            Orphan::Document(id) => tables.delete_document(id).await,
        };
        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not compensate {:?}: {}", artifact, e);
                false
            }
        }
    }
}
