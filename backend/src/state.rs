use crate::config::IngestSettings;
use crate::identity::IdentityProvider;
use crate::store::{ObjectStore, TableStore};
use crate::upload_controller::state::UploadsState;
use std::sync::Arc;

/// Shared application state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub objects: Arc<dyn ObjectStore>,
    pub tables: Arc<dyn TableStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub uploads: UploadsState,
    pub ingest: IngestSettings,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        tables: Arc<dyn TableStore>,
        identity: Arc<dyn IdentityProvider>,
        ingest: IngestSettings,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            objects,
            tables,
            identity,
            uploads: UploadsState::new(),
            ingest,
            max_upload_bytes,
        }
    }
}
