//! Tracks which uploads are currently running.
//!
//! The browser disables its submit button while an upload is in flight, but a
//! second tab or a replayed request would still reach the server. This
//! registry gives the same single-flight rule per uploader on the server side:
//! while a user holds an [`UploadSlot`], a second upload by that user is
//! refused instead of queued.
//!
//! - `UploadsState`: a clonable, thread-safe set of uploader ids, injected into
//!   the Actix application state through `AppState`.
//! - `UploadSlot`: returned by `try_acquire`; the uploader id is released when
//!   the slot is dropped, whichever way the upload ended.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Default)]
pub struct UploadsState {
    /// User ids with an upload in progress.
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Proof that the holder is the only upload running for `uploader`.
pub struct UploadSlot {
    state: UploadsState,
    uploader: String,
}

impl UploadsState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // the set stays consistent even if a holder panicked
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claims the upload slot of `uploader`, or `None` if it is taken.
    pub fn try_acquire(&self, uploader: &str) -> Option<UploadSlot> {
        if self.lock().insert(uploader.to_string()) {
            Some(UploadSlot {
                state: self.clone(),
                uploader: uploader.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_uploading(&self, uploader: &str) -> bool {
        self.lock().contains(uploader)
    }
}

impl Drop for UploadSlot {
    fn drop(&mut self) {
        self.state.lock().remove(&self.uploader);
    }
}
