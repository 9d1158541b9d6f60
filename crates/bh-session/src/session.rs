//! Explicit session context handed to each flow.

use std::path::PathBuf;
use std::sync::Arc;

use bh_core::ModelId;
use tracing::{debug, warn};

use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// Storage key holding the most recently uploaded model.
pub const MODEL_ID_KEY: &str = "modelId";

/// Handle on the persisted session state.
///
/// Storage failures never surface to callers: reads degrade to "absent" and
/// writes are dropped, both with a warning. The identifier can always be
/// recovered by uploading again.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session persisted as plain-text files under `state_dir`.
    pub fn persistent(state_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(state_dir)))
    }

    /// Session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn model_id(&self) -> Option<ModelId> {
        match self.store.get(MODEL_ID_KEY) {
            Ok(Some(raw)) => {
                let parsed = ModelId::from_input(&raw);
                if parsed.is_none() {
                    debug!("Stored model ID is blank; treating as absent");
                }
                parsed
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Session storage unavailable, model ID treated as absent: {}", e);
                None
            }
        }
    }

    pub fn set_model_id(&self, id: &ModelId) {
        if let Err(e) = self.store.set(MODEL_ID_KEY, id.as_str()) {
            warn!("Session storage unavailable, model ID {} not persisted: {}", id, e);
        }
    }

    pub fn clear_model_id(&self) {
        if let Err(e) = self.store.remove(MODEL_ID_KEY) {
            warn!("Session storage unavailable, model ID not cleared: {}", e);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_has_no_model() {
        assert_eq!(Session::in_memory().model_id(), None);
    }

    #[test]
    fn last_write_wins() {
        let session = Session::in_memory();
        session.set_model_id(&ModelId::parse("first").unwrap());
        session.set_model_id(&ModelId::parse("second").unwrap());
        assert_eq!(session.model_id().unwrap().as_str(), "second");
    }

    #[test]
    fn blank_stored_value_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set(MODEL_ID_KEY, "   ").unwrap();
        let session = Session::new(store);
        assert_eq!(session.model_id(), None);
    }

    #[test]
    fn clones_share_storage() {
        let session = Session::in_memory();
        let other = session.clone();
        session.set_model_id(&ModelId::parse("shared").unwrap());
        assert_eq!(other.model_id().unwrap().as_str(), "shared");
        other.clear_model_id();
        assert_eq!(session.model_id(), None);
    }
}
