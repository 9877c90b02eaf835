//! In-memory interaction log with optional persistence via RecordStore.

use crate::error::CadreCoreError;
use crate::state::{RecordStore, RecordUpdate};
use cadre_rs_protocol::{InteractionId, InteractionRecord};
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Interaction storage facade used by the delegator and API handlers.
#[derive(Clone)]
pub struct InteractionLog {
    /// In-memory record cache.
    records: Arc<RwLock<HashMap<InteractionId, InteractionRecord>>>,
    /// Optional persistent store for records.
    record_store: Option<Arc<dyn RecordStore>>,
}

impl InteractionLog {
    /// Create a new interaction log with an optional backing store.
    pub fn new(record_store: Option<Arc<dyn RecordStore>>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            record_store,
        }
    }

    /// Record a freshly created interaction, persisting it if configured.
    pub fn create(&self, record: &InteractionRecord) -> Result<(), CadreCoreError> {
        info!(
            "created interaction (interaction_id={}, message_len={})",
            record.id,
            record.message.len()
        );

        if let Some(store) = &self.record_store {
            store
                .create_record(record)
                .map_err(|err| CadreCoreError::State(err.to_string()))?;
        }

        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    /// Record the terminal outcome of an interaction.
    pub fn finalize(&self, record: &InteractionRecord) -> Result<(), CadreCoreError> {
        debug!(
            "finalizing interaction (interaction_id={}, status={})",
            record.id,
            record.status.as_str()
        );

        if let Some(store) = &self.record_store {
            let update = RecordUpdate::finalizing(record);
            store
                .update_record(record.id, &update)
                .map_err(|err| CadreCoreError::State(err.to_string()))?;
        }

        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    /// Fetch an interaction from cache or persistent store.
    pub fn get(&self, id: InteractionId) -> Result<InteractionRecord, CadreCoreError> {
        if let Some(record) = self.records.read().get(&id).cloned() {
            return Ok(record);
        }

        if let Some(store) = &self.record_store
            && let Some(record) = store
                .load_record(id)
                .map_err(|err| CadreCoreError::State(err.to_string()))?
        {
            debug!("loaded interaction from store (interaction_id={})", id);
            self.records.write().insert(id, record.clone());
            return Ok(record);
        }

        Err(CadreCoreError::UnknownInteraction(id))
    }

    /// Return the most recently updated interaction, if any.
    pub fn latest(&self) -> Result<Option<InteractionRecord>, CadreCoreError> {
        if let Some(store) = &self.record_store {
            return store
                .latest_record()
                .map_err(|err| CadreCoreError::State(err.to_string()));
        }

        Ok(self
            .records
            .read()
            .values()
            .max_by_key(|record| record.updated_at)
            .cloned())
    }

    /// List all interactions, most recently updated first.
    pub fn list(&self) -> Result<Vec<InteractionRecord>, CadreCoreError> {
        if let Some(store) = &self.record_store {
            return store
                .list_records()
                .map_err(|err| CadreCoreError::State(err.to_string()));
        }

        let mut records: Vec<InteractionRecord> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// Delete an interaction from cache and persistence.
    pub fn delete(&self, id: InteractionId) -> Result<bool, CadreCoreError> {
        info!("deleting interaction (interaction_id={})", id);
        let mut removed = self.records.write().remove(&id).is_some();
        if let Some(store) = &self.record_store {
            let deleted = store
                .delete_record(id)
                .map_err(|err| CadreCoreError::State(err.to_string()))?;
            removed = removed || deleted;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::InteractionLog;
    use crate::state::JsonlRecordStore;
    use cadre_rs_protocol::{AgentKind, InteractionRecord, InteractionStatus};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn interaction_log_in_memory_lists_records() {
        let log = InteractionLog::new(None);
        let record = InteractionRecord::new("hello".to_string());
        log.create(&record).expect("create");
        let records = log.list().expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record.id);
        assert_eq!(records[0].status, InteractionStatus::Processing);
    }

    #[test]
    fn interaction_log_persists_and_reloads_records() {
        let root = tempdir().expect("root");
        let store = JsonlRecordStore::new(root.path()).expect("store");
        let log = InteractionLog::new(Some(Arc::new(store)));

        let mut record = InteractionRecord::new("debug my stack trace".to_string());
        log.create(&record).expect("create");
        record.complete(AgentKind::Debugger, "the bug is on line 3".to_string());
        log.finalize(&record).expect("finalize");

        let log = InteractionLog::new(Some(Arc::new(
            JsonlRecordStore::new(root.path()).expect("store"),
        )));
        let loaded = log.get(record.id).expect("get");
        assert_eq!(loaded, record);

        let latest = log.latest().expect("latest").expect("record");
        assert_eq!(latest.id, record.id);

        assert_eq!(log.delete(record.id).expect("delete"), true);
        let err = log.get(record.id).expect_err("missing");
        match err {
            crate::error::CadreCoreError::UnknownInteraction(id) => assert_eq!(id, record.id),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
