//! Delegation pipeline: classify, dispatch, record, broadcast.

use crate::classifier::AgentClassifier;
use crate::dispatcher::AgentDispatcher;
use crate::error::CadreCoreError;
use crate::interactions::InteractionLog;
use crate::state::{JsonlRecordStore, RecordStore};
use cadre_rs_config::InteractionsConfig;
use cadre_rs_llm::CompletionClient;
use cadre_rs_protocol::{
    EventMsg, EventPayload, EventSink, InteractionId, InteractionRecord,
};
use directories::BaseDirs;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// Coordinates the full lifecycle of an inbound message.
///
/// Every accepted message gets one record, one terminal transition, and one
/// finished event, in that order.
#[derive(Clone)]
pub struct Delegator {
    classifier: AgentClassifier,
    dispatcher: AgentDispatcher,
    log: InteractionLog,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl Delegator {
    /// Create a delegator sharing one completion client across stages.
    pub fn new(completion: Arc<dyn CompletionClient>, log: InteractionLog) -> Self {
        Self {
            classifier: AgentClassifier::new(completion.clone()),
            dispatcher: AgentDispatcher::new(completion),
            log,
            event_sink: None,
        }
    }

    /// Attach an event sink notified once per finalized interaction.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Process one message end to end and return its finalized record.
    ///
    /// Classification and dispatch failures finalize the record as `Failed`
    /// rather than erroring; only a storage failure before the record exists
    /// is returned to the caller.
    pub async fn handle(&self, message: String) -> Result<InteractionRecord, CadreCoreError> {
        let mut record = InteractionRecord::new(message);
        info!(
            "handling message (interaction_id={}, message_len={})",
            record.id,
            record.message.len()
        );
        self.log.create(&record)?;

        match self.classifier.classify(&record.message).await {
            Ok(kind) => match self.dispatcher.dispatch(kind, &record.message).await {
                // A terminal record always carries a non-empty response.
                Ok(response) if response.trim().is_empty() => {
                    let err =
                        CadreCoreError::Dispatch("blank response from specialist".to_string());
                    error!("dispatch failed (interaction_id={}): {err}", record.id);
                    record.fail(err.to_string());
                }
                Ok(response) => {
                    debug!(
                        "dispatch succeeded (interaction_id={}, agent_kind={})",
                        record.id, kind
                    );
                    record.complete(kind, response);
                }
                Err(err) => {
                    error!("dispatch failed (interaction_id={}): {err}", record.id);
                    record.fail(err.to_string());
                }
            },
            Err(err) => {
                error!("classification failed (interaction_id={}): {err}", record.id);
                record.fail(err.to_string());
            }
        }

        if let Err(err) = self.log.finalize(&record) {
            warn!(
                "failed to persist interaction outcome (interaction_id={}): {err}",
                record.id
            );
        }
        self.emit_finished(&record);
        Ok(record)
    }

    /// Fetch a finalized or in-flight interaction by id.
    pub fn get_interaction(&self, id: InteractionId) -> Result<InteractionRecord, CadreCoreError> {
        self.log.get(id)
    }

    /// Return the most recently updated interaction, if any.
    pub fn latest_interaction(&self) -> Result<Option<InteractionRecord>, CadreCoreError> {
        self.log.latest()
    }

    /// List all interactions, most recently updated first.
    pub fn list_interactions(&self) -> Result<Vec<InteractionRecord>, CadreCoreError> {
        self.log.list()
    }

    /// Delete an interaction and its persisted state.
    pub fn delete_interaction(&self, id: InteractionId) -> Result<bool, CadreCoreError> {
        self.log.delete(id)
    }

    /// Emit the finished event for a terminal record.
    fn emit_finished(&self, record: &InteractionRecord) {
        if let Some(sink) = &self.event_sink {
            sink.emit(EventMsg::new(
                record.id,
                EventPayload::InteractionFinished {
                    record: record.clone(),
                },
            ));
        }
    }
}

/// Build the default JSONL record store from config and platform defaults.
pub fn build_default_record_store(
    config: &InteractionsConfig,
) -> Result<Arc<dyn RecordStore>, CadreCoreError> {
    let root = resolve_default_root(config.path.as_ref(), "interactions")?;
    info!("initializing record store (root={})", root.display());
    let store =
        JsonlRecordStore::new(root).map_err(|err| CadreCoreError::State(err.to_string()))?;
    Ok(Arc::new(store))
}

/// Resolve an absolute storage root for config-specified paths.
fn resolve_default_root(
    path: Option<&String>,
    fallback_dir: &str,
) -> Result<PathBuf, CadreCoreError> {
    let cwd = std::env::current_dir().map_err(CadreCoreError::Io)?;
    if let Some(path) = path {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            debug!("using absolute storage root: {}", path.display());
            return Ok(path);
        }
        debug!(
            "resolving storage root relative to cwd: {}",
            cwd.join(&path).display()
        );
        return Ok(cwd.join(path));
    }

    if let Some(home) = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()) {
        debug!(
            "resolving storage root under home: {}",
            home.join(".cadre").join(fallback_dir).display()
        );
        return Ok(home.join(".cadre").join(fallback_dir));
    }

    Ok(cwd.join(".cadre").join(fallback_dir))
}
