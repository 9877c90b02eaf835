//! Interaction persistence for Cadre using JSONL rollouts.

use cadre_rs_protocol::{AgentKind, InteractionId, InteractionRecord, InteractionStatus};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Partial update applied to a persisted interaction record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordUpdate {
    /// New agent kind, when classification resolved one.
    #[serde(default)]
    pub agent_kind: Option<AgentKind>,
    /// New response or error context.
    #[serde(default)]
    pub response: Option<String>,
    /// New lifecycle status.
    #[serde(default)]
    pub status: Option<InteractionStatus>,
    /// Timestamp of the mutation.
    pub updated_at: DateTime<Utc>,
}

impl RecordUpdate {
    /// Capture the terminal fields of a finalized record.
    pub fn finalizing(record: &InteractionRecord) -> Self {
        Self {
            agent_kind: Some(record.agent_kind),
            response: record.response.clone(),
            status: Some(record.status),
            updated_at: record.updated_at,
        }
    }

    /// Apply this update onto a record.
    pub fn apply(&self, record: &mut InteractionRecord) {
        if let Some(agent_kind) = self.agent_kind {
            record.agent_kind = agent_kind;
        }
        if let Some(response) = &self.response {
            record.response = Some(response.clone());
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        record.updated_at = self.updated_at;
    }
}

/// Persistent store abstraction for interaction records.
pub trait RecordStore: Send + Sync {
    /// Persist a newly created record.
    fn create_record(&self, record: &InteractionRecord) -> Result<(), StateError>;
    /// Apply a partial update to a record by id.
    fn update_record(&self, id: InteractionId, update: &RecordUpdate) -> Result<(), StateError>;
    /// Load a record by id.
    fn load_record(&self, id: InteractionId) -> Result<Option<InteractionRecord>, StateError>;
    /// Return the most recently updated record.
    fn latest_record(&self) -> Result<Option<InteractionRecord>, StateError>;
    /// List all records, most recently updated first.
    fn list_records(&self) -> Result<Vec<InteractionRecord>, StateError>;
    /// Delete a record and its backing storage.
    fn delete_record(&self, id: InteractionId) -> Result<bool, StateError>;
}

/// Errors returned by the record store.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported schema version: {0}")]
    UnsupportedSchema(u32),
    #[error("missing record metadata")]
    MissingMetadata,
    #[error("record already exists: {0}")]
    RecordExists(InteractionId),
    #[error("unknown record: {0}")]
    UnknownRecord(InteractionId),
}

/// Internal JSONL event representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RolloutEvent {
    SchemaVersion { version: u32 },
    Created { record: InteractionRecord },
    Updated { update: RecordUpdate },
}

#[derive(Default)]
struct RolloutState {
    version: Option<u32>,
    record: Option<InteractionRecord>,
}

impl RolloutState {
    fn apply(&mut self, event: RolloutEvent) -> Result<(), StateError> {
        match event {
            RolloutEvent::SchemaVersion { version } => {
                self.version = Some(version);
                if version > 1 {
                    return Err(StateError::UnsupportedSchema(version));
                }
            }
            RolloutEvent::Created { record } => {
                self.record = Some(record);
            }
            RolloutEvent::Updated { update } => {
                if let Some(record) = self.record.as_mut() {
                    update.apply(record);
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<InteractionRecord, StateError> {
        let _ = self.version.ok_or(StateError::MissingMetadata)?;
        self.record.ok_or(StateError::MissingMetadata)
    }
}

/// JSONL-backed record store implementation.
///
/// Each record owns one append-only rollout file, so concurrent invocations
/// never contend on each other's records beyond the short write lock.
pub struct JsonlRecordStore {
    /// Root directory for interaction rollouts.
    root: PathBuf,
    /// Serialize write access to rollout files.
    write_lock: Mutex<()>,
}

impl JsonlRecordStore {
    /// Create a new JSONL store under the given root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StateError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!("initialized JSONL record store (root={})", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Build the rollout file path for a record.
    fn rollout_path(&self, id: InteractionId) -> PathBuf {
        self.root.join(format!("{id}.jsonl"))
    }

    /// Append an event to an existing rollout file.
    fn write_event(&self, id: InteractionId, event: &RolloutEvent) -> Result<(), StateError> {
        let _guard = self.write_lock.lock();
        let path = self.rollout_path(id);
        if !path.exists() {
            return Err(StateError::UnknownRecord(id));
        }
        let mut file = OpenOptions::new().append(true).open(path)?;
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Create a new rollout file and write the initial event.
    fn write_new_rollout(&self, id: InteractionId, event: &RolloutEvent) -> Result<(), StateError> {
        let _guard = self.write_lock.lock();
        let path = self.rollout_path(id);
        if path.exists() {
            return Err(StateError::RecordExists(id));
        }
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)?;
        let header = serde_json::to_string(&RolloutEvent::SchemaVersion { version: 1 })?;
        writeln!(file, "{header}")?;
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Read and reconstruct a record from its rollout file.
    fn read_rollout(&self, id: InteractionId) -> Result<Option<InteractionRecord>, StateError> {
        let path = self.rollout_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let file = OpenOptions::new().read(true).open(&path)?;
        let reader = BufReader::new(file);
        let mut rollout = RolloutState::default();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: RolloutEvent = serde_json::from_str(&line)?;
            rollout.apply(event)?;
        }
        Ok(Some(rollout.finish()?))
    }
}

impl RecordStore for JsonlRecordStore {
    /// Persist record creation as a rollout event.
    fn create_record(&self, record: &InteractionRecord) -> Result<(), StateError> {
        info!(
            "recording interaction creation (interaction_id={}, message_len={})",
            record.id,
            record.message.len()
        );
        let event = RolloutEvent::Created {
            record: record.clone(),
        };
        self.write_new_rollout(record.id, &event)
    }

    /// Append an update event to a record rollout.
    fn update_record(&self, id: InteractionId, update: &RecordUpdate) -> Result<(), StateError> {
        debug!(
            "appending update event (interaction_id={}, status={:?})",
            id, update.status
        );
        let event = RolloutEvent::Updated {
            update: update.clone(),
        };
        self.write_event(id, &event)
    }

    /// Load a record from its rollout file.
    fn load_record(&self, id: InteractionId) -> Result<Option<InteractionRecord>, StateError> {
        self.read_rollout(id)
    }

    /// Return the most recently updated record by scanning rollouts.
    fn latest_record(&self) -> Result<Option<InteractionRecord>, StateError> {
        Ok(self.list_records()?.into_iter().next())
    }

    /// List all records by scanning rollout files.
    fn list_records(&self) -> Result<Vec<InteractionRecord>, StateError> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
                continue;
            }
            let file_name = match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(name) => name,
                None => continue,
            };
            let id = match Uuid::parse_str(file_name) {
                Ok(id) => id,
                Err(_) => continue,
            };
            if let Some(record) = self.read_rollout(id)? {
                records.push(record);
            }
        }
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// Delete the rollout file for a record.
    fn delete_record(&self, id: InteractionId) -> Result<bool, StateError> {
        let path = self.rollout_path(id);
        if path.exists() {
            info!("deleting interaction rollout (interaction_id={})", id);
            fs::remove_file(path)?;
            Ok(true)
        } else {
            warn!("interaction rollout not found (interaction_id={})", id);
            Ok(false)
        }
    }
}
