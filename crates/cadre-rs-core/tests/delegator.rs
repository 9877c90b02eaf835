//! Delegator integration tests with fake completion clients.

use cadre_rs_core::{
    CadreCoreError, Delegator, InteractionLog, JsonlRecordStore, RecordStore, RecordUpdate,
    StateError,
};
use cadre_rs_protocol::{
    AgentKind, EventPayload, InteractionId, InteractionRecord, InteractionStatus,
};
use cadre_rs_test_utils::{CapturingSink, FailingCompletion, ScriptedCompletion};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

/// Store whose create always fails, simulating an unwritable disk.
struct BrokenStore;

impl RecordStore for BrokenStore {
    fn create_record(&self, _record: &InteractionRecord) -> Result<(), StateError> {
        Err(StateError::Io(std::io::Error::other("disk full")))
    }

    fn update_record(&self, _id: InteractionId, _update: &RecordUpdate) -> Result<(), StateError> {
        Err(StateError::Io(std::io::Error::other("disk full")))
    }

    fn load_record(&self, _id: InteractionId) -> Result<Option<InteractionRecord>, StateError> {
        Ok(None)
    }

    fn latest_record(&self) -> Result<Option<InteractionRecord>, StateError> {
        Ok(None)
    }

    fn list_records(&self) -> Result<Vec<InteractionRecord>, StateError> {
        Ok(Vec::new())
    }

    fn delete_record(&self, _id: InteractionId) -> Result<bool, StateError> {
        Ok(false)
    }
}

/// A classifiable message should complete with the specialist's response.
#[tokio::test]
async fn handle_completes_classified_message() {
    let completion = Arc::new(ScriptedCompletion::new([
        "code_reviewer",
        "the error handling in this diff swallows failures",
    ]));
    let sink = Arc::new(CapturingSink::new());
    let delegator =
        Delegator::new(completion, InteractionLog::new(None)).with_event_sink(sink.clone());

    let record = delegator
        .handle("please review this pull request".to_string())
        .await
        .expect("handle");

    assert_eq!(record.status, InteractionStatus::Completed);
    assert_eq!(record.agent_kind, AgentKind::CodeReviewer);
    assert_eq!(
        record.response.as_deref(),
        Some("the error handling in this diff swallows failures")
    );
    assert!(record.updated_at >= record.created_at);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].interaction_id, record.id);
    let EventPayload::InteractionFinished { record: broadcast } = &events[0].payload;
    assert_eq!(broadcast, &record);
}

/// Classification failures finalize the record as failed, not as an error.
#[tokio::test]
async fn handle_records_classification_failure() {
    let sink = Arc::new(CapturingSink::new());
    let delegator = Delegator::new(
        Arc::new(FailingCompletion::new("API Error")),
        InteractionLog::new(None),
    )
    .with_event_sink(sink.clone());

    let record = delegator.handle("hello".to_string()).await.expect("handle");

    assert_eq!(record.status, InteractionStatus::Failed);
    assert_eq!(record.agent_kind, AgentKind::Supervisor);
    let response = record.response.as_deref().expect("error context");
    assert!(response.contains("classification error"), "got: {response}");
    assert!(response.contains("API Error"), "got: {response}");

    // A failed interaction still broadcasts exactly once.
    assert_eq!(sink.events().len(), 1);
}

/// Unrecognized classification labels route to the supervisor.
#[tokio::test]
async fn handle_routes_unknown_labels_to_supervisor() {
    let completion = Arc::new(ScriptedCompletion::new(["astrologer", "happy to help"]));
    let delegator = Delegator::new(completion, InteractionLog::new(None));

    let record = delegator
        .handle("tell me about my day".to_string())
        .await
        .expect("handle");

    assert_eq!(record.status, InteractionStatus::Completed);
    assert_eq!(record.agent_kind, AgentKind::Supervisor);
    assert_eq!(record.response.as_deref(), Some("happy to help"));
}

/// Dispatch failures after a successful classification finalize as failed.
#[tokio::test]
async fn handle_records_dispatch_failure() {
    let completion = Arc::new(ScriptedCompletion::new(["debugger"]));
    completion.push_error("API Error");
    let sink = Arc::new(CapturingSink::new());
    let delegator =
        Delegator::new(completion, InteractionLog::new(None)).with_event_sink(sink.clone());

    let record = delegator
        .handle("why does this panic".to_string())
        .await
        .expect("handle");

    assert_eq!(record.status, InteractionStatus::Failed);
    let response = record.response.as_deref().expect("error context");
    assert!(response.contains("dispatch error"), "got: {response}");
    assert!(response.contains("API Error"), "got: {response}");
    assert_eq!(sink.events().len(), 1);
}

/// A blank specialist response finalizes as failed, never as completed.
#[tokio::test]
async fn handle_rejects_blank_dispatch_responses() {
    let completion = Arc::new(ScriptedCompletion::new(["debugger", "   "]));
    let sink = Arc::new(CapturingSink::new());
    let delegator =
        Delegator::new(completion, InteractionLog::new(None)).with_event_sink(sink.clone());

    let record = delegator
        .handle("why is this empty".to_string())
        .await
        .expect("handle");

    assert_eq!(record.status, InteractionStatus::Failed);
    let response = record.response.as_deref().expect("error context");
    assert!(!response.trim().is_empty());
    assert!(response.contains("dispatch error"), "got: {response}");
    assert!(response.contains("blank response"), "got: {response}");
    assert_eq!(sink.events().len(), 1);
}

/// Storage failure before the record exists is the one path that errors.
#[tokio::test]
async fn handle_propagates_create_store_failure() {
    let completion = Arc::new(ScriptedCompletion::new(["supervisor", "never reached"]));
    let sink = Arc::new(CapturingSink::new());
    let delegator = Delegator::new(completion, InteractionLog::new(Some(Arc::new(BrokenStore))))
        .with_event_sink(sink.clone());

    let err = delegator
        .handle("hello".to_string())
        .await
        .expect_err("store failure");
    match err {
        CadreCoreError::State(message) => assert!(message.contains("disk full"), "got: {message}"),
        other => panic!("unexpected error: {other:?}"),
    }

    // Nothing was accepted, so nothing broadcasts.
    assert_eq!(sink.events().len(), 0);
}

/// Each message gets its own record and its own finished event.
#[tokio::test]
async fn handle_creates_one_record_per_message() {
    let completion = Arc::new(ScriptedCompletion::new([
        "optimizer",
        "batch the writes",
        "debugger",
        "check the lock ordering",
    ]));
    let sink = Arc::new(CapturingSink::new());
    let delegator =
        Delegator::new(completion, InteractionLog::new(None)).with_event_sink(sink.clone());

    let first = delegator
        .handle("this loop is slow".to_string())
        .await
        .expect("first");
    let second = delegator
        .handle("this deadlocks".to_string())
        .await
        .expect("second");
    assert_ne!(first.id, second.id);

    let records = delegator.list_interactions().expect("list");
    assert_eq!(records.len(), 2);
    let latest = delegator.latest_interaction().expect("latest").expect("record");
    assert_eq!(latest.id, second.id);
    assert_eq!(sink.events().len(), 2);
}

/// Finalized records survive a reload from the persistent store.
#[tokio::test]
async fn handle_persists_terminal_records() {
    let root = tempdir().expect("root");
    let store = JsonlRecordStore::new(root.path()).expect("store");
    let completion = Arc::new(ScriptedCompletion::new(["optimizer", "cache the result"]));
    let delegator = Delegator::new(completion, InteractionLog::new(Some(Arc::new(store))));

    let record = delegator
        .handle("make this faster".to_string())
        .await
        .expect("handle");
    assert_eq!(record.status, InteractionStatus::Completed);

    let log = InteractionLog::new(Some(Arc::new(
        JsonlRecordStore::new(root.path()).expect("store"),
    )));
    let reloaded = log.get(record.id).expect("reload");
    assert_eq!(reloaded, record);
    assert!(reloaded.is_terminal());
}
