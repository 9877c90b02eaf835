//! Core delegation primitives for Cadre.
//!
//! This crate owns the interaction lifecycle, agent classification and
//! dispatch, and interaction persistence used by the server and SDK.

pub mod classifier;
pub mod delegator;
pub mod dispatcher;
pub mod error;
pub mod interactions;
pub mod state;

pub use cadre_rs_protocol::EventSink;
pub use classifier::AgentClassifier;
pub use delegator::{Delegator, build_default_record_store};
pub use dispatcher::AgentDispatcher;
pub use error::CadreCoreError;
pub use interactions::InteractionLog;
pub use state::{JsonlRecordStore, RecordStore, RecordUpdate, StateError};
