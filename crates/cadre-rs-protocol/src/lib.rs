//! Wire protocol types for Cadre interactions, events, and common types.

mod record;

pub use record::{AgentKind, InteractionRecord, InteractionStatus, UnknownAgentKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an interaction.
pub type InteractionId = Uuid;

/// Inbound message submission accepted by the delegation entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Raw user message text.
    pub message: String,
}

/// Success reply for a handled message.
///
/// The interaction carries its own terminal `status`; the outer envelope
/// only marks that the request itself was serviced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReply {
    /// Fixed envelope marker, always `success`.
    pub status: String,
    /// The finalized interaction record.
    pub interaction: InteractionRecord,
}

impl MessageReply {
    /// Wrap a finalized record in the success envelope.
    pub fn success(interaction: InteractionRecord) -> Self {
        Self {
            status: "success".to_string(),
            interaction,
        }
    }
}

/// Error reply used when no record could be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Human-readable error context.
    pub error: String,
}

/// Wrapper for events emitted on the broadcast channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMsg {
    /// Unique id for the event.
    pub id: Uuid,
    /// Interaction id associated with the event.
    pub interaction_id: InteractionId,
    /// Timestamp when the event was created.
    pub created_at: DateTime<Utc>,
    /// Event payload content.
    pub payload: EventPayload,
}

impl EventMsg {
    /// Build a new event for an interaction with a fresh id and timestamp.
    pub fn new(interaction_id: InteractionId, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            interaction_id,
            created_at: Utc::now(),
            payload,
        }
    }
}

/// All events emitted during delegation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum EventPayload {
    /// An interaction reached a terminal state; carries the full record.
    InteractionFinished { record: InteractionRecord },
}

/// Sink interface for delegation events.
///
/// Delivery is fire-and-forget: emitting never blocks and carries no
/// acknowledgment contract.
pub trait EventSink: Send + Sync {
    /// Emit an event to downstream listeners.
    fn emit(&self, event: EventMsg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn event_payload_round_trips_through_json() {
        let record = InteractionRecord::new("review this".to_string());
        let event = EventMsg::new(
            record.id,
            EventPayload::InteractionFinished { record },
        );
        let encoded = serde_json::to_value(&event).expect("serialize");
        assert_eq!(encoded["payload"]["type"], json!("interaction_finished"));
        let decoded: EventMsg = serde_json::from_value(encoded.clone()).expect("deserialize");
        let decoded_value = serde_json::to_value(decoded).expect("serialize decoded");
        assert_eq!(decoded_value, encoded);
    }

    #[test]
    fn message_reply_wraps_record_under_success_envelope() {
        let mut record = InteractionRecord::new("hello".to_string());
        record.complete(AgentKind::Debugger, "diagnosis".to_string());
        let reply = MessageReply::success(record);
        let encoded = serde_json::to_value(&reply).expect("serialize");
        assert_eq!(encoded["status"], json!("success"));
        assert_eq!(encoded["interaction"]["status"], json!("completed"));
        assert_eq!(encoded["interaction"]["agent_kind"], json!("debugger"));
    }
}
