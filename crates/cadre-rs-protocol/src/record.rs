//! Interaction record and agent role types.

use crate::InteractionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Specialist agent roles a message can be delegated to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// General-purpose fallback role.
    #[default]
    Supervisor,
    /// Reviews code for correctness and best practices.
    CodeReviewer,
    /// Diagnoses errors and failing behavior.
    Debugger,
    /// Suggests performance and structure improvements.
    Optimizer,
}

/// Returned when a label does not name a known agent role.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown agent kind: {0}")]
pub struct UnknownAgentKind(pub String);

impl AgentKind {
    /// All known roles, in classification-prompt order.
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Supervisor,
        AgentKind::CodeReviewer,
        AgentKind::Debugger,
        AgentKind::Optimizer,
    ];

    /// Return the role as its wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Supervisor => "supervisor",
            AgentKind::CodeReviewer => "code_reviewer",
            AgentKind::Debugger => "debugger",
            AgentKind::Optimizer => "optimizer",
        }
    }

    /// Parse an exact wire label into a role.
    pub fn from_label(label: &str) -> Result<Self, UnknownAgentKind> {
        match label {
            "supervisor" => Ok(AgentKind::Supervisor),
            "code_reviewer" => Ok(AgentKind::CodeReviewer),
            "debugger" => Ok(AgentKind::Debugger),
            "optimizer" => Ok(AgentKind::Optimizer),
            other => Err(UnknownAgentKind(other.to_string())),
        }
    }

    /// Normalize free-form classifier output into a role.
    ///
    /// Anything outside the closed set falls back to `Supervisor`; external
    /// text never flows into control paths unvalidated.
    pub fn normalize(label: &str) -> Self {
        Self::from_label(label.trim()).unwrap_or_default()
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an interaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    /// Created, no terminal outcome yet.
    Processing,
    /// Finished with an assistant response.
    Completed,
    /// Finished with an error context.
    Failed,
}

impl InteractionStatus {
    /// Return the status as its wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionStatus::Processing => "processing",
            InteractionStatus::Completed => "completed",
            InteractionStatus::Failed => "failed",
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InteractionStatus::Processing)
    }
}

/// The persisted unit describing one message's delegation journey.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    /// Interaction identifier, assigned at creation.
    pub id: InteractionId,
    /// Role the message was delegated to.
    pub agent_kind: AgentKind,
    /// Original user input, immutable after creation.
    pub message: String,
    /// Assistant output or error context; absent until terminal.
    pub response: Option<String>,
    /// Lifecycle status; transitions exactly once to a terminal state.
    pub status: InteractionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent mutation.
    pub updated_at: DateTime<Utc>,
}

impl InteractionRecord {
    /// Create a fresh record in `Processing` state for a message.
    pub fn new(message: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            agent_kind: AgentKind::default(),
            message,
            response: None,
            status: InteractionStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition the record to `Completed` with the dispatched response.
    pub fn complete(&mut self, agent_kind: AgentKind, response: String) {
        self.agent_kind = agent_kind;
        self.response = Some(response);
        self.status = InteractionStatus::Completed;
        self.updated_at = Utc::now();
    }

    /// Transition the record to `Failed` with an error context.
    pub fn fail(&mut self, context: String) {
        self.response = Some(context);
        self.status = InteractionStatus::Failed;
        self.updated_at = Utc::now();
    }

    /// Whether the record reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentKind, InteractionRecord, InteractionStatus, UnknownAgentKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn agent_kind_labels_round_trip() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::from_label(kind.as_str()), Ok(kind));
        }
        assert_eq!(
            AgentKind::from_label("poet"),
            Err(UnknownAgentKind("poet".to_string()))
        );
    }

    #[test]
    fn normalize_falls_back_to_supervisor() {
        assert_eq!(AgentKind::normalize(" code_reviewer \n"), AgentKind::CodeReviewer);
        assert_eq!(AgentKind::normalize("CODE_REVIEWER"), AgentKind::Supervisor);
        assert_eq!(AgentKind::normalize("something else"), AgentKind::Supervisor);
        assert_eq!(AgentKind::normalize(""), AgentKind::Supervisor);
    }

    #[test]
    fn record_transitions_once_to_terminal() {
        let mut record = InteractionRecord::new("fix this".to_string());
        assert_eq!(record.status, InteractionStatus::Processing);
        assert_eq!(record.agent_kind, AgentKind::Supervisor);
        assert_eq!(record.response, None);
        assert_eq!(record.is_terminal(), false);

        record.complete(AgentKind::Optimizer, "use a hash map".to_string());
        assert_eq!(record.status, InteractionStatus::Completed);
        assert_eq!(record.agent_kind, AgentKind::Optimizer);
        assert_eq!(record.response, Some("use a hash map".to_string()));
        assert_eq!(record.is_terminal(), true);
    }

    #[test]
    fn failed_record_keeps_default_agent_kind() {
        let mut record = InteractionRecord::new("fix this".to_string());
        record.fail("classification error: API Error".to_string());
        assert_eq!(record.status, InteractionStatus::Failed);
        assert_eq!(record.agent_kind, AgentKind::Supervisor);
        assert_eq!(
            record.response,
            Some("classification error: API Error".to_string())
        );
    }
}
