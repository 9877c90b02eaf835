//! Message classification into specialist agent kinds.

use crate::error::CadreCoreError;
use cadre_rs_llm::CompletionClient;
use cadre_rs_protocol::AgentKind;
use log::{debug, warn};
use std::sync::Arc;

/// Classifies inbound messages into an agent kind via a completion call.
#[derive(Clone)]
pub struct AgentClassifier {
    completion: Arc<dyn CompletionClient>,
}

impl AgentClassifier {
    /// Create a classifier backed by the given completion client.
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    /// Classify a message, falling back to the supervisor on unknown labels.
    ///
    /// Completion failures surface as classification errors so the caller can
    /// record them on the interaction instead of dropping it.
    pub async fn classify(&self, message: &str) -> Result<AgentKind, CadreCoreError> {
        let prompt = classification_prompt(message);
        let label = self
            .completion
            .complete(&prompt)
            .await
            .map_err(|err| CadreCoreError::Classification(err.to_string()))?;

        let kind = AgentKind::normalize(&label);
        if kind == AgentKind::Supervisor && label.trim() != AgentKind::Supervisor.as_str() {
            warn!(
                "unrecognized classification label, routing to supervisor (label={})",
                label.trim()
            );
        }
        debug!("classified message (agent_kind={})", kind.as_str());
        Ok(kind)
    }
}

/// Build the classification prompt for a message.
fn classification_prompt(message: &str) -> String {
    let labels = AgentKind::ALL
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are a task router for a team of specialist agents.\n\
         Classify the user message below into exactly one category.\n\
         Categories: {labels}.\n\
         Use code_reviewer for requests to review or critique code, \
         debugger for diagnosing errors or unexpected behavior, \
         optimizer for performance tuning requests, \
         and supervisor for anything else.\n\
         Respond with only the category name, nothing else.\n\n\
         Message:\n{message}"
    )
}
