//! Specialist handlers that produce the assistant response for a message.

use crate::error::CadreCoreError;
use cadre_rs_llm::CompletionClient;
use cadre_rs_protocol::AgentKind;
use log::debug;
use std::sync::Arc;

/// Dispatches a classified message to the matching specialist prompt.
#[derive(Clone)]
pub struct AgentDispatcher {
    completion: Arc<dyn CompletionClient>,
}

impl AgentDispatcher {
    /// Create a dispatcher backed by the given completion client.
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    /// Run the specialist handler for an agent kind against a message.
    pub async fn dispatch(&self, kind: AgentKind, message: &str) -> Result<String, CadreCoreError> {
        debug!("dispatching message (agent_kind={})", kind.as_str());
        let prompt = specialist_prompt(kind, message);
        self.completion
            .complete(&prompt)
            .await
            .map_err(|err| CadreCoreError::Dispatch(err.to_string()))
    }
}

/// Build the role prompt for a specialist handler.
fn specialist_prompt(kind: AgentKind, message: &str) -> String {
    let role = match kind {
        AgentKind::Supervisor => {
            "You are a supervisor agent coordinating a team of software specialists. \
             Answer the user's request directly and helpfully."
        }
        AgentKind::CodeReviewer => {
            "You are a meticulous code reviewer. Review the code or change described \
             below, pointing out correctness issues, style problems, and risky edge cases."
        }
        AgentKind::Debugger => {
            "You are a debugging specialist. Diagnose the problem described below, \
             explain the likely root cause, and suggest how to confirm and fix it."
        }
        AgentKind::Optimizer => {
            "You are a performance optimization specialist. Analyze the scenario below \
             and recommend concrete optimizations with their trade-offs."
        }
    };
    format!("{role}\n\nUser message:\n{message}")
}
