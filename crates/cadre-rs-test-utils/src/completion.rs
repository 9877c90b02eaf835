//! Fake completion clients for exercising delegation paths.

use async_trait::async_trait;
use cadre_rs_llm::{CompletionClient, CompletionError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Completion client that always returns the same text.
#[derive(Debug, Clone)]
pub struct FixedCompletion {
    response: String,
}

impl FixedCompletion {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for FixedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Ok(self.response.clone())
    }
}

/// Completion client that replays a scripted sequence of responses.
///
/// Calls past the end of the script fail like an exhausted upstream.
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedCompletion {
    pub fn new(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
        }
    }

    /// Queue an error outcome after the already-scripted responses.
    pub fn push_error(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        match self.responses.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(CompletionError::Api {
                status: 500,
                message,
            }),
            None => Err(CompletionError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// Completion client that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingCompletion {
    message: String,
}

impl FailingCompletion {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Api {
            status: 500,
            message: self.message.clone(),
        })
    }
}

/// Completion client that records every prompt it receives.
pub struct RecordingCompletion {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingCompletion {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl CompletionClient for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.response.clone())
    }
}
