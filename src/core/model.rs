use super::conversation::{Conversation, Message};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use std::{collections::VecDeque, sync::Mutex};

/// Text-completion seam between the agent and a language model provider.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier used in logs
    fn name(&self) -> &str;

    /// Complete the conversation, returning the assistant's text.
    async fn complete(&self, conversation: &Conversation) -> Result<String>;
}

/// Language model returning canned responses in order.
///
/// Every conversation it receives is recorded so tests can assert on what
/// the agent sent. Once the queue is empty the fallback response is used; with
/// no fallback the call fails like a provider error.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    received: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// A model that answers every call with the same text.
    pub fn repeating(response: impl Into<String>) -> Self {
        Self {
            fallback: Some(response.into()),
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(response.into());
        self
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        self.received.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Snapshot of every conversation the model was asked to complete
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, conversation: &Conversation) -> Result<String> {
        if let Ok(mut received) = self.received.lock() {
            received.push(conversation.messages().to_vec());
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| AgentError::Provider("scripted model lock poisoned".to_string()))?
            .pop_front();

        next.or_else(|| self.fallback.clone()).ok_or_else(|| {
            AgentError::Provider("scripted model has no responses left".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_model_replays_in_order() {
        let model = ScriptedModel::new(["first", "second"]);
        let conversation = Conversation::with_system_prompt("system");

        assert_eq!(model.complete(&conversation).await.unwrap(), "first");
        assert_eq!(model.complete(&conversation).await.unwrap(), "second");
        let err = model.complete(&conversation).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
        assert_eq!(model.call_count(), 3);
        assert_eq!(model.received()[0][0].content, "system");
    }

    #[tokio::test]
    async fn test_repeating_model_never_runs_dry() {
        let model = ScriptedModel::repeating("FINAL ANSWER:\nIS_COMPATIBLE");
        let conversation = Conversation::new();
        for _ in 0..3 {
            assert!(model.complete(&conversation).await.unwrap().contains("IS_COMPATIBLE"));
        }
    }
}
