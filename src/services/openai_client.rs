use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    core::{conversation::Conversation, model::LanguageModel},
    error::{AgentError, Result},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Chat-completions client for OpenAI-compatible providers.
///
/// One request per call: failures are returned as `AgentError::Provider`
/// without retrying.
#[derive(Clone)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Option<Duration>,
    max_tokens: Option<u32>,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
            max_tokens: None,
        }
    }

    /// Build a client from `OPENAI_API_KEY` and, when set, `OPENAI_BASE_URL`
    /// or `OPENROUTER_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AgentError::Config(
                "OPENAI_API_KEY environment variable must be set before calling the model"
                    .to_string(),
            )
        })?;
        let mut client = Self::new(api_key);
        if let Ok(base_url) =
            std::env::var("OPENAI_BASE_URL").or_else(|_| std::env::var("OPENROUTER_BASE_URL"))
        {
            client.set_base_url(base_url);
        }
        Ok(client)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.set_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(&self, body: &Value) -> Result<Value> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| AgentError::Provider(format!("Failed to build HTTP client: {err}")))?;

        let request_url = build_chat_url(&self.base_url);
        let response = client
            .post(&request_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AgentError::Provider(format!("request to {request_url} timed out"))
                } else {
                    AgentError::Provider(format!("HTTP request failed: {err}"))
                }
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|err| AgentError::Provider(format!("Failed to read response: {err}")))?;

        let response_json: Value = serde_json::from_str(&response_text).map_err(|err| {
            AgentError::Provider(format!("HTTP {status}: failed to parse JSON: {err}"))
        })?;

        if !status.is_success() {
            let api_message = response_json
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or(response_text);

            return Err(AgentError::Provider(format!(
                "HTTP {} error: {}",
                status, api_message
            )));
        }

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(AgentError::Provider(format!("API error: {}", error_message)));
        }

        Ok(response_json)
    }
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LanguageModel for OpenAIClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, conversation: &Conversation) -> Result<String> {
        let mut request =
            ChatCompletionRequest::new(self.model.clone(), conversation.to_openai_messages())
                .with_max_tokens(self.max_tokens);
        if let Some(response_format) = conversation.response_format() {
            request = request.with_response_format(response_format);
        }

        debug!(
            target: "itinerary::provider",
            model = %self.model,
            messages = conversation.len(),
            "sending chat completion"
        );
        let response = self.chat_completion(&request.into_value()).await?;
        extract_content(&response)
    }
}

/// Text of the first choice's assistant message.
fn extract_content(response: &Value) -> Result<String> {
    let message = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            AgentError::Provider("Completion response contained no assistant message".to_string())
        })?;

    Ok(message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    max_tokens: Option<u32>,
    response_format: Option<Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            response_format: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_response_format(mut self, response_format: Value) -> Self {
        self.response_format = Some(response_format);
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(response_format) = self.response_format {
            body["response_format"] = response_format;
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vacation_types::TravelPlan;
    use mockito::Matcher;

    fn completion_body(content: &str) -> String {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn test_build_chat_url() {
        assert_eq!(
            build_chat_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            build_chat_url("http://localhost/chat/completions"),
            "http://localhost/chat/completions"
        );
    }

    #[test]
    fn test_request_body_includes_optional_fields() {
        let body = ChatCompletionRequest::new("gpt-4.1-mini", vec![json!({"role": "user"})])
            .with_max_tokens(Some(10))
            .into_value();
        assert_eq!(body["max_tokens"], 10);
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn test_complete_sends_conversation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4.1-nano",
                "messages": [
                    {"role": "system", "content": "judge"},
                    {"role": "user", "content": "Activity: Palette & Pour"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("FINAL ANSWER:\nIS_COMPATIBLE"))
            .create_async()
            .await;

        let client = OpenAIClient::new("test-key")
            .with_base_url(server.url())
            .with_model("gpt-4.1-nano");
        let mut conversation = Conversation::with_system_prompt("judge");
        conversation.push_user("Activity: Palette & Pour");

        let text = client.complete(&conversation).await.unwrap();
        assert_eq!(text, "FINAL ANSWER:\nIS_COMPATIBLE");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_response_format_is_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {"name": TravelPlan::SCHEMA_NAME}
                }
            })))
            .with_status(200)
            .with_body(completion_body("{}"))
            .create_async()
            .await;

        let client = OpenAIClient::new("k").with_base_url(server.url());
        let mut conversation = Conversation::new();
        conversation.push_user("plan");
        conversation.set_schema::<TravelPlan>();

        client.complete(&conversation).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body(json!({"error": {"message": "upstream exploded"}}).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = OpenAIClient::new("k").with_base_url(server.url());
        let err = client.complete(&Conversation::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(ref message) if message.contains("upstream exploded")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_choices_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("{\"choices\": []}")
            .create_async()
            .await;

        let client = OpenAIClient::new("k").with_base_url(server.url());
        let err = client.complete(&Conversation::new()).await.unwrap_err();
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
    }
}
