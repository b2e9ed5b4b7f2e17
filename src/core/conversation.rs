use crate::schemas::{CompletionSchema, SchemaHandle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Structured-output directive attached to a conversation.
#[derive(Clone, Debug, Default)]
pub struct SchemaContext {
    active: Option<SchemaHandle>,
}

impl SchemaContext {
    pub fn set<T: CompletionSchema>(&mut self) {
        self.active = Some(T::schema().clone());
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn handle(&self) -> Option<&SchemaHandle> {
        self.active.as_ref()
    }

    pub fn response_format(&self) -> Option<Value> {
        self.active.as_ref().map(SchemaHandle::response_format)
    }
}

/// Append-only, role-tagged chat history owned by a single agent.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    schema: SchemaContext,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with a system prompt. Leading indentation and
    /// surrounding whitespace are stripped.
    pub fn with_system_prompt(prompt: &str) -> Self {
        let mut conversation = Self::new();
        conversation.push_system(dedent(prompt));
        conversation
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        let content = content.into();
        debug!(
            target: "itinerary::conversation",
            role = role.as_str(),
            chars = content.len(),
            "message appended"
        );
        self.messages.push(Message { role, content });
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push(Role::System, content);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages in the chat-completions wire format.
    pub fn to_openai_messages(&self) -> Vec<Value> {
        self.messages
            .iter()
            .map(|message| {
                json!({
                    "role": message.role.as_str(),
                    "content": message.content
                })
            })
            .collect()
    }

    pub fn set_schema<T: CompletionSchema>(&mut self) {
        self.schema.set::<T>();
    }

    pub fn clear_schema(&mut self) {
        self.schema.clear();
    }

    pub fn schema_context(&self) -> &SchemaContext {
        &self.schema
    }

    pub fn response_format(&self) -> Option<Value> {
        self.schema.response_format()
    }
}

/// Remove the common leading indentation from every non-blank line and trim
/// the result.
pub(crate) fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
