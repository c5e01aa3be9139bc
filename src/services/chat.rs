//! Chat transcript backed by a pluggable text generator

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    error::ChatError,
    storage::{Scope, Slot, Storage},
};

pub const TRANSCRIPT_KEY: &str = "chat_messages";
pub const PROMPT_LOG_KEY: &str = "ai_conversation_logs";
pub const PROMPT_LOG_LIMIT: usize = 50;

pub const WELCOME_TEXT: &str = "Hi there! I'm your FitSync AI assistant. Ask me anything about health, fitness, nutrition, or workout routines!";
pub const ERROR_TEXT: &str = "Sorry, I couldn't process your request. Please try again.";

/// Anything that turns a prompt into a single text completion
pub trait TextGenerator: Send + Sync + 'static {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ChatError>>;
}

/// Stand-in used when no provider is wired up; every request fails
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

impl TextGenerator for UnconfiguredGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, ChatError>> {
        future::ready(Err::<String, _>(ChatError::Unavailable)).boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub is_user: bool,
    #[serde(default)]
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptLogEntry {
    pub prompt: String,
    pub timestamp: DateTime<Utc>,
}

fn welcome() -> Vec<ChatMessage> {
    vec![ChatMessage {
        id: 1,
        text: WELCOME_TEXT.to_string(),
        is_user: false,
        is_error: false,
        timestamp: Utc::now(),
    }]
}

pub struct ChatService {
    transcript: Slot<Vec<ChatMessage>>,
    prompt_log: Slot<Vec<PromptLogEntry>>,
    generator: Arc<dyn TextGenerator>,
}

impl ChatService {
    pub fn new(storage: Storage, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            transcript: Slot::new(storage.clone(), TRANSCRIPT_KEY, Scope::Lifetime, welcome()),
            prompt_log: Slot::new(storage, PROMPT_LOG_KEY, Scope::Lifetime, Vec::new()),
            generator,
        }
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.get()
    }

    /// Send a user message and append the assistant's reply.
    ///
    /// A failed generation is not an error for the caller: it is logged and
    /// shows up as one error message in the transcript. Only blank input is
    /// rejected.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, ChatError> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.append(prompt.to_string(), true, false);
        debug!("Requesting completion for {} char prompt", prompt.len());

        let reply = match self.generator.generate(prompt).await {
            Ok(reply) if reply.trim().is_empty() => {
                Err(ChatError::Generation("empty response".to_string()))
            }
            other => other,
        };

        match reply {
            Ok(reply) => {
                self.log_prompt(prompt);
                Ok(self.append(reply, false, false))
            }
            Err(e) => {
                error!("Error generating response: {}", e);
                Ok(self.append(ERROR_TEXT.to_string(), false, true))
            }
        }
    }

    /// Back to just the welcome message
    pub fn clear(&self) {
        info!("Clearing chat transcript");
        self.transcript.set(welcome());
    }

    pub fn prompt_log(&self) -> Vec<PromptLogEntry> {
        self.prompt_log.get()
    }

    pub fn clear_prompt_log(&self) {
        info!("Clearing prompt log");
        self.prompt_log.clear();
    }

    fn append(&self, text: String, is_user: bool, is_error: bool) -> ChatMessage {
        self.transcript.update(|messages| {
            let id = messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
            let message = ChatMessage {
                id,
                text,
                is_user,
                is_error,
                timestamp: Utc::now(),
            };
            messages.push(message.clone());
            message
        })
    }

    fn log_prompt(&self, prompt: &str) {
        self.prompt_log.update(|log| {
            log.push(PromptLogEntry {
                prompt: prompt.to_string(),
                timestamp: Utc::now(),
            });
            if log.len() > PROMPT_LOG_LIMIT {
                let excess = log.len() - PROMPT_LOG_LIMIT;
                log.drain(..excess);
            }
        });
    }
}
