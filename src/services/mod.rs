//! External collaborators
//!
//! The assistant chat and the text-generation contract it depends on.

pub mod chat;

pub use chat::{ChatMessage, ChatService, PromptLogEntry, TextGenerator, UnconfiguredGenerator};
