//! Visible chat transcript
//!
//! Unlike the gateway history, the transcript also shows failed exchanges:
//! an error is rendered as an assistant-side line next to the user's message.

use chat_core::config::{ENV_API_KEY, ENV_ENDPOINT};
use chat_core::ConfigStatus;
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Message,
    Error,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub speaker: Speaker,
    pub kind: EntryKind,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Entry {
    /// `[HH:MM:SS] You: text`
    pub fn render(&self) -> String {
        let label = match (self.speaker, &self.kind) {
            (Speaker::User, _) => "You",
            (Speaker::Assistant, EntryKind::Message) => "Assistant",
            (Speaker::Assistant, EntryKind::Error) => "Assistant (error)",
        };
        format!("[{}] {}: {}", self.timestamp.format("%H:%M:%S"), label, self.text)
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: &str) -> &Entry {
        self.push(Speaker::User, EntryKind::Message, text)
    }

    pub fn push_reply(&mut self, text: &str) -> &Entry {
        self.push(Speaker::Assistant, EntryKind::Message, text)
    }

    pub fn push_error(&mut self, text: &str) -> &Entry {
        self.push(Speaker::Assistant, EntryKind::Error, text)
    }

    fn push(&mut self, speaker: Speaker, kind: EntryKind, text: &str) -> &Entry {
        self.entries.push(Entry {
            speaker,
            kind,
            text: text.to_string(),
            timestamp: Local::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Instructions shown instead of the chat when the endpoint is not usable.
pub fn config_required_message(status: &ConfigStatus) -> String {
    let reason = match status {
        ConfigStatus::Ready(_) => return String::new(),
        ConfigStatus::MissingApiKey => "No API key is configured.",
        ConfigStatus::PlaceholderApiKey => "The API key is still the sample placeholder.",
        ConfigStatus::MissingEndpoint => "No completion endpoint is configured.",
    };

    format!(
        "Configuration required\n\
         {reason}\n\
         \n\
         To use this chat, provide the following settings:\n\
         \x20 1. Set {ENV_API_KEY} to your API key\n\
         \x20 2. Set {ENV_ENDPOINT} to the chat completions URL\n\
         \x20    (or put api_key and endpoint in config.toml)\n\
         \x20 3. Restart the application"
    )
}
