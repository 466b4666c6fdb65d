use crate::classifier::Payload;
use crate::models::{HistoryEntry, Message, Product, Role};

pub const WELCOME_MESSAGE: &str = "Welcome! I am your personal shopper. How can I help you today?";

/// Append-only log of conversational turns.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::system(WELCOME_MESSAGE)],
        }
    }

    /// Returns the log length after the append.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len()
    }

    /// Every non-system turn, in order, as sent to the backend.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(HistoryEntry::from)
            .collect()
    }

    /// Only checkout calls this.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(Message::system(WELCOME_MESSAGE));
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

    /// Products of the most recent turn that reads as a listing.
    pub fn latest_products(&self) -> Option<Vec<Product>> {
        self.messages.iter().rev().find_map(|m| match m.payload() {
            Payload::Products(products) => Some(products),
            Payload::Text(_) => None,
        })
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
