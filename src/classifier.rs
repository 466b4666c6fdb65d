//! Decides whether an inbound conversational payload is free text or a
//! product listing.
//!
//! The check is a bracket heuristic: only content that is wrapped in `[` `]`
//! after trimming is parsed, and only an array whose every element carries
//! `id`, `name`, `price` and `image` counts as a listing. Anything else,
//! including an empty array, is text. A payload kind tag from the backend
//! would make this unambiguous; until then a listing-shaped reply written as
//! prose is still shown as prose.

use crate::models::Product;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Products(Vec<Product>),
}

impl Payload {
    pub fn is_products(&self) -> bool {
        matches!(self, Payload::Products(_))
    }
}

pub fn classify(content: &str) -> Payload {
    let trimmed = content.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return Payload::Text(content.to_string());
    }

    match serde_json::from_str::<Vec<Product>>(trimmed) {
        Ok(products) if !products.is_empty() => Payload::Products(products),
        _ => Payload::Text(content.to_string()),
    }
}
