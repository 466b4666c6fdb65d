use crate::models::Product;
use std::collections::BTreeMap;

/// Session-local set of saved products, keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct SavedItems {
    items: BTreeMap<String, Product>,
}

impl SavedItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `product.id` and returns the new membership.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.items.remove(&product.id).is_some() {
            false
        } else {
            self.items.insert(product.id.clone(), product.clone());
            true
        }
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Product> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
