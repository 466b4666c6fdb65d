use crate::backend::{ChatRequest, HttpBackend, ShopBackend};
use crate::cart::{CartSyncEngine, MutationHandle, RefreshOutcome};
use crate::config::Config;
use crate::conversation::ConversationStore;
use crate::core::error::ShopError;
use crate::models::{Message, Product};
use crate::saved::SavedItems;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub const CHAT_FAILURE_MESSAGE: &str =
    "I'm sorry, I'm having trouble connecting to the store right now.";

/// Everything one shopping session owns. Handlers get it by `&mut`.
pub struct Session {
    pub cart: CartSyncEngine,
    pub conversation: ConversationStore,
    pub saved: SavedItems,
    pub cart_open: bool,
    pub should_continue: bool,
    backend: Arc<dyn ShopBackend>,
    post_chat_delay: Duration,
    pending: Vec<MutationHandle>,
}

impl Session {
    pub fn new(
        backend: Arc<dyn ShopBackend>,
        poll_interval: Option<Duration>,
        post_chat_delay: Duration,
    ) -> Self {
        Self {
            cart: CartSyncEngine::new(Arc::clone(&backend), poll_interval),
            conversation: ConversationStore::new(),
            saved: SavedItems::new(),
            cart_open: false,
            should_continue: true,
            backend,
            post_chat_delay,
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ShopError> {
        let backend = HttpBackend::new(&config.api_url, config.request_timeout())?;
        Ok(Self::new(
            Arc::new(backend),
            config.poll_interval(),
            config.post_chat_refresh_delay(),
        ))
    }

    /// Initial sync when the session comes up.
    pub async fn mount(&self) -> RefreshOutcome {
        self.cart.refresh().await
    }

    /// Sends one chat turn and returns the assistant message that was
    /// appended. A backend failure appends an apology instead and skips the
    /// post-chat refresh.
    pub async fn send_message(&mut self, text: &str) -> Result<Message, ShopError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ShopError::Input("Message is empty".to_string()));
        }

        // The backend appends the new message to the history itself.
        let request = ChatRequest {
            message: text.to_string(),
            history: self.conversation.history(),
        };
        self.conversation.append(Message::user(text));

        let reply = match self.backend.chat(&request).await {
            Ok(reply) => {
                let message = Message::assistant(reply.content.unwrap_or_default())
                    .with_tool_calls(reply.tool_calls);
                self.cart.schedule_refresh(self.post_chat_delay);
                message
            }
            Err(e) => {
                error!(error = %e, "Chat request failed");
                Message::assistant(CHAT_FAILURE_MESSAGE)
            }
        };
        self.conversation.append(reply.clone());
        Ok(reply)
    }

    /// Product `n` (1-based) of the latest listing in the conversation.
    pub fn listed_product(&self, n: usize) -> Result<Product, ShopError> {
        let products = self
            .conversation
            .latest_products()
            .ok_or_else(|| ShopError::Input("No products have been listed yet".to_string()))?;
        n.checked_sub(1)
            .and_then(|i| products.get(i))
            .cloned()
            .ok_or_else(|| {
                ShopError::Input(format!(
                    "Pick a product between 1 and {}",
                    products.len()
                ))
            })
    }

    /// Accepts a 1-based bag position or a product id.
    pub fn resolve_bag_item(&self, reference: &str) -> Result<Product, ShopError> {
        let items = self.cart.snapshot();
        let by_position = reference
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| items.get(i));
        by_position
            .or_else(|| items.iter().find(|p| p.id == reference))
            .cloned()
            .ok_or_else(|| ShopError::Input(format!("'{}' is not in your bag", reference)))
    }

    /// Returns the displayed count right after the optimistic bump.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<usize, ShopError> {
        let handle = self.cart.add_item(product)?;
        self.pending.push(handle);
        Ok(self.cart.displayed_count())
    }

    pub fn remove_from_cart(&mut self, product_id: &str) {
        let handle = self.cart.remove_item(product_id);
        self.pending.push(handle);
    }

    pub fn toggle_saved(&mut self, product: &Product) -> bool {
        self.saved.toggle(product)
    }

    pub fn checkout(&mut self) -> Result<(), ShopError> {
        if self.cart.displayed_count() == 0 {
            return Err(ShopError::Input("Your bag is empty".to_string()));
        }
        self.cart.checkout(&mut self.conversation);
        self.cart_open = false;
        Ok(())
    }

    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }

    /// Collects the results of mutations that have finished, leaving the
    /// rest running.
    pub async fn reap_settled(&mut self) -> Vec<ShopError> {
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|h| h.is_finished());
        self.pending = running;
        collect_failures(done).await
    }

    /// Waits for every outstanding mutation.
    pub async fn settle_all(&mut self) -> Vec<ShopError> {
        let handles = std::mem::take(&mut self.pending);
        collect_failures(handles).await
    }
}

async fn collect_failures(handles: Vec<MutationHandle>) -> Vec<ShopError> {
    let mut failures = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures.push(e),
            Err(e) => {
                debug!(error = %e, "Mutation task did not complete");
                failures.push(e.into());
            }
        }
    }
    failures
}
