use super::state::{CartState, CartView, Phase, RefreshOutcome, RefreshTicket};
use crate::backend::ShopBackend;
use crate::conversation::ConversationStore;
use crate::core::error::ShopError;
use crate::models::Product;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

/// Resolves once a background add/remove and its follow-up refresh settle.
pub type MutationHandle = JoinHandle<Result<(), ShopError>>;

struct Shared {
    backend: Arc<dyn ShopBackend>,
    state: Mutex<CartState>,
}

impl Shared {
    // Never held across an await.
    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn complete_refresh(&self, ticket: RefreshTicket) -> RefreshOutcome {
        match self.backend.fetch_cart().await {
            Ok(items) => {
                let count = items.len();
                let outcome = self.lock().apply_refresh(ticket, items);
                match outcome {
                    RefreshOutcome::Applied => debug!(
                        sequence = ticket.sequence,
                        epoch = ticket.epoch,
                        count,
                        "Applied cart snapshot"
                    ),
                    _ => debug!(
                        sequence = ticket.sequence,
                        epoch = ticket.epoch,
                        "Discarded stale cart snapshot"
                    ),
                }
                outcome
            }
            Err(e) => {
                warn!(sequence = ticket.sequence, error = %e, "Failed to fetch cart");
                self.lock().fail_refresh(ticket)
            }
        }
    }

    async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.lock().begin_refresh();
        self.complete_refresh(ticket).await
    }
}

/// Owns the displayed cart and keeps it converging on the backend's cart.
///
/// A polling task is started on construction (unless the interval is `None`)
/// and aborted when the engine is dropped.
pub struct CartSyncEngine {
    shared: Arc<Shared>,
    poller: Option<JoinHandle<()>>,
}

impl CartSyncEngine {
    /// Must be called from within a tokio runtime when polling is enabled.
    pub fn new(backend: Arc<dyn ShopBackend>, poll_interval: Option<Duration>) -> Self {
        let shared = Arc::new(Shared {
            backend,
            state: Mutex::new(CartState::new()),
        });
        let poller = poll_interval
            .filter(|period| !period.is_zero())
            .map(|period| spawn_poller(Arc::downgrade(&shared), period));

        Self { shared, poller }
    }

    /// Fetches the remote cart and applies it unless a newer response or a
    /// checkout got there first.
    ///
    /// The sequence number is taken when this is called, not when the
    /// returned future is first polled.
    pub fn refresh(&self) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        let shared = Arc::clone(&self.shared);
        let ticket = shared.lock().begin_refresh();
        async move { shared.complete_refresh(ticket).await }
    }

    /// Runs a refresh after `delay`, giving the backend time to commit
    /// whatever a chat turn's tools did.
    pub fn schedule_refresh(&self, delay: Duration) -> JoinHandle<RefreshOutcome> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.refresh().await
        })
    }

    /// Bumps the displayed count now and adds the product remotely in the
    /// background. A failed add is reported through the handle but the count
    /// is not rolled back.
    pub fn add_item(&self, product: &Product) -> Result<MutationHandle, ShopError> {
        if product.id.trim().is_empty() {
            return Err(ShopError::Input(format!(
                "Product '{}' has no id",
                product.name
            )));
        }

        let (count, epoch) = {
            let mut state = self.shared.lock();
            (state.record_optimistic_add(), state.epoch())
        };
        debug!(product_id = %product.id, count, "Optimistically added item");

        let shared = Arc::clone(&self.shared);
        let product_id = product.id.clone();
        Ok(tokio::spawn(async move {
            let result = match shared.backend.add_item(&product_id).await {
                Ok(()) => {
                    shared.refresh().await;
                    Ok(())
                }
                Err(e) => {
                    error!(product_id = %product_id, error = %e, "Failed to add item to cart");
                    Err(e)
                }
            };
            shared.lock().settle_optimistic_add(epoch);
            result
        }))
    }

    /// Removes the product remotely, then refreshes whether or not the
    /// delete succeeded. Nothing changes locally until that refresh lands.
    pub fn remove_item(&self, product_id: &str) -> MutationHandle {
        let shared = Arc::clone(&self.shared);
        let product_id = product_id.to_string();
        tokio::spawn(async move {
            let result = shared.backend.remove_item(&product_id).await;
            if let Err(e) = &result {
                warn!(product_id = %product_id, error = %e, "Failed to remove item from cart");
            }
            shared.refresh().await;
            result
        })
    }

    /// Empties the cart, starts a new epoch and resets the conversation.
    /// The remote reset is fire-and-forget.
    pub fn checkout(&self, conversation: &mut ConversationStore) -> u64 {
        let epoch = self.shared.lock().checkout();
        conversation.reset();
        debug!(epoch, "Checked out");

        let backend = Arc::clone(&self.shared.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.reset().await {
                debug!(error = %e, "Remote reset failed; ignoring");
            }
        });
        epoch
    }

    pub fn view(&self) -> CartView {
        self.shared.lock().view()
    }

    pub fn snapshot(&self) -> Vec<Product> {
        self.shared.lock().snapshot().to_vec()
    }

    pub fn displayed_count(&self) -> usize {
        self.shared.lock().displayed_count()
    }

    pub fn epoch(&self) -> u64 {
        self.shared.lock().epoch()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }
}

impl Drop for CartSyncEngine {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

fn spawn_poller(shared: Weak<Shared>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            shared.refresh().await;
        }
    })
}
