use async_trait::async_trait;
use shopchat::backend::{ChatReply, ChatRequest, ShopBackend};
use shopchat::core::error::ShopError;
use shopchat::models::Product;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::oneshot;

type FetchGate = oneshot::Receiver<Result<Vec<Product>, ShopError>>;

#[allow(dead_code)]
pub fn product(id: &str, name: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "footwear".to_string(),
        price,
        description: String::new(),
        tags: vec![],
        image: format!("https://img.test/{}.png", id),
    }
}

#[allow(dead_code)]
pub fn shoe() -> Product {
    product("shoe", "Shoe", 10.0)
}

/// In-memory backend whose cart fetches can be held open and released in
/// any order.
#[derive(Default)]
pub struct FakeBackend {
    catalog: Mutex<Vec<Product>>,
    cart: Mutex<Vec<Product>>,
    gates: Mutex<VecDeque<FetchGate>>,
    add_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    chat_replies: Mutex<VecDeque<Result<ChatReply, ShopError>>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    pub fail_add: AtomicBool,
    pub fail_remove: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_reset: AtomicBool,
    fetches: AtomicUsize,
    resets: AtomicUsize,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn with_catalog(products: Vec<Product>) -> Self {
        let backend = Self::default();
        *backend.catalog.lock().unwrap() = products;
        backend
    }

    pub fn set_cart(&self, items: Vec<Product>) {
        *self.cart.lock().unwrap() = items;
    }

    pub fn cart(&self) -> Vec<Product> {
        self.cart.lock().unwrap().clone()
    }

    /// The next `fetch_cart` call waits for the returned sender instead of
    /// reading the cart.
    pub fn hold_next_fetch(&self) -> oneshot::Sender<Result<Vec<Product>, ShopError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// The next `add_item` call waits until the returned sender fires (or is
    /// dropped) before touching the cart.
    pub fn hold_next_add(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.add_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn queue_chat_reply(&self, reply: Result<ChatReply, ShopError>) {
        self.chat_replies.lock().unwrap().push_back(reply);
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    /// Yields until `fetch_cart` has been entered `n` times.
    pub async fn wait_for_fetches(&self, n: usize) {
        while self.fetches() < n {
            tokio::task::yield_now().await;
        }
    }
}

fn server_error(message: &str) -> ShopError {
    ShopError::Api {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl ShopBackend for FakeBackend {
    async fn fetch_cart(&self) -> Result<Vec<Product>, ShopError> {
        let gate = self.gates.lock().unwrap().pop_front();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(ShopError::Network("gate dropped".to_string())));
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ShopError::Network("connection refused".to_string()));
        }
        Ok(self.cart())
    }

    async fn add_item(&self, product_id: &str) -> Result<(), ShopError> {
        let gate = self.add_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(server_error("add failed"));
        }
        let product = self
            .catalog
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| ShopError::Api {
                status: 404,
                message: "Product not found".to_string(),
            })?;
        self.cart.lock().unwrap().push(product);
        Ok(())
    }

    async fn remove_item(&self, product_id: &str) -> Result<(), ShopError> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(server_error("remove failed"));
        }
        let mut cart = self.cart.lock().unwrap();
        let idx = cart
            .iter()
            .position(|p| p.id == product_id)
            .ok_or_else(|| ShopError::Api {
                status: 404,
                message: "Item not found in cart".to_string(),
            })?;
        cart.remove(idx);
        Ok(())
    }

    async fn reset(&self) -> Result<(), ShopError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reset.load(Ordering::SeqCst) {
            return Err(server_error("reset failed"));
        }
        self.cart.lock().unwrap().clear();
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ShopError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ChatReply {
                    content: Some("How can I help?".to_string()),
                    tool_calls: None,
                })
            })
    }
}
