pub mod engine;
pub mod state;

pub use engine::{CartSyncEngine, MutationHandle};
pub use state::{CartState, CartView, Phase, RefreshOutcome, RefreshTicket};
