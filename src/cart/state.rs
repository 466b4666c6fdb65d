use crate::models::Product;

/// Tags one cart fetch so its response can be checked for staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub sequence: u64,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Stale,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Refreshing,
}

/// Read-only copy of the cart for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub items: Vec<Product>,
    pub displayed_count: usize,
    pub phase: Phase,
    pub optimistic_pending: bool,
}

impl CartView {
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(|p| p.price).sum()
    }
}

/// Local cart state reconciled against the backend.
///
/// `displayed_count` equals `snapshot.len()` after every applied refresh and
/// runs ahead of it by one for each optimistic add since. The optimistic
/// overlay stays up until every add of the current epoch has settled, either
/// by failing or by the refresh it triggered completing. Responses are
/// applied only when their sequence is the highest seen and their epoch is
/// current; checkout bumps the epoch so everything issued before it is
/// dropped on arrival.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    snapshot: Vec<Product>,
    displayed_count: usize,
    last_issued_sequence: u64,
    last_applied_sequence: u64,
    epoch: u64,
    in_flight: usize,
    // Adds in this epoch whose own follow-up refresh has not completed.
    unsettled_adds: usize,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.last_issued_sequence += 1;
        self.in_flight += 1;
        RefreshTicket {
            sequence: self.last_issued_sequence,
            epoch: self.epoch,
        }
    }

    pub fn apply_refresh(&mut self, ticket: RefreshTicket, items: Vec<Product>) -> RefreshOutcome {
        if ticket.epoch != self.epoch {
            return RefreshOutcome::Stale;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket.sequence <= self.last_applied_sequence {
            return RefreshOutcome::Stale;
        }

        self.last_applied_sequence = ticket.sequence;
        self.displayed_count = items.len();
        self.snapshot = items;
        RefreshOutcome::Applied
    }

    /// Keeps the previous snapshot and count.
    pub fn fail_refresh(&mut self, ticket: RefreshTicket) -> RefreshOutcome {
        if ticket.epoch == self.epoch {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        RefreshOutcome::Failed
    }

    pub fn record_optimistic_add(&mut self) -> usize {
        self.displayed_count += 1;
        self.unsettled_adds += 1;
        self.displayed_count
    }

    /// Called once per add recorded in `epoch`, after its remote call failed
    /// or its follow-up refresh finished. Adds from an earlier epoch were
    /// already dropped by checkout.
    pub fn settle_optimistic_add(&mut self, epoch: u64) {
        if epoch == self.epoch {
            self.unsettled_adds = self.unsettled_adds.saturating_sub(1);
        }
    }

    /// Clears everything and starts a new epoch. Returns the new epoch.
    pub fn checkout(&mut self) -> u64 {
        self.snapshot.clear();
        self.displayed_count = 0;
        self.epoch += 1;
        self.in_flight = 0;
        self.unsettled_adds = 0;
        self.epoch
    }

    pub fn snapshot(&self) -> &[Product] {
        &self.snapshot
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed_count
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn last_applied_sequence(&self) -> u64 {
        self.last_applied_sequence
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight > 0 {
            Phase::Refreshing
        } else {
            Phase::Idle
        }
    }

    pub fn optimistic_pending(&self) -> bool {
        self.unsettled_adds > 0
    }

    pub fn view(&self) -> CartView {
        CartView {
            items: self.snapshot.clone(),
            displayed_count: self.displayed_count,
            phase: self.phase(),
            optimistic_pending: self.optimistic_pending(),
        }
    }
}
