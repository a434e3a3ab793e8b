use std::cell::Cell;

use crate::transit::Round;

/// The search clock. It is shared by reference between the worker, the routing
/// strategy and any pruning oracle; only the worker advances it.
#[derive(Debug)]
pub struct RoundTracker {
    round: Cell<Round>,
    round_max_limit: Round,
}

impl RoundTracker {
    pub fn new(round_max_limit: Round) -> Self {
        Self { round: Cell::new(0), round_max_limit }
    }

    pub fn round(&self) -> Round {
        self.round.get()
    }

    pub fn round_max_limit(&self) -> Round {
        self.round_max_limit
    }

    pub fn has_more_rounds(&self) -> bool {
        self.round.get() < self.round_max_limit
    }

    /// Only the search driving the rounds should call this.
    pub fn setup_iteration(&self) {
        self.round.set(0);
    }

    pub fn next_round(&self) -> Round {
        let next = self.round.get().saturating_add(1);
        self.round.set(next);
        next
    }
}
