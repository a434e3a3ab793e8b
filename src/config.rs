use crate::calculator::SearchDirection;
use crate::transit::Round;

/// Parameters for one heuristic pass.
#[derive(Clone, Debug)]
pub struct HeuristicSearchParams {
    pub direction: SearchDirection,
    // Upper bound on rounds (number of boardings) for the whole pass.
    pub max_rounds: Round,
    // Extra transfers explored after the destination is first reached by transit.
    pub additional_transfers: Round,
    pub enable_transfer_constraints: bool,
}

impl Default for HeuristicSearchParams {
    fn default() -> Self {
        HeuristicSearchParams {
            direction: SearchDirection::Reverse,
            max_rounds: 12,
            additional_transfers: 5,
            enable_transfer_constraints: false,
        }
    }
}

impl HeuristicSearchParams {
    pub fn forward() -> Self {
        Self { direction: SearchDirection::Forward, ..Self::default() }
    }

    pub fn reverse() -> Self {
        Self::default()
    }
}
