use crate::transit::{Cost, Round, StopIndex, Timestamp};

/// A street (or flex) leg between the origin/destination and a transit stop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessEgress {
    pub stop: StopIndex,
    pub duration: Timestamp,
    pub cost: Cost,
    // Vehicle rides already taken within the leg, e.g. a flex trip counts as one.
    pub num_rides: Round,
    // The leg ends on board a vehicle, so it counts as a transit arrival.
    pub stop_reached_on_board: bool,
}

impl AccessEgress {
    pub fn walk(stop: StopIndex, duration: Timestamp, cost: Cost) -> Self {
        Self { stop, duration, cost, num_rides: 0, stop_reached_on_board: false }
    }

    pub fn flex(stop: StopIndex, duration: Timestamp, cost: Cost, num_rides: Round, stop_reached_on_board: bool) -> Self {
        Self { stop, duration, cost, num_rides, stop_reached_on_board }
    }
}

/// Access legs bucketed by the number of rides needed before they apply.
#[derive(Clone, Debug, Default)]
pub struct AccessPaths {
    arrived_on_street: Vec<Vec<AccessEgress>>,
    arrived_on_board: Vec<Vec<AccessEgress>>,
}

impl AccessPaths {
    pub fn new(paths: impl IntoIterator<Item = AccessEgress>) -> Self {
        let mut access_paths = Self::default();
        for path in paths {
            let buckets = if path.stop_reached_on_board {
                &mut access_paths.arrived_on_board
            } else {
                &mut access_paths.arrived_on_street
            };
            let round = path.num_rides as usize;
            if buckets.len() <= round {
                buckets.resize_with(round + 1, Vec::new);
            }
            buckets[round].push(path);
        }
        access_paths
    }

    pub fn arrived_on_street_by_num_rides(&self, round: Round) -> &[AccessEgress] {
        self.arrived_on_street.get(round as usize).map_or(&[], Vec::as_slice)
    }

    pub fn arrived_on_board_by_num_rides(&self, round: Round) -> &[AccessEgress] {
        self.arrived_on_board.get(round as usize).map_or(&[], Vec::as_slice)
    }

    /// The search must run at least this many rounds to apply every access leg.
    pub fn calculate_max_number_of_rides(&self) -> Round {
        let max_bucket = |buckets: &[Vec<AccessEgress>]| buckets.iter().rposition(|b| !b.is_empty()).unwrap_or(0);
        max_bucket(&self.arrived_on_street).max(max_bucket(&self.arrived_on_board)) as Round
    }

    pub fn is_empty(&self) -> bool {
        self.arrived_on_street.iter().chain(&self.arrived_on_board).all(Vec::is_empty)
    }
}
