use crate::transit::{Cost, Round, StopIndex, Timestamp, UNREACHED_ROUNDS};

/// Lower bounds from one stop to the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeuristicAtStop {
    pub min_travel_duration: Timestamp,
    pub min_num_transfers: Round,
    pub min_cost: Cost,
}

/// The immutable result of a heuristic pass.
///
/// The label arrays are moved out of the routing strategy when the pass completes,
/// so nothing can modify them afterwards.
#[derive(Clone, Debug)]
pub struct Heuristics {
    best_num_transfers: Vec<Round>,
    times: Vec<Timestamp>,
    costs: Vec<Cost>,
    egress_stops: Vec<StopIndex>,
}

impl Heuristics {
    pub(crate) fn new(
        best_num_transfers: Vec<Round>,
        times: Vec<Timestamp>,
        costs: Vec<Cost>,
        egress_stops: Vec<StopIndex>,
    ) -> Self {
        debug_assert_eq!(best_num_transfers.len(), times.len());
        debug_assert_eq!(times.len(), costs.len());
        Self { best_num_transfers, times, costs, egress_stops }
    }

    pub fn size(&self) -> usize {
        self.best_num_transfers.len()
    }

    pub fn reached(&self, stop: StopIndex) -> bool {
        self.best_num_transfers[stop as usize] < UNREACHED_ROUNDS
    }

    pub fn heuristic_at_stop(&self, stop: StopIndex) -> Option<HeuristicAtStop> {
        self.reached(stop).then(|| {
            let stop = stop as usize;
            HeuristicAtStop {
                min_travel_duration: self.times[stop],
                min_num_transfers: self.best_num_transfers[stop],
                min_cost: self.costs[stop],
            }
        })
    }

    pub fn best_travel_duration_to_vec(&self, unreached: Timestamp) -> Vec<Timestamp> {
        self.to_vec(unreached, &self.times)
    }

    pub fn best_num_transfers_to_vec(&self, unreached: Round) -> Vec<Round> {
        self.to_vec(unreached, &self.best_num_transfers)
    }

    pub fn best_generalized_cost_to_vec(&self, unreached: Cost) -> Vec<Cost> {
        self.to_vec(unreached, &self.costs)
    }

    pub fn best_overall_journey_travel_duration(&self) -> Option<Timestamp> {
        self.best_among_egress_stops(&self.times)
    }

    pub fn best_overall_journey_num_transfers(&self) -> Option<Round> {
        self.best_among_egress_stops(&self.best_num_transfers)
    }

    pub fn best_overall_journey_cost(&self) -> Option<Cost> {
        self.best_among_egress_stops(&self.costs)
    }

    // Waiting is not tracked by the heuristic pass.
    pub fn min_wait_time_for_journeys_reaching_destination(&self) -> Timestamp {
        0
    }

    pub fn destination_reached(&self) -> bool {
        self.egress_stops.iter().any(|&stop| self.reached(stop))
    }

    pub fn egress_stops(&self) -> &[StopIndex] {
        &self.egress_stops
    }

    fn to_vec<V: Copy>(&self, unreached: V, values: &[V]) -> Vec<V> {
        values
            .iter()
            .enumerate()
            .map(|(stop, &value)| if self.reached(stop as StopIndex) { value } else { unreached })
            .collect()
    }

    fn best_among_egress_stops<V: Copy + Ord>(&self, values: &[V]) -> Option<V> {
        self.egress_stops
            .iter()
            .filter(|&&stop| self.reached(stop))
            .map(|&stop| values[stop as usize])
            .min()
    }
}
