use std::cell::OnceCell;

use crate::calculator::SearchDirection;
use crate::heuristics::{HeuristicAtStop, Heuristics};
use crate::round::RoundTracker;
use crate::transit::{Cost, Round, StopIndex, Timestamp};

/// A partial path as seen by the multi-criteria search.
pub trait StopArrival {
    fn stop(&self) -> StopIndex;
    fn arrival_time(&self) -> Timestamp;
    fn travel_duration(&self) -> Timestamp;
    fn cost(&self) -> Cost;
}

/// The destination arrivals found so far by the multi-criteria search.
pub trait DestinationArrivals {
    fn is_empty(&self) -> bool;

    /// True unless an already found arrival dominates the given one.
    fn qualify(&self, departure_time: Timestamp, arrival_time: Timestamp, num_transfers: Round, cost: Cost) -> bool;
}

/// Prunes partial paths of a multi-criteria search using the lower bounds of an
/// opposite-direction heuristic pass.
pub struct HeuristicsProvider<'a> {
    heuristics: Option<Heuristics>,
    round_tracker: &'a RoundTracker,
    direction: SearchDirection,
    // Lazily filled per-stop lookups.
    stops: Vec<OnceCell<Option<HeuristicAtStop>>>,
}

impl<'a> HeuristicsProvider<'a> {
    /// `direction` is the direction of the search being pruned.
    pub fn new(heuristics: Heuristics, round_tracker: &'a RoundTracker, direction: SearchDirection) -> Self {
        let stops = (0..heuristics.size()).map(|_| OnceCell::new()).collect();
        Self { heuristics: Some(heuristics), round_tracker, direction, stops }
    }

    /// A provider that never rejects anything.
    pub fn disabled(round_tracker: &'a RoundTracker, direction: SearchDirection) -> Self {
        Self { heuristics: None, round_tracker, direction, stops: Vec::new() }
    }

    pub fn heuristics(&self) -> Option<&Heuristics> {
        self.heuristics.as_ref()
    }

    /// True if `arrival` cannot lead to a destination arrival that `paths` would accept.
    pub fn reject_destination_arrival_based_on_heuristic<A, P>(&self, arrival: &A, paths: &P) -> bool
    where
        A: StopArrival,
        P: DestinationArrivals,
    {
        if self.heuristics.is_none() || paths.is_empty() {
            return false;
        }
        let rejected = !self.qualify(
            arrival.stop(),
            arrival.arrival_time(),
            arrival.travel_duration(),
            arrival.cost(),
            paths,
        );
        if rejected {
            log::trace!(
                "Arrival at stop {} rejected: the destination is not reachable within the limit based on heuristic {:?}.",
                arrival.stop(),
                self.get(arrival.stop())
            );
        }
        rejected
    }

    // Builds an optimistic guess of the best possible destination arrival from this arrival.
    fn qualify<P: DestinationArrivals>(
        &self,
        stop: StopIndex,
        arrival_time: Timestamp,
        travel_duration: Timestamp,
        cost: Cost,
        paths: &P,
    ) -> bool {
        // The heuristic pass may drop stops for round budget reasons alone, so an
        // unreached stop proves nothing.
        let Some(h) = self.get(stop) else {
            return true;
        };
        let min_arrival_time = self.direction.plus_duration(arrival_time, h.min_travel_duration);
        let min_number_of_rounds = self.round_tracker.round().saturating_add(h.min_num_transfers);
        if min_number_of_rounds > self.round_tracker.round_max_limit() {
            return false;
        }
        let min_travel_duration = travel_duration.saturating_add(h.min_travel_duration);
        let min_cost = cost.saturating_add(h.min_cost);
        let departure_time = self.direction.minus_duration(min_arrival_time, min_travel_duration);
        paths.qualify(departure_time, min_arrival_time, min_number_of_rounds.saturating_sub(1), min_cost)
    }

    fn get(&self, stop: StopIndex) -> Option<HeuristicAtStop> {
        let heuristics = self.heuristics.as_ref()?;
        *self.stops[stop as usize].get_or_init(|| heuristics.heuristic_at_stop(stop))
    }
}
