use fixedbitset::FixedBitSet;

use crate::access::AccessEgress;
use crate::calculator::SearchDirection;
use crate::config::HeuristicSearchParams;
use crate::heuristics::Heuristics;
use crate::round::RoundTracker;
use crate::transit::{
    Cost, CostCalculator, Round, StopIndex, Timestamp, Transfer, TransferConstraint, TripSchedule, UNREACHED,
    UNREACHED_ROUNDS,
};

// A boarding candidate held while scanning one pattern. `value` is either the
// duration or the cost accumulated up to and including the boarding.
#[derive(Clone, Copy, Debug)]
struct Boarding {
    board_time: Timestamp,
    value: u32,
}

// Reset for every pattern scan.
struct BoardingScan<'a, T> {
    trip: Option<&'a T>,
    fastest: Option<Boarding>,
    cheapest: Option<Boarding>,
}

impl<T> BoardingScan<'_, T> {
    fn empty() -> Self {
        Self { trip: None, fastest: None, cheapest: None }
    }
}

/// Maintains the per-stop best time, cost and transfer labels of a heuristic pass.
///
/// Labels only ever improve, across rounds and across iterations. The round-scoped
/// sets record which stops were improved in the current and the previous round.
pub struct HeuristicRoutingStrategy<'a, T: TripSchedule, C: CostCalculator<T>> {
    direction: SearchDirection,
    egress_stops: Vec<StopIndex>,
    best_num_transfers: Vec<Round>,
    // Best times to reach a stop, across rounds and iterations.
    times: Vec<Timestamp>,
    // Best "on-board" arrival times. Includes transit arrivals and access legs ending on board.
    transit_arrival_times: Vec<Timestamp>,
    costs: Vec<Cost>,
    transit_arrival_costs: Vec<Cost>,
    reached_current_round: FixedBitSet,
    reached_last_round: FixedBitSet,
    reached_by_transit_current_round: FixedBitSet,
    // Rounds needed from each stop according to an opposite-direction pass.
    heuristic_rounds: Vec<Round>,
    round_max_limit: Round,
    additional_transfers: Round,
    cost_calculator: &'a C,
    round_tracker: &'a RoundTracker,
    scan: BoardingScan<'a, T>,
}

impl<'a, T: TripSchedule, C: CostCalculator<T>> HeuristicRoutingStrategy<'a, T, C> {
    pub fn new(
        num_stops: usize,
        params: &HeuristicSearchParams,
        round_tracker: &'a RoundTracker,
        cost_calculator: &'a C,
        egress_stops: Vec<StopIndex>,
        previous: Option<&Heuristics>,
    ) -> Self {
        let heuristic_rounds = match previous {
            Some(heuristics) => {
                debug_assert_eq!(heuristics.size(), num_stops);
                heuristics.best_num_transfers_to_vec(params.max_rounds)
            }
            None => vec![0; num_stops],
        };

        Self {
            direction: params.direction,
            egress_stops,
            best_num_transfers: vec![UNREACHED_ROUNDS; num_stops],
            times: vec![UNREACHED; num_stops],
            transit_arrival_times: vec![UNREACHED; num_stops],
            costs: vec![UNREACHED; num_stops],
            transit_arrival_costs: vec![UNREACHED; num_stops],
            reached_current_round: FixedBitSet::with_capacity(num_stops),
            reached_last_round: FixedBitSet::with_capacity(num_stops),
            reached_by_transit_current_round: FixedBitSet::with_capacity(num_stops),
            heuristic_rounds,
            round_max_limit: params.max_rounds,
            additional_transfers: params.additional_transfers,
            cost_calculator,
            round_tracker,
            scan: BoardingScan::empty(),
        }
    }

    pub fn is_new_round_available(&self) -> bool {
        !self.reached_current_round.is_clear()
    }

    /// Only transit arrivals count; a transfer onto an egress stop does not reach the destination.
    pub fn is_destination_reached_in_current_round(&self) -> bool {
        self.egress_stops
            .iter()
            .any(|&stop| self.reached_by_transit_current_round.contains(stop as usize))
    }

    pub fn reached_last_round(&self) -> &FixedBitSet {
        &self.reached_last_round
    }

    pub fn stops_touched_previous_round(&self) -> impl Iterator<Item = StopIndex> + '_ {
        self.reached_last_round.ones().map(|stop| stop as StopIndex)
    }

    pub fn stops_touched_by_transit_current_round(&self) -> impl Iterator<Item = StopIndex> + '_ {
        self.reached_by_transit_current_round.ones().map(|stop| stop as StopIndex)
    }

    pub fn is_stop_reached_in_previous_round(&self, stop: StopIndex) -> bool {
        self.reached_last_round.contains(stop as usize)
    }

    pub fn is_stop_reached_in_current_round(&self, stop: StopIndex) -> bool {
        self.reached_current_round.contains(stop as usize)
    }

    // Labels are not versioned per round, so this is the best value known so far.
    pub fn best_time_previous_round(&self, stop: StopIndex) -> Timestamp {
        self.times[stop as usize]
    }

    pub fn best_cost_previous_round(&self, stop: StopIndex) -> Cost {
        self.costs[stop as usize]
    }

    pub fn best_time(&self, stop: StopIndex) -> Timestamp {
        self.times[stop as usize]
    }

    pub fn best_transit_arrival_time(&self, stop: StopIndex) -> Timestamp {
        self.transit_arrival_times[stop as usize]
    }

    pub fn best_cost(&self, stop: StopIndex) -> Cost {
        self.costs[stop as usize]
    }

    pub fn best_transit_arrival_cost(&self, stop: StopIndex) -> Cost {
        self.transit_arrival_costs[stop as usize]
    }

    pub fn best_num_transfers(&self, stop: StopIndex) -> Round {
        self.best_num_transfers[stop as usize]
    }

    pub fn round_max_limit(&self) -> Round {
        self.round_max_limit
    }

    pub fn num_stops(&self) -> usize {
        self.times.len()
    }

    pub fn prepare_for_transit_with(&mut self, heuristic_trip: &'a T) {
        self.scan = BoardingScan { trip: Some(heuristic_trip), fastest: None, cheapest: None };
    }

    pub fn board(&mut self, stop: StopIndex, stop_pos: usize, board_slack: Timestamp, has_constrained_transfer: bool) {
        let Some(trip) = self.scan.trip else {
            return;
        };
        let direction = self.direction;
        let previous_duration = self.best_time_previous_round(stop);
        let board_time = direction.board_time(trip, stop_pos);
        let slack = if has_constrained_transfer { 0 } else { board_slack };
        let duration = previous_duration.saturating_add(slack);

        let faster = self.scan.fastest.is_none_or(|held| {
            duration < held.value.saturating_add(direction.ride_duration(held.board_time, board_time))
        });
        if faster {
            self.scan.fastest = Some(Boarding { board_time, value: duration });
        }

        let board_cost = if has_constrained_transfer {
            0
        } else {
            self.cost_calculator.boarding_cost(
                self.round_tracker.round() < 2,
                previous_duration,
                stop,
                duration,
                trip,
                TransferConstraint::Regular,
            )
        };
        let cost = self.best_cost_previous_round(stop).saturating_add(board_cost);

        let calculator = self.cost_calculator;
        let cheaper = self.scan.cheapest.is_none_or(|held| {
            let ride = direction.ride_duration(held.board_time, board_time);
            cost < held.value.saturating_add(calculator.ride_cost(ride, trip))
        });
        if cheaper {
            self.scan.cheapest = Some(Boarding { board_time, value: cost });
        }
    }

    pub fn alight(&mut self, stop: StopIndex, stop_pos: usize, alight_slack: Timestamp) {
        let (Some(trip), Some(fastest), Some(cheapest)) = (self.scan.trip, self.scan.fastest, self.scan.cheapest) else {
            return;
        };
        let alight_time = self.direction.alight_time(trip, stop_pos);

        let ride = self.direction.ride_duration(fastest.board_time, alight_time);
        let time = fastest.value.saturating_add(alight_slack).saturating_add(ride);

        let ride = self.direction.ride_duration(cheapest.board_time, alight_time);
        let transit_cost = self.cost_calculator.transit_arrival_cost(cheapest.value, alight_slack, ride, trip, stop);
        let cost = cheapest.value.saturating_add(transit_cost);

        self.update_new_best_time_cost_and_round(stop, time, cost, true);
    }

    pub fn transfer_to_stops(&mut self, from_stop: StopIndex, transfers: &[Transfer]) {
        let previous_duration = self.best_time_previous_round(from_stop);
        let previous_cost = self.best_cost_previous_round(from_stop);

        for transfer in transfers {
            self.update_new_best_time_cost_and_round(
                transfer.stop,
                previous_duration.saturating_add(transfer.duration),
                previous_cost.saturating_add(transfer.cost),
                false,
            );
        }
    }

    pub fn set_access_to_stop(&mut self, access: &AccessEgress) {
        self.update_new_best_time_cost_and_round(access.stop, access.duration, access.cost, access.stop_reached_on_board);
    }

    /// Clears the round-scoped sets so stops reached in the last round of one
    /// iteration do not leak into the next.
    pub fn setup_iteration(&mut self) {
        self.reached_current_round.clear();
        self.reached_by_transit_current_round.clear();
    }

    pub fn prepare_for_next_round(&mut self) {
        std::mem::swap(&mut self.reached_current_round, &mut self.reached_last_round);
        self.reached_current_round.clear();
        self.reached_by_transit_current_round.clear();
    }

    pub fn round_complete(&mut self, destination_reached: bool) {
        if destination_reached {
            let limit = self.round_limit_after_destination(self.round_tracker.round());
            self.round_max_limit = self.round_max_limit.min(limit);
        }
    }

    pub fn into_heuristics(self) -> Heuristics {
        Heuristics::new(self.best_num_transfers, self.times, self.costs, self.egress_stops)
    }

    fn round_limit_after_destination(&self, round: Round) -> Round {
        round.saturating_add(self.additional_transfers).saturating_add(1)
    }

    fn update_new_best_time_cost_and_round(&mut self, stop: StopIndex, time: Timestamp, cost: Cost, is_transit: bool) {
        let stop = stop as usize;
        let round = self.round_tracker.round();
        if self.heuristic_rounds[stop].saturating_add(round) > self.round_max_limit {
            return;
        }
        if !is_transit || self.update_best_transit_arrival_time(stop, time) {
            self.update_best_time(stop, time);
        }
        if !is_transit || self.update_best_transit_arrival_cost(stop, cost) {
            self.update_best_cost(stop, cost);
        }
        self.update_best_round(stop, round);
    }

    fn update_best_time(&mut self, stop: usize, time: Timestamp) -> bool {
        if time < self.times[stop] {
            self.times[stop] = time;
            self.reached_current_round.insert(stop);
            return true;
        }
        false
    }

    fn update_best_transit_arrival_time(&mut self, stop: usize, time: Timestamp) -> bool {
        if time < self.transit_arrival_times[stop] {
            self.transit_arrival_times[stop] = time;
            self.reached_by_transit_current_round.insert(stop);
            return true;
        }
        false
    }

    fn update_best_cost(&mut self, stop: usize, cost: Cost) -> bool {
        if cost < self.costs[stop] {
            self.costs[stop] = cost;
            self.reached_current_round.insert(stop);
            return true;
        }
        false
    }

    fn update_best_transit_arrival_cost(&mut self, stop: usize, cost: Cost) -> bool {
        if cost < self.transit_arrival_costs[stop] {
            self.transit_arrival_costs[stop] = cost;
            self.reached_by_transit_current_round.insert(stop);
            return true;
        }
        false
    }

    // Access stops reached in round 0 get zero transfers.
    fn update_best_round(&mut self, stop: usize, round: Round) {
        let num_transfers = round.saturating_sub(1);
        if num_transfers < self.best_num_transfers[stop] {
            self.best_num_transfers[stop] = num_transfers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{CostParams, DefaultCostCalculator};

    struct Trip(Vec<Timestamp>);

    impl TripSchedule for Trip {
        fn arrival(&self, stop_pos: usize) -> Timestamp { self.0[stop_pos] }
        fn departure(&self, stop_pos: usize) -> Timestamp { self.0[stop_pos] }
    }

    fn free_calculator() -> DefaultCostCalculator {
        DefaultCostCalculator::new(CostParams { board_cost: 0, ..CostParams::default() })
    }

    fn strategy<'a>(
        tracker: &'a RoundTracker,
        calculator: &'a DefaultCostCalculator,
        num_stops: usize,
    ) -> HeuristicRoutingStrategy<'a, Trip, DefaultCostCalculator> {
        HeuristicRoutingStrategy::new(
            num_stops,
            &HeuristicSearchParams::forward(),
            tracker,
            calculator,
            vec![num_stops as StopIndex - 1],
            None,
        )
    }

    #[test]
    fn access_seeds_a_stop_without_transit_arrival() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let mut s = strategy(&tracker, &calc, 3);

        s.set_access_to_stop(&AccessEgress::walk(0, 60, 90));

        assert_eq!(s.best_time(0), 60);
        assert_eq!(s.best_cost(0), 90);
        assert_eq!(s.best_transit_arrival_time(0), UNREACHED);
        assert_eq!(s.best_num_transfers(0), 0);
        assert!(s.is_new_round_available());
        assert_eq!(s.stops_touched_by_transit_current_round().count(), 0);
    }

    #[test]
    fn on_board_access_counts_as_transit_arrival() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let mut s = strategy(&tracker, &calc, 3);

        s.set_access_to_stop(&AccessEgress::flex(1, 300, 400, 0, true));

        assert_eq!(s.best_transit_arrival_time(1), 300);
        assert_eq!(s.best_transit_arrival_cost(1), 400);
        assert_eq!(s.stops_touched_by_transit_current_round().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn relaxing_twice_is_idempotent() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let mut s = strategy(&tracker, &calc, 3);

        s.set_access_to_stop(&AccessEgress::walk(2, 60, 60));
        s.prepare_for_next_round();
        s.set_access_to_stop(&AccessEgress::walk(2, 60, 60));

        assert_eq!(s.best_time(2), 60);
        assert!(!s.is_stop_reached_in_current_round(2));
        assert!(!s.is_new_round_available());
    }

    #[test]
    fn ride_from_boarding_to_alighting() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let trip = Trip(vec![0, 100, 250]);
        let mut s = strategy(&tracker, &calc, 3);

        s.set_access_to_stop(&AccessEgress::walk(0, 30, 30));
        tracker.next_round();
        s.prepare_for_next_round();

        s.prepare_for_transit_with(&trip);
        s.alight(0, 0, 0);
        s.board(0, 0, 0, false);
        s.alight(1, 1, 0);
        s.alight(2, 2, 0);

        assert_eq!(s.best_time(1), 130);
        assert_eq!(s.best_time(2), 280);
        assert_eq!(s.best_transit_arrival_time(2), 280);
        assert_eq!(s.best_cost(2), 280);
        assert_eq!(s.best_num_transfers(2), 0);
        // Alighting before boarding must not touch the boarding stop.
        assert_eq!(s.best_transit_arrival_time(0), UNREACHED);
        assert!(s.is_destination_reached_in_current_round());
    }

    #[test]
    fn reboards_when_the_previous_round_is_faster_downstream() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let trip = Trip(vec![0, 100, 200, 300]);
        let mut s = strategy(&tracker, &calc, 4);

        s.set_access_to_stop(&AccessEgress::walk(0, 0, 0));
        s.set_access_to_stop(&AccessEgress::walk(1, 20, 20));
        tracker.next_round();
        s.prepare_for_next_round();

        s.prepare_for_transit_with(&trip);
        for pos in 0..4 {
            s.alight(pos as StopIndex, pos, 0);
            if s.is_stop_reached_in_previous_round(pos as StopIndex) {
                s.board(pos as StopIndex, pos, 0, false);
            }
        }

        assert_eq!(s.best_time(3), 220);
    }

    #[test]
    fn constrained_transfer_waives_slack_and_board_cost() {
        let tracker = RoundTracker::new(12);
        let calc = DefaultCostCalculator::default();
        let trip = Trip(vec![0, 100]);
        let mut s = strategy(&tracker, &calc, 2);

        s.set_access_to_stop(&AccessEgress::walk(0, 0, 0));
        tracker.next_round();
        s.prepare_for_next_round();

        s.prepare_for_transit_with(&trip);
        s.board(0, 0, 120, true);
        s.alight(1, 1, 0);

        assert_eq!(s.best_time(1), 100);
        assert_eq!(s.best_cost(1), 100);
    }

    #[test]
    fn transfers_do_not_mark_transit_arrivals() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let mut s = strategy(&tracker, &calc, 3);

        s.set_access_to_stop(&AccessEgress::walk(0, 10, 10));
        tracker.next_round();
        s.transfer_to_stops(0, &[Transfer::new(2, 60, 75)]);

        assert_eq!(s.best_time(2), 70);
        assert_eq!(s.best_cost(2), 85);
        assert_eq!(s.best_transit_arrival_time(2), UNREACHED);
        assert!(!s.is_destination_reached_in_current_round());
    }

    #[test]
    fn round_budget_shrinks_once_destination_is_reached() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let mut s = strategy(&tracker, &calc, 3);

        tracker.next_round();
        tracker.next_round();
        s.round_complete(false);
        assert_eq!(s.round_max_limit(), 12);
        s.round_complete(true);
        assert_eq!(s.round_max_limit(), 2 + 5 + 1);

        // Never grows back.
        for _ in 0..6 {
            tracker.next_round();
        }
        s.round_complete(true);
        assert_eq!(s.round_max_limit(), 8);

        // Round 9 is past the budget, so relaxations are discarded.
        tracker.next_round();
        s.set_access_to_stop(&AccessEgress::walk(1, 5, 5));
        assert_eq!(s.best_time(1), UNREACHED);
    }

    #[test]
    fn previous_heuristic_cuts_off_hopeless_stops() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let previous = Heuristics::new(
            vec![0, 11, UNREACHED_ROUNDS],
            vec![0, 10, UNREACHED],
            vec![0, 10, UNREACHED],
            vec![0],
        );
        let params = HeuristicSearchParams::forward();
        let mut s = HeuristicRoutingStrategy::<Trip, _>::new(3, &params, &tracker, &calc, vec![2], Some(&previous));

        s.set_access_to_stop(&AccessEgress::walk(1, 10, 10));
        assert_eq!(s.best_time(1), 10);

        tracker.next_round();
        tracker.next_round();
        s.set_access_to_stop(&AccessEgress::walk(0, 10, 10));
        s.set_access_to_stop(&AccessEgress::walk(1, 5, 5));
        s.set_access_to_stop(&AccessEgress::walk(2, 10, 10));
        assert_eq!(s.best_time(0), 10);
        // 11 + 2 rounds exceeds the limit of 12.
        assert_eq!(s.best_time(1), 10);
        // Unreached stops get the full limit.
        assert_eq!(s.best_time(2), UNREACHED);
    }

    #[test]
    fn freezing_moves_the_labels() {
        let tracker = RoundTracker::new(12);
        let calc = free_calculator();
        let mut s = strategy(&tracker, &calc, 3);
        s.set_access_to_stop(&AccessEgress::walk(2, 45, 50));

        let heuristics = s.into_heuristics();
        assert!(heuristics.destination_reached());
        assert_eq!(heuristics.best_travel_duration_to_vec(0), vec![0, 0, 45]);
    }
}
