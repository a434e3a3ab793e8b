use crate::access::AccessPaths;
use crate::calculator::SearchDirection;
use crate::config::HeuristicSearchParams;
use crate::heuristics::Heuristics;
use crate::round::RoundTracker;
use crate::slack::SlackProvider;
use crate::strategy::HeuristicRoutingStrategy;
use crate::transit::{Round, StopIndex, TransitDataProvider};

/// Drives a heuristic pass round by round.
pub struct HeuristicRaptorWorker<'a, D: TransitDataProvider> {
    strategy: HeuristicRoutingStrategy<'a, D::Trip, D::Cost>,
    transit_data: &'a D,
    slack_provider: &'a dyn SlackProvider,
    access_paths: AccessPaths,
    round_tracker: &'a RoundTracker,
    direction: SearchDirection,
    // Flex access legs with rides need this many rounds before they can be applied.
    min_number_of_rounds: Round,
    enable_transfer_constraints: bool,
}

impl<'a, D: TransitDataProvider> HeuristicRaptorWorker<'a, D> {
    pub fn new(
        transit_data: &'a D,
        params: &HeuristicSearchParams,
        slack_provider: &'a dyn SlackProvider,
        access_paths: AccessPaths,
        egress_stops: Vec<StopIndex>,
        round_tracker: &'a RoundTracker,
        previous: Option<&Heuristics>,
    ) -> Self {
        let strategy = HeuristicRoutingStrategy::new(
            transit_data.num_stops(),
            params,
            round_tracker,
            transit_data.cost_calculator(),
            egress_stops,
            previous,
        );
        let min_number_of_rounds = access_paths.calculate_max_number_of_rides();

        Self {
            strategy,
            transit_data,
            slack_provider,
            access_paths,
            round_tracker,
            direction: params.direction,
            min_number_of_rounds,
            enable_transfer_constraints: params.enable_transfer_constraints,
        }
    }

    pub fn strategy(&self) -> &HeuristicRoutingStrategy<'a, D::Trip, D::Cost> {
        &self.strategy
    }

    /// Runs one iteration. Labels carry over between iterations and keep improving.
    pub fn route(&mut self) {
        self.start_iteration();
        while self.run_round() {}
    }

    /// Resets the round-scoped state and applies the access legs that need no ride.
    pub fn start_iteration(&mut self) {
        self.strategy.setup_iteration();
        self.round_tracker.setup_iteration();
        self.find_access_on_street_for_round();
    }

    /// Runs the next round, or returns false if the iteration is finished.
    pub fn run_round(&mut self) -> bool {
        if !self.has_more_rounds() {
            return false;
        }
        self.round_tracker.next_round();
        self.strategy.prepare_for_next_round();

        self.find_transit_for_round();
        self.find_access_on_board_for_round();
        self.find_transfers_for_round();
        self.find_access_on_street_for_round();

        let destination_reached = self.strategy.is_destination_reached_in_current_round();
        self.strategy.round_complete(destination_reached);

        log::debug!(
            "Heuristic round {} complete: {} stops reached by transit, destination reached: {}, round limit: {}.",
            self.round(),
            self.strategy.stops_touched_by_transit_current_round().count(),
            destination_reached,
            self.strategy.round_max_limit()
        );
        true
    }

    pub fn into_heuristics(self) -> Heuristics {
        let round = self.round();
        let heuristics = self.strategy.into_heuristics();
        log::info!(
            "Heuristic {:?} pass finished after {} rounds, destination reached: {}.",
            self.direction,
            round,
            heuristics.destination_reached()
        );
        heuristics
    }

    fn round(&self) -> Round {
        self.round_tracker.round()
    }

    fn has_more_rounds(&self) -> bool {
        if self.round() < self.min_number_of_rounds {
            return true;
        }
        self.strategy.is_new_round_available() && self.round_tracker.has_more_rounds()
    }

    fn find_transit_for_round(&mut self) {
        let data = self.transit_data;
        let direction = self.direction;

        for route in data.routes_for_stops(self.strategy.reached_last_round()) {
            let stops = data.pattern_stops(route);
            let slack_index = data.slack_index(route);
            let board_slack = self.slack_provider.board_slack(slack_index);
            let alight_slack = self.slack_provider.alight_slack(slack_index);

            self.strategy.prepare_for_transit_with(data.heuristic_trip(route));

            for i in 0..stops.len() {
                let stop_pos = direction.stop_position(i, stops.len());
                let stop = stops[stop_pos];

                // Alight first, so we never alight at the stop we just boarded.
                if direction.alighting_possible_at(data, route, stop_pos) {
                    self.strategy.alight(stop, stop_pos, alight_slack);
                }

                if direction.boarding_possible_at(data, route, stop_pos)
                    && self.strategy.is_stop_reached_in_previous_round(stop)
                {
                    let has_constrained_transfer = self.enable_transfer_constraints
                        && data.has_constrained_transfer(route, stop_pos, direction.is_forward());
                    self.strategy.board(stop, stop_pos, board_slack, has_constrained_transfer);
                }
            }
        }
    }

    fn find_transfers_for_round(&mut self) {
        let touched: Vec<StopIndex> = self.strategy.stops_touched_by_transit_current_round().collect();
        for from_stop in touched {
            self.strategy.transfer_to_stops(from_stop, self.direction.transfers(self.transit_data, from_stop));
        }
    }

    fn find_access_on_street_for_round(&mut self) {
        for access in self.access_paths.arrived_on_street_by_num_rides(self.round_tracker.round()) {
            self.strategy.set_access_to_stop(access);
        }
    }

    fn find_access_on_board_for_round(&mut self) {
        for access in self.access_paths.arrived_on_board_by_num_rides(self.round_tracker.round()) {
            self.strategy.set_access_to_stop(access);
        }
    }
}

/// Runs a complete single-iteration heuristic pass and freezes the result.
///
/// `access_paths` are the legs at the start of the pass (the egress legs of the
/// journey when searching in reverse) and `egress_stops` the stops at its end.
pub fn heuristic_query<D: TransitDataProvider>(
    transit_data: &D,
    params: &HeuristicSearchParams,
    slack_provider: &dyn SlackProvider,
    access_paths: AccessPaths,
    egress_stops: Vec<StopIndex>,
    previous: Option<&Heuristics>,
) -> Heuristics {
    let round_tracker = RoundTracker::new(params.max_rounds);
    let mut worker = HeuristicRaptorWorker::new(
        transit_data,
        params,
        slack_provider,
        access_paths,
        egress_stops,
        &round_tracker,
        previous,
    );
    worker.route();
    worker.into_heuristics()
}
