use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use chrono::NaiveDate;
use fixedbitset::FixedBitSet;
use gtfs_structures::{DirectionType, Gtfs, PickupDropOffType, TransferType, Trip};

use crate::cost::DefaultCostCalculator;
use crate::transit::{Cost, RouteIndex, StopIndex, Timestamp, Transfer, TransitDataProvider, TripSchedule};
use crate::utils;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Too many stops ({0}) for a 32-bit stop index.")]
    TooManyStops(usize),
    #[error("Stop {0} is referenced but not defined.")]
    UnknownStop(String),
    #[error("Stop index {0} is out of range.")]
    UnknownStopIndex(StopIndex),
    #[error("Route index {0} is out of range.")]
    UnknownRouteIndex(RouteIndex),
    #[error("Route {route} has no stop at position {stop_pos}.")]
    UnknownStopPosition { route: RouteIndex, stop_pos: usize },
    #[error("Trip {0} has a stop time without arrival or departure time.")]
    MissingStopTime(String),
    #[error("Route {line} has {expected} stops but a trip with {found} stop times.")]
    TripLength { line: String, expected: usize, found: usize },
    #[error("Route {0} needs at least one stop and one trip.")]
    EmptyRoute(String),
}

pub struct Route {
    pub line: Rc<str>,
    pub num_stops: usize,
    pub num_trips: usize,
    pub route_stops_idx: usize,
    pub stop_times_idx: usize,
    pub slack_index: usize,
}

impl Route {
    pub fn get_stops<'a>(&self, route_stops: &'a [StopIndex]) -> &'a [StopIndex] {
        &route_stops[self.route_stops_idx..(self.route_stops_idx + self.num_stops)]
    }

    pub fn get_trip<'a>(&self, trip: usize, stop_times: &'a [StopTime]) -> &'a [StopTime] {
        let start = self.stop_times_idx + trip * self.num_stops;
        let end = start + self.num_stops;
        &stop_times[start..end]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopTime {
    pub arrival_time: Timestamp,
    pub departure_time: Timestamp,
}

impl StopTime {
    pub fn new(arrival_time: Timestamp, departure_time: Timestamp) -> Self {
        Self { arrival_time, departure_time }
    }
}

/// The stop times of a single trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripTimes {
    pub stop_times: Vec<StopTime>,
}

impl TripTimes {
    // The fastest hop and the shortest dwell of any trip at every position, so no
    // ride on the envelope is longer than the same ride on a real trip.
    fn min_envelope(trips: &[Vec<StopTime>], num_stops: usize) -> Self {
        let mut stop_times = Vec::with_capacity(num_stops);
        let mut time = 0;
        for pos in 0..num_stops {
            let dwell = trips
                .iter()
                .map(|trip| trip[pos].departure_time.saturating_sub(trip[pos].arrival_time))
                .min()
                .unwrap_or(0);
            stop_times.push(StopTime::new(time, time + dwell));
            time += dwell;
            if pos + 1 < num_stops {
                time += trips
                    .iter()
                    .map(|trip| trip[pos + 1].arrival_time.saturating_sub(trip[pos].departure_time))
                    .min()
                    .unwrap_or(0);
            }
        }
        Self { stop_times }
    }
}

impl TripSchedule for TripTimes {
    fn arrival(&self, stop_pos: usize) -> Timestamp {
        self.stop_times[stop_pos].arrival_time
    }

    fn departure(&self, stop_pos: usize) -> Timestamp {
        self.stop_times[stop_pos].departure_time
    }
}

pub struct Stop {
    pub name: Box<str>,
    pub routes_idx: usize,
    pub num_routes: usize,
}

impl Stop {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            routes_idx: 0,
            num_routes: 0,
        }
    }

    pub fn get_routes<'a>(&self, stop_routes: &'a [RouteIndex]) -> &'a [RouteIndex] {
        &stop_routes[self.routes_idx..(self.routes_idx + self.num_routes)]
    }
}

/// An in-memory timetable for one service day.
pub struct Network {
    pub routes: Vec<Route>,
    pub stops: Vec<Stop>,
    pub stop_index: HashMap<String, StopIndex>,
    pub stop_times: Vec<StopTime>,
    pub stop_routes: Vec<RouteIndex>,
    pub route_stops: Vec<StopIndex>,
    // Parallel to route_stops.
    pub can_board: Vec<bool>,
    pub can_alight: Vec<bool>,
    heuristic_trips: Vec<TripTimes>,
    transfers_from: Vec<Vec<Transfer>>,
    transfers_to: Vec<Vec<Transfer>>,
    // (route, stop position) pairs where a guaranteed transfer boards or alights.
    guaranteed_boardings: HashSet<(RouteIndex, usize)>,
    guaranteed_alightings: HashSet<(RouteIndex, usize)>,
    cost_calculator: DefaultCostCalculator,
}

impl Network {
    /// Builds the network of trips running on `journey_date`.
    pub fn from_gtfs(gtfs: &Gtfs, journey_date: NaiveDate, default_transfer_time: Timestamp) -> Result<Self, NetworkError> {
        if StopIndex::try_from(gtfs.stops.len()).is_err() {
            return Err(NetworkError::TooManyStops(gtfs.stops.len()));
        }

        // Sorted so stop indices do not depend on hash map order.
        let mut stop_ids: Vec<&String> = gtfs.stops.keys().collect();
        stop_ids.sort_unstable();

        let mut builder = NetworkBuilder::new();
        for &id in &stop_ids {
            let name = gtfs.stops[id].name.as_deref().unwrap_or(id);
            builder.add_stop(id, name);
        }

        // Construct our own routes as collections of trips with the same stops, because
        // the ones defined in the GTFS contain different amounts of stops.
        let mut patterns: BTreeMap<(Vec<StopIndex>, u8), Vec<&Trip>> = BTreeMap::new();
        for trip in gtfs.trips.values() {
            if !utils::does_trip_run(gtfs, trip, journey_date) {
                continue;
            }
            if trip.stop_times.len() < 2 {
                log::warn!("Skipping trip {} with fewer than two stop times.", trip.id);
                continue;
            }
            let stops = trip
                .stop_times
                .iter()
                .map(|stop_time| {
                    builder
                        .get_stop_idx(&stop_time.stop.id)
                        .ok_or_else(|| NetworkError::UnknownStop(stop_time.stop.id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let direction = trip.direction_id.unwrap_or(DirectionType::Outbound) as u8;
            patterns.entry((stops, direction)).or_default().push(trip);
        }

        for ((stops, _), mut trips) in patterns {
            trips.sort_unstable_by_key(|trip| trip.stop_times[0].departure_time.or(trip.stop_times[0].arrival_time));

            let first_trip = trips[0];
            let line = gtfs
                .routes
                .get(first_trip.route_id.as_str())
                .and_then(|route| route.short_name.clone())
                .unwrap_or_else(|| first_trip.route_id.clone());

            let mut trip_times = Vec::with_capacity(trips.len());
            for trip in &trips {
                let times = trip
                    .stop_times
                    .iter()
                    .map(|stop_time| {
                        let arrival = stop_time.arrival_time.or(stop_time.departure_time);
                        let departure = stop_time.departure_time.or(stop_time.arrival_time);
                        match (arrival, departure) {
                            (Some(arrival), Some(departure)) => Ok(StopTime::new(arrival, departure)),
                            _ => Err(NetworkError::MissingStopTime(trip.id.clone())),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                trip_times.push(times);
            }

            let route = builder.add_route(&line, &stops, trip_times)?;
            for pos in 0..stops.len() {
                let can_board = trips
                    .iter()
                    .any(|trip| !matches!(trip.stop_times[pos].pickup_type, PickupDropOffType::NotAvailable));
                let can_alight = trips
                    .iter()
                    .any(|trip| !matches!(trip.stop_times[pos].drop_off_type, PickupDropOffType::NotAvailable));
                builder.set_boarding_and_alighting(route, pos, can_board, can_alight)?;
            }
        }

        for &id in &stop_ids {
            let Some(from) = builder.get_stop_idx(id) else { continue };
            for transfer in &gtfs.stops[id].transfers {
                if matches!(transfer.transfer_type, TransferType::Impossible) {
                    continue;
                }
                let Some(to) = builder.get_stop_idx(&transfer.to_stop_id) else {
                    log::warn!("Skipping transfer from {} to unknown stop {}.", id, transfer.to_stop_id);
                    continue;
                };
                if from != to {
                    builder.add_transfer(from, to, transfer.min_transfer_time.unwrap_or(default_transfer_time))?;
                }
            }
        }

        let network = builder.build();
        log::info!(
            "Network for {} built with {} stops, {} routes and {} stop times.",
            journey_date,
            network.num_stops(),
            network.num_routes(),
            network.stop_times.len()
        );
        Ok(network)
    }

    pub fn set_cost_calculator(&mut self, cost_calculator: DefaultCostCalculator) {
        self.cost_calculator = cost_calculator;
    }

    pub fn get_stop(&self, stop: StopIndex) -> &Stop { &self.stops[stop as usize] }

    pub fn get_stop_idx(&self, stop_id: &str) -> Option<StopIndex> { self.stop_index.get(stop_id).copied() }

    pub fn get_stop_idx_from_name(&self, stop_name: &str) -> Option<StopIndex> {
        self.stops.iter().position(|stop| &*stop.name == stop_name).map(|idx| idx as StopIndex)
    }

    pub fn num_stops(&self) -> usize { self.stops.len() }

    pub fn num_routes(&self) -> usize { self.routes.len() }

    pub fn num_trips(&self, route_idx: usize) -> usize { self.routes[route_idx].num_trips }

    pub fn num_stops_in_route(&self, route_idx: usize) -> usize { self.routes[route_idx].num_stops }

    pub fn get_trip(&self, route_idx: usize, trip_idx: usize) -> &[StopTime] {
        let route = &self.routes[route_idx];
        route.get_trip(trip_idx, &self.stop_times)
    }
}

impl TransitDataProvider for Network {
    type Trip = TripTimes;
    type Cost = DefaultCostCalculator;

    fn num_stops(&self) -> usize {
        self.stops.len()
    }

    fn routes_for_stops(&self, stops: &FixedBitSet) -> Vec<RouteIndex> {
        let mut seen = FixedBitSet::with_capacity(self.routes.len());
        let mut routes = Vec::new();
        for stop in stops.ones() {
            for &route in self.stops[stop].get_routes(&self.stop_routes) {
                if !seen.put(route as usize) {
                    routes.push(route);
                }
            }
        }
        routes
    }

    fn pattern_stops(&self, route: RouteIndex) -> &[StopIndex] {
        self.routes[route as usize].get_stops(&self.route_stops)
    }

    fn slack_index(&self, route: RouteIndex) -> usize {
        self.routes[route as usize].slack_index
    }

    fn boarding_possible_at(&self, route: RouteIndex, stop_pos: usize) -> bool {
        self.can_board[self.routes[route as usize].route_stops_idx + stop_pos]
    }

    fn alighting_possible_at(&self, route: RouteIndex, stop_pos: usize) -> bool {
        self.can_alight[self.routes[route as usize].route_stops_idx + stop_pos]
    }

    fn heuristic_trip(&self, route: RouteIndex) -> &TripTimes {
        &self.heuristic_trips[route as usize]
    }

    fn transfers_from_stop(&self, stop: StopIndex) -> &[Transfer] {
        &self.transfers_from[stop as usize]
    }

    fn transfers_to_stop(&self, stop: StopIndex) -> &[Transfer] {
        &self.transfers_to[stop as usize]
    }

    // A reverse search boards where the journey alights.
    fn has_constrained_transfer(&self, route: RouteIndex, stop_pos: usize, forward: bool) -> bool {
        if forward {
            self.guaranteed_boardings.contains(&(route, stop_pos))
        } else {
            self.guaranteed_alightings.contains(&(route, stop_pos))
        }
    }

    fn cost_calculator(&self) -> &DefaultCostCalculator {
        &self.cost_calculator
    }
}

struct PatternData {
    line: String,
    stops: Vec<StopIndex>,
    trips: Vec<Vec<StopTime>>,
    can_board: Vec<bool>,
    can_alight: Vec<bool>,
    slack_index: usize,
}

/// Builds a [`Network`] stop by stop and route by route.
#[derive(Default)]
pub struct NetworkBuilder {
    stops: Vec<Stop>,
    stop_index: HashMap<String, StopIndex>,
    patterns: Vec<PatternData>,
    transfers: Vec<(StopIndex, Transfer)>,
    guaranteed_boardings: HashSet<(RouteIndex, usize)>,
    guaranteed_alightings: HashSet<(RouteIndex, usize)>,
    cost_calculator: DefaultCostCalculator,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cost_calculator(mut self, cost_calculator: DefaultCostCalculator) -> Self {
        self.cost_calculator = cost_calculator;
        self
    }

    pub fn add_stop(&mut self, id: &str, name: &str) -> StopIndex {
        if let Some(&idx) = self.stop_index.get(id) {
            return idx;
        }
        let idx = self.stops.len() as StopIndex;
        self.stops.push(Stop::new(name));
        self.stop_index.insert(id.to_owned(), idx);
        idx
    }

    pub fn get_stop_idx(&self, id: &str) -> Option<StopIndex> {
        self.stop_index.get(id).copied()
    }

    /// Adds a route serving `stops` in order. Every trip must have one stop time per stop.
    pub fn add_route(
        &mut self,
        line: &str,
        stops: &[StopIndex],
        trips: Vec<Vec<StopTime>>,
    ) -> Result<RouteIndex, NetworkError> {
        if stops.is_empty() || trips.is_empty() {
            return Err(NetworkError::EmptyRoute(line.to_owned()));
        }
        if let Some(&stop) = stops.iter().find(|&&stop| stop as usize >= self.stops.len()) {
            return Err(NetworkError::UnknownStopIndex(stop));
        }
        if let Some(trip) = trips.iter().find(|trip| trip.len() != stops.len()) {
            return Err(NetworkError::TripLength {
                line: line.to_owned(),
                expected: stops.len(),
                found: trip.len(),
            });
        }

        self.patterns.push(PatternData {
            line: line.to_owned(),
            stops: stops.to_vec(),
            trips,
            can_board: vec![true; stops.len()],
            can_alight: vec![true; stops.len()],
            slack_index: 0,
        });
        Ok((self.patterns.len() - 1) as RouteIndex)
    }

    pub fn set_boarding_and_alighting(
        &mut self,
        route: RouteIndex,
        stop_pos: usize,
        can_board: bool,
        can_alight: bool,
    ) -> Result<(), NetworkError> {
        self.check_stop_pos(route, stop_pos)?;
        let pattern = &mut self.patterns[route as usize];
        pattern.can_board[stop_pos] = can_board;
        pattern.can_alight[stop_pos] = can_alight;
        Ok(())
    }

    pub fn set_slack_index(&mut self, route: RouteIndex, slack_index: usize) -> Result<(), NetworkError> {
        let pattern = self.patterns.get_mut(route as usize).ok_or(NetworkError::UnknownRouteIndex(route))?;
        pattern.slack_index = slack_index;
        Ok(())
    }

    /// Adds a one-way transfer. Its generalized cost equals its duration.
    pub fn add_transfer(&mut self, from: StopIndex, to: StopIndex, duration: Timestamp) -> Result<(), NetworkError> {
        self.add_transfer_with_cost(from, to, duration, duration)
    }

    pub fn add_transfer_with_cost(
        &mut self,
        from: StopIndex,
        to: StopIndex,
        duration: Timestamp,
        cost: Cost,
    ) -> Result<(), NetworkError> {
        for stop in [from, to] {
            if stop as usize >= self.stops.len() {
                return Err(NetworkError::UnknownStopIndex(stop));
            }
        }
        self.transfers.push((from, Transfer::new(to, duration, cost)));
        Ok(())
    }

    /// Registers a guaranteed transfer from alighting `from_route` at `from_pos` to
    /// boarding `to_route` at `to_pos`.
    pub fn add_guaranteed_transfer(
        &mut self,
        from_route: RouteIndex,
        from_pos: usize,
        to_route: RouteIndex,
        to_pos: usize,
    ) -> Result<(), NetworkError> {
        self.check_stop_pos(from_route, from_pos)?;
        self.check_stop_pos(to_route, to_pos)?;
        self.guaranteed_alightings.insert((from_route, from_pos));
        self.guaranteed_boardings.insert((to_route, to_pos));
        Ok(())
    }

    fn check_stop_pos(&self, route: RouteIndex, stop_pos: usize) -> Result<(), NetworkError> {
        let pattern = self.patterns.get(route as usize).ok_or(NetworkError::UnknownRouteIndex(route))?;
        if stop_pos >= pattern.stops.len() {
            return Err(NetworkError::UnknownStopPosition { route, stop_pos });
        }
        Ok(())
    }

    pub fn build(self) -> Network {
        let num_stops = self.stops.len();
        let mut stops = self.stops;

        let mut routes = Vec::with_capacity(self.patterns.len());
        let mut route_stops = Vec::new();
        let mut can_board = Vec::new();
        let mut can_alight = Vec::new();
        let mut stop_times = Vec::new();
        let mut heuristic_trips = Vec::with_capacity(self.patterns.len());
        let mut routes_by_stop: Vec<Vec<RouteIndex>> = vec![Vec::new(); num_stops];

        for (route_idx, mut pattern) in self.patterns.into_iter().enumerate() {
            // Sort trips in route based on earliest departure time.
            pattern.trips.sort_unstable_by_key(|trip| trip[0].departure_time);

            let num_stops_in_route = pattern.stops.len();
            routes.push(Route {
                line: Rc::from(pattern.line.as_str()),
                num_stops: num_stops_in_route,
                num_trips: pattern.trips.len(),
                route_stops_idx: route_stops.len(),
                stop_times_idx: stop_times.len(),
                slack_index: pattern.slack_index,
            });
            heuristic_trips.push(TripTimes::min_envelope(&pattern.trips, num_stops_in_route));

            for &stop in &pattern.stops {
                let routes_at_stop = &mut routes_by_stop[stop as usize];
                // A route may visit a stop more than once.
                if routes_at_stop.last() != Some(&(route_idx as RouteIndex)) {
                    routes_at_stop.push(route_idx as RouteIndex);
                }
            }
            route_stops.extend_from_slice(&pattern.stops);
            can_board.extend_from_slice(&pattern.can_board);
            can_alight.extend_from_slice(&pattern.can_alight);
            for trip in pattern.trips {
                stop_times.extend(trip);
            }
        }

        // Index the routes for a given stop.
        let mut stop_routes = Vec::new();
        for (stop, routes_at_stop) in stops.iter_mut().zip(routes_by_stop) {
            stop.routes_idx = stop_routes.len();
            stop.num_routes = routes_at_stop.len();
            stop_routes.extend(routes_at_stop);
        }

        let mut transfers_from = vec![Vec::new(); num_stops];
        let mut transfers_to = vec![Vec::new(); num_stops];
        for (from, transfer) in self.transfers {
            transfers_to[transfer.stop as usize].push(Transfer::new(from, transfer.duration, transfer.cost));
            transfers_from[from as usize].push(transfer);
        }

        Network {
            routes,
            stops,
            stop_index: self.stop_index,
            stop_times,
            stop_routes,
            route_stops,
            can_board,
            can_alight,
            heuristic_trips,
            transfers_from,
            transfers_to,
            guaranteed_boardings: self.guaranteed_boardings,
            guaranteed_alightings: self.guaranteed_alightings,
            cost_calculator: self.cost_calculator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(times: &[(Timestamp, Timestamp)]) -> Vec<StopTime> {
        times.iter().map(|&(arrival, departure)| StopTime::new(arrival, departure)).collect()
    }

    fn network() -> Network {
        let mut builder = NetworkBuilder::new();
        let stops: Vec<_> = ["A", "B", "C", "D"].iter().map(|&id| builder.add_stop(id, id)).collect();
        builder
            .add_route(
                "1",
                &stops[0..3],
                vec![
                    trip(&[(700, 700), (900, 960), (1200, 1200)]),
                    trip(&[(100, 100), (400, 420), (600, 600)]),
                ],
            )
            .unwrap();
        builder.add_route("2", &[stops[2], stops[3]], vec![trip(&[(0, 0), (300, 300)])]).unwrap();
        builder.add_transfer(stops[1], stops[3], 120).unwrap();
        builder.build()
    }

    #[test]
    fn trips_are_sorted_by_departure() {
        let network = network();
        assert_eq!(network.get_trip(0, 0)[0], StopTime::new(100, 100));
        assert_eq!(network.num_trips(0), 2);
        assert_eq!(network.num_stops_in_route(1), 2);
    }

    #[test]
    fn heuristic_trip_uses_fastest_hops_and_shortest_dwells() {
        let network = network();
        let envelope = network.heuristic_trip(0);
        // Hops are 200/300 and 240/180, dwells at B are 60/20.
        assert_eq!(envelope.stop_times, trip(&[(0, 0), (200, 220), (400, 400)]));
    }

    #[test]
    fn routes_for_stops_are_deduplicated_in_stop_order() {
        let network = network();
        let mut stops = FixedBitSet::with_capacity(network.num_stops());
        stops.insert(3);
        stops.insert(0);
        stops.insert(2);
        assert_eq!(network.routes_for_stops(&stops), vec![0, 1]);

        let mut only_d = FixedBitSet::with_capacity(network.num_stops());
        only_d.insert(3);
        assert_eq!(network.routes_for_stops(&only_d), vec![1]);
    }

    #[test]
    fn transfers_are_indexed_both_ways() {
        let network = network();
        assert_eq!(network.transfers_from_stop(1), &[Transfer::new(3, 120, 120)]);
        assert_eq!(network.transfers_to_stop(3), &[Transfer::new(1, 120, 120)]);
        assert!(network.transfers_from_stop(3).is_empty());
    }

    #[test]
    fn lookups_by_id_and_name() {
        let network = network();
        assert_eq!(network.get_stop_idx("C"), Some(2));
        assert_eq!(network.get_stop_idx_from_name("D"), Some(3));
        assert_eq!(network.get_stop_idx("Z"), None);
        assert_eq!(&*network.routes[1].line, "2");
    }

    #[test]
    fn rejects_malformed_routes() {
        let mut builder = NetworkBuilder::new();
        let a = builder.add_stop("A", "A");
        let b = builder.add_stop("B", "B");
        assert_eq!(builder.add_route("x", &[a, b], vec![]), Err(NetworkError::EmptyRoute("x".into())));
        assert_eq!(
            builder.add_route("x", &[a, b], vec![trip(&[(0, 0)])]),
            Err(NetworkError::TripLength { line: "x".into(), expected: 2, found: 1 })
        );
        assert_eq!(
            builder.add_route("x", &[a, 7], vec![trip(&[(0, 0), (1, 1)])]),
            Err(NetworkError::UnknownStopIndex(7))
        );
        assert_eq!(builder.add_transfer(a, 9, 60), Err(NetworkError::UnknownStopIndex(9)));

        let route = builder.add_route("x", &[a, b], vec![trip(&[(0, 0), (1, 1)])]).unwrap();
        assert_eq!(builder.add_guaranteed_transfer(3, 0, route, 0), Err(NetworkError::UnknownRouteIndex(3)));
        assert_eq!(
            builder.add_guaranteed_transfer(route, 1, route, 2),
            Err(NetworkError::UnknownStopPosition { route, stop_pos: 2 })
        );
        assert_eq!(
            builder.set_boarding_and_alighting(route, 5, false, false),
            Err(NetworkError::UnknownStopPosition { route, stop_pos: 5 })
        );
        assert_eq!(builder.set_boarding_and_alighting(4, 0, false, false), Err(NetworkError::UnknownRouteIndex(4)));
    }

    #[test]
    fn boarding_restrictions_and_guaranteed_transfers() {
        let mut builder = NetworkBuilder::new();
        let a = builder.add_stop("A", "A");
        let b = builder.add_stop("B", "B");
        let c = builder.add_stop("C", "C");
        let first = builder.add_route("1", &[a, b], vec![trip(&[(0, 0), (60, 60)])]).unwrap();
        let second = builder.add_route("2", &[b, c], vec![trip(&[(90, 90), (150, 150)])]).unwrap();
        builder.set_boarding_and_alighting(first, 1, false, true).unwrap();
        builder.add_guaranteed_transfer(first, 1, second, 0).unwrap();
        let network = builder.build();

        assert!(network.boarding_possible_at(first, 0));
        assert!(!network.boarding_possible_at(first, 1));
        assert!(network.alighting_possible_at(first, 1));

        assert!(network.has_constrained_transfer(second, 0, true));
        assert!(!network.has_constrained_transfer(second, 0, false));
        // Searching backwards, the transfer is found when boarding the feeding route.
        assert!(network.has_constrained_transfer(first, 1, false));
        assert!(!network.has_constrained_transfer(first, 1, true));
    }

    mod gtfs {
        use super::*;
        use crate::utils::tests::{date, load_feed, STOP_TIMES, TRIPS};

        fn monday_network() -> Network {
            Network::from_gtfs(&load_feed(TRIPS, STOP_TIMES), date(2024, 1, 1), 120).unwrap()
        }

        #[test]
        fn stops_are_indexed_in_id_order() {
            let network = monday_network();
            assert_eq!(network.num_stops(), 4);
            assert_eq!(network.get_stop_idx("S1"), Some(0));
            assert_eq!(network.get_stop_idx("S4"), Some(3));
            assert_eq!(&*network.get_stop(1).name, "Second");
        }

        #[test]
        fn trips_are_grouped_by_stops_and_direction() {
            let network = monday_network();
            // T4 does not run on Mondays and T6 has a single stop time.
            assert_eq!(network.num_routes(), 2);
            assert_eq!(network.pattern_stops(0), &[0, 1, 2]);
            assert_eq!(network.pattern_stops(1), &[2, 0]);
            assert_eq!(network.num_trips(0), 2);
            assert_eq!(network.get_trip(0, 0)[0], StopTime::new(8 * 3600, 8 * 3600));
            assert_eq!(&*network.routes[0].line, "1");
        }

        #[test]
        fn heuristic_trip_from_gtfs_trips() {
            let network = monday_network();
            // Hops are 600/480 and 540/900 seconds, dwells at S2 are 60/120.
            assert_eq!(network.heuristic_trip(0).stop_times, trip(&[(0, 0), (480, 540), (1080, 1080)]));
        }

        #[test]
        fn pickup_and_drop_off_flags() {
            let network = monday_network();
            assert!(network.boarding_possible_at(0, 0));
            assert!(!network.alighting_possible_at(0, 0));
            assert!(network.boarding_possible_at(0, 1));
            assert!(network.alighting_possible_at(0, 1));
            assert!(!network.boarding_possible_at(0, 2));
            assert!(network.alighting_possible_at(0, 2));
        }

        #[test]
        fn transfers_use_minimum_or_default_time() {
            let network = monday_network();
            assert_eq!(network.transfers_from_stop(1), &[Transfer::new(3, 180, 180)]);
            assert_eq!(network.transfers_from_stop(0), &[Transfer::new(1, 120, 120)]);
            // Impossible transfers are skipped.
            assert!(network.transfers_from_stop(2).is_empty());
            assert_eq!(network.transfers_to_stop(3), &[Transfer::new(1, 180, 180)]);
        }

        #[test]
        fn service_day_exceptions() {
            // Weekday service removed, and no Saturday service on a Monday.
            let network = Network::from_gtfs(&load_feed(TRIPS, STOP_TIMES), date(2024, 1, 8), 120).unwrap();
            assert_eq!(network.num_routes(), 0);

            // Saturday service added on a Tuesday.
            let network = Network::from_gtfs(&load_feed(TRIPS, STOP_TIMES), date(2024, 1, 9), 120).unwrap();
            assert_eq!(network.num_routes(), 3);
            assert_eq!(network.pattern_stops(1), &[0, 2]);
        }

        #[test]
        fn stop_time_without_times_is_an_error() {
            let trips = "route_id,service_id,trip_id,direction_id\nR1,WEEKDAY,T5,0\n";
            let stop_times = "trip_id,arrival_time,departure_time,stop_id,stop_sequence,pickup_type,drop_off_type
T5,08:00:00,08:00:00,S1,1,0,0
T5,,,S2,2,0,0
T5,08:20:00,08:20:00,S3,3,0,0
";
            let result = Network::from_gtfs(&load_feed(trips, stop_times), date(2024, 1, 1), 120);
            assert_eq!(result.err(), Some(NetworkError::MissingStopTime("T5".into())));
        }
    }
}
