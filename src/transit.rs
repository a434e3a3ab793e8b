use fixedbitset::FixedBitSet;

// Timestamp is seconds since midnight, and doubles as a duration in seconds.
pub type Timestamp = u32;
pub type Cost = u32;
pub type Round = u8;
pub type StopIndex = u32;
pub type RouteIndex = u32;

pub const UNREACHED: u32 = 999_999_999;
pub const UNREACHED_ROUNDS: Round = 99;

/// The times of one trip along its pattern.
pub trait TripSchedule {
    fn arrival(&self, stop_pos: usize) -> Timestamp;
    fn departure(&self, stop_pos: usize) -> Timestamp;
}

/// The kind of constraint attached to the transfer a boarding is made from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferConstraint {
    Regular,
    Guaranteed,
    StaySeated,
}

impl TransferConstraint {
    pub fn is_free(self) -> bool {
        !matches!(self, TransferConstraint::Regular)
    }
}

/// A non-transit edge between two stops. For a reverse transfer list `stop` is the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub stop: StopIndex,
    pub duration: Timestamp,
    pub cost: Cost,
}

impl Transfer {
    pub fn new(stop: StopIndex, duration: Timestamp, cost: Cost) -> Self {
        Self { stop, duration, cost }
    }
}

pub trait CostCalculator<T: TripSchedule> {
    /// Cost of boarding `trip` at `board_stop`, including any wait since `prev_arrival_time`.
    fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: Timestamp,
        board_stop: StopIndex,
        board_time: Timestamp,
        trip: &T,
        constraint: TransferConstraint,
    ) -> Cost;

    /// Cost of staying on board `trip` for `ride_duration`. Must not decrease as the ride gets longer.
    fn ride_cost(&self, ride_duration: Timestamp, trip: &T) -> Cost;

    /// Cost added when alighting at `to_stop`, on top of `board_cost`.
    fn transit_arrival_cost(
        &self,
        board_cost: Cost,
        alight_slack: Timestamp,
        ride_duration: Timestamp,
        trip: &T,
        to_stop: StopIndex,
    ) -> Cost;
}

/// The filtered, per-request view of the timetable consumed by the heuristic search.
pub trait TransitDataProvider {
    type Trip: TripSchedule;
    type Cost: CostCalculator<Self::Trip>;

    fn num_stops(&self) -> usize;

    /// Routes serving any stop in `stops`, in a deterministic order without duplicates.
    fn routes_for_stops(&self, stops: &FixedBitSet) -> Vec<RouteIndex>;

    fn pattern_stops(&self, route: RouteIndex) -> &[StopIndex];

    fn slack_index(&self, route: RouteIndex) -> usize;

    fn boarding_possible_at(&self, _route: RouteIndex, _stop_pos: usize) -> bool {
        true
    }

    fn alighting_possible_at(&self, _route: RouteIndex, _stop_pos: usize) -> bool {
        true
    }

    /// The single trip used to approximate every trip of the route.
    fn heuristic_trip(&self, route: RouteIndex) -> &Self::Trip;

    fn transfers_from_stop(&self, stop: StopIndex) -> &[Transfer];

    fn transfers_to_stop(&self, stop: StopIndex) -> &[Transfer];

    /// Whether a constrained transfer allows boarding `route` at `stop_pos` in the given direction.
    fn has_constrained_transfer(&self, _route: RouteIndex, _stop_pos: usize, _forward: bool) -> bool {
        false
    }

    fn cost_calculator(&self) -> &Self::Cost;
}
