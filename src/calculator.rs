use crate::transit::{RouteIndex, StopIndex, Timestamp, Transfer, TransitDataProvider, TripSchedule};

/// Which way a search walks through time. A heuristic pass normally runs in the
/// opposite direction of the multi-criteria search it prunes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchDirection {
    #[default]
    Forward,
    Reverse,
}

impl SearchDirection {
    pub fn is_forward(self) -> bool {
        self == SearchDirection::Forward
    }

    pub fn opposite(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Reverse,
            SearchDirection::Reverse => SearchDirection::Forward,
        }
    }

    // Maps the i-th visited position to a position in the pattern.
    pub fn stop_position(self, i: usize, num_stops: usize) -> usize {
        match self {
            SearchDirection::Forward => i,
            SearchDirection::Reverse => num_stops - 1 - i,
        }
    }

    pub fn board_time<T: TripSchedule>(self, trip: &T, stop_pos: usize) -> Timestamp {
        match self {
            SearchDirection::Forward => trip.departure(stop_pos),
            SearchDirection::Reverse => trip.arrival(stop_pos),
        }
    }

    pub fn alight_time<T: TripSchedule>(self, trip: &T, stop_pos: usize) -> Timestamp {
        match self {
            SearchDirection::Forward => trip.arrival(stop_pos),
            SearchDirection::Reverse => trip.departure(stop_pos),
        }
    }

    /// Time spent on board between a boarding and a later (in search order) stop event.
    pub fn ride_duration(self, board_time: Timestamp, later_time: Timestamp) -> Timestamp {
        match self {
            SearchDirection::Forward => later_time.saturating_sub(board_time),
            SearchDirection::Reverse => board_time.saturating_sub(later_time),
        }
    }

    pub fn plus_duration(self, time: Timestamp, duration: Timestamp) -> Timestamp {
        match self {
            SearchDirection::Forward => time.saturating_add(duration),
            SearchDirection::Reverse => time.saturating_sub(duration),
        }
    }

    pub fn minus_duration(self, time: Timestamp, duration: Timestamp) -> Timestamp {
        self.opposite().plus_duration(time, duration)
    }

    /// True if `a` is strictly better than `b` as an arrival time in this direction.
    pub fn is_better_time(self, a: Timestamp, b: Timestamp) -> bool {
        match self {
            SearchDirection::Forward => a < b,
            SearchDirection::Reverse => a > b,
        }
    }

    pub fn boarding_possible_at<D: TransitDataProvider>(self, data: &D, route: RouteIndex, stop_pos: usize) -> bool {
        match self {
            SearchDirection::Forward => data.boarding_possible_at(route, stop_pos),
            SearchDirection::Reverse => data.alighting_possible_at(route, stop_pos),
        }
    }

    pub fn alighting_possible_at<D: TransitDataProvider>(self, data: &D, route: RouteIndex, stop_pos: usize) -> bool {
        match self {
            SearchDirection::Forward => data.alighting_possible_at(route, stop_pos),
            SearchDirection::Reverse => data.boarding_possible_at(route, stop_pos),
        }
    }

    pub fn transfers<D: TransitDataProvider>(self, data: &D, stop: StopIndex) -> &[Transfer] {
        match self {
            SearchDirection::Forward => data.transfers_from_stop(stop),
            SearchDirection::Reverse => data.transfers_to_stop(stop),
        }
    }
}
