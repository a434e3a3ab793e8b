use crate::calculator::SearchDirection;
use crate::provider::DestinationArrivals;
use crate::transit::{Cost, Round, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationArrival {
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub num_transfers: Round,
    pub cost: Cost,
}

impl DestinationArrival {
    pub fn new(departure_time: Timestamp, arrival_time: Timestamp, num_transfers: Round, cost: Cost) -> Self {
        Self { departure_time, arrival_time, num_transfers, cost }
    }

    // At least as good as `other` in every criterion.
    fn covers(&self, other: &DestinationArrival, direction: SearchDirection) -> bool {
        !direction.is_better_time(other.arrival_time, self.arrival_time)
            && !direction.opposite().is_better_time(other.departure_time, self.departure_time)
            && self.num_transfers <= other.num_transfers
            && self.cost <= other.cost
    }

    fn dominates(&self, other: &DestinationArrival, direction: SearchDirection) -> bool {
        self.covers(other, direction) && self != other
    }
}

/// The Pareto set of arrivals found at the destination so far.
#[derive(Clone, Debug)]
pub struct DestinationArrivalSet {
    direction: SearchDirection,
    arrivals: Vec<DestinationArrival>,
}

impl DestinationArrivalSet {
    pub fn new(direction: SearchDirection) -> Self {
        Self { direction, arrivals: Vec::new() }
    }

    // Adds an arrival to the set, discarding arrivals it dominates.
    // Returns true if the arrival was added <=> the set was modified.
    pub fn add(&mut self, new_arrival: DestinationArrival) -> bool {
        let direction = self.direction;
        if self.arrivals.iter().any(|arrival| arrival.covers(&new_arrival, direction)) {
            return false;
        }
        self.arrivals.retain(|arrival| !new_arrival.covers(arrival, direction));
        self.arrivals.push(new_arrival);
        true
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DestinationArrival> {
        self.arrivals.iter()
    }
}

impl DestinationArrivals for DestinationArrivalSet {
    fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    fn qualify(&self, departure_time: Timestamp, arrival_time: Timestamp, num_transfers: Round, cost: Cost) -> bool {
        let candidate = DestinationArrival::new(departure_time, arrival_time, num_transfers, cost);
        !self.arrivals.iter().any(|arrival| arrival.dominates(&candidate, self.direction))
    }
}
