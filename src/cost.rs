use crate::transit::{Cost, CostCalculator, StopIndex, Timestamp, TransferConstraint, TripSchedule};

/// Generalized cost parameters. Costs are in seconds-equivalent units.
#[derive(Clone, Debug)]
pub struct CostParams {
    pub board_cost: Cost,
    pub transfer_cost: Cost,
    pub wait_reluctance: f32,
    pub transit_reluctance: f32,
    // Extra cost for boarding or alighting at a given stop, indexed by stop.
    pub stop_transfer_costs: Option<Vec<Cost>>,
}

impl Default for CostParams {
    fn default() -> Self {
        CostParams {
            board_cost: 600,
            transfer_cost: 0,
            wait_reluctance: 1.0,
            transit_reluctance: 1.0,
            stop_transfer_costs: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DefaultCostCalculator {
    params: CostParams,
}

impl DefaultCostCalculator {
    pub fn new(params: CostParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CostParams {
        &self.params
    }

    fn stop_cost(&self, stop: StopIndex) -> Cost {
        self.params
            .stop_transfer_costs
            .as_ref()
            .and_then(|costs| costs.get(stop as usize).copied())
            .unwrap_or(0)
    }

    fn weighted(duration: Timestamp, reluctance: f32) -> Cost {
        (duration as f32 * reluctance).round() as Cost
    }
}

impl<T: TripSchedule> CostCalculator<T> for DefaultCostCalculator {
    fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: Timestamp,
        board_stop: StopIndex,
        board_time: Timestamp,
        _trip: &T,
        constraint: TransferConstraint,
    ) -> Cost {
        if constraint.is_free() {
            return 0;
        }
        let wait = board_time.saturating_sub(prev_arrival_time);
        let mut cost = Self::weighted(wait, self.params.wait_reluctance) + self.params.board_cost;
        if !first_boarding {
            cost += self.params.transfer_cost;
        }
        cost + self.stop_cost(board_stop)
    }

    fn ride_cost(&self, ride_duration: Timestamp, _trip: &T) -> Cost {
        Self::weighted(ride_duration, self.params.transit_reluctance)
    }

    fn transit_arrival_cost(
        &self,
        _board_cost: Cost,
        alight_slack: Timestamp,
        ride_duration: Timestamp,
        trip: &T,
        to_stop: StopIndex,
    ) -> Cost {
        self.ride_cost(ride_duration, trip)
            + Self::weighted(alight_slack, self.params.wait_reluctance)
            + self.stop_cost(to_stop)
    }
}
