pub mod transit;

pub use transit::{Cost, CostCalculator, Round, RouteIndex, StopIndex, Timestamp, Transfer, TransitDataProvider, TripSchedule};

pub mod calculator;

pub use calculator::SearchDirection;

pub mod round;

pub use round::RoundTracker;

pub mod access;

pub use access::{AccessEgress, AccessPaths};

pub mod slack;
pub mod cost;
pub mod config;

pub use config::HeuristicSearchParams;

pub mod strategy;

pub use strategy::HeuristicRoutingStrategy;

pub mod worker;

pub use worker::{heuristic_query, HeuristicRaptorWorker};

pub mod heuristics;

pub use heuristics::{HeuristicAtStop, Heuristics};

pub mod provider;

pub use provider::{DestinationArrivals, HeuristicsProvider, StopArrival};

pub mod pareto;

pub mod network;

pub use network::{Network, NetworkBuilder, NetworkError};

pub mod utils;
