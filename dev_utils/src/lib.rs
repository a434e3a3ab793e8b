use raptor::network::StopTime;
use raptor::{Network, NetworkBuilder, StopIndex, Timestamp};

// Common synthetic networks for the tests and benchmarks.

pub fn get_example_start_time() -> Timestamp {
    6 * 3600
}

pub fn get_example_end_time() -> Timestamp {
    10 * 3600
}

pub fn get_example_transfer_time() -> Timestamp {
    4 * 60 // 4 minutes walk between diagonal neighbours.
}

pub fn grid_stop(size: usize, row: usize, col: usize) -> StopIndex {
    (row * size + col) as StopIndex
}

// Trips along `stops` every `headway` seconds, with random hop times and a little jitter per trip.
fn add_line(
    builder: &mut NetworkBuilder,
    rng: &mut fastrand::Rng,
    line: &str,
    stops: &[StopIndex],
    headway: Timestamp,
) {
    let hops: Vec<Timestamp> = (1..stops.len()).map(|_| rng.u32(60..300)).collect();
    let dwell = 30;

    let mut trips = Vec::new();
    let mut start = get_example_start_time() + rng.u32(0..headway);
    while start < get_example_end_time() {
        let mut time = start;
        let mut trip = Vec::with_capacity(stops.len());
        for pos in 0..stops.len() {
            trip.push(StopTime::new(time, time + dwell));
            time += dwell;
            if let Some(hop) = hops.get(pos) {
                time += hop + rng.u32(0..30);
            }
        }
        trips.push(trip);
        start += headway;
    }
    builder.add_route(line, stops, trips).unwrap();
}

/// A `size` x `size` grid with a line along every row and column in both directions,
/// and walking transfers between diagonal neighbours.
pub fn build_grid_network(size: usize, seed: u64) -> Network {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut builder = NetworkBuilder::new();
    for row in 0..size {
        for col in 0..size {
            let id = format!("{row}-{col}");
            builder.add_stop(&id, &id);
        }
    }

    for i in 0..size {
        let row: Vec<_> = (0..size).map(|col| grid_stop(size, i, col)).collect();
        let col: Vec<_> = (0..size).map(|row| grid_stop(size, row, i)).collect();
        for (line, stops) in [(format!("R{i}"), row), (format!("C{i}"), col)] {
            let headway = rng.u32(5..20) * 60;
            let reversed: Vec<_> = stops.iter().rev().copied().collect();
            add_line(&mut builder, &mut rng, &line, &stops, headway);
            add_line(&mut builder, &mut rng, &format!("{line}'"), &reversed, headway);
        }
    }

    for row in 0..size.saturating_sub(1) {
        for col in 0..size - 1 {
            let a = grid_stop(size, row, col);
            let b = grid_stop(size, row + 1, col + 1);
            builder.add_transfer(a, b, get_example_transfer_time()).unwrap();
            builder.add_transfer(b, a, get_example_transfer_time()).unwrap();
        }
    }

    builder.build()
}

/// A grid network with an origin and a destination in opposite corners.
pub fn get_example_scenario() -> (Network, StopIndex, StopIndex) {
    let size = 12;
    let network = build_grid_network(size, 7);
    (network, grid_stop(size, 0, 0), grid_stop(size, size - 1, size - 1))
}
