use bin_grid::spatial::{GridConfig, GridIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    env_logger::init();

    let config = GridConfig::uniform(0.0, 1000.0, 0.0, 1000.0, 32);
    let mut index = match GridIndex::new(config) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("invalid grid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let mut rng = StdRng::seed_from_u64(42);
    let count = 20_000;
    let mut inserted = 0;
    for _ in 0..count {
        let x = rng.random_range(0.0..1000.0);
        let y = rng.random_range(0.0..1000.0);
        if index.insert(x, y) {
            inserted += 1;
        }
    }

    let occupancy = index.occupancy();
    log::debug!("{:?}", occupancy);

    println!("Grid stats:");
    println!("  Bins: {}x{}", config.num_x_bins, config.num_y_bins);
    println!("  Points: {} / {}", inserted, count);
    println!(
        "  Occupied bins: {} ({:.1}%)",
        occupancy.occupied_bins,
        occupancy.occupied_bins as f64 * 100.0 / index.num_bins() as f64
    );
    println!("  Longest chain: {}", occupancy.max_chain_len);

    let queries: Vec<(f64, f64)> = (0..8)
        .map(|_| (rng.random_range(-200.0..1200.0), rng.random_range(-200.0..1200.0)))
        .collect();
    let batch = index.nearest_batch(&queries);

    println!("Queries:");
    for (&(x, y), pruned) in queries.iter().zip(batch) {
        let brute = index.nearest(x, y);
        match brute {
            Some(p) => println!(
                "  ({:8.2}, {:8.2}) -> ({:8.2}, {:8.2})  dist {:7.3}  pruned agrees: {}",
                x,
                y,
                p.x,
                p.y,
                p.distance_to(x, y),
                pruned == brute
            ),
            None => println!("  ({:8.2}, {:8.2}) -> none", x, y),
        }
    }
}
