//! Example finding restaurants around a location.
//!
//! Builds a two-dimensional tree of (latitude, longitude) pairs, then runs one bounding box query
//! and one radius query. Set `RUST_LOG=debug` to see the tree's tracing events.

use kd_index::kdtree::{KDTree, KDTreeIndex};

fn main() {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> kd_index::Result<()> {
    // Assuming 2-dimensional space (latitude, longitude)
    let mut tree = KDTree::<f64>::new(2)?;

    let restaurants = [
        [40.748817, -73.985428], // Restaurant 1
        [40.748947, -73.987563], // Restaurant 2
        [40.749102, -73.987683], // Restaurant 3
    ];
    tree.build(restaurants)?;

    // Lower and upper corners of the range (latitude, longitude)
    let lower = [40.748000, -73.990000];
    let upper = [40.750000, -73.980000];

    let in_range = tree.range(&lower, &upper)?;
    println!("Number of restaurants in range: {}", in_range.len());
    for point in &in_range {
        println!("({}, {})", point[0], point[1]);
    }

    // Radius in degrees
    let center = [40.748817, -73.985428];
    let radius = 0.001;

    let in_radius = tree.within(&center, radius)?;
    println!("Number of restaurants within radius: {}", in_radius.len());
    for point in &in_radius {
        println!("({}, {})", point[0], point[1]);
    }

    Ok(())
}
