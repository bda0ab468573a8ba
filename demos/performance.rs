use fortune_voronoi::{BoundingBox, InputSite, Voronoi};
use rand::prelude::*;
use std::time::Instant;
use tracing::Level;

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let count = 10000;
    let mut rng = rand::thread_rng();
    let sites: Vec<InputSite> = (0..count)
        .map(|_| InputSite {
            x: rng.gen(),
            y: rng.gen(),
        })
        .collect();
    let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0);

    let mut voronoi = Voronoi::with_capacity(count);
    for run in 0..3 {
        let now = Instant::now();
        let diagram = voronoi.compute(&sites, &bbox).unwrap();
        println!(
            "Run {}: voronoi diagram of {} points ({} edges) took {}ms",
            run,
            count,
            diagram.edges.len(),
            now.elapsed().as_millis()
        );
    }
}
