use fortune_voronoi::{BoundingBox, InputSite, Voronoi};

fn main() {
    let sites = vec![
        InputSite { x: -1.0, y: 0.0 },
        InputSite { x: 0.0, y: 0.0 },
        InputSite { x: 1.0, y: 0.0 },
        InputSite { x: 0.0, y: 1.0 },
        InputSite { x: 0.0, y: -1.0 },
    ];

    let diagram = Voronoi::build(&sites, &BoundingBox::new(-2.0, 2.0, -2.0, 2.0)).unwrap();
    for (x1, y1, x2, y2) in diagram.segments() {
        println!("({}, {}) -> ({}, {})", x1, y1, x2, y2);
    }
}
