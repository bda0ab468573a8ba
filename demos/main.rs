use fortune_voronoi::{BoundingBox, InputSite, Voronoi};

fn main() {
    let sites = vec![
        InputSite { x: 50.0, y: 50.0 },
        InputSite { x: 70.0, y: 60.0 },
        InputSite { x: 55.0, y: 70.0 },
    ];

    let diagram = Voronoi::build(&sites, &BoundingBox::new(0.0, 100.0, 0.0, 100.0)).unwrap();
    for cell in &diagram.cells {
        let ring: Vec<String> = diagram
            .polygon(cell.site.id)
            .iter()
            .map(|(x, y)| format!("({:.2}, {:.2})", x, y))
            .collect();
        println!(
            "site {} at ({}, {}), neighbours {:?}: {}",
            cell.site.index,
            cell.site.x,
            cell.site.y,
            diagram.neighbor_ids(cell.site.id),
            ring.join(" ")
        );
    }
}
