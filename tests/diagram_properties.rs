use fortune_voronoi::{BoundingBox, Diagram, InputSite, PointLocation, Voronoi, VoronoiError};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn sites(points: &[(f64, f64)]) -> Vec<InputSite> {
    points.iter().map(|&(x, y)| InputSite { x, y }).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1. + a.abs().max(b.abs()))
}

fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

fn area(ring: &[(f64, f64)]) -> f64 {
    let mut twice = 0.;
    for i in 0..ring.len() {
        let (x1, y1) = ring[i];
        let (x2, y2) = ring[(i + 1) % ring.len()];
        twice += x1 * y2 - x2 * y1;
    }
    twice.abs() / 2.
}

fn assert_rings_closed(diagram: &Diagram) {
    for (id, cell) in diagram.cells.iter().enumerate() {
        assert!(!cell.halfedges.is_empty(), "cell {} is empty", id);
        for (i, halfedge) in cell.halfedges.iter().enumerate() {
            let following = &cell.halfedges[(i + 1) % cell.halfedges.len()];
            let end = diagram.vertex(halfedge.end);
            let start = diagram.vertex(following.start);
            assert!(
                close(end.x, start.x) && close(end.y, start.y),
                "cell {} breaks between half-edges {} and {}",
                id,
                i,
                i + 1
            );
        }
    }
}

// Primary edges lie on the bisector of their two sites.
fn assert_bisectors(diagram: &Diagram) {
    for edge in diagram.edges.iter().filter(|e| e.is_primary()) {
        let left = diagram.cells[edge.left_site].site;
        let right = diagram.cells[edge.right_site.unwrap()].site;
        for v in [diagram.vertex(edge.va), diagram.vertex(edge.vb)] {
            let dl = distance(v.x, v.y, left.x, left.y);
            let dr = distance(v.x, v.y, right.x, right.y);
            assert!(close(dl, dr), "vertex ({}, {}) is off the bisector: {} vs {}", v.x, v.y, dl, dr);
        }
    }
}

// Every corner of a cell is at least as close to its own site as to any other.
fn assert_nearest_sites(diagram: &Diagram) {
    for cell in &diagram.cells {
        for halfedge in &cell.halfedges {
            let v = diagram.vertex(halfedge.start);
            let own = distance(v.x, v.y, cell.site.x, cell.site.y);
            for other in &diagram.cells {
                let d = distance(v.x, v.y, other.site.x, other.site.y);
                assert!(own <= d + 1e-6 * (1. + d), "cell {} claims a vertex nearer to {}", cell.site.id, other.site.id);
            }
        }
    }
}

fn assert_covers(diagram: &Diagram, bbox: &BoundingBox) {
    let total: f64 = diagram.polygons().iter().map(|ring| area(ring)).sum();
    assert!(close(total, bbox.width() * bbox.height()), "cells cover {} of the box", total);
}

fn interior_vertices(diagram: &Diagram, bbox: &BoundingBox) -> usize {
    diagram
        .vertices
        .iter()
        .filter(|v| v.x > bbox.left + 1e-9 && v.x < bbox.right - 1e-9 && v.y > bbox.top + 1e-9 && v.y < bbox.bottom - 1e-9)
        .count()
}

#[test]
fn two_sites_split_the_box() {
    let bbox = BoundingBox::new(-5., 15., -5., 5.);
    let diagram = Voronoi::build(&sites(&[(0., 0.), (10., 0.)]), &bbox).unwrap();

    assert_eq!(diagram.cells.len(), 2);
    let primary: Vec<_> = diagram.edges.iter().filter(|e| e.is_primary()).collect();
    assert_eq!(primary.len(), 1);
    let a = diagram.vertex(primary[0].va);
    let b = diagram.vertex(primary[0].vb);
    assert_eq!(a.x, 5.);
    assert_eq!(b.x, 5.);
    assert_eq!(a.y.min(b.y), -5.);
    assert_eq!(a.y.max(b.y), 5.);

    assert_eq!(diagram.cell_bounds(0), Some(BoundingBox::new(-5., 5., -5., 5.)));
    assert_eq!(diagram.cell_bounds(1), Some(BoundingBox::new(5., 15., -5., 5.)));
    for cell in &diagram.cells {
        assert_eq!(cell.halfedges.len(), 4);
    }
    assert_eq!(diagram.neighbor_ids(0), vec![1]);
    assert_eq!(diagram.point_intersection(0, 0., 0.), PointLocation::Inside);
    assert_eq!(diagram.point_intersection(1, 0., 0.), PointLocation::Outside);
    assert_eq!(diagram.point_intersection(0, 5., 0.), PointLocation::OnPerimeter);
    // Below the box, in line with the bisector and the box sides
    assert_eq!(diagram.point_intersection(0, 5., 40.), PointLocation::Outside);
    assert_eq!(diagram.point_intersection(0, -5., 40.), PointLocation::Outside);
    assert_eq!(diagram.point_intersection(1, 5., 40.), PointLocation::Outside);
    assert_rings_closed(&diagram);
}

#[test]
fn cocircular_square_meets_at_one_vertex() {
    let bbox = BoundingBox::new(0., 10., 0., 10.);
    let diagram = Voronoi::build(&sites(&[(0., 0.), (10., 0.), (0., 10.), (10., 10.)]), &bbox).unwrap();

    assert_eq!(diagram.cells.len(), 4);
    assert_eq!(interior_vertices(&diagram, &bbox), 1);
    let center = diagram
        .vertices
        .iter()
        .position(|v| close(v.x, 5.) && close(v.y, 5.))
        .unwrap();

    let primary: Vec<_> = diagram.edges.iter().filter(|e| e.is_primary()).collect();
    assert_eq!(primary.len(), 4);
    for edge in primary {
        assert!(edge.va == center || edge.vb == center);
    }
    assert_rings_closed(&diagram);
    assert_covers(&diagram, &bbox);
}

#[test]
fn collinear_sites_make_strips() {
    let bbox = BoundingBox::new(-5., 15., -5., 5.);
    let diagram = Voronoi::build(&sites(&[(0., 0.), (5., 0.), (10., 0.)]), &bbox).unwrap();

    assert_eq!(diagram.cells.len(), 3);
    assert_eq!(interior_vertices(&diagram, &bbox), 0);
    assert_eq!(diagram.edges.iter().filter(|e| e.is_primary()).count(), 2);
    assert_eq!(diagram.cell_bounds(1), Some(BoundingBox::new(2.5, 7.5, -5., 5.)));
    assert_eq!(diagram.cells[1].halfedges.len(), 4);
    assert_eq!(diagram.neighbor_ids(1).len(), 2);
    assert_rings_closed(&diagram);
    assert_covers(&diagram, &bbox);
}

#[test]
fn duplicate_sites_share_a_cell() {
    let bbox = BoundingBox::new(0., 10., 0., 10.);
    let diagram = Voronoi::build(&sites(&[(5., 5.), (5., 5.), (2., 8.)]), &bbox).unwrap();

    assert_eq!(diagram.cells.len(), 2);
    let at_five = diagram.cells.iter().filter(|c| c.site.x == 5. && c.site.y == 5.).count();
    assert_eq!(at_five, 1);
    assert_rings_closed(&diagram);
}

#[test]
fn a_lone_site_owns_the_box() {
    let bbox = BoundingBox::new(0., 4., 0., 3.);
    let diagram = Voronoi::build(&sites(&[(1., 1.)]), &bbox).unwrap();

    assert_eq!(diagram.cells.len(), 1);
    assert_eq!(diagram.edges.len(), 4);
    assert!(diagram.edges.iter().all(|e| e.is_border()));
    assert_eq!(diagram.cell_bounds(0), Some(bbox));
    assert!(close(area(&diagram.polygon(0)), 12.));
    assert_rings_closed(&diagram);
}

#[test]
fn invalid_input_is_reported() {
    let bbox = BoundingBox::new(0., 10., 0., 10.);
    let err = Voronoi::build(&sites(&[(1., 1.), (2., f64::INFINITY)]), &bbox).unwrap_err();
    assert_eq!(err, VoronoiError::NonFiniteSite { index: 1, x: 2., y: f64::INFINITY });

    let err = Voronoi::build(&sites(&[(1., 1.)]), &BoundingBox::new(0., 10., 5., 5.)).unwrap_err();
    assert!(matches!(err, VoronoiError::InvalidBoundingBox { .. }));
    assert!(err.to_string().contains("invalid bounding box"));
}

#[test]
fn recomputing_gives_the_same_diagram() {
    let mut rng = StdRng::seed_from_u64(7);
    let points: Vec<(f64, f64)> = (0..200).map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0))).collect();
    let input = sites(&points);
    let bbox = BoundingBox::new(0., 100., 0., 100.);

    let mut voronoi = Voronoi::new();
    let first = voronoi.compute(&input, &bbox).unwrap();
    let second = voronoi.compute(&input, &bbox).unwrap();
    let fresh = Voronoi::build(&input, &bbox).unwrap();
    for other in [&second, &fresh] {
        assert_eq!(first.vertices, other.vertices);
        assert_eq!(first.edges, other.edges);
        assert_eq!(first.cells.len(), other.cells.len());
    }
}

#[test]
fn edges_only_meet_at_end_points() {
    fn orientation(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
        (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
    }

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..5 {
        let points: Vec<(f64, f64)> = (0..60).map(|_| (rng.gen_range(0.0..50.0), rng.gen_range(0.0..50.0))).collect();
        let diagram = Voronoi::build(&sites(&points), &BoundingBox::new(0., 50., 0., 50.)).unwrap();
        let segments = diagram.segments();

        for (i, &(ax, ay, bx, by)) in segments.iter().enumerate() {
            for &(cx, cy, dx, dy) in &segments[i + 1..] {
                let (a, b, c, d) = ((ax, ay), (bx, by), (cx, cy), (dx, dy));
                let o1 = orientation(a, b, c);
                let o2 = orientation(a, b, d);
                let o3 = orientation(c, d, a);
                let o4 = orientation(c, d, b);
                // A proper crossing puts each segment's ends strictly on
                // both sides of the other
                let eps = 1e-7;
                let crosses = ((o1 > eps && o2 < -eps) || (o1 < -eps && o2 > eps))
                    && ((o3 > eps && o4 < -eps) || (o3 < -eps && o4 > eps));
                assert!(!crosses, "edges {:?} and {:?} cross", a, c);
            }
        }
    }
}

#[test]
fn cells_map_back_to_input() {
    let points = [(30., 10.), (10., 20.), (20., 30.), (40., 40.)];
    let diagram = Voronoi::build(&sites(&points), &BoundingBox::new(0., 50., 0., 50.)).unwrap();
    for cell in &diagram.cells {
        assert_eq!((cell.site.x, cell.site.y), points[cell.site.index]);
        assert_eq!(diagram.point_intersection(cell.site.id, cell.site.x, cell.site.y), PointLocation::Inside);
    }
}

proptest! {
    #[test]
    fn random_diagrams_are_well_formed(points in prop::collection::vec((1.0f64..99.0, 1.0f64..99.0), 1..40)) {
        let bbox = BoundingBox::new(0., 100., 0., 100.);
        let diagram = Voronoi::build(&sites(&points), &bbox).unwrap();

        let mut distinct = points.clone();
        distinct.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        distinct.dedup();
        prop_assert_eq!(diagram.cells.len(), distinct.len());

        assert_rings_closed(&diagram);
        assert_bisectors(&diagram);
        assert_nearest_sites(&diagram);
        assert_covers(&diagram, &bbox);
        for v in &diagram.vertices {
            let inside = v.x >= bbox.left - 1e-9 && v.x <= bbox.right + 1e-9 && v.y >= bbox.top - 1e-9 && v.y <= bbox.bottom + 1e-9;
            prop_assert!(inside, "vertex ({}, {}) outside the box", v.x, v.y);
        }
    }
}
