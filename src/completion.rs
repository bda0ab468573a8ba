// Completes the graph left by the sweep against the bounding box: dangling
// edges are extended to the box, everything is clipped to it, and cells
// that touch the box get border edges to close their rings.

use crate::bbox::BoundingBox;
use crate::builder::DiagramBuilder;
use crate::diagram::Vertex;
use crate::error::{Result, VoronoiError};
use crate::math_helpers::{equals_with_epsilon, greater_than_with_epsilon, less_than_with_epsilon, EPSILON};

// Box sides in the order a border walk visits them.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Side {
    Left,
    Bottom,
    Right,
    Top,
}

impl Side {
    // The side a walk starting at `p` runs along. Corners belong to the
    // side the walk leaves them by.
    fn entry(p: Vertex, bbox: &BoundingBox) -> Option<Side> {
        if equals_with_epsilon(p.x, bbox.left) && less_than_with_epsilon(p.y, bbox.bottom) {
            Some(Side::Left)
        } else if equals_with_epsilon(p.y, bbox.bottom) && less_than_with_epsilon(p.x, bbox.right) {
            Some(Side::Bottom)
        } else if equals_with_epsilon(p.x, bbox.right) && greater_than_with_epsilon(p.y, bbox.top) {
            Some(Side::Right)
        } else if equals_with_epsilon(p.y, bbox.top) && greater_than_with_epsilon(p.x, bbox.left) {
            Some(Side::Top)
        } else {
            None
        }
    }

    fn next(self) -> Side {
        match self {
            Side::Left => Side::Bottom,
            Side::Bottom => Side::Right,
            Side::Right => Side::Top,
            Side::Top => Side::Left,
        }
    }

    fn contains(self, p: Vertex, bbox: &BoundingBox) -> bool {
        match self {
            Side::Left => equals_with_epsilon(p.x, bbox.left),
            Side::Bottom => equals_with_epsilon(p.y, bbox.bottom),
            Side::Right => equals_with_epsilon(p.x, bbox.right),
            Side::Top => equals_with_epsilon(p.y, bbox.top),
        }
    }

    // Where a walk along this side ends when it runs to the end.
    fn corner(self, bbox: &BoundingBox) -> (f64, f64) {
        match self {
            Side::Left => (bbox.left, bbox.bottom),
            Side::Bottom => (bbox.right, bbox.bottom),
            Side::Right => (bbox.right, bbox.top),
            Side::Top => (bbox.left, bbox.top),
        }
    }
}

/// Liang–Barsky: the parameter range of the segment `a -> b` that lies
/// inside the box, or None when the segment misses it.
pub(crate) fn clip_parameters(a: Vertex, b: Vertex, bbox: &BoundingBox) -> Option<(f64, f64)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0: f64 = 0.;
    let mut t1: f64 = 1.;
    for (p, q) in [
        (-dx, a.x - bbox.left),
        (dx, bbox.right - a.x),
        (-dy, a.y - bbox.top),
        (dy, bbox.bottom - a.y),
    ] {
        if p == 0. {
            // Parallel to this side
            if q < 0. {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0. {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
            }
        }
    }
    Some((t0, t1))
}

impl DiagramBuilder {
    // Gives a dangling edge an end point on the box, and a start point too
    // if it has none or the one it has is outside. Returns false when the
    // bisector can't be visible.
    pub(crate) fn connect_edge(&mut self, edge: usize, bbox: &BoundingBox) -> bool {
        let raw = &self.edges[edge];
        if raw.vb.is_some() {
            return true;
        }
        let left = raw.left_site;
        let right = match raw.right_site {
            Some(right) => right,
            None => return true,
        };
        let start = raw.va.map(|va| self.vertices[va]);

        // Whatever happens next, both cells lose a closed ring
        self.cells[left.id].close_me = true;
        self.cells[right.id].close_me = true;

        let (lx, ly, rx, ry) = (left.x, left.y, right.x, right.y);
        let fx = (lx + rx) / 2.;
        let fy = (ly + ry) / 2.;

        // The edge runs downward when left.x > right.x, upward when
        // left.x < right.x, rightward when left.y < right.y and leftward
        // when left.y > right.y.
        let mut new_start = None;
        let end;
        if ry == ly {
            // Vertical bisector
            if fx < bbox.left || fx >= bbox.right {
                return false;
            }
            if lx > rx {
                match start {
                    Some(a) if a.y >= bbox.top => {
                        if a.y >= bbox.bottom {
                            return false;
                        }
                    }
                    _ => new_start = Some((fx, bbox.top)),
                }
                end = (fx, bbox.bottom);
            } else {
                match start {
                    Some(a) if a.y <= bbox.bottom => {
                        if a.y < bbox.top {
                            return false;
                        }
                    }
                    _ => new_start = Some((fx, bbox.bottom)),
                }
                end = (fx, bbox.top);
            }
        } else {
            let fm = (lx - rx) / (ry - ly);
            let fb = fy - fm * fx;
            if !(-1. ..=1.).contains(&fm) {
                // Closer to vertical: connect to the top or bottom side
                if lx > rx {
                    match start {
                        Some(a) if a.y >= bbox.top => {
                            if a.y >= bbox.bottom {
                                return false;
                            }
                        }
                        _ => new_start = Some(((bbox.top - fb) / fm, bbox.top)),
                    }
                    end = ((bbox.bottom - fb) / fm, bbox.bottom);
                } else {
                    match start {
                        Some(a) if a.y <= bbox.bottom => {
                            if a.y < bbox.top {
                                return false;
                            }
                        }
                        _ => new_start = Some(((bbox.bottom - fb) / fm, bbox.bottom)),
                    }
                    end = ((bbox.top - fb) / fm, bbox.top);
                }
            } else {
                // Closer to horizontal: connect to the left or right side
                if ly < ry {
                    match start {
                        Some(a) if a.x >= bbox.left => {
                            if a.x >= bbox.right {
                                return false;
                            }
                        }
                        _ => new_start = Some((bbox.left, fm * bbox.left + fb)),
                    }
                    end = (bbox.right, fm * bbox.right + fb);
                } else {
                    match start {
                        Some(a) if a.x <= bbox.right => {
                            if a.x < bbox.left {
                                return false;
                            }
                        }
                        _ => new_start = Some((bbox.right, fm * bbox.right + fb)),
                    }
                    end = (bbox.left, fm * bbox.left + fb);
                }
            }
        }

        if let Some((x, y)) = new_start {
            let va = self.create_vertex(x, y);
            self.edges[edge].va = Some(va);
        }
        let vb = self.create_vertex(end.0, end.1);
        self.edges[edge].vb = Some(vb);
        true
    }

    // Clipped end points become new vertices: the old ones may still be
    // shared with other edges.
    pub(crate) fn clip_edge(&mut self, edge: usize, bbox: &BoundingBox) -> bool {
        let raw = &self.edges[edge];
        let (va, vb) = match (raw.va, raw.vb) {
            (Some(va), Some(vb)) => (va, vb),
            _ => return false,
        };
        let (left, right) = (raw.left_site, raw.right_site);
        let a = self.vertices[va];
        let b = self.vertices[vb];

        let (t0, t1) = match clip_parameters(a, b, bbox) {
            Some(range) => range,
            None => return false,
        };

        let (dx, dy) = (b.x - a.x, b.y - a.y);
        if t0 > 0. {
            let vertex = self.create_vertex(a.x + t0 * dx, a.y + t0 * dy);
            self.edges[edge].va = Some(vertex);
        }
        if t1 < 1. {
            let vertex = self.create_vertex(a.x + t1 * dx, a.y + t1 * dy);
            self.edges[edge].vb = Some(vertex);
        }
        if t0 > 0. || t1 < 1. {
            self.cells[left.id].close_me = true;
            if let Some(right) = right {
                self.cells[right.id].close_me = true;
            }
        }
        true
    }

    /// Connects dangling edges to the box and clips everything to it.
    /// Edges outside the box, or shorter than epsilon once clipped, lose
    /// both end points.
    pub(crate) fn clip_edges(&mut self, bbox: &BoundingBox) {
        let mut discarded = 0;
        for edge in 0..self.edges.len() {
            let keep = self.connect_edge(edge, bbox) && self.clip_edge(edge, bbox) && !self.is_degenerate(edge);
            if !keep {
                let raw = &mut self.edges[edge];
                raw.va = None;
                raw.vb = None;
                discarded += 1;
            }
        }
        tracing::trace!(edges = self.edges.len(), discarded, "clipped edges");
    }

    fn is_degenerate(&self, edge: usize) -> bool {
        match (self.edges[edge].va, self.edges[edge].vb) {
            (Some(va), Some(vb)) => {
                let a = self.vertices[va];
                let b = self.vertices[vb];
                (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
            }
            _ => true,
        }
    }

    /// Orders every cell's half-edges and fills the gaps between them with
    /// border edges along the box.
    pub(crate) fn close_cells(&mut self, bbox: &BoundingBox) -> Result<()> {
        let single_site = self.cells.len() == 1;
        for cell in (0..self.cells.len()).rev() {
            if self.prepare_halfedges(cell) == 0 {
                if single_site {
                    self.enclose_in_box(cell, bbox);
                }
                continue;
            }
            if !self.cells[cell].close_me {
                continue;
            }

            // A gap is where a half-edge ends somewhere other than where the
            // next one starts. Gaps need not be adjacent.
            let mut at = 0;
            while at < self.cells[cell].halfedges.len() {
                let halfedges = &self.cells[cell].halfedges;
                let following = &halfedges[(at + 1) % halfedges.len()];
                let (va, vz) = match (self.halfedge_end(&halfedges[at]), self.halfedge_start(following)) {
                    (Some(va), Some(vz)) => (va, vz),
                    _ => {
                        at += 1;
                        continue;
                    }
                };
                let a = self.vertices[va];
                let z = self.vertices[vz];
                if (a.x - z.x).abs() >= EPSILON || (a.y - z.y).abs() >= EPSILON {
                    at = self.walk_border(cell, at, va, vz, bbox)?;
                }
                at += 1;
            }
            self.cells[cell].close_me = false;
        }
        Ok(())
    }

    // Walks the box perimeter from `va` to `vz`, inserting a border
    // half-edge after position `at` for every side crossed. Returns the
    // position of the last one inserted. A convex cell never needs more
    // than four segments for one gap.
    fn walk_border(&mut self, cell: usize, mut at: usize, mut va: usize, vz: usize, bbox: &BoundingBox) -> Result<usize> {
        let start = self.vertices[va];
        let target = self.vertices[vz];
        let site = self.cells[cell].site;

        if let Some(mut side) = Side::entry(start, bbox) {
            for _ in 0..4 {
                let last = side.contains(target, bbox);
                let vb = if last {
                    vz
                } else {
                    let (x, y) = side.corner(bbox);
                    self.create_vertex(x, y)
                };
                let halfedge = self.create_border_edge(site, va, vb);
                at += 1;
                self.cells[cell].halfedges.insert(at, halfedge);
                if last {
                    return Ok(at);
                }
                va = vb;
                side = side.next();
            }
        }

        tracing::error!(
            cell,
            x = start.x,
            y = start.y,
            target_x = target.x,
            target_y = target.y,
            "border walk can't close cell"
        );
        Err(VoronoiError::UnclosableCell {
            cell,
            x: start.x,
            y: start.y,
        })
    }

    // The only cell of a one-site diagram is the box itself.
    fn enclose_in_box(&mut self, cell: usize, bbox: &BoundingBox) {
        let site = self.cells[cell].site;
        let corners = [
            self.create_vertex(bbox.left, bbox.top),
            self.create_vertex(bbox.left, bbox.bottom),
            self.create_vertex(bbox.right, bbox.bottom),
            self.create_vertex(bbox.right, bbox.top),
        ];
        for i in 0..corners.len() {
            let halfedge = self.create_border_edge(site, corners[i], corners[(i + 1) % corners.len()]);
            self.cells[cell].halfedges.push(halfedge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;

    fn site(x: f64, y: f64, id: usize) -> Site {
        Site { x, y, id, index: id }
    }

    fn vertex(x: f64, y: f64) -> Vertex {
        Vertex { x, y }
    }

    fn builder_with(sites: &[Site]) -> DiagramBuilder {
        let mut builder = DiagramBuilder::with_capacity(sites.len());
        for site in sites {
            builder.create_cell(*site);
        }
        builder
    }

    fn assert_ring_closed(builder: &DiagramBuilder, cell: usize) {
        let halfedges = &builder.cells[cell].halfedges;
        for i in 0..halfedges.len() {
            let end = builder.halfedge_end(&halfedges[i]).unwrap();
            let start = builder.halfedge_start(&halfedges[(i + 1) % halfedges.len()]).unwrap();
            let (a, b) = (builder.vertices[end], builder.vertices[start]);
            assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "gap in cell {}", cell);
        }
    }

    #[test]
    fn it_clips_segments_crossing_the_box() {
        let bbox = BoundingBox::new(0., 10., 0., 10.);
        let (t0, t1) = clip_parameters(vertex(-5., 5.), vertex(15., 5.), &bbox).unwrap();
        assert!((t0 - 0.25).abs() < 1e-12);
        assert!((t1 - 0.75).abs() < 1e-12);

        // Fully inside: untouched
        assert_eq!(clip_parameters(vertex(1., 1.), vertex(9., 9.), &bbox), Some((0., 1.)));
    }

    #[test]
    fn it_rejects_segments_outside_the_box() {
        let bbox = BoundingBox::new(0., 10., 0., 10.);
        assert_eq!(clip_parameters(vertex(-5., -1.), vertex(15., -1.), &bbox), None);
        assert_eq!(clip_parameters(vertex(11., 0.), vertex(11., 10.), &bbox), None);
        assert_eq!(clip_parameters(vertex(-5., 4.), vertex(4., -5.), &bbox), None);
    }

    #[test]
    fn it_connects_vertical_bisectors() {
        let a = site(0., 0., 0);
        let b = site(10., 0., 1);
        let mut builder = builder_with(&[a, b]);
        let edge = builder.create_edge(a, b, None, None);
        let bbox = BoundingBox::new(-5., 15., -5., 5.);

        assert!(builder.connect_edge(edge, &bbox));
        let raw = &builder.edges[edge];
        let va = builder.vertices[raw.va.unwrap()];
        let vb = builder.vertices[raw.vb.unwrap()];
        assert_eq!((va.x, va.y), (5., 5.));
        assert_eq!((vb.x, vb.y), (5., -5.));
        assert!(builder.cells[0].close_me && builder.cells[1].close_me);
    }

    #[test]
    fn it_drops_bisectors_missing_the_box() {
        let a = site(0., 0., 0);
        let b = site(10., 0., 1);
        let mut builder = builder_with(&[a, b]);
        let edge = builder.create_edge(a, b, None, None);
        assert!(!builder.connect_edge(edge, &BoundingBox::new(6., 15., -5., 5.)));
    }

    #[test]
    fn it_connects_half_open_edges_from_their_start() {
        // Bisector of (0,0) and (10,10) is y = 10 - x, starting at (5,5)
        let a = site(0., 0., 0);
        let b = site(10., 10., 1);
        let mut builder = builder_with(&[a, b]);
        let v = builder.create_vertex(5., 5.);
        let edge = builder.create_edge(a, b, Some(v), None);
        assert!(builder.connect_edge(edge, &BoundingBox::new(0., 20., 0., 20.)));

        let raw = &builder.edges[edge];
        assert_eq!(raw.va, Some(v));
        let end = builder.vertices[raw.vb.unwrap()];
        assert!((end.x + end.y - 10.).abs() < 1e-9);
        assert!(end.x == 0. || end.x == 20. || end.y == 0. || end.y == 20.);
    }

    #[test]
    fn it_discards_edges_outside_the_box() {
        let a = site(0., 0., 0);
        let b = site(10., 0., 1);
        let mut builder = builder_with(&[a, b]);
        let va = builder.create_vertex(5., 50.);
        let vb = builder.create_vertex(5., 60.);
        let edge = builder.create_edge(a, b, Some(va), Some(vb));
        builder.clip_edges(&BoundingBox::new(-5., 15., -5., 5.));
        assert!(builder.edges[edge].is_removed());
    }

    #[test]
    fn it_closes_two_half_boxes() {
        let a = site(0., 0., 0);
        let b = site(10., 0., 1);
        let mut builder = builder_with(&[a, b]);
        builder.create_edge(a, b, None, None);
        let bbox = BoundingBox::new(-5., 15., -5., 5.);
        builder.clip_edges(&bbox);
        builder.close_cells(&bbox).unwrap();

        for cell in 0..2 {
            assert_eq!(builder.cells[cell].halfedges.len(), 4);
            assert!(!builder.cells[cell].close_me);
            assert_ring_closed(&builder, cell);
        }
        // One bisector plus three border edges per cell
        assert_eq!(builder.edges.len(), 7);
        assert_eq!(builder.edges.iter().filter(|e| e.right_site.is_none()).count(), 6);
    }

    #[test]
    fn it_encloses_a_lone_site() {
        let mut builder = builder_with(&[site(3., 3., 0)]);
        let bbox = BoundingBox::new(0., 10., 0., 10.);
        builder.close_cells(&bbox).unwrap();
        assert_eq!(builder.cells[0].halfedges.len(), 4);
        assert_eq!(builder.vertices.len(), 4);
        assert_ring_closed(&builder, 0);
    }

    #[test]
    fn it_fails_on_gaps_off_the_perimeter() {
        let a = site(0., 0., 0);
        let b = site(10., 0., 1);
        let mut builder = builder_with(&[a, b]);
        // An edge ending strictly inside the box can't be walked from
        let va = builder.create_vertex(5., -2.);
        let vb = builder.create_vertex(5., 2.);
        builder.create_edge(a, b, Some(va), Some(vb));
        builder.cells[0].close_me = true;

        let err = builder.close_cells(&BoundingBox::new(-5., 15., -5., 5.)).unwrap_err();
        assert_eq!(err, VoronoiError::UnclosableCell { cell: 0, x: 5., y: 2. });
    }
}
