// The finished diagram handed back to callers. Everything references
// everything else by index: edges point into `vertices`, half-edges into
// `edges`, and cells are indexed by site id.

use std::time::Duration;

use crate::bbox::BoundingBox;
use crate::Site;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// A piece of the bisector between two sites, or a piece of the bounding
/// box for border edges (which have no right site).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub left_site: usize,
    pub right_site: Option<usize>,
    pub va: usize,
    pub vb: usize,
}

impl Edge {
    pub fn is_border(&self) -> bool {
        self.right_site.is_none()
    }

    /// Separates two sites.
    pub fn is_primary(&self) -> bool {
        self.right_site.is_some()
    }

    // Point sites only ever produce straight bisectors.
    pub fn is_curved(&self) -> bool {
        false
    }
}

/// An edge as seen from one of the cells it bounds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HalfEdge {
    pub site: usize,
    pub edge: usize,
    /// Polar angle used to order a cell's half-edges.
    pub angle: f64,
    /// Vertex where the half-edge starts when walking around its cell.
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub site: Site,
    /// Closed ring: each half-edge ends where the next one starts.
    pub halfedges: Vec<HalfEdge>,
}

/// Where a point lies relative to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointLocation {
    Outside,
    OnPerimeter,
    Inside,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagram {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub cells: Vec<Cell>,
    pub exec_time: Duration,
}

impl Diagram {
    pub fn vertex(&self, id: usize) -> &Vertex {
        &self.vertices[id]
    }

    /// Every edge as `(x1, y1, x2, y2)`.
    pub fn segments(&self) -> Vec<(f64, f64, f64, f64)> {
        self.edges
            .iter()
            .map(|edge| {
                let a = self.vertices[edge.va];
                let b = self.vertices[edge.vb];
                (a.x, a.y, b.x, b.y)
            })
            .collect()
    }

    /// Ring of the cell as the start point of each half-edge.
    pub fn polygon(&self, cell: usize) -> Vec<(f64, f64)> {
        self.cells[cell]
            .halfedges
            .iter()
            .map(|halfedge| {
                let v = self.vertices[halfedge.start];
                (v.x, v.y)
            })
            .collect()
    }

    pub fn polygons(&self) -> Vec<Vec<(f64, f64)>> {
        (0..self.cells.len()).map(|cell| self.polygon(cell)).collect()
    }

    /// Ids of the cells sharing an edge with `cell`.
    pub fn neighbor_ids(&self, cell: usize) -> Vec<usize> {
        let id = self.cells[cell].site.id;
        let mut neighbors = Vec::new();
        for halfedge in &self.cells[cell].halfedges {
            let edge = &self.edges[halfedge.edge];
            if edge.left_site != id {
                neighbors.push(edge.left_site);
            } else if let Some(right) = edge.right_site {
                if right != id {
                    neighbors.push(right);
                }
            }
        }
        neighbors
    }

    /// Tight axis-aligned bounds of the cell, None for an empty cell.
    pub fn cell_bounds(&self, cell: usize) -> Option<BoundingBox> {
        let halfedges = &self.cells[cell].halfedges;
        if halfedges.is_empty() {
            return None;
        }
        let mut bounds = BoundingBox::new(f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        // Every end point is also the start point of the next half-edge
        for halfedge in halfedges {
            let v = self.vertices[halfedge.start];
            bounds.left = bounds.left.min(v.x);
            bounds.right = bounds.right.max(v.x);
            bounds.top = bounds.top.min(v.y);
            bounds.bottom = bounds.bottom.max(v.y);
        }
        Some(bounds)
    }

    // Cells are convex, so a point is inside when it sits on the same side
    // of every half-edge. Lying on one edge's line only counts once no other
    // edge puts the point outside.
    pub fn point_intersection(&self, cell: usize, x: f64, y: f64) -> PointLocation {
        let halfedges = &self.cells[cell].halfedges;
        if halfedges.is_empty() {
            return PointLocation::Outside;
        }
        let mut on_perimeter = false;
        for halfedge in halfedges {
            let p0 = self.vertices[halfedge.start];
            let p1 = self.vertices[halfedge.end];
            let r = (y - p0.y) * (p1.x - p0.x) - (x - p0.x) * (p1.y - p0.y);
            if r > 0. {
                return PointLocation::Outside;
            }
            if r == 0. {
                on_perimeter = true;
            }
        }
        if on_perimeter {
            PointLocation::OnPerimeter
        } else {
            PointLocation::Inside
        }
    }
}
