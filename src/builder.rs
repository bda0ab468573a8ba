// Mutable diagram graph grown by the sweep. Edges stay open-ended here
// (either endpoint may be missing) until completion clips and closes them,
// after which `finish` freezes everything into a `Diagram`.

use std::mem;
use std::time::Duration;

use crate::diagram::{Cell, Diagram, Edge, HalfEdge, Vertex};
use crate::Site;

#[derive(Clone, Debug)]
pub(crate) struct RawEdge {
    pub left_site: Site,
    pub right_site: Option<Site>,
    pub va: Option<usize>,
    pub vb: Option<usize>,
}

impl RawEdge {
    pub fn is_removed(&self) -> bool {
        self.va.is_none() || self.vb.is_none()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RawHalfEdge {
    pub site: usize,
    pub edge: usize,
    pub angle: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct RawCell {
    pub site: Site,
    pub halfedges: Vec<RawHalfEdge>,
    pub close_me: bool,
}

#[derive(Default)]
pub(crate) struct DiagramBuilder {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<RawEdge>,
    pub cells: Vec<RawCell>,
}

impl DiagramBuilder {
    pub fn with_capacity(sites: usize) -> DiagramBuilder {
        // A diagram of n sites has at most 2n - 5 vertices and 3n - 6 edges
        DiagramBuilder {
            vertices: Vec::with_capacity(2 * sites),
            edges: Vec::with_capacity(3 * sites),
            cells: Vec::with_capacity(sites),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.cells.clear();
    }

    pub fn create_cell(&mut self, site: Site) {
        debug_assert_eq!(site.id, self.cells.len());
        self.cells.push(RawCell {
            site,
            halfedges: Vec::new(),
            close_me: false,
        });
    }

    pub fn create_vertex(&mut self, x: f64, y: f64) -> usize {
        let index = self.vertices.len();
        self.vertices.push(Vertex { x, y });
        index
    }

    // Creates the edge between two sites plus one half-edge in each of
    // their cells.
    pub fn create_edge(&mut self, left: Site, right: Site, va: Option<usize>, vb: Option<usize>) -> usize {
        let edge = self.edges.len();
        self.edges.push(RawEdge {
            left_site: left,
            right_site: Some(right),
            va: None,
            vb: None,
        });
        if let Some(va) = va {
            self.set_edge_startpoint(edge, left, right, va);
        }
        if let Some(vb) = vb {
            self.set_edge_endpoint(edge, left, right, vb);
        }

        // Half-edges are ordered by the direction from their site to the
        // site across the edge
        self.cells[left.id].halfedges.push(RawHalfEdge {
            site: left.id,
            edge,
            angle: (right.y - left.y).atan2(right.x - left.x),
        });
        self.cells[right.id].halfedges.push(RawHalfEdge {
            site: right.id,
            edge,
            angle: (left.y - right.y).atan2(left.x - right.x),
        });
        edge
    }

    // Border edges only belong to the cell they close, so the half-edge is
    // left to the caller to splice into the ring.
    pub fn create_border_edge(&mut self, site: Site, va: usize, vb: usize) -> RawHalfEdge {
        let edge = self.edges.len();
        self.edges.push(RawEdge {
            left_site: site,
            right_site: None,
            va: Some(va),
            vb: Some(vb),
        });
        // No site across the edge: use the direction perpendicular to it
        let a = self.vertices[va];
        let b = self.vertices[vb];
        RawHalfEdge {
            site: site.id,
            edge,
            angle: (b.x - a.x).atan2(a.y - b.y),
        }
    }

    // The first endpoint set on an edge defines its orientation: from then
    // on `va` is the start point as seen from `left_site`.
    pub fn set_edge_startpoint(&mut self, edge: usize, left: Site, right: Site, vertex: usize) {
        let edge = &mut self.edges[edge];
        if edge.va.is_none() && edge.vb.is_none() {
            edge.va = Some(vertex);
            edge.left_site = left;
            edge.right_site = Some(right);
        } else if edge.left_site.id == right.id {
            edge.vb = Some(vertex);
        } else {
            edge.va = Some(vertex);
        }
    }

    pub fn set_edge_endpoint(&mut self, edge: usize, left: Site, right: Site, vertex: usize) {
        self.set_edge_startpoint(edge, right, left, vertex);
    }

    pub fn halfedge_start(&self, halfedge: &RawHalfEdge) -> Option<usize> {
        let edge = &self.edges[halfedge.edge];
        if edge.left_site.id == halfedge.site {
            edge.va
        } else {
            edge.vb
        }
    }

    pub fn halfedge_end(&self, halfedge: &RawHalfEdge) -> Option<usize> {
        let edge = &self.edges[halfedge.edge];
        if edge.left_site.id == halfedge.site {
            edge.vb
        } else {
            edge.va
        }
    }

    // Drops half-edges whose edge was discarded and orders the rest
    // counterclockwise. Returns how many are left.
    pub fn prepare_halfedges(&mut self, cell: usize) -> usize {
        let edges = &self.edges;
        let halfedges = &mut self.cells[cell].halfedges;
        halfedges.retain(|halfedge| !edges[halfedge.edge].is_removed());
        halfedges.sort_by(|a, b| b.angle.total_cmp(&a.angle));
        halfedges.len()
    }

    /// Freezes the graph. Discarded edges are dropped, edge ids compacted,
    /// and vertices no surviving edge uses are pruned.
    pub fn finish(&mut self, exec_time: Duration) -> Diagram {
        let vertices = mem::take(&mut self.vertices);
        let edges = mem::take(&mut self.edges);
        let cells = mem::take(&mut self.cells);

        let mut vertex_ids: Vec<Option<usize>> = vec![None; vertices.len()];
        let mut out_vertices = Vec::with_capacity(vertices.len());
        let mut intern = |id: usize, out: &mut Vec<Vertex>| -> usize {
            *vertex_ids[id].get_or_insert_with(|| {
                out.push(vertices[id]);
                out.len() - 1
            })
        };

        let mut edge_ids: Vec<Option<usize>> = vec![None; edges.len()];
        let mut out_edges = Vec::with_capacity(edges.len());
        for (i, edge) in edges.iter().enumerate() {
            if let (Some(va), Some(vb)) = (edge.va, edge.vb) {
                edge_ids[i] = Some(out_edges.len());
                out_edges.push(Edge {
                    left_site: edge.left_site.id,
                    right_site: edge.right_site.map(|site| site.id),
                    va: intern(va, &mut out_vertices),
                    vb: intern(vb, &mut out_vertices),
                });
            }
        }

        let out_cells = cells
            .into_iter()
            .map(|cell| {
                let halfedges = cell
                    .halfedges
                    .iter()
                    .filter_map(|halfedge| {
                        let edge_id = edge_ids[halfedge.edge]?;
                        let edge: &Edge = &out_edges[edge_id];
                        let (start, end) = if edge.left_site == halfedge.site {
                            (edge.va, edge.vb)
                        } else {
                            (edge.vb, edge.va)
                        };
                        Some(HalfEdge {
                            site: halfedge.site,
                            edge: edge_id,
                            angle: halfedge.angle,
                            start,
                            end,
                        })
                    })
                    .collect();
                Cell {
                    site: cell.site,
                    halfedges,
                }
            })
            .collect();

        Diagram {
            vertices: out_vertices,
            edges: out_edges,
            cells: out_cells,
            exec_time,
        }
    }
}
