// The beachline: parabolic arcs ordered left to right, stored in a red-black
// tree keyed by position only. Insertion and removal of arcs is where the
// diagram's vertices and edges are born.

use std::collections::VecDeque;

use crate::math_helpers::{breakpoint_between, circumcenter, EPSILON};
use crate::rbtree::{NodeHandle, RbTree};
use crate::{Site, Voronoi};

#[derive(Clone, Debug)]
pub(crate) struct Arc {
    pub site: Site,
    /// Pending collapse of this arc, a node of the circle-event queue.
    pub circle_event: Option<NodeHandle>,
    /// Edge traced by the break point between this arc and its left neighbour.
    pub edge: Option<usize>,
}

impl Arc {
    pub fn new(site: Site) -> Arc {
        Arc {
            site,
            circle_event: None,
            edge: None,
        }
    }
}

pub(crate) type BeachLine = RbTree<Arc>;

// An arc that vanished (or is about to) at a vertex, with the edge on its left.
struct Transition {
    site: Site,
    edge: Option<usize>,
}

impl Voronoi {
    pub(crate) fn left_break_point(&self, arc: NodeHandle, directrix: f64) -> f64 {
        let site = self.beachline.get(arc).site;
        if site.y == directrix {
            return site.x;
        }
        match self.beachline.previous(arc) {
            Some(left) => {
                let left = self.beachline.get(left).site;
                breakpoint_between((left.x, left.y), (site.x, site.y), directrix)
            }
            None => f64::NEG_INFINITY,
        }
    }

    pub(crate) fn right_break_point(&self, arc: NodeHandle, directrix: f64) -> f64 {
        if let Some(right) = self.beachline.next(arc) {
            return self.left_break_point(right, directrix);
        }
        let site = self.beachline.get(arc).site;
        if site.y == directrix {
            site.x
        } else {
            f64::INFINITY
        }
    }

    fn detach_beach_section(&mut self, arc: NodeHandle) -> Arc {
        self.detach_circle_event(arc);
        self.beachline.remove(arc)
    }

    fn set_arc_edge(&mut self, arc: NodeHandle, edge: usize) {
        self.beachline.get_mut(arc).edge = Some(edge);
    }

    pub(crate) fn add_beach_section(&mut self, site: Site) {
        let x = site.x;
        let directrix = site.y;

        // Find the arcs that will surround the new one
        let mut left_arc = None;
        let mut right_arc = None;
        let mut node = self.beachline.root();
        while let Some(at) = node {
            let dxl = self.left_break_point(at, directrix) - x;
            if dxl > EPSILON {
                // Falls somewhere before the left edge of the arc
                node = self.beachline.left(at);
                continue;
            }
            let dxr = x - self.right_break_point(at, directrix);
            if dxr > EPSILON {
                // Falls somewhere after the right edge of the arc
                match self.beachline.right(at) {
                    Some(right) => node = Some(right),
                    None => {
                        left_arc = Some(at);
                        break;
                    }
                }
                continue;
            }
            if dxl > -EPSILON {
                // Exactly on the left edge
                left_arc = self.beachline.previous(at);
                right_arc = Some(at);
            } else if dxr > -EPSILON {
                // Exactly on the right edge
                left_arc = Some(at);
                right_arc = self.beachline.next(at);
            } else {
                // Strictly inside
                left_arc = Some(at);
                right_arc = Some(at);
            }
            break;
        }

        let new_arc = self.beachline.insert_after(left_arc, Arc::new(site));

        match (left_arc, right_arc) {
            // First arc on the beachline
            (None, None) => {}

            // Splits an existing arc in two: one new edge, and both halves
            // may now be collapsing
            (Some(left), Some(right)) if left == right => {
                self.detach_circle_event(left);
                let left_site = self.beachline.get(left).site;
                let right = self.beachline.insert_after(Some(new_arc), Arc::new(left_site));

                let edge = self.builder.create_edge(left_site, site, None, None);
                self.set_arc_edge(new_arc, edge);
                self.set_arc_edge(right, edge);

                self.attach_circle_event(left);
                self.attach_circle_event(right);
            }

            // New last arc. Only happens while every arc so far sits on the
            // same horizontal line as the new site.
            (Some(left), None) => {
                let left_site = self.beachline.get(left).site;
                let edge = self.builder.create_edge(left_site, site, None, None);
                self.set_arc_edge(new_arc, edge);
            }

            // Sites are processed top to bottom, left to right, so there is
            // always an arc on the left; this only happens when the new site
            // lands within epsilon of the first arc's focus.
            (None, Some(right)) => {
                tracing::warn!(x = site.x, y = site.y, "site lands on the left end of the beachline");
                let right_site = self.beachline.get(right).site;
                let edge = self.builder.create_edge(site, right_site, None, None);
                self.set_arc_edge(right, edge);
            }

            // Exactly between two different arcs: their transition vanishes
            // at a new vertex and two edges start from it
            (Some(left), Some(right)) => {
                self.detach_circle_event(left);
                self.detach_circle_event(right);

                let left_site = self.beachline.get(left).site;
                let right_site = self.beachline.get(right).site;
                let (vx, vy) = circumcenter((left_site.x, left_site.y), (site.x, site.y), (right_site.x, right_site.y));
                let vertex = self.builder.create_vertex(vx, vy);

                if let Some(edge) = self.beachline.get(right).edge {
                    self.builder.set_edge_startpoint(edge, left_site, right_site, vertex);
                }

                let edge = self.builder.create_edge(left_site, site, None, Some(vertex));
                self.set_arc_edge(new_arc, edge);
                let edge = self.builder.create_edge(site, right_site, None, Some(vertex));
                self.set_arc_edge(right, edge);

                self.attach_circle_event(left);
                self.attach_circle_event(right);
            }
        }
    }

    // Resolves the circle event of `arc`. Several arcs may collapse onto the
    // same point at once (more than three sites on one circle), so the
    // neighbours are scanned for events converging there too.
    pub(crate) fn remove_beach_section(&mut self, arc: NodeHandle) {
        let (x, y) = match self.beachline.get(arc).circle_event {
            Some(event) => {
                let event = self.circle_events.get(event);
                (event.x, event.y_center)
            }
            None => return,
        };
        let vertex = self.builder.create_vertex(x, y);

        let previous = self.beachline.previous(arc);
        let next = self.beachline.next(arc);
        let collapsed = self.detach_beach_section(arc);
        let mut disappearing = VecDeque::new();
        disappearing.push_back(Transition {
            site: collapsed.site,
            edge: collapsed.edge,
        });

        // A collapsing arc is never first or last on the beachline
        let (mut left_arc, mut right_arc) = match (previous, next) {
            (Some(previous), Some(next)) => (previous, next),
            _ => {
                tracing::error!(x, y, "collapsing arc without two neighbours");
                return;
            }
        };

        while self.converges_at(left_arc, x, y) {
            let Some(previous) = self.beachline.previous(left_arc) else {
                break;
            };
            let collapsed = self.detach_beach_section(left_arc);
            disappearing.push_front(Transition {
                site: collapsed.site,
                edge: collapsed.edge,
            });
            left_arc = previous;
        }
        // The surviving left arc is the left site of the first transition
        self.detach_circle_event(left_arc);
        let left = self.beachline.get(left_arc);
        disappearing.push_front(Transition {
            site: left.site,
            edge: left.edge,
        });

        while self.converges_at(right_arc, x, y) {
            let Some(next) = self.beachline.next(right_arc) else {
                break;
            };
            let collapsed = self.detach_beach_section(right_arc);
            disappearing.push_back(Transition {
                site: collapsed.site,
                edge: collapsed.edge,
            });
            right_arc = next;
        }
        self.detach_circle_event(right_arc);
        let right = self.beachline.get(right_arc);
        disappearing.push_back(Transition {
            site: right.site,
            edge: right.edge,
        });

        // Every transition between consecutive arcs ends at the vertex
        for i in 1..disappearing.len() {
            let left = &disappearing[i - 1];
            let right = &disappearing[i];
            if let Some(edge) = right.edge {
                self.builder.set_edge_startpoint(edge, left.site, right.site, vertex);
            }
        }

        // The two outermost arcs are now adjacent: a new edge starts here,
        // as an end point relative to the left site
        let left_site = self.beachline.get(left_arc).site;
        let right_site = self.beachline.get(right_arc).site;
        let edge = self.builder.create_edge(left_site, right_site, None, Some(vertex));
        self.set_arc_edge(right_arc, edge);

        self.attach_circle_event(left_arc);
        self.attach_circle_event(right_arc);
    }

    fn converges_at(&self, arc: NodeHandle, x: f64, y: f64) -> bool {
        match self.beachline.get(arc).circle_event {
            Some(event) => {
                let event = self.circle_events.get(event);
                (x - event.x).abs() < EPSILON && (y - event.y_center).abs() < EPSILON
            }
            None => false,
        }
    }

    // Logs every arc with its break points at the given sweep position,
    // followed by the tree shape.
    pub(crate) fn trace_beachline(&self, directrix: f64) {
        let mut arc = self.beachline.first();
        while let Some(at) = arc {
            let site = self.beachline.get(at).site;
            tracing::trace!(
                site = site.id,
                xl = self.left_break_point(at, directrix),
                xr = self.right_break_point(at, directrix),
                "beach section"
            );
            arc = self.beachline.next(at);
        }
        tracing::trace!(
            "beachline tree:\n{}",
            self.beachline.render(|arc| arc.site.id.to_string())
        );
    }
}
