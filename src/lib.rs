//! Voronoi diagrams of point sites with Fortune's sweep-line algorithm.
//!
//! ```
//! use fortune_voronoi::{BoundingBox, InputSite, Voronoi};
//!
//! let sites = vec![InputSite { x: 0., y: 0. }, InputSite { x: 10., y: 0. }];
//! let diagram = Voronoi::build(&sites, &BoundingBox::new(-5., 15., -5., 5.)).unwrap();
//! assert_eq!(diagram.cells.len(), 2);
//! ```
//!
//! Coordinates follow the screen convention: y grows downward and the sweep
//! line moves from the top of the box to the bottom.

mod bbox;
mod beachline;
mod builder;
mod completion;
mod diagram;
mod error;
mod eventqueue;
mod math_helpers;
mod rbtree;
mod treeprint;

pub use bbox::BoundingBox;
pub use diagram::{Cell, Diagram, Edge, HalfEdge, PointLocation, Vertex};
pub use error::{Result, VoronoiError};
pub use math_helpers::{
    breakpoint_between, circumcenter, equals_with_epsilon, greater_than_with_epsilon, less_than_with_epsilon, EPSILON,
    ORIENTATION_EPSILON,
};

use std::time::Instant;

use beachline::BeachLine;
use builder::DiagramBuilder;
use eventqueue::{sweep_order, CircleEventQueue, Event};
use rbtree::RbTree;
use tracing::Level;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputSite {
    pub x: f64,
    pub y: f64,
}

// A site corresponds to an input point. Sites get a dense id in sweep order
// (duplicates skipped) which is also the index of their cell, and keep the
// position they had in the caller's input.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Site {
    pub x: f64,
    pub y: f64,
    pub id: usize,
    pub index: usize,
}

impl PartialEq for Site {
    fn eq(&self, other: &Self) -> bool {
        equals_with_epsilon(self.x, other.x) && equals_with_epsilon(self.y, other.y)
    }
}

/// The sweep engine. Its arenas keep their capacity between runs, so one
/// engine computing many diagrams allocates less than fresh ones would.
pub struct Voronoi {
    pub(crate) beachline: BeachLine,
    pub(crate) circle_events: CircleEventQueue,
    pub(crate) builder: DiagramBuilder,
    pub(crate) site_events: Vec<Site>,
    pub(crate) next_site: usize,
    // Coordinates of the last site turned into a cell
    last_site: Option<(f64, f64)>,
    started: Instant,
}

impl Default for Voronoi {
    fn default() -> Voronoi {
        Voronoi::new()
    }
}

impl Voronoi {
    pub fn new() -> Voronoi {
        Voronoi {
            beachline: RbTree::new(),
            circle_events: RbTree::new(),
            builder: DiagramBuilder::default(),
            site_events: Vec::new(),
            next_site: 0,
            last_site: None,
            started: Instant::now(),
        }
    }

    /// Pre-sizes the engine for diagrams of about `sites` sites.
    pub fn with_capacity(sites: usize) -> Voronoi {
        Voronoi {
            // A site can split an arc, adding two to the beachline
            beachline: RbTree::with_capacity(2 * sites),
            circle_events: RbTree::with_capacity(sites),
            builder: DiagramBuilder::with_capacity(sites),
            site_events: Vec::with_capacity(sites),
            ..Voronoi::new()
        }
    }

    /// Computes the diagram of `sites` clipped to `bbox` with a one-off engine.
    pub fn build(sites: &[InputSite], bbox: &BoundingBox) -> Result<Diagram> {
        Voronoi::with_capacity(sites.len()).compute(sites, bbox)
    }

    /// Runs the sweep over `sites` and completes the diagram against
    /// `bbox`. On error nothing is returned and the engine is left ready
    /// for the next call.
    pub fn compute(&mut self, sites: &[InputSite], bbox: &BoundingBox) -> Result<Diagram> {
        bbox.validate()?;
        self.reset();
        if let Err(err) = self.queue_sites(sites) {
            self.reset();
            return Err(err);
        }
        while self.step() {}
        self.finalize(bbox)
    }

    pub fn reset(&mut self) {
        self.beachline.clear();
        self.circle_events.clear();
        self.builder.clear();
        self.site_events.clear();
        self.next_site = 0;
        self.last_site = None;
        self.started = Instant::now();
    }

    pub(crate) fn queue_sites(&mut self, sites: &[InputSite]) -> Result<()> {
        for (index, site) in sites.iter().enumerate() {
            if !site.x.is_finite() || !site.y.is_finite() {
                return Err(VoronoiError::NonFiniteSite {
                    index,
                    x: site.x,
                    y: site.y,
                });
            }
            self.site_events.push(Site {
                x: site.x,
                y: site.y,
                id: 0,
                index,
            });
        }
        self.site_events.sort_by(sweep_order);
        Ok(())
    }

    // Handles the next event. Returns false once both queues are empty.
    pub(crate) fn step(&mut self) -> bool {
        match self.next_event() {
            Some(Event::Site(mut site)) => {
                self.next_site += 1;
                if self.last_site == Some((site.x, site.y)) {
                    tracing::trace!(index = site.index, x = site.x, y = site.y, "skipping duplicate site");
                    return true;
                }
                self.last_site = Some((site.x, site.y));

                site.id = self.builder.cells.len();
                self.builder.create_cell(site);
                tracing::trace!(id = site.id, x = site.x, y = site.y, "site event");
                self.add_beach_section(site);
                if tracing::enabled!(Level::TRACE) {
                    self.trace_beachline(site.y);
                }
                true
            }
            Some(Event::Circle(event)) => {
                let circle = self.circle_events.get(event);
                let (arc, site, x, y) = (circle.arc, circle.site, circle.x, circle.y);
                debug_assert_eq!(self.beachline.get(arc).circle_event, Some(event));
                tracing::trace!(site, x, y, "circle event");
                self.remove_beach_section(arc);
                if tracing::enabled!(Level::TRACE) {
                    self.trace_beachline(y);
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn finalize(&mut self, bbox: &BoundingBox) -> Result<Diagram> {
        debug_assert!(self.circle_events.is_empty(), "sweep stopped with pending circle events");
        self.builder.clip_edges(bbox);
        if let Err(err) = self.builder.close_cells(bbox) {
            self.reset();
            return Err(err);
        }
        let diagram = self.builder.finish(self.started.elapsed());
        tracing::debug!(
            sites = self.site_events.len(),
            arcs = self.beachline.len(),
            cells = diagram.cells.len(),
            vertices = diagram.vertices.len(),
            edges = diagram.edges.len(),
            elapsed = ?diagram.exec_time,
            "computed diagram"
        );
        self.reset();
        Ok(diagram)
    }
}

/// Snaps every coordinate down onto the `EPSILON` grid. Inputs with very
/// large or very finely spaced coordinates can otherwise produce break
/// points that disagree with each other.
pub fn quantize_sites(sites: &mut [InputSite]) {
    for site in sites.iter_mut() {
        site.x = (site.x / EPSILON).floor() * EPSILON;
        site.y = (site.y / EPSILON).floor() * EPSILON;
    }
}
