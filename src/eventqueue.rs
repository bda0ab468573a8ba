// Event scheduling for the sweep. Site events are a plain sorted list;
// circle events live in a red-black tree ordered by the sweep position at
// which they fire, so they can be cancelled when an arc's neighbours change.

use std::cmp::Ordering;

use crate::math_helpers::find_collapse;
use crate::rbtree::{NodeHandle, RbTree};
use crate::{Site, Voronoi};

pub(crate) enum Event {
    Site(Site),
    Circle(NodeHandle),
}

#[derive(Clone, Debug)]
pub(crate) struct CircleEvent {
    /// The beachline arc that vanishes when this event fires.
    pub arc: NodeHandle,
    pub site: usize,
    pub x: f64,
    /// Bottom of the circumcircle, where the sweep line triggers the event.
    pub y: f64,
    pub y_center: f64,
}

impl CircleEvent {
    // Earliest collapse first, ties go to the smaller x. New events land
    // before existing equal ones.
    fn fires_before(&self, other: &CircleEvent) -> bool {
        self.y < other.y || (self.y == other.y && self.x <= other.x)
    }
}

pub(crate) type CircleEventQueue = RbTree<CircleEvent>;

// Sweep order: top to bottom, then left to right.
pub(crate) fn sweep_order(a: &Site, b: &Site) -> Ordering {
    a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
}

impl Voronoi {
    pub(crate) fn next_event(&self) -> Option<Event> {
        let site = self.site_events.get(self.next_site);
        let circle = self.circle_events.first();
        match (site, circle) {
            (Some(site), Some(circle)) => {
                let event = self.circle_events.get(circle);
                if site.y < event.y || (site.y == event.y && site.x < event.x) {
                    Some(Event::Site(*site))
                } else {
                    Some(Event::Circle(circle))
                }
            }
            (Some(site), None) => Some(Event::Site(*site)),
            (None, Some(circle)) => Some(Event::Circle(circle)),
            (None, None) => None,
        }
    }

    // Schedules the collapse of `arc` if its neighbours converge on it.
    pub(crate) fn attach_circle_event(&mut self, arc: NodeHandle) {
        let (left, right) = match (self.beachline.previous(arc), self.beachline.next(arc)) {
            (Some(left), Some(right)) => (left, right),
            _ => return,
        };
        let left_site = self.beachline.get(left).site;
        let site = self.beachline.get(arc).site;
        let right_site = self.beachline.get(right).site;

        // The same site on both sides can't converge
        if left_site.id == right_site.id {
            return;
        }

        let collapse = match find_collapse((left_site.x, left_site.y), (site.x, site.y), (right_site.x, right_site.y)) {
            Some(collapse) => collapse,
            None => return,
        };

        let event = CircleEvent {
            arc,
            site: site.id,
            x: collapse.x,
            y: collapse.y,
            y_center: collapse.y_center,
        };
        let handle = self.circle_events.insert_ordered_by(event, CircleEvent::fires_before);
        self.beachline.get_mut(arc).circle_event = Some(handle);
    }

    pub(crate) fn detach_circle_event(&mut self, arc: NodeHandle) {
        if let Some(event) = self.beachline.get_mut(arc).circle_event.take() {
            self.circle_events.remove(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beachline::Arc;

    fn site(x: f64, y: f64, id: usize) -> Site {
        Site { x, y, id, index: id }
    }

    fn beachline_of(voronoi: &mut Voronoi, sites: &[Site]) -> Vec<NodeHandle> {
        let mut handles: Vec<NodeHandle> = Vec::new();
        for site in sites {
            let anchor = handles.last().cloned();
            handles.push(voronoi.beachline.insert_after(anchor, Arc::new(*site)));
        }
        handles
    }

    #[test]
    fn it_orders_sites_for_the_sweep() {
        let mut sites = vec![site(3., 1., 0), site(1., 2., 1), site(0., 1., 2), site(-1., 0., 3)];
        sites.sort_by(sweep_order);
        let order: Vec<usize> = sites.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![3, 2, 0, 1]);
    }

    #[test]
    fn it_attaches_and_detaches_circle_events() {
        let mut voronoi = Voronoi::new();
        let arcs = beachline_of(&mut voronoi, &[site(0., 10., 0), site(0., 0., 1), site(10., 0., 2)]);

        // End arcs have no neighbour on one side
        voronoi.attach_circle_event(arcs[0]);
        voronoi.attach_circle_event(arcs[2]);
        assert!(voronoi.circle_events.is_empty());

        voronoi.attach_circle_event(arcs[1]);
        let event = voronoi.beachline.get(arcs[1]).circle_event.unwrap();
        let circle = voronoi.circle_events.get(event);
        assert_eq!(circle.arc, arcs[1]);
        assert_eq!(circle.site, 1);
        assert!((circle.x - 5.).abs() < 1e-9);
        assert!((circle.y_center - 5.).abs() < 1e-9);

        voronoi.detach_circle_event(arcs[1]);
        assert!(voronoi.beachline.get(arcs[1]).circle_event.is_none());
        assert!(voronoi.circle_events.is_empty());
    }

    #[test]
    fn it_skips_arcs_flanked_by_one_site() {
        let mut voronoi = Voronoi::new();
        let arcs = beachline_of(&mut voronoi, &[site(0., 0., 0), site(5., 5., 1), site(0., 0., 0)]);
        voronoi.attach_circle_event(arcs[1]);
        assert!(voronoi.circle_events.is_empty());
    }

    #[test]
    fn it_picks_the_earliest_event() {
        let mut voronoi = Voronoi::new();
        // Two independent triples; the one with the smaller circle fires first
        let arcs = beachline_of(
            &mut voronoi,
            &[
                site(0., 10., 0),
                site(0., 0., 1),
                site(10., 0., 2),
                site(100., 20., 3),
                site(100., 0., 4),
                site(102., 0., 5),
            ],
        );
        voronoi.attach_circle_event(arcs[4]);
        voronoi.attach_circle_event(arcs[1]);
        assert_eq!(voronoi.circle_events.len(), 2);

        match voronoi.next_event() {
            Some(Event::Circle(handle)) => assert_eq!(voronoi.circle_events.get(handle).arc, arcs[1]),
            _ => panic!("expected a circle event"),
        }

        // A pending site above the circle's bottom goes first
        voronoi.site_events.push(site(50., 1., 6));
        match voronoi.next_event() {
            Some(Event::Site(site)) => assert_eq!(site.id, 6),
            _ => panic!("expected a site event"),
        }
    }
}
