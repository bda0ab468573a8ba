// Numerical tolerances and the small geometric predicates shared by the
// sweep and by diagram completion.

/// Tolerance for positional comparisons ("falls exactly on", "same point").
pub const EPSILON: f64 = 1e-9;

/// Tolerance for the clockwise test of a circle-event triple.
pub const ORIENTATION_EPSILON: f64 = 2e-12;

pub fn equals_with_epsilon(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

pub fn greater_than_with_epsilon(a: f64, b: f64) -> bool {
    a - b > EPSILON
}

pub fn less_than_with_epsilon(a: f64, b: f64) -> bool {
    b - a > EPSILON
}

// Returns the x coordinate where the arc of `left` meets the arc of `right`
// on the beachline, for a horizontal directrix.
//
//                                 *                .
//                                 f2             ..
//    .                                        ...
//     .       f1        .*..             .....
//      ..      *      .. |  .............
//        ....     ....   |
//            .....       |
//                        |
// -----------------------X--------------------------- directrix
//
// A focus lying on the directrix degenerates into a vertical ray, so the
// break point is that focus' x. The origin is moved to the right focus to
// keep the quadratic well conditioned.
pub fn breakpoint_between(left: (f64, f64), right: (f64, f64), directrix: f64) -> f64 {
    let (rfocx, rfocy) = right;
    let pby2 = rfocy - directrix;
    if pby2 == 0.0 {
        return rfocx;
    }
    let (lfocx, lfocy) = left;
    let plby2 = lfocy - directrix;
    if plby2 == 0.0 {
        return lfocx;
    }
    let hl = lfocx - rfocx;
    let aby2 = 1.0 / pby2 - 1.0 / plby2;
    let b = hl / plby2;
    if aby2 != 0.0 {
        let c = hl * hl / (-2.0 * plby2) - lfocy + plby2 / 2.0 + rfocy - pby2 / 2.0;
        return (-b + (b * b - 2.0 * aby2 * c).sqrt()) / aby2 + rfocx;
    }
    // Both foci are equally far from the directrix
    (rfocx + lfocx) / 2.0
}

// Center of the circle through a, b and c, computed with a as the origin.
// The caller guarantees the points are not collinear.
pub fn circumcenter(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> (f64, f64) {
    let (ax, ay) = a;
    let bx = b.0 - ax;
    let by = b.1 - ay;
    let cx = c.0 - ax;
    let cy = c.1 - ay;
    let d = 2.0 * (bx * cy - by * cx);
    let hb = bx * bx + by * by;
    let hc = cx * cx + cy * cy;
    ((cy * hb - by * hc) / d + ax, (bx * hc - cx * hb) / d + ay)
}

/// Where and when the middle arc of a `left, middle, right` triple collapses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collapse {
    pub x: f64,
    /// Bottom of the circumcircle: the sweep position that triggers the event.
    pub y: f64,
    pub y_center: f64,
}

// Returns None unless left -> middle -> right turn clockwise (in the y-down
// convention), which is the only configuration where the middle arc shrinks.
pub fn find_collapse(left: (f64, f64), middle: (f64, f64), right: (f64, f64)) -> Option<Collapse> {
    let (bx, by) = middle;
    let ax = left.0 - bx;
    let ay = left.1 - by;
    let cx = right.0 - bx;
    let cy = right.1 - by;

    // The sign of d is the reverse of the orientation
    let d = 2.0 * (ax * cy - ay * cx);
    if d >= -ORIENTATION_EPSILON {
        return None;
    }

    let ha = ax * ax + ay * ay;
    let hc = cx * cx + cy * cy;
    let x = (cy * ha - ay * hc) / d;
    let y = (ax * hc - cx * ha) / d;
    let y_center = y + by;
    Some(Collapse {
        x: x + bx,
        y: y_center + (x * x + y * y).sqrt(),
        y_center,
    })
}
