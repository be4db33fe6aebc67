//! Orthogonal link routing that steers around node bodies.
//!
//! A route leaves its source port along the port direction for a fixed end
//! segment, joins the target's end segment with one or two elbows, and, when
//! that path cuts through a node, tries detours around the offending rectangle.

use crate::model::{Bounds, PortId, Point};

/// Length of the straight run out of a port and into a port.
pub const END_SEGMENT_LENGTH: f64 = 30.0;
/// Clearance kept between routes and node outlines.
pub const COLLISION_MARGIN: f64 = 6.0;

const DETOUR_CLEARANCE: f64 = COLLISION_MARGIN * 2.0 + 8.0;
const MAX_DETOUR_PASSES: usize = 3;

pub struct LinkEnd<'a> {
    pub bounds: &'a Bounds,
    pub port: PortId,
}

/// Computes a polyline from `from` to `to`. `obstacles` should hold every
/// node body other than the two endpoints.
pub fn route_link(from: LinkEnd, to: LinkEnd, obstacles: &[Bounds]) -> Vec<Point> {
    let start = from.port.spot(from.bounds);
    let end = to.port.spot(to.bounds);
    let start_stub = stub(start, from.port);
    let end_stub = stub(end, to.port);

    // The endpoints' own bodies block everything but the end segments, so a
    // route never doubles back through its own node.
    let mut ends = vec![*from.bounds];
    if from.bounds != to.bounds {
        ends.push(*to.bounds);
    }
    let blocking = Blocking {
        obstacles,
        ends: &ends,
    };

    let mid_x = (start_stub.x + end_stub.x) * 0.5;
    let mid_y = (start_stub.y + end_stub.y) * 0.5;
    let middles: [Vec<Point>; 4] = [
        vec![Point::new(end_stub.x, start_stub.y)],
        vec![Point::new(start_stub.x, end_stub.y)],
        vec![Point::new(mid_x, start_stub.y), Point::new(mid_x, end_stub.y)],
        vec![Point::new(start_stub.x, mid_y), Point::new(end_stub.x, mid_y)],
    ];

    let mut best: Option<(Metric, Vec<Point>)> = None;
    for middle in middles {
        let route = build_route(start, start_stub, &middle, end_stub, end);
        let metric = evaluate(&route, &blocking);
        if best.as_ref().is_none_or(|(m, _)| metric.better_than(m)) {
            best = Some((metric, route));
        }
    }
    let Some((mut best_metric, mut best_route)) = best else {
        return vec![start, end];
    };

    for _ in 0..MAX_DETOUR_PASSES {
        if best_metric.collisions == 0 {
            break;
        }
        match detour(&best_route, &blocking, best_metric) {
            Some((metric, route)) => {
                best_metric = metric;
                best_route = route;
            }
            None => break,
        }
    }

    simplify_route(&mut best_route);
    best_route
}

struct Blocking<'a> {
    obstacles: &'a [Bounds],
    ends: &'a [Bounds],
}

fn stub(p: Point, port: PortId) -> Point {
    let (dx, dy) = port.direction();
    Point::new(p.x + dx * END_SEGMENT_LENGTH, p.y + dy * END_SEGMENT_LENGTH)
}

fn build_route(
    start: Point,
    start_stub: Point,
    middle: &[Point],
    end_stub: Point,
    end: Point,
) -> Vec<Point> {
    let mut route = Vec::with_capacity(middle.len() + 4);
    route.push(start);
    route.push(start_stub);
    route.extend_from_slice(middle);
    route.push(end_stub);
    route.push(end);
    route.dedup_by(|a, b| points_close(*a, *b));
    route
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Metric {
    collisions: usize,
    length: f64,
}

impl Metric {
    fn better_than(&self, other: &Metric) -> bool {
        (self.collisions, self.length) < (other.collisions, other.length)
    }
}

fn evaluate(route: &[Point], blocking: &Blocking) -> Metric {
    Metric {
        collisions: count_collisions(route, blocking.obstacles, blocking.ends),
        length: route_length(route),
    }
}

fn hits(rect: &Bounds, a: Point, b: Point) -> bool {
    rect.inflate(COLLISION_MARGIN).intersects_segment(a, b)
}

/// Counts (segment, rectangle) crossings. The first and last segments always
/// touch their own node, so they are only checked against `obstacles`.
fn count_collisions(route: &[Point], obstacles: &[Bounds], ends: &[Bounds]) -> usize {
    let last = route.len().saturating_sub(2);
    route
        .windows(2)
        .enumerate()
        .map(|(i, seg)| {
            let others = obstacles.iter().filter(|r| hits(r, seg[0], seg[1])).count();
            let own = if i == 0 || i == last {
                0
            } else {
                ends.iter().filter(|r| hits(r, seg[0], seg[1])).count()
            };
            others + own
        })
        .sum()
}

pub fn route_length(route: &[Point]) -> f64 {
    route
        .windows(2)
        .map(|seg| ((seg[1].x - seg[0].x).powi(2) + (seg[1].y - seg[0].y).powi(2)).sqrt())
        .sum()
}

/// Tries going around each rectangle hit by an inner segment, keeping the
/// first strictly better candidate.
fn detour(route: &[Point], blocking: &Blocking, current: Metric) -> Option<(Metric, Vec<Point>)> {
    let mut best: Option<(Metric, Vec<Point>)> = None;
    let mut best_metric = current;

    for idx in 1..route.len().saturating_sub(2) {
        let a = route[idx];
        let b = route[idx + 1];
        for rect in blocking.obstacles.iter().chain(blocking.ends.iter()) {
            let inflated = rect.inflate(COLLISION_MARGIN);
            if !inflated.intersects_segment(a, b) {
                continue;
            }
            let above = inflated.min_y - DETOUR_CLEARANCE;
            let below = inflated.max_y + DETOUR_CLEARANCE;
            let left = inflated.min_x - DETOUR_CLEARANCE;
            let right = inflated.max_x + DETOUR_CLEARANCE;
            let candidates = [
                [Point::new(a.x, above), Point::new(b.x, above)],
                [Point::new(a.x, below), Point::new(b.x, below)],
                [Point::new(left, a.y), Point::new(left, b.y)],
                [Point::new(right, a.y), Point::new(right, b.y)],
            ];
            for detour in candidates {
                let mut candidate = Vec::with_capacity(route.len() + 2);
                candidate.extend_from_slice(&route[..=idx]);
                candidate.extend(detour.iter());
                candidate.extend_from_slice(&route[idx + 1..]);
                candidate.dedup_by(|a, b| points_close(*a, *b));

                let metric = evaluate(&candidate, blocking);
                if metric.better_than(&best_metric) {
                    best_metric = metric;
                    best = Some((metric, candidate));
                    if metric.collisions == 0 {
                        return best;
                    }
                }
            }
        }
    }
    best
}

fn points_close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

/// Drops duplicate points and interior points of straight runs.
pub fn simplify_route(route: &mut Vec<Point>) {
    route.dedup_by(|a, b| points_close(*a, *b));
    if route.len() < 3 {
        return;
    }
    let mut idx = 1;
    while idx + 1 < route.len() {
        let prev = route[idx - 1];
        let current = route[idx];
        let next = route[idx + 1];
        let cross =
            (current.x - prev.x) * (next.y - prev.y) - (current.y - prev.y) * (next.x - prev.x);
        let within_x =
            current.x >= prev.x.min(next.x) - 1e-6 && current.x <= prev.x.max(next.x) + 1e-6;
        let within_y =
            current.y >= prev.y.min(next.y) - 1e-6 && current.y <= prev.y.max(next.y) + 1e-6;
        if cross.abs() < 1e-6 && within_x && within_y {
            route.remove(idx);
            continue;
        }
        idx += 1;
    }
}
