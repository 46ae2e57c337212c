//! Planar outlines handed to the host for extrusion.
//!
//! A [`Profile`] is one closed outer [`Loop`] plus any number of hole loops,
//! drawn in the local `(u, v)` coordinates of a [`SketchPlane`]. Loops are
//! built from straight [`Curve::Line`]s and circular [`Curve::Arc`]s; the
//! host tessellates arcs when it needs polylines.

use std::f64::consts::{PI, TAU};

use crate::geometry::{Point2, Point3, Vector3};

/// Number of straight pieces used to tessellate a full circle.
pub const CIRCLE_SEGMENTS: usize = 32;

/// One piece of a closed loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line {
        start: Point2,
        end: Point2,
    },
    /// Circular arc swept from `start_angle` by `sweep` radians
    /// (positive is counter-clockwise in the sketch plane).
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

impl Curve {
    pub fn line(start: Point2, end: Point2) -> Self {
        Self::Line { start, end }
    }

    pub fn arc(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self::Arc {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    pub fn start(&self) -> Point2 {
        match *self {
            Self::Line { start, .. } => start,
            Self::Arc {
                center,
                radius,
                start_angle,
                ..
            } => point_on_circle(center, radius, start_angle),
        }
    }

    pub fn end(&self) -> Point2 {
        match *self {
            Self::Line { end, .. } => end,
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => point_on_circle(center, radius, start_angle + sweep),
        }
    }

    /// Points along the curve, start included, end excluded.
    pub fn tessellate(&self) -> Vec<Point2> {
        match *self {
            Self::Line { start, .. } => vec![start],
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let pieces = ((sweep.abs() / TAU) * CIRCLE_SEGMENTS as f64).ceil().max(1.0) as usize;
                (0..pieces)
                    .map(|i| {
                        let angle = start_angle + sweep * i as f64 / pieces as f64;
                        point_on_circle(center, radius, angle)
                    })
                    .collect()
            }
        }
    }
}

fn point_on_circle(center: Point2, radius: f64, angle: f64) -> Point2 {
    let (sin, cos) = angle.sin_cos();
    center.offset(radius * cos, radius * sin)
}

/// A closed chain of curves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Loop {
    curves: Vec<Curve>,
}

impl Loop {
    pub fn new(curves: Vec<Curve>) -> Self {
        Self { curves }
    }

    /// Closed polygon through `points` (the closing edge is added).
    pub fn polygon(points: &[Point2]) -> Self {
        let curves = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(&start, &end)| Curve::line(start, end))
            .collect();
        Self { curves }
    }

    /// Axis-aligned rectangle from its lower-left corner.
    pub fn rectangle(min: Point2, width: f64, height: f64) -> Self {
        Self::polygon(&[
            min,
            min.offset(width, 0.0),
            min.offset(width, height),
            min.offset(0.0, height),
        ])
    }

    /// Full circle.
    pub fn circle(center: Point2, radius: f64) -> Self {
        Self {
            curves: vec![Curve::arc(center, radius, 0.0, TAU)],
        }
    }

    /// Slot with semicircular ends, `length` measured tip to tip along u.
    ///
    /// Degenerates to a circle when `length <= height`.
    pub fn obround(center: Point2, length: f64, height: f64) -> Self {
        let radius = height / 2.0;
        let straight = (length - height).max(0.0) / 2.0;
        if straight == 0.0 {
            return Self::circle(center, radius);
        }

        let left = center.offset(-straight, 0.0);
        let right = center.offset(straight, 0.0);
        Self {
            curves: vec![
                Curve::line(left.offset(0.0, -radius), right.offset(0.0, -radius)),
                Curve::arc(right, radius, -PI / 2.0, PI),
                Curve::line(right.offset(0.0, radius), left.offset(0.0, radius)),
                Curve::arc(left, radius, PI / 2.0, PI),
            ],
        }
    }

    /// Keyhole: a round head of `head_radius` above a straight slot of
    /// `slot_width`, the whole shape `total_height` tall and centred on `center`.
    pub fn keyhole(center: Point2, head_radius: f64, slot_width: f64, total_height: f64) -> Self {
        let half_slot = (slot_width / 2.0).min(head_radius * 0.9);
        let bottom = center.v() - total_height / 2.0;
        let head_center = Point2::new(center.u(), center.v() + total_height / 2.0 - head_radius);
        // Angle at which the slot walls meet the head circle.
        let join = (half_slot / head_radius).asin();
        let join_v = head_center.v() - head_radius * join.cos();

        let bottom_left = Point2::new(center.u() - half_slot, bottom);
        let bottom_right = Point2::new(center.u() + half_slot, bottom);
        let right_join = Point2::new(center.u() + half_slot, join_v);
        let left_join = Point2::new(center.u() - half_slot, join_v);

        let start_angle = -PI / 2.0 + join;
        Self {
            curves: vec![
                Curve::line(bottom_left, bottom_right),
                Curve::line(bottom_right, right_join),
                Curve::arc(head_center, head_radius, start_angle, TAU - 2.0 * join),
                Curve::line(left_join, bottom_left),
            ],
        }
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Polyline approximation of the loop (not repeated at the end).
    pub fn tessellate(&self) -> Vec<Point2> {
        self.curves.iter().flat_map(Curve::tessellate).collect()
    }

    /// Signed area of the tessellated loop (positive when counter-clockwise).
    pub fn signed_area(&self) -> f64 {
        let points = self.tessellate();
        points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(a, b)| a.u() * b.v() - b.u() * a.v())
            .sum::<f64>()
            / 2.0
    }

    /// Returns `true` when consecutive curves meet end to start.
    pub fn is_closed(&self) -> bool {
        if self.curves.is_empty() {
            return false;
        }
        self.curves
            .iter()
            .zip(self.curves.iter().cycle().skip(1))
            .all(|(current, next)| current.end().distance(next.start()) < 1e-6)
    }
}

/// An outer boundary with optional holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    outer: Loop,
    holes: Vec<Loop>,
}

impl Profile {
    pub fn new(outer: Loop) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Adds a hole loop (builder style).
    pub fn with_hole(mut self, hole: Loop) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn outer(&self) -> &Loop {
        &self.outer
    }

    pub fn holes(&self) -> &[Loop] {
        &self.holes
    }

    /// Outer loop followed by the holes.
    pub fn loops(&self) -> impl Iterator<Item = &Loop> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }
}

/// The plane a profile is drawn on; extrusion runs along `normal`.
///
/// `normal` is stored rather than derived so that an XZ sketch can be pushed
/// towards either side of the plane without mirroring the outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchPlane {
    origin: Point3,
    u_axis: Vector3,
    v_axis: Vector3,
    normal: Vector3,
}

impl SketchPlane {
    pub fn new(origin: Point3, u_axis: Vector3, v_axis: Vector3, normal: Vector3) -> Self {
        Self {
            origin,
            u_axis,
            v_axis,
            normal,
        }
    }

    /// Front elevation plane at depth `y`: u = X, v = Z, extruding along +Y.
    pub fn elevation(y: f64) -> Self {
        Self::elevation_towards(y, Vector3::Y)
    }

    /// Front elevation plane extruding along `normal` (+Y or -Y).
    pub fn elevation_towards(y: f64, normal: Vector3) -> Self {
        Self::new(Point3::new(0.0, y, 0.0), Vector3::X, Vector3::Z, normal)
    }

    /// Horizontal plane at height `z`: u = X, v = Y, extruding along `normal`.
    pub fn plan(z: f64, normal: Vector3) -> Self {
        Self::new(Point3::new(0.0, 0.0, z), Vector3::X, Vector3::Y, normal)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn u_axis(&self) -> Vector3 {
        self.u_axis
    }

    pub fn v_axis(&self) -> Vector3 {
        self.v_axis
    }

    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Maps a sketch point to model space.
    pub fn to_model(&self, point: Point2) -> Point3 {
        self.origin + self.u_axis * point.u() + self.v_axis * point.v()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_rectangle_is_closed_and_ccw() {
        let rect = Loop::rectangle(Point2::new(0.0, 0.0), 300.0, 100.0);

        assert!(rect.is_closed());
        assert_eq!(rect.curves().len(), 4);
        assert_approx_eq!(f64, rect.signed_area(), 30_000.0);
    }

    #[test]
    fn test_circle_tessellation() {
        let circle = Loop::circle(Point2::new(10.0, 10.0), 5.0);
        let points = circle.tessellate();

        assert_eq!(points.len(), CIRCLE_SEGMENTS);
        for point in points {
            assert_approx_eq!(f64, point.distance(Point2::new(10.0, 10.0)), 5.0, epsilon = 1e-9);
        }
        assert!(circle.is_closed());
    }

    #[test]
    fn test_obround_is_closed() {
        let slot = Loop::obround(Point2::new(0.0, 0.0), 120.0, 40.0);

        assert!(slot.is_closed());
        assert_eq!(slot.curves().len(), 4);
        assert!(slot.signed_area() > 0.0);
    }

    #[test]
    fn test_obround_degenerates_to_circle() {
        let slot = Loop::obround(Point2::new(0.0, 0.0), 30.0, 40.0);
        assert_eq!(slot.curves().len(), 1);
    }

    #[test]
    fn test_keyhole_is_closed_and_inside_height() {
        let keyhole = Loop::keyhole(Point2::new(50.0, 25.0), 10.0, 8.0, 40.0);

        assert!(keyhole.is_closed());
        for point in keyhole.tessellate() {
            assert!(point.v() >= 25.0 - 20.0 - 1e-9);
            assert!(point.v() <= 25.0 + 20.0 + 1e-9);
        }
    }

    #[test]
    fn test_elevation_plane_normal() {
        assert!(SketchPlane::elevation(0.0).normal().is_almost_equal(Vector3::Y));
        assert!(
            SketchPlane::elevation_towards(0.0, -Vector3::Y)
                .normal()
                .is_almost_equal(-Vector3::Y)
        );
    }

    #[test]
    fn test_to_model() {
        let plane = SketchPlane::elevation(25.0);
        let point = plane.to_model(Point2::new(3.0, 4.0));
        assert_eq!(point, Point3::new(3.0, 25.0, 4.0));
    }
}
