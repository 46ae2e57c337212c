//! Geometric primitives for unit layout and annotation.
//!
//! # Overview
//!
//! - [`Point2`] - A coordinate in a sketch plane's local `(u, v)` system
//! - [`Point3`] / [`Vector3`] - Model-space positions and directions
//! - [`Bounds3`] - An axis-aligned box
//! - [`Axis`] - A line in space used as a rotation axis
//! - [`Transform`] - A rigid transform (rotation followed by translation)
//!
//! # Coordinate System
//!
//! All values are millimetres in a right-handed model space:
//!
//! ```text
//!         +Z (up)
//!          │
//!          │   +Y (depth, away from the front view)
//!          │  ╱
//!          │ ╱
//!          └──────────► +X (along the airflow chains)
//! ```
//!
//! Chains run along X, segments are extruded along +Y by their width and
//! stacked along Z.

use std::ops::{Add, Mul, Neg, Sub};

/// Tolerance used when comparing directions and coordinates.
pub const EPSILON: f64 = 1e-6;

/// A point in a sketch plane's local coordinate system.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point2 {
    u: f64,
    v: f64,
}

impl Point2 {
    /// Creates a new point with the specified sketch coordinates
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Returns the coordinate along the sketch plane's u axis
    pub fn u(self) -> f64 {
        self.u
    }

    /// Returns the coordinate along the sketch plane's v axis
    pub fn v(self) -> f64 {
        self.v
    }

    /// Returns this point moved by `(du, dv)`
    pub fn offset(self, du: f64, dv: f64) -> Self {
        Self {
            u: self.u + du,
            v: self.v + dv,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point2) -> f64 {
        (self.u - other.u).hypot(self.v - other.v)
    }
}

/// A direction or displacement in model space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector3 {
    pub const X: Vector3 = Vector3::new(1.0, 0.0, 0.0);
    pub const Y: Vector3 = Vector3::new(0.0, 1.0, 0.0);
    pub const Z: Vector3 = Vector3::new(0.0, 0.0, 1.0);
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn z(self) -> f64 {
        self.z
    }

    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns the unit vector in the same direction, or `None` for a zero vector
    pub fn normalize(self) -> Option<Vector3> {
        let length = self.length();
        (length > EPSILON).then(|| self * (1.0 / length))
    }

    /// Returns `true` if both vectors point the same way within [`EPSILON`]
    pub fn is_almost_equal(self, other: Vector3) -> bool {
        (self - other).length() <= EPSILON
    }

    /// Returns `true` if the vectors are parallel or anti-parallel
    pub fn is_parallel(self, other: Vector3) -> bool {
        self.is_almost_equal(other) || self.is_almost_equal(-other)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, factor: f64) -> Vector3 {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

/// A position in model space.
///
/// # Examples
///
/// ```
/// # use ahu_core::geometry::{Point3, Vector3};
/// let p = Point3::new(100.0, 0.0, 50.0);
/// let moved = p + Vector3::new(10.0, 0.0, -5.0);
/// assert_eq!(moved, Point3::new(110.0, 0.0, 45.0));
/// assert_eq!(moved - p, Vector3::new(10.0, 0.0, -5.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn z(self) -> f64 {
        self.z
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    /// Creates a new point with the specified z-coordinate
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Returns the position vector from the origin to this point
    pub fn to_vector(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn distance(self, other: Point3) -> f64 {
        (self - other).length()
    }

    /// Averages a set of points, or `None` when the set is empty
    pub fn centroid<I>(points: I) -> Option<Point3>
    where
        I: IntoIterator<Item = Point3>,
    {
        let (sum, count) = points
            .into_iter()
            .fold((Vector3::ZERO, 0usize), |(sum, count), point| {
                (sum + point.to_vector(), count + 1)
            });
        (count > 0).then(|| Point3::ORIGIN + sum * (1.0 / count as f64))
    }
}

impl Add<Vector3> for Point3 {
    type Output = Point3;

    fn add(self, offset: Vector3) -> Point3 {
        Point3::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }
}

impl Sub<Vector3> for Point3 {
    type Output = Point3;

    fn sub(self, offset: Vector3) -> Point3 {
        Point3::new(self.x - offset.x, self.y - offset.y, self.z - offset.z)
    }
}

impl Sub for Point3 {
    type Output = Vector3;

    fn sub(self, other: Point3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    min: Point3,
    max: Point3,
}

impl Bounds3 {
    /// Creates bounds from two opposite corners, in any order
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty set
    pub fn from_points<I>(points: I) -> Option<Bounds3>
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Bounds3::new(first, first), |bounds, point| {
            bounds.include(point)
        }))
    }

    pub fn min(self) -> Point3 {
        self.min
    }

    pub fn max(self) -> Point3 {
        self.max
    }

    pub fn center(self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Extent along X
    pub fn length(self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y
    pub fn width(self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along Z
    pub fn height(self) -> f64 {
        self.max.z - self.min.z
    }

    /// Returns bounds grown to contain `point`
    pub fn include(self, point: Point3) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            max: Point3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        }
    }

    /// Merges two bounds into the smallest bounds containing both
    pub fn merge(self, other: Bounds3) -> Self {
        self.include(other.min).include(other.max)
    }

    pub fn translate(self, offset: Vector3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// A line in model space, used as a rotation axis or dimension line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    origin: Point3,
    direction: Vector3,
}

impl Axis {
    /// Creates an axis through `origin`; `direction` is normalized (zero falls back to X)
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize().unwrap_or(Vector3::X),
        }
    }

    pub fn origin(self) -> Point3 {
        self.origin
    }

    pub fn direction(self) -> Vector3 {
        self.direction
    }

    /// Signed coordinate of `point` projected onto this axis
    pub fn project(self, point: Point3) -> f64 {
        (point - self.origin).dot(self.direction)
    }
}

/// A rigid transform: `p' = R·p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    rows: [[f64; 3]; 3],
    translation: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        translation: Vector3::ZERO,
    };

    /// Pure translation
    pub fn translation(offset: Vector3) -> Self {
        Self {
            translation: offset,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `angle` radians (right-hand rule) about `axis`.
    ///
    /// Quarter turns use exact sines and cosines so repeated layouts stay
    /// bit-identical.
    pub fn rotation(axis: Axis, angle: f64) -> Self {
        let d = axis.direction();
        let (sin, cos) = quarter_turn_sin_cos(angle).unwrap_or_else(|| angle.sin_cos());
        let one_minus = 1.0 - cos;
        let (x, y, z) = (d.x, d.y, d.z);

        let rows = [
            [
                cos + x * x * one_minus,
                x * y * one_minus - z * sin,
                x * z * one_minus + y * sin,
            ],
            [
                y * x * one_minus + z * sin,
                cos + y * y * one_minus,
                y * z * one_minus - x * sin,
            ],
            [
                z * x * one_minus - y * sin,
                z * y * one_minus + x * sin,
                cos + z * z * one_minus,
            ],
        ];

        // Rotate about the axis origin rather than the model origin.
        let rotation = Self {
            rows,
            translation: Vector3::ZERO,
        };
        let origin = axis.origin().to_vector();
        let shift = origin - rotation.apply_vector(origin);
        Self {
            rows,
            translation: shift,
        }
    }

    /// Rotates a direction (translation is ignored)
    pub fn apply_vector(&self, v: Vector3) -> Vector3 {
        let r = &self.rows;
        Vector3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    pub fn apply_point(&self, p: Point3) -> Point3 {
        Point3::ORIGIN + self.apply_vector(p.to_vector()) + self.translation
    }

    /// Returns the transform that applies `self` first and then `next`
    pub fn then(&self, next: &Transform) -> Transform {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| next.rows[i][k] * self.rows[k][j]).sum();
            }
        }
        Transform {
            rows,
            translation: next.apply_vector(self.translation) + next.translation,
        }
    }
}

/// Exact `(sin, cos)` when `angle` is a whole number of quarter turns.
fn quarter_turn_sin_cos(angle: f64) -> Option<(f64, f64)> {
    let quarters = angle / std::f64::consts::FRAC_PI_2;
    let rounded = quarters.round();
    if (quarters - rounded).abs() > 1e-9 {
        return None;
    }
    Some(match (rounded as i64).rem_euclid(4) {
        0 => (0.0, 1.0),
        1 => (1.0, 0.0),
        2 => (0.0, -1.0),
        _ => (-1.0, 0.0),
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use float_cmp::{approx_eq, assert_approx_eq};
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let v = Vector3::new(0.5, -1.0, 2.0);

        assert_eq!(p + v, Point3::new(1.5, 1.0, 5.0));
        assert_eq!((p + v) - v, p);
        assert_eq!(p - Point3::ORIGIN, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_vector_parallel() {
        assert!(Vector3::X.is_parallel(-Vector3::X));
        assert!(!Vector3::X.is_parallel(Vector3::Y));
        assert!(Vector3::new(0.0, 0.0, 5.0).normalize().unwrap().is_almost_equal(Vector3::Z));
        assert!(Vector3::ZERO.normalize().is_none());
    }

    #[test]
    fn test_centroid() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let centroid = Point3::centroid(points).unwrap();
        assert_approx_eq!(f64, centroid.x(), 1.0);
        assert_approx_eq!(f64, centroid.z(), 1.0);
        assert!(Point3::centroid(std::iter::empty::<Point3>()).is_none());
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds3::from_points([
            Point3::new(3.0, 1.0, -2.0),
            Point3::new(-1.0, 4.0, 0.0),
        ])
        .unwrap();

        assert_eq!(bounds.min(), Point3::new(-1.0, 1.0, -2.0));
        assert_eq!(bounds.max(), Point3::new(3.0, 4.0, 0.0));
        assert_approx_eq!(f64, bounds.length(), 4.0);
        assert_approx_eq!(f64, bounds.width(), 3.0);
        assert_approx_eq!(f64, bounds.height(), 2.0);
    }

    #[test]
    fn test_quarter_turn_about_z_is_exact() {
        let transform = Transform::rotation(Axis::new(Point3::ORIGIN, Vector3::Z), FRAC_PI_2);
        let rotated = transform.apply_point(Point3::new(1.0, 0.0, 0.0));

        assert_eq!(rotated, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotation_about_offset_axis_keeps_axis_points_fixed() {
        let axis = Axis::new(Point3::new(10.0, 0.0, 5.0), Vector3::Y);
        let transform = Transform::rotation(axis, FRAC_PI_2);

        assert_eq!(
            transform.apply_point(Point3::new(10.0, 3.0, 5.0)),
            Point3::new(10.0, 3.0, 5.0)
        );
        // +X from the pivot swings down to -Z under a right-handed turn about +Y.
        assert_eq!(
            transform.apply_point(Point3::new(11.0, 0.0, 5.0)),
            Point3::new(10.0, 0.0, 4.0)
        );
    }

    #[test]
    fn test_then_composes_in_order() {
        let rotate = Transform::rotation(Axis::new(Point3::ORIGIN, Vector3::Z), FRAC_PI_2);
        let shift = Transform::translation(Vector3::new(5.0, 0.0, 0.0));
        let combined = rotate.then(&shift);

        assert_eq!(
            combined.apply_point(Point3::new(1.0, 0.0, 0.0)),
            Point3::new(5.0, 1.0, 0.0)
        );
    }

    // ===================
    // Property Test Functions
    // ===================

    fn point_strategy() -> impl Strategy<Value = Point3> {
        (-1e4..1e4f64, -1e4..1e4f64, -1e4..1e4f64).prop_map(|(x, y, z)| Point3::new(x, y, z))
    }

    fn axis_direction_strategy() -> impl Strategy<Value = Vector3> {
        prop_oneof![Just(Vector3::X), Just(Vector3::Y), Just(Vector3::Z)]
    }

    /// Rigid transforms preserve distances.
    fn check_rotation_preserves_distance(
        a: Point3,
        b: Point3,
        pivot: Point3,
        direction: Vector3,
        angle: f64,
    ) -> Result<(), TestCaseError> {
        let transform = Transform::rotation(Axis::new(pivot, direction), angle);
        let before = a.distance(b);
        let after = transform.apply_point(a).distance(transform.apply_point(b));

        prop_assert!(approx_eq!(f64, before, after, epsilon = 1e-6));
        Ok(())
    }

    /// Merged bounds contain both inputs.
    fn check_bounds_merge_contains_both(
        a: Point3,
        b: Point3,
        c: Point3,
        d: Point3,
    ) -> Result<(), TestCaseError> {
        let first = Bounds3::new(a, b);
        let second = Bounds3::new(c, d);
        let merged = first.merge(second);

        for bounds in [first, second] {
            prop_assert!(merged.min().x() <= bounds.min().x());
            prop_assert!(merged.min().z() <= bounds.min().z());
            prop_assert!(merged.max().y() >= bounds.max().y());
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn rotation_preserves_distance(
            a in point_strategy(),
            b in point_strategy(),
            pivot in point_strategy(),
            direction in axis_direction_strategy(),
            angle in -6.3..6.3f64,
        ) {
            check_rotation_preserves_distance(a, b, pivot, direction, angle)?;
        }

        #[test]
        fn bounds_merge_contains_both(
            a in point_strategy(),
            b in point_strategy(),
            c in point_strategy(),
            d in point_strategy(),
        ) {
            check_bounds_merge_contains_both(a, b, c, d)?;
        }
    }
}
