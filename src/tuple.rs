use std::ops::{ Add, Sub, Neg, Mul };

use crate::feq;
use crate::error::{ TraceError, Result };

/// A point in 3D space.
///
/// Points can be moved by a vector (`Point + Vector`) and connected to other
/// points (`vector_to`), but there is no point arithmetic beyond that.
#[derive(Debug, Default, Copy, Clone)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Point {
    fn eq(&self, other: &Point) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Point {
        Point { x, y, z }
    }

    /// The vector leading from this point to `other`.
    pub fn vector_to(&self, other: &Point) -> Vector {
        Vector::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, v: Vector) -> Point {
        Point {
            x: self.x + v.x,
            y: self.y + v.y,
            z: self.z + v.z,
        }
    }
}

/// A vector in 3D space.
///
/// The length is computed once on construction and cached, which is why the
/// components are private; use `x()`, `y()` and `z()` to read them.
#[derive(Debug, Default, Copy, Clone)]
pub struct Vector {
    x: f64,
    y: f64,
    z: f64,
    length: f64,
}

impl PartialEq for Vector {
    fn eq(&self, other: &Vector) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0, z: 0.0, length: 0.0 };
    pub const X: Vector = Vector { x: 1.0, y: 0.0, z: 0.0, length: 1.0 };
    pub const Y: Vector = Vector { x: 0.0, y: 1.0, z: 0.0, length: 1.0 };
    pub const Z: Vector = Vector { x: 0.0, y: 0.0, z: 1.0, length: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Vector {
        let length = (x * x + y * y + z * z).sqrt();
        Vector { x, y, z, length }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Scales the vector to a new length, keeping its direction.
    ///
    /// A zero vector has no direction, so this fails with a domain error.
    pub fn scale(&self, new_length: f64) -> Result<Vector> {
        if self.length == 0.0 {
            return Err(TraceError::Domain(
                "cannot scale a vector of length 0".to_string()
            ));
        }

        Ok(*self * (new_length / self.length))
    }

    /// Returns a vector with the same direction and length 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use jraytracer::tuple::Vector;
    /// let v = Vector::new(4.0, 0.0, 0.0).normalize().unwrap();
    /// assert_eq!(v, Vector::X);
    /// assert!(Vector::ZERO.normalize().is_err());
    /// ```
    pub fn normalize(&self) -> Result<Vector> {
        self.scale(1.0)
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product `self × other`.
    ///
    /// The order matters: `a.cross(&b) == -b.cross(&a)`. Everything built on
    /// top of this (the camera basis in particular) follows the right-hand
    /// rule.
    pub fn cross(&self, other: &Vector) -> Vector {
        Vector::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Mirrors a vector about a normal: `v - 2 (v·n) n`.
    ///
    /// The normal does not have to be normalized, but it must not be zero.
    pub fn mirror(&self, normal: &Vector) -> Result<Vector> {
        let n = normal.normalize()?;
        Ok(*self - n * (2.0 * self.dot(&n)))
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Vector { x: -self.x, y: -self.y, z: -self.z, length: self.length }
    }
}

/// Implements scalar right-multiplication for a vector.
///
/// ```
/// use jraytracer::tuple::Vector;
///
/// let v = Vector::new(1.0, 2.0, 3.0);
///
/// // (notice how the scalar is on the right)
/// assert_eq!(v * 5.0, Vector::new(5.0, 10.0, 15.0));
/// ```
impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Vector::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vector> for f64 {
    type Output = Vector;

    fn mul(self, v: Vector) -> Vector {
        v * self
    }
}

/* Tests */

#[test]
fn move_point_by_vector() {
    let p = Point::new(3.0, -2.0, 5.0);
    let v = Vector::new(-2.0, 3.0, 1.0);

    assert_eq!(p + v, Point::new(1.0, 1.0, 6.0));
}

#[test]
fn vector_between_points() {
    let p1 = Point::new(3.0, 2.0, 1.0);
    let p2 = Point::new(5.0, 6.0, 7.0);

    assert_eq!(p1.vector_to(&p2), Vector::new(2.0, 4.0, 6.0));
    assert_eq!(p2.vector_to(&p1), Vector::new(-2.0, -4.0, -6.0));
}

#[test]
fn sub_vectors() {
    let v1 = Vector::new(3.0, 2.0, 1.0);
    let v2 = Vector::new(5.0, 6.0, 7.0);

    assert_eq!(v1 - v2, Vector::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector::new(-1.0, 2.0, -3.0));
    assert_eq!((-a).length(), a.length());
}

#[test]
fn mul_fraction() {
    let a = Vector::new(1.0, -2.0, 3.0);

    assert_eq!(a * 0.5, Vector::new(0.5, -1.0, 1.5));
    assert_eq!(0.5 * a, Vector::new(0.5, -1.0, 1.5));
}

#[test]
fn length_is_cached() {
    let v = Vector::new(-1.0, -2.0, -3.0);

    assert_eq!(v.length(), f64::sqrt(14.0));
    assert_eq!(Vector::Y.length(), 1.0);
}

#[test]
fn normalize_dirty() {
    let v = Vector::new(1.0, 2.0, 3.0);
    let e = Vector::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    let n = v.normalize().unwrap();
    assert_eq!(n, e);
    assert!(feq(n.length(), 1.0));
}

#[test]
fn normalize_has_unit_length() {
    for v in &[
        Vector::new(1e-6, 0.0, 0.0),
        Vector::new(-3.0, 4.0, 12.0),
        Vector::new(123456.0, -0.5, 7.25),
    ] {
        assert!(feq(v.normalize().unwrap().length(), 1.0));
    }
}

#[test]
fn normalize_zero_is_domain_error() {
    assert!(matches!(Vector::ZERO.normalize(), Err(TraceError::Domain(_))));
    assert!(matches!(Vector::new(0.0, 0.0, 0.0).scale(2.0),
        Err(TraceError::Domain(_))));
}

#[test]
fn scale_to_length() {
    let v = Vector::new(0.0, 3.0, 4.0).scale(10.0).unwrap();

    assert_eq!(v, Vector::new(0.0, 6.0, 8.0));
}

#[test]
fn dot_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0);
    let b = Vector::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0);
    let b = Vector::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector::new(1.0, -2.0, 1.0));
    assert_eq!(Vector::X.cross(&Vector::Y), Vector::Z);
}

#[test]
fn mirror_45() {
    let v = Vector::new(1.0, -1.0, 0.0);
    let n = Vector::new(0.0, 1.0, 0.0);

    assert_eq!(v.mirror(&n).unwrap(), Vector::new(1.0, 1.0, 0.0));
}

#[test]
fn mirror_normalizes_normal() {
    let v = Vector::new(1.0, -1.0, 0.0);
    let n = Vector::new(0.0, 7.0, 0.0);

    assert_eq!(v.mirror(&n).unwrap(), Vector::new(1.0, 1.0, 0.0));
    assert!(v.mirror(&Vector::ZERO).is_err());
}

#[test]
fn mirror_twice_is_identity() {
    let v = Vector::new(0.3, -2.0, 1.7);
    let n = Vector::new(1.0, 1.0, -0.5);

    let twice = v.mirror(&n).unwrap().mirror(&n).unwrap();
    assert_eq!(twice, v);
}
