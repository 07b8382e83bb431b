use crate::consts::DEFAULT_RAY_WEIGHT;
use crate::error::{ TraceError, Result };
use crate::tuple::{ Point, Vector };

/// A ray with an origin, a unit direction and a weight.
///
/// The weight is the remaining share of light the ray can still carry. It
/// starts at 1 for primary rays and shrinks with every reflective bounce.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Point,
    direction: Vector,
    weight: f64,
}

impl Ray {
    /// Creates a primary ray (weight 1). The direction gets normalized.
    pub fn new(origin: Point, direction: Vector) -> Result<Ray> {
        Ray::weighted(origin, direction, DEFAULT_RAY_WEIGHT)
    }

    /// Creates a ray with an explicit weight in (0, 1].
    pub fn weighted(origin: Point, direction: Vector, weight: f64)
        -> Result<Ray> {
        if direction == Vector::ZERO {
            return Err(TraceError::Construction(
                "ray direction is the zero vector".to_string()
            ));
        }

        if !(weight > 0.0 && weight <= 1.0) {
            return Err(TraceError::Range(format!(
                "ray weight must be within (0, 1], got {}", weight
            )));
        }

        Ok(Ray { origin, direction: direction.normalize()?, weight })
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The point `distance` units along the ray.
    pub fn position(&self, distance: f64) -> Point {
        self.origin + self.direction * distance
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Point::new(2.0, 3.0, 4.0),
                Vector::new(1.0, 0.0, 0.0)
            ).unwrap();

    assert_eq!(r.position(0.0), Point::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Point::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Point::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Point::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray::new(Point::ORIGIN, Vector::new(0.0, 0.0, -5.0)).unwrap();

    assert_eq!(r.direction(), Vector::new(0.0, 0.0, -1.0));
    assert_eq!(r.weight(), 1.0);
    assert_eq!(r.position(2.0), Point::new(0.0, 0.0, -2.0));
}

#[test]
fn ray_keeps_weight() {
    let r = Ray::weighted(Point::ORIGIN, Vector::X, 0.25).unwrap();

    assert_eq!(r.weight(), 0.25);
}

#[test]
fn zero_direction_fails() {
    let r = Ray::new(Point::ORIGIN, Vector::ZERO);

    assert!(matches!(r, Err(TraceError::Construction(_))));
}

#[test]
fn weight_out_of_range_fails() {
    for weight in &[0.0, -0.5, 1.5, f64::NAN] {
        let r = Ray::weighted(Point::ORIGIN, Vector::X, *weight);
        assert!(matches!(r, Err(TraceError::Range(_))), "weight {}", weight);
    }

    assert!(Ray::weighted(Point::ORIGIN, Vector::X, 1.0).is_ok());
}
