use crate::feq;
use crate::consts::MINIMUM_DISTANCE;
use crate::tuple::Point;
use crate::primitive::Primitive;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. `distance`
/// is the offset from the ray origin and is always positive; primitives never
/// report intersections behind a ray.
///
/// `entering` is set if the ray passes from outside to inside the primitive's
/// volume at this point.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub point: Point,
    pub what: &'a Primitive,
    pub distance: f64,
    pub entering: bool,
}

/// Implements partial equality on an Intersection.
///
/// Two intersections are equal if their distances are equal within epsilon,
/// their points and entering flags match, and they refer to the *same*
/// primitive (pointer equality).
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        feq(self.distance, other.distance)
            && self.entering == other.entering
            && self.point == other.point
            && std::ptr::eq(self.what, other.what)
    }
}

impl<'a> Intersection<'a> {
    pub fn new(point: Point, what: &'a Primitive, distance: f64,
        entering: bool) -> Intersection<'a> {
        debug_assert!(distance > 0.0);
        Intersection { point, what, distance, entering }
    }
}

/// A collection of intersections.
///
/// Mostly a wrapper for a vector of `Intersection` objects, ordered by
/// ascending distance once `sort` has been called.
#[derive(Clone, Debug, Default)]
pub struct Intersections<'a> {
    pub intersections: Vec<Intersection<'a>>,
}

impl<'a> Intersections<'a> {
    /// Creates a new list of intersections.
    pub fn new() -> Intersections<'a> {
        Intersections { intersections: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Moves all intersections of `other` into this collection.
    pub fn append(&mut self, other: &mut Intersections<'a>) {
        self.intersections.append(&mut other.intersections);
    }

    /// Sorts the intersections by distance, ignoring `f64` semantics.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b|
            a.distance.partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        );
    }

    /// Returns the nearest intersection that is further away than
    /// `MINIMUM_DISTANCE`.
    ///
    /// Closer intersections are treated as the ray touching the surface it
    /// just left. If none remain, this function returns `None`.
    pub fn hit(&mut self) -> Option<Intersection<'a>> {
        self.sort();
        self.intersections.iter()
            .find(|i| i.distance > MINIMUM_DISTANCE)
            .copied()
    }
}

#[test]
fn hit_picks_nearest() {
    let s = Primitive::sphere(Point::ORIGIN, 1.0).unwrap();
    let mut is = Intersections {
        intersections: vec![
            Intersection::new(Point::ORIGIN, &s, 5.0, false),
            Intersection::new(Point::ORIGIN, &s, 2.0, true),
            Intersection::new(Point::ORIGIN, &s, 3.0, false),
        ]
    };

    assert_eq!(is.hit().unwrap().distance, 2.0);
    let distances: Vec<f64> = is.intersections.iter()
        .map(|i| i.distance).collect();
    assert_eq!(distances, vec![2.0, 3.0, 5.0]);
}

#[test]
fn hit_skips_self_intersections() {
    let s = Primitive::sphere(Point::ORIGIN, 1.0).unwrap();
    let mut is = Intersections {
        intersections: vec![
            Intersection::new(Point::ORIGIN, &s, 1e-11, true),
            Intersection::new(Point::ORIGIN, &s, 4.0, false),
        ]
    };

    assert_eq!(is.hit().unwrap().distance, 4.0);
}

#[test]
fn hit_on_empty() {
    assert!(Intersections::new().hit().is_none());
}

#[test]
fn equality_is_by_primitive_identity() {
    let s1 = Primitive::sphere(Point::ORIGIN, 1.0).unwrap();
    let s2 = Primitive::sphere(Point::ORIGIN, 1.0).unwrap();
    let p = Point::new(0.0, 0.0, 1.0);

    let a = Intersection::new(p, &s1, 4.0, true);
    let b = Intersection::new(p, &s1, 4.0 + 1e-13, true);
    let c = Intersection::new(p, &s2, 4.0, true);
    let d = Intersection::new(p, &s1, 4.0, false);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
}
