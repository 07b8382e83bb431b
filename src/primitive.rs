use crate::feq;
use crate::error::{ TraceError, Result };
use crate::tuple::{ Point, Vector };
use crate::ray::Ray;
use crate::surface::Surface;
use crate::intersect::{ Intersection, Intersections };

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveType {
    /// A sphere around `center`.
    Sphere { center: Point, radius: f64 },

    /// An infinite plane through `point` with a unit `normal`.
    ///
    /// `origin_distance` is the signed distance `-(point · normal)` of the
    /// plane from the world origin, computed once on construction.
    Plane { point: Point, normal: Vector, origin_distance: f64 },
}

/// A primitive of the scene: its geometry plus a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub ty: PrimitiveType,
    surface: Surface,
}

impl Primitive {
    /// Creates a sphere. The radius has to be positive.
    pub fn sphere(center: Point, radius: f64) -> Result<Primitive> {
        if !(radius > 0.0) {
            return Err(TraceError::Construction(format!(
                "sphere radius must be positive, got {}", radius
            )));
        }

        Ok(Primitive {
            ty: PrimitiveType::Sphere { center, radius },
            surface: Surface::new(),
        })
    }

    /// Creates a plane through `point`. The normal gets normalized and must
    /// not be the zero vector.
    pub fn plane(point: Point, normal: Vector) -> Result<Primitive> {
        if normal == Vector::ZERO {
            return Err(TraceError::Construction(
                "plane normal is the zero vector".to_string()
            ));
        }

        let normal = normal.normalize()?;
        let origin_distance = -Point::ORIGIN.vector_to(&point).dot(&normal);

        Ok(Primitive {
            ty: PrimitiveType::Plane { point, normal, origin_distance },
            surface: Surface::new(),
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Intersects a ray with this primitive.
    ///
    /// Only intersections in front of the ray origin are returned, nearest
    /// first.
    pub fn intersect(&self, ray: &Ray) -> Intersections<'_> {
        match self.ty {
            PrimitiveType::Sphere { center, radius }
                => self.intersect_sphere(ray, center, radius),
            PrimitiveType::Plane { normal, origin_distance, .. }
                => self.intersect_plane(ray, normal, origin_distance),
        }
    }

    /// The (not necessarily normalized) surface normal at `at`.
    ///
    /// For a sphere this points from the center to `at`; a plane has the
    /// same normal everywhere.
    pub fn normal_at(&self, at: &Point) -> Vector {
        match self.ty {
            PrimitiveType::Sphere { center, .. } => center.vector_to(at),
            PrimitiveType::Plane { normal, .. } => normal,
        }
    }

    /// Solves `t² + b·t + c = 0` for the ray parameter `t`.
    ///
    /// The ray direction has unit length, so the quadratic coefficient is 1.
    /// The larger root is checked first: if it lies behind the origin, so
    /// does the smaller one.
    fn intersect_sphere(&self, ray: &Ray, center: Point, radius: f64)
        -> Intersections<'_> {
        let delta = center.vector_to(&ray.origin());

        let b = 2.0 * delta.dot(&ray.direction());
        let c = delta.dot(&delta) - radius * radius;

        let discriminant = b * b - 4.0 * c;
        if discriminant < 0.0 {
            return Intersections::new();
        }

        let root = discriminant.sqrt();

        let far = (-b + root) * 0.5;
        if far <= 0.0 {
            return Intersections::new();
        }

        // Either the far side or the ray starts inside: never entering.
        let mut intersections = vec![
            Intersection::new(ray.position(far), self, far, false)
        ];

        // Tangent
        if root == 0.0 {
            return Intersections { intersections };
        }

        let near = (-b - root) * 0.5;
        if near > 0.0 {
            intersections.insert(0,
                Intersection::new(ray.position(near), self, near, true));
        }

        Intersections { intersections }
    }

    fn intersect_plane(&self, ray: &Ray, normal: Vector, origin_distance: f64)
        -> Intersections<'_> {
        let denominator = normal.dot(&ray.direction());

        // Parallel to the plane
        if feq(denominator, 0.0) {
            return Intersections::new();
        }

        let origin = Point::ORIGIN.vector_to(&ray.origin());
        let t = -(normal.dot(&origin) + origin_distance) / denominator;

        if t > 0.0 {
            Intersections {
                intersections: vec![
                    Intersection::new(ray.position(t), self, t, true)
                ]
            }
        } else {
            Intersections::new()
        }
    }
}

#[test]
fn ray_through_sphere_center() {
    let s = Primitive::sphere(Point::new(0.0, 0.0, -10.0), 2.0).unwrap();
    let r = Ray::new(Point::ORIGIN, Vector::new(0.0, 0.0, -1.0)).unwrap();

    let is = s.intersect(&r);
    assert_eq!(is.len(), 2);
    assert!(feq(is.intersections[0].distance, 8.0));
    assert!(feq(is.intersections[1].distance, 12.0));
    assert!(is.intersections[0].entering);
    assert!(!is.intersections[1].entering);
    assert_eq!(is.intersections[0].point, Point::new(0.0, 0.0, -8.0));
}

#[test]
fn ray_from_inside_sphere() {
    let s = Primitive::sphere(Point::ORIGIN, 1.0).unwrap();
    let r = Ray::new(Point::ORIGIN, Vector::new(0.0, 0.0, 1.0)).unwrap();

    let is = s.intersect(&r);
    assert_eq!(is.len(), 1);
    assert!(feq(is.intersections[0].distance, 1.0));
    assert!(!is.intersections[0].entering);
}

#[test]
fn sphere_behind_ray() {
    let s = Primitive::sphere(Point::new(0.0, 0.0, 5.0), 1.0).unwrap();
    let r = Ray::new(Point::ORIGIN, Vector::new(0.0, 0.0, -1.0)).unwrap();

    assert!(s.intersect(&r).is_empty());
}

#[test]
fn ray_misses_sphere() {
    let s = Primitive::sphere(Point::ORIGIN, 1.0).unwrap();
    let r = Ray::new(Point::new(0.0, 2.0, -5.0), Vector::Z).unwrap();

    assert!(s.intersect(&r).is_empty());
}

#[test]
fn ray_tangent_to_sphere() {
    let s = Primitive::sphere(Point::ORIGIN, 1.0).unwrap();
    let r = Ray::new(Point::new(0.0, 1.0, -5.0), Vector::Z).unwrap();

    let is = s.intersect(&r);
    assert_eq!(is.len(), 1);
    assert!(feq(is.intersections[0].distance, 5.0));
}

#[test]
fn sphere_intersections_are_ascending_and_positive() {
    let s = Primitive::sphere(Point::new(1.0, -2.0, 3.0), 2.5).unwrap();
    let origins = [
        Point::ORIGIN,
        Point::new(1.0, -2.0, 3.0),
        Point::new(10.0, 10.0, 10.0),
        Point::new(-4.0, 0.5, 2.0),
    ];
    let directions = [
        Vector::X, Vector::Y, Vector::Z, -Vector::X,
        Vector::new(1.0, -2.0, 3.0), Vector::new(-1.0, -1.0, -1.0),
    ];

    for o in origins.iter() {
        for d in directions.iter() {
            let r = Ray::new(*o, *d).unwrap();
            let is = s.intersect(&r);
            assert!(is.len() <= 2);
            for i in is.intersections.iter() {
                assert!(i.distance > 0.0);
            }
            if is.len() == 2 {
                assert!(is.intersections[0].distance
                    < is.intersections[1].distance);
            }
        }
    }
}

#[test]
fn non_positive_radius_fails() {
    assert!(matches!(Primitive::sphere(Point::ORIGIN, 0.0),
        Err(TraceError::Construction(_))));
    assert!(matches!(Primitive::sphere(Point::ORIGIN, -1.0),
        Err(TraceError::Construction(_))));
}

#[test]
fn sphere_normal_points_outward() {
    let s = Primitive::sphere(Point::new(1.0, 1.0, 1.0), 1.0).unwrap();

    assert_eq!(s.normal_at(&Point::new(1.0, 2.0, 1.0)), Vector::Y);
}

#[test]
fn ray_hits_plane() {
    let p = Primitive::plane(Point::new(0.0, -1.0, 0.0),
        Vector::new(0.0, 3.0, 0.0)).unwrap();
    let r = Ray::new(Point::new(0.0, 1.0, 0.0),
        Vector::new(0.0, -1.0, 0.0)).unwrap();

    let is = p.intersect(&r);
    assert_eq!(is.len(), 1);
    assert!(feq(is.intersections[0].distance, 2.0));
    assert!(is.intersections[0].entering);
    assert_eq!(is.intersections[0].point, Point::new(0.0, -1.0, 0.0));
    assert_eq!(p.normal_at(&Point::ORIGIN), Vector::Y);
}

#[test]
fn ray_parallel_to_plane() {
    let p = Primitive::plane(Point::ORIGIN, Vector::Y).unwrap();
    let r = Ray::new(Point::new(0.0, 1.0, 0.0), Vector::X).unwrap();

    assert!(p.intersect(&r).is_empty());
}

#[test]
fn plane_behind_ray() {
    let p = Primitive::plane(Point::ORIGIN, Vector::Y).unwrap();
    let r = Ray::new(Point::new(0.0, 1.0, 0.0), Vector::Y).unwrap();

    assert!(p.intersect(&r).is_empty());
}

#[test]
fn zero_plane_normal_fails() {
    assert!(matches!(Primitive::plane(Point::ORIGIN, Vector::ZERO),
        Err(TraceError::Construction(_))));
}
