use crate::error::{ TraceError, Result };
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

/// The camera of a scene.
///
/// A looker sits at `position` and looks at the center of a rectangular
/// viewport. The viewport is spanned by `right` and `up`, which are scaled to
/// half the viewport width and height, so that viewport coordinates in
/// [-1, 1] reach exactly to its edges.
///
/// Lookers are immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Looker {
    position: Point,
    view: Vector,
    right: Vector,
    up: Vector,
}

impl Looker {
    /// Builds a looker from the camera position, the viewport center and the
    /// viewport's width and height.
    ///
    /// Fails if the camera sits on the viewport center, if a dimension is not
    /// positive, or if the view direction is vertical (there is no "right"
    /// then).
    pub fn new(position: Point, viewport_center: Point, width: f64,
        height: f64) -> Result<Looker> {
        if position == viewport_center {
            return Err(TraceError::Construction(
                "camera position equals viewport center".to_string()
            ));
        }

        if !(width > 0.0) {
            return Err(TraceError::Construction(format!(
                "viewport width must be positive, got {}", width
            )));
        }

        if !(height > 0.0) {
            return Err(TraceError::Construction(format!(
                "viewport height must be positive, got {}", height
            )));
        }

        let view = position.vector_to(&viewport_center);

        let direction = view.normalize()?;
        if direction == Vector::Y || direction == -Vector::Y {
            return Err(TraceError::Construction(
                "view vector is parallel to the y axis".to_string()
            ));
        }

        // view × Y points right and right × view points up; swapping either
        // order mirrors the image.
        let right = view.cross(&Vector::Y).scale(width / 2.0)?;
        let up = right.cross(&view).scale(height / 2.0)?;

        Ok(Looker { position, view, right, up })
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn view(&self) -> Vector {
        self.view
    }

    pub fn right(&self) -> Vector {
        self.right
    }

    pub fn up(&self) -> Vector {
        self.up
    }

    /// Returns the primary ray through viewport coordinates
    /// `(horizontal, vertical)`, both within [-1, 1].
    pub fn primary_ray(&self, horizontal: f64, vertical: f64) -> Result<Ray> {
        check_viewport_coordinate("horizontal", horizontal)?;
        check_viewport_coordinate("vertical", vertical)?;

        let direction = self.view
            + self.right * horizontal
            + self.up * vertical;

        Ray::new(self.position, direction)
    }
}

/// Fails with a range error unless `value` lies within [-1, 1].
pub fn check_viewport_coordinate(name: &str, value: f64) -> Result<()> {
    if !(value.abs() <= 1.0) {
        return Err(TraceError::Range(format!(
            "{} coordinate must be within -1 and 1, got {}", name, value
        )));
    }

    Ok(())
}

#[test]
fn ray_through_center() {
    let l = Looker::new(Point::new(0.0, 0.0, 5.0), Point::ORIGIN, 2.0, 2.0)
        .unwrap();
    let r = l.primary_ray(0.0, 0.0).unwrap();

    assert_eq!(r.origin(), Point::new(0.0, 0.0, 5.0));
    assert_eq!(r.direction(), Vector::new(0.0, 0.0, -1.0));
}

#[test]
fn basis_follows_right_hand_rule() {
    let l = Looker::new(Point::new(0.0, 0.0, 5.0), Point::ORIGIN, 4.0, 2.0)
        .unwrap();

    assert_eq!(l.right(), Vector::new(2.0, 0.0, 0.0));
    assert_eq!(l.up(), Vector::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_through_corner() {
    let l = Looker::new(Point::new(0.0, 0.0, 1.0), Point::ORIGIN, 2.0, 2.0)
        .unwrap();
    let r = l.primary_ray(1.0, -1.0).unwrap();

    let e = Vector::new(1.0, -1.0, -1.0).normalize().unwrap();
    assert_eq!(r.direction(), e);
}

#[test]
fn coordinates_out_of_viewport() {
    let l = Looker::new(Point::new(0.0, 0.0, 5.0), Point::ORIGIN, 2.0, 2.0)
        .unwrap();

    assert!(matches!(l.primary_ray(1.5, 0.0), Err(TraceError::Range(_))));
    assert!(matches!(l.primary_ray(0.0, -1.01), Err(TraceError::Range(_))));
    assert!(matches!(l.primary_ray(f64::NAN, 0.0), Err(TraceError::Range(_))));
}

#[test]
fn degenerate_lookers_fail() {
    let p = Point::new(1.0, 2.0, 3.0);

    assert!(matches!(Looker::new(p, p, 1.0, 1.0),
        Err(TraceError::Construction(_))));
    assert!(matches!(Looker::new(p, Point::new(1.0, 5.0, 3.0), 1.0, 1.0),
        Err(TraceError::Construction(_))));
    assert!(matches!(Looker::new(p, Point::new(1.0, -5.0, 3.0), 1.0, 1.0),
        Err(TraceError::Construction(_))));
    assert!(matches!(Looker::new(p, Point::ORIGIN, 0.0, 1.0),
        Err(TraceError::Construction(_))));
    assert!(matches!(Looker::new(p, Point::ORIGIN, 1.0, -2.0),
        Err(TraceError::Construction(_))));
}
