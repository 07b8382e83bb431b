use std::convert::TryFrom;

use log::debug;
use serde::{ Serialize, Deserialize };

use crate::error::{ TraceError, Result };
use crate::tuple::{ Point, Vector };
use crate::ray::Ray;
use crate::camera::Looker;
use crate::primitive::Primitive;
use crate::surface::Property;
use crate::intersect::{ Intersection, Intersections };

/// A scene with primitives, an optional point light and a looker.
///
/// Scenes are assembled with a `SceneBuilder` and are read-only afterwards,
/// so they can be shared between render threads by reference.
#[derive(Clone, Debug)]
pub struct Scene {
    primitives: Vec<Primitive>,
    light: Option<Point>,
    looker: Looker,
}

impl Scene {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn light(&self) -> Option<Point> {
        self.light
    }

    pub fn looker(&self) -> &Looker {
        &self.looker
    }

    /// Intersects a ray against all primitives and returns the nearest hit.
    ///
    /// Every primitive is tested; there is no spatial acceleration.
    pub fn find_intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let mut intersections = Intersections::new();
        for primitive in self.primitives.iter() {
            let mut is = primitive.intersect(ray);
            intersections.append(&mut is);
        }

        intersections.hit()
    }

    /// Parses a scene from its JSON description.
    pub fn from_json(json: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        Scene::try_from(scene_json)
    }
}

/// Assembles a `Scene` step by step.
///
/// Surface properties always go to the most recently added primitive, and
/// only as long as no looker or light was set since that primitive.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    primitives: Vec<Primitive>,
    light: Option<Point>,
    looker: Option<Looker>,
    property_allowed: bool,
}

impl SceneBuilder {
    pub fn new() -> SceneBuilder {
        Default::default()
    }

    pub fn has_looker(&self) -> bool {
        self.looker.is_some()
    }

    pub fn has_light(&self) -> bool {
        self.light.is_some()
    }

    /// Whether `set_property` would currently be accepted.
    pub fn property_allowed(&self) -> bool {
        self.property_allowed
    }

    pub fn looker(&mut self, looker: Looker) -> Result<&mut SceneBuilder> {
        if self.looker.is_some() {
            return Err(TraceError::State("second looker defined".to_string()));
        }

        debug!("Looker at {:?}", looker.position());
        self.looker = Some(looker);
        self.property_allowed = false;
        Ok(self)
    }

    pub fn light(&mut self, light: Point) -> Result<&mut SceneBuilder> {
        if self.light.is_some() {
            return Err(TraceError::State("second light defined".to_string()));
        }

        debug!("Light at {:?}", light);
        self.light = Some(light);
        self.property_allowed = false;
        Ok(self)
    }

    pub fn primitive(&mut self, primitive: Primitive) -> &mut SceneBuilder {
        debug!("Primitive #{}: {:?}", self.primitives.len(), primitive.ty);
        self.primitives.push(primitive);
        self.property_allowed = true;
        self
    }

    /// Sets a surface property on the most recently added primitive.
    pub fn property(&mut self, property: Property, value: f64)
        -> Result<&mut SceneBuilder> {
        if !self.property_allowed {
            return Err(TraceError::State(format!(
                "{:?} is not allowed here", property
            )));
        }

        // `property_allowed` implies at least one primitive.
        if let Some(last) = self.primitives.last_mut() {
            last.surface_mut().set(property, value)?;
        }

        Ok(self)
    }

    /// Finishes the scene. A scene without a looker cannot be built.
    pub fn build(self) -> Result<Scene> {
        let looker = self.looker.ok_or_else(|| TraceError::Construction(
            "scene has no looker".to_string()
        ))?;

        Ok(Scene {
            primitives: self.primitives,
            light: self.light,
            looker,
        })
    }
}

/* JSON scene description */

#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    looker: LookerJson,
    #[serde(default)]
    light: Option<[f64; 3]>,
    #[serde(default)]
    primitives: Vec<PrimitiveJson>,
}

#[derive(Clone, Serialize, Deserialize)]
struct LookerJson {
    camera: [f64; 3],
    center: [f64; 3],
    width: f64,
    height: f64,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PrimitiveJson {
    Sphere {
        center: [f64; 3],
        radius: f64,
        #[serde(default)]
        surface: SurfaceJson,
    },
    Plane {
        point: [f64; 3],
        normal: [f64; 3],
        #[serde(default)]
        surface: SurfaceJson,
    },
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SurfaceJson {
    ambient: Option<f64>,
    diffuse: Option<f64>,
    specular: Option<f64>,
    exponent: Option<f64>,
    reflexion: Option<f64>,
}

impl SurfaceJson {
    fn properties(&self) -> Vec<(Property, f64)> {
        let slots = [
            (Property::AmbientRatio, self.ambient),
            (Property::DiffuseRatio, self.diffuse),
            (Property::SpecularRatio, self.specular),
            (Property::SpecularExponent, self.exponent),
            (Property::ReflexionRatio, self.reflexion),
        ];

        slots.iter()
            .filter_map(|(p, v)| v.map(|v| (*p, v)))
            .collect()
    }
}

fn point(c: [f64; 3]) -> Point {
    Point::new(c[0], c[1], c[2])
}

impl TryFrom<SceneJson> for Scene {
    type Error = TraceError;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        let mut builder = SceneBuilder::new();

        for primitive_json in scene_json.primitives {
            let (primitive, surface) = match primitive_json {
                PrimitiveJson::Sphere { center, radius, surface } => (
                    Primitive::sphere(point(center), radius)?,
                    surface,
                ),
                PrimitiveJson::Plane { point: p, normal, surface } => (
                    Primitive::plane(point(p),
                        Vector::new(normal[0], normal[1], normal[2]))?,
                    surface,
                ),
            };

            builder.primitive(primitive);
            for (property, value) in surface.properties() {
                builder.property(property, value)?;
            }
        }

        let l = scene_json.looker;
        builder.looker(Looker::new(point(l.camera), point(l.center),
            l.width, l.height)?)?;

        if let Some(light) = scene_json.light {
            builder.light(point(light))?;
        }

        builder.build()
    }
}

#[cfg(test)]
fn two_spheres() -> Scene {
    let mut b = SceneBuilder::new();
    b.looker(Looker::new(Point::new(0.0, 0.0, 5.0), Point::ORIGIN, 2.0, 2.0)
        .unwrap()).unwrap();
    b.primitive(Primitive::sphere(Point::new(0.0, 0.0, -5.0), 1.0).unwrap());
    b.primitive(Primitive::sphere(Point::new(0.0, 0.0, -10.0), 2.0).unwrap());
    b.build().unwrap()
}

#[test]
fn find_nearest_intersection() {
    let s = two_spheres();
    let r = Ray::new(Point::ORIGIN, Vector::new(0.0, 0.0, -1.0)).unwrap();

    let i = s.find_intersection(&r).unwrap();
    assert!(crate::feq(i.distance, 4.0));
    assert!(std::ptr::eq(i.what, &s.primitives()[0]));
}

#[test]
fn find_intersection_from_surface() {
    let s = two_spheres();
    // Starts on the near sphere's far side, pointing away from it.
    let r = Ray::new(Point::new(0.0, 0.0, -6.0),
        Vector::new(0.0, 0.0, -1.0)).unwrap();

    let i = s.find_intersection(&r).unwrap();
    assert!(crate::feq(i.distance, 2.0));
    assert!(std::ptr::eq(i.what, &s.primitives()[1]));
}

#[test]
fn find_no_intersection() {
    let s = two_spheres();
    let r = Ray::new(Point::ORIGIN, Vector::Y).unwrap();

    assert!(s.find_intersection(&r).is_none());
}

#[test]
fn scene_without_looker_fails() {
    let mut b = SceneBuilder::new();
    b.primitive(Primitive::sphere(Point::ORIGIN, 1.0).unwrap());

    assert!(matches!(b.build(), Err(TraceError::Construction(_))));
}

#[test]
fn properties_go_to_last_primitive() {
    let mut b = SceneBuilder::new();
    b.looker(Looker::new(Point::new(0.0, 0.0, 5.0), Point::ORIGIN, 2.0, 2.0)
        .unwrap()).unwrap();
    assert!(matches!(b.property(Property::AmbientRatio, 1.0),
        Err(TraceError::State(_))));

    b.primitive(Primitive::sphere(Point::ORIGIN, 1.0).unwrap());
    b.primitive(Primitive::sphere(Point::ORIGIN, 2.0).unwrap());
    b.property(Property::AmbientRatio, 1.0).unwrap();

    b.light(Point::new(5.0, 5.0, 5.0)).unwrap();
    assert!(matches!(b.property(Property::DiffuseRatio, 1.0),
        Err(TraceError::State(_))));

    let s = b.build().unwrap();
    assert_eq!(s.primitives()[0].surface().get(Property::AmbientRatio), 0.05);
    assert_eq!(s.primitives()[1].surface().get(Property::AmbientRatio), 1.0);
    assert_eq!(s.light(), Some(Point::new(5.0, 5.0, 5.0)));
}

#[test]
fn second_looker_or_light_fails() {
    let looker = Looker::new(Point::new(0.0, 0.0, 5.0), Point::ORIGIN,
        2.0, 2.0).unwrap();

    let mut b = SceneBuilder::new();
    b.looker(looker.clone()).unwrap();
    assert!(b.looker(looker).is_err());

    b.light(Point::ORIGIN).unwrap();
    assert!(b.light(Point::ORIGIN).is_err());
}

#[test]
fn scene_from_json() {
    let json = r#"{
        "looker": { "camera": [0, 0, 5], "center": [0, 0, 0],
                    "width": 2, "height": 2 },
        "light": [5, 5, 5],
        "primitives": [
            { "type": "sphere", "center": [0, 0, -5], "radius": 1,
              "surface": { "ambient": 1, "specular": 0.5, "exponent": 20 } },
            { "type": "plane", "point": [0, -1, 0], "normal": [0, 2, 0] }
        ]
    }"#;

    let s = Scene::from_json(json).unwrap();
    assert_eq!(s.primitives().len(), 2);
    assert_eq!(s.light(), Some(Point::new(5.0, 5.0, 5.0)));

    let surface = s.primitives()[0].surface();
    assert_eq!(surface.get(Property::AmbientRatio), 1.0);
    assert_eq!(surface.get(Property::SpecularRatio), 0.5);
    assert_eq!(surface.get(Property::SpecularExponent), 20.0);
    assert_eq!(surface.get(Property::DiffuseRatio), 0.95);

    assert_eq!(s.primitives()[1].normal_at(&Point::ORIGIN), Vector::Y);
}

#[test]
fn invalid_json_scenes_fail() {
    assert!(matches!(Scene::from_json("{}"), Err(TraceError::Json(_))));

    let bad_radius = r#"{
        "looker": { "camera": [0, 0, 5], "center": [0, 0, 0],
                    "width": 2, "height": 2 },
        "primitives": [ { "type": "sphere", "center": [0, 0, 0], "radius": 0 } ]
    }"#;
    assert!(matches!(Scene::from_json(bad_radius),
        Err(TraceError::Construction(_))));
}
