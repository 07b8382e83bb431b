use std::cell::Cell;

use crate::consts::REFLEXION_WEIGHT_STOP;
use crate::error::Result;
use crate::ray::Ray;
use crate::surface::Property;
use crate::intersect::Intersection;
use crate::tracer::Raytracer;

/// A once-computed shadow flag.
///
/// The shadow test for a hit is needed by both the diffuse and the specular
/// model, but the shadow ray must only be cast once. The first `get` runs the
/// computation, later calls return the cached value.
#[derive(Debug, Default)]
pub struct ShadowPromise {
    value: Cell<Option<bool>>,
}

impl ShadowPromise {
    pub fn new() -> ShadowPromise {
        Default::default()
    }

    pub fn get<F>(&self, compute: F) -> Result<bool>
        where F: FnOnce() -> Result<bool> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let value = compute()?;
        self.value.set(Some(value));
        Ok(value)
    }
}

/// Everything the light models know about one traced ray.
///
/// Lives for a single hit while `Raytracer::trace_ray` follows a ray; the
/// shadow flag is never shared between rays.
#[derive(Debug)]
pub struct Shading<'a> {
    /// The ray being traced (not necessarily a primary ray).
    pub ray: Ray,

    /// The nearest intersection of `ray` with the scene, if any.
    pub hit: Option<Intersection<'a>>,

    shadowed: ShadowPromise,
}

impl<'a> Shading<'a> {
    pub fn new(ray: Ray, hit: Option<Intersection<'a>>) -> Shading<'a> {
        Shading { ray, hit, shadowed: ShadowPromise::new() }
    }

    /// Whether the hit point lies in shadow, computed on first use.
    pub fn is_shadowed(&self, tracer: &Raytracer) -> Result<bool> {
        self.shadowed.get(|| {
            Ok(LightModel::Shadowed.calculate(tracer, self)? > 0.0)
        })
    }
}

/// The light models that make up a pixel's brightness.
///
/// Each model scores the hit of a ray with a non-negative contribution.
/// `Shadowed` is the odd one out: it yields 1 for "in shadow" and 0 otherwise
/// and is only consulted by `Diffuse` and `SpecularHighlight`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightModel {
    Ambient,
    Shadowed,
    Diffuse,
    SpecularHighlight,
    Reflexion,
}

impl LightModel {
    /// The models that only depend on the hit itself. Together with
    /// `Reflexion` they make up the brightness of a ray.
    pub const LOCAL: [LightModel; 3] = [
        LightModel::Ambient,
        LightModel::Diffuse,
        LightModel::SpecularHighlight,
    ];

    pub fn calculate(&self, tracer: &Raytracer, shading: &Shading)
        -> Result<f64> {
        match self {
            LightModel::Ambient => Ok(ambient(shading)),
            LightModel::Shadowed => shadowed(tracer, shading),
            LightModel::Diffuse => diffuse(tracer, shading),
            LightModel::SpecularHighlight => specular(tracer, shading),
            LightModel::Reflexion => reflexion(tracer, shading),
        }
    }
}

fn ambient(shading: &Shading) -> f64 {
    shading.hit
        .map(|hit| hit.what.surface().get(Property::AmbientRatio))
        .unwrap_or(0.0)
}

fn shadowed(tracer: &Raytracer, shading: &Shading) -> Result<f64> {
    let (hit, light) = match (shading.hit, tracer.scene().light()) {
        (Some(hit), Some(light)) => (hit, light),
        _ => return Ok(0.0),
    };

    #[cfg(test)]
    SHADOW_RAYS.with(|count| count.set(count.get() + 1));

    let to_light = hit.point.vector_to(&light);
    let light_ray = Ray::new(hit.point, to_light)?;

    // Anything behind the light source does not cast a shadow.
    match tracer.scene().find_intersection(&light_ray) {
        Some(blocker) if blocker.distance < to_light.length() => Ok(1.0),
        _ => Ok(0.0),
    }
}

/// Lambertian reflection of the point light.
fn diffuse(tracer: &Raytracer, shading: &Shading) -> Result<f64> {
    let (hit, light) = match (shading.hit, tracer.scene().light()) {
        (Some(hit), Some(light)) => (hit, light),
        _ => return Ok(0.0),
    };

    let ratio = hit.what.surface().get(Property::DiffuseRatio);
    if ratio == 0.0 || shading.is_shadowed(tracer)? {
        return Ok(0.0);
    }

    let normal = hit.what.normal_at(&hit.point).normalize()?;
    let to_light = hit.point.vector_to(&light).normalize()?;

    Ok((ratio * normal.dot(&to_light)).max(0.0))
}

/// Phong highlight: how well the mirrored view ray lines up with the light.
fn specular(tracer: &Raytracer, shading: &Shading) -> Result<f64> {
    let (hit, light) = match (shading.hit, tracer.scene().light()) {
        (Some(hit), Some(light)) => (hit, light),
        _ => return Ok(0.0),
    };

    let surface = hit.what.surface();
    let ratio = surface.get(Property::SpecularRatio);
    if ratio == 0.0 || shading.is_shadowed(tracer)? {
        return Ok(0.0);
    }

    let normal = hit.what.normal_at(&hit.point).normalize()?;
    let mirrored = shading.ray.direction().mirror(&normal)?;
    let to_light = hit.point.vector_to(&light).normalize()?;

    let alignment = mirrored.dot(&to_light);
    if alignment < 0.0 {
        return Ok(0.0);
    }

    Ok(ratio * alignment.powf(surface.get(Property::SpecularExponent)))
}

/// The ray mirrored at the hit, weighted by the reflexion ratio.
///
/// `None` if nothing was hit or the weight drops below
/// `REFLEXION_WEIGHT_STOP`; such a bounce counts as black. That cutoff is
/// what ends a chain of reflexions.
pub fn reflected_ray(shading: &Shading) -> Result<Option<Ray>> {
    let hit = match shading.hit {
        Some(hit) => hit,
        None => return Ok(None),
    };

    let ratio = hit.what.surface().get(Property::ReflexionRatio);
    let weight = shading.ray.weight() * ratio;
    if weight < REFLEXION_WEIGHT_STOP {
        return Ok(None);
    }

    let mirrored = shading.ray.direction().mirror(&hit.what.normal_at(&hit.point))?;
    Ok(Some(Ray::weighted(hit.point, mirrored, weight)?))
}

/// Traces the reflected ray and returns its brightness as is. The ratio only
/// lowers the weight of the mirrored ray.
fn reflexion(tracer: &Raytracer, shading: &Shading) -> Result<f64> {
    match reflected_ray(shading)? {
        Some(ray) => tracer.trace_ray(&ray),
        None => Ok(0.0),
    }
}

#[cfg(test)]
thread_local! {
    static SHADOW_RAYS: Cell<usize> = Cell::new(0);
}

/// Number of shadow rays cast on this thread so far.
#[cfg(test)]
pub(crate) fn shadow_rays_cast() -> usize {
    SHADOW_RAYS.with(|count| count.get())
}

#[cfg(test)]
mod fixtures {
    use crate::tuple::{ Point, Vector };
    use crate::camera::Looker;
    use crate::primitive::Primitive;
    use crate::surface::Property;
    use crate::scene::{ Scene, SceneBuilder };

    pub fn builder() -> SceneBuilder {
        let mut b = SceneBuilder::new();
        b.looker(Looker::new(Point::new(0.0, 0.0, 5.0), Point::ORIGIN,
            2.0, 2.0).unwrap()).unwrap();
        b
    }

    /// A floor at y = 0 and a light right above the origin.
    pub fn floor(properties: &[(Property, f64)], blocked: bool) -> Scene {
        let mut b = builder();
        b.primitive(Primitive::plane(Point::ORIGIN, Vector::Y).unwrap());
        for (p, v) in properties {
            b.property(*p, *v).unwrap();
        }

        if blocked {
            b.primitive(Primitive::sphere(Point::new(0.0, 5.0, 0.0), 1.0)
                .unwrap());
        }

        b.light(Point::new(0.0, 10.0, 0.0)).unwrap();
        b.build().unwrap()
    }
}

#[cfg(test)]
fn shade<'a>(scene: &'a crate::scene::Scene, ray: Ray) -> Shading<'a> {
    Shading::new(ray, scene.find_intersection(&ray))
}

#[cfg(test)]
fn onto_floor() -> Ray {
    use crate::tuple::{ Point, Vector };
    // Hits the floor at the origin at 45 degrees.
    Ray::new(Point::new(0.0, 1.0, 1.0), Vector::new(0.0, -1.0, -1.0)).unwrap()
}

#[test]
fn shadow_promise_computes_once() {
    let promise = ShadowPromise::new();
    let calls = Cell::new(0);

    let compute = || {
        calls.set(calls.get() + 1);
        Ok(true)
    };

    assert!(promise.get(compute).unwrap());
    assert!(promise.get(compute).unwrap());
    assert_eq!(calls.get(), 1);
}

#[test]
fn ambient_of_hit_primitive() {
    let scene = fixtures::floor(&[(Property::AmbientRatio, 0.3)], false);
    let tracer = Raytracer::new(&scene);

    let s = shade(&scene, onto_floor());
    assert_eq!(LightModel::Ambient.calculate(&tracer, &s).unwrap(), 0.3);

    let miss = Ray::new(crate::tuple::Point::new(0.0, 1.0, 0.0),
        crate::tuple::Vector::Y).unwrap();
    let s = shade(&scene, miss);
    assert_eq!(LightModel::Ambient.calculate(&tracer, &s).unwrap(), 0.0);
}

#[test]
fn diffuse_facing_light() {
    let scene = fixtures::floor(&[], false);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    assert!(!s.is_shadowed(&tracer).unwrap());
    let d = LightModel::Diffuse.calculate(&tracer, &s).unwrap();
    assert!(crate::feq(d, 0.95));
}

#[test]
fn diffuse_in_shadow() {
    let scene = fixtures::floor(&[], true);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    assert!(s.is_shadowed(&tracer).unwrap());
    assert_eq!(LightModel::Shadowed.calculate(&tracer, &s).unwrap(), 1.0);
    assert_eq!(LightModel::Diffuse.calculate(&tracer, &s).unwrap(), 0.0);
}

#[test]
fn diffuse_without_ratio() {
    let scene = fixtures::floor(&[(Property::DiffuseRatio, 0.0)], false);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    assert_eq!(LightModel::Diffuse.calculate(&tracer, &s).unwrap(), 0.0);
}

#[test]
fn no_light_no_shadow() {
    use crate::tuple::Point;
    use crate::primitive::Primitive;

    let mut b = fixtures::builder();
    b.primitive(Primitive::plane(Point::ORIGIN, crate::tuple::Vector::Y)
        .unwrap());
    let scene = b.build().unwrap();
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    assert!(!s.is_shadowed(&tracer).unwrap());
    assert_eq!(LightModel::Diffuse.calculate(&tracer, &s).unwrap(), 0.0);
    assert_eq!(LightModel::SpecularHighlight.calculate(&tracer, &s).unwrap(),
        0.0);
}

#[test]
fn blocker_behind_light_casts_no_shadow() {
    use crate::tuple::{ Point, Vector };
    use crate::primitive::Primitive;

    let mut b = fixtures::builder();
    b.primitive(Primitive::plane(Point::ORIGIN, Vector::Y).unwrap());
    b.primitive(Primitive::sphere(Point::new(0.0, 20.0, 0.0), 1.0).unwrap());
    b.light(Point::new(0.0, 10.0, 0.0)).unwrap();
    let scene = b.build().unwrap();
    let tracer = Raytracer::new(&scene);

    let s = shade(&scene, onto_floor());
    assert!(!s.is_shadowed(&tracer).unwrap());
}

#[test]
fn specular_highlight() {
    let scene = fixtures::floor(&[
        (Property::SpecularRatio, 0.5),
        (Property::SpecularExponent, 2.0),
    ], false);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    // mirrored · light = cos 45°, squared = 0.5
    let h = LightModel::SpecularHighlight.calculate(&tracer, &s).unwrap();
    approx::assert_abs_diff_eq!(h, 0.25, epsilon = 1e-12);
}

#[test]
fn specular_off_by_default() {
    let scene = fixtures::floor(&[], false);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    assert_eq!(LightModel::SpecularHighlight.calculate(&tracer, &s).unwrap(),
        0.0);
}

/// A mirroring floor reflecting `onto_floor` into an ambient-only sphere.
#[cfg(test)]
fn floor_mirroring_sphere(ratio: f64) -> crate::scene::Scene {
    use crate::tuple::{ Point, Vector };
    use crate::primitive::Primitive;

    let mut b = fixtures::builder();
    b.primitive(Primitive::plane(Point::ORIGIN, Vector::Y).unwrap());
    b.property(Property::ReflexionRatio, ratio).unwrap();
    b.primitive(Primitive::sphere(Point::new(0.0, 5.0, -5.0), 1.0).unwrap());
    b.property(Property::AmbientRatio, 0.6).unwrap();
    b.build().unwrap()
}

#[test]
fn reflexion_returns_mirrored_brightness() {
    let scene = floor_mirroring_sphere(0.5);
    let tracer = Raytracer::new(&scene);

    // The mirrored ray hits the sphere, which is lit by ambient light only.
    // Its brightness comes back without the 0.5 ratio applied.
    let s = shade(&scene, onto_floor());
    let r = LightModel::Reflexion.calculate(&tracer, &s).unwrap();
    assert!(crate::feq(r, 0.6));
}

#[test]
fn reflexion_below_cutoff_is_black() {
    let scene = fixtures::floor(&[(Property::ReflexionRatio, 0.003)], false);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    assert_eq!(LightModel::Reflexion.calculate(&tracer, &s).unwrap(), 0.0);
}

#[test]
fn reflexion_at_cutoff_is_traced() {
    let scene = floor_mirroring_sphere(REFLEXION_WEIGHT_STOP);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    let reflected = reflected_ray(&s).unwrap().unwrap();
    assert_eq!(reflected.weight(), REFLEXION_WEIGHT_STOP);
    let r = LightModel::Reflexion.calculate(&tracer, &s).unwrap();
    assert!(crate::feq(r, 0.6));

    let scene = floor_mirroring_sphere(REFLEXION_WEIGHT_STOP * 0.99);
    let tracer = Raytracer::new(&scene);
    let s = shade(&scene, onto_floor());

    assert!(reflected_ray(&s).unwrap().is_none());
    assert_eq!(LightModel::Reflexion.calculate(&tracer, &s).unwrap(), 0.0);
}

#[test]
fn reflexion_between_parallel_mirrors_terminates() {
    use crate::tuple::{ Point, Vector };
    use crate::primitive::Primitive;

    let mut b = fixtures::builder();
    b.primitive(Primitive::plane(Point::ORIGIN, Vector::Y).unwrap());
    b.property(Property::ReflexionRatio, 0.5).unwrap();
    b.primitive(Primitive::plane(Point::new(0.0, 10.0, 0.0), -Vector::Y)
        .unwrap());
    b.property(Property::ReflexionRatio, 0.5).unwrap();
    let scene = b.build().unwrap();
    let tracer = Raytracer::new(&scene);

    let ray = Ray::new(Point::new(0.0, 5.0, 0.0), -Vector::Y).unwrap();
    let brightness = tracer.trace_ray(&ray).unwrap();
    assert!(brightness > 0.0 && brightness <= 1.0);
}
