use log::debug;

use crate::consts::MAX_REFLEXION_DEPTH;
use crate::error::Result;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::camera::check_viewport_coordinate;
use crate::light::{ LightModel, Shading, reflected_ray };

/// Computes the brightness seen along rays through a scene.
///
/// A raytracer only borrows its scene, so any number of threads can share
/// one raytracer while rendering.
#[derive(Copy, Clone, Debug)]
pub struct Raytracer<'s> {
    scene: &'s Scene,
}

impl<'s> Raytracer<'s> {
    pub fn new(scene: &'s Scene) -> Raytracer<'s> {
        Raytracer { scene }
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    /// Brightness of the viewport at `(horizontal, vertical)`, both within
    /// [-1, 1].
    pub fn trace_primary(&self, horizontal: f64, vertical: f64) -> Result<f64> {
        check_viewport_coordinate("horizontal", horizontal)?;
        check_viewport_coordinate("vertical", vertical)?;

        let ray = self.scene.looker().primary_ray(horizontal, vertical)?;
        self.trace_ray(&ray)
    }

    /// Brightness in [0, 1] seen along `ray`.
    ///
    /// Every hit contributes the sum of the local light models plus the
    /// brightness of its reflected ray, clamped to 1. The chain of reflected
    /// rays is followed in a loop and summed up from its far end, so deep
    /// chains between mirrors do not grow the stack.
    pub fn trace_ray(&self, ray: &Ray) -> Result<f64> {
        let mut local = Vec::new();
        let mut next = Some(*ray);

        while let Some(ray) = next {
            let shading = Shading::new(ray, self.scene.find_intersection(&ray));

            let mut brightness = 0.0;
            for model in LightModel::LOCAL.iter() {
                brightness += model.calculate(self, &shading)?;
            }

            // Light models never contribute negative brightness.
            debug_assert!(brightness >= 0.0);
            local.push(brightness);

            next = reflected_ray(&shading)?;
            if next.is_some() && local.len() == MAX_REFLEXION_DEPTH {
                debug!("Reflexion chain cut after {} bounces", local.len());
                next = None;
            }
        }

        // A reflected ray's brightness is added as is, without its weight.
        Ok(local.iter().rev()
            .fold(0.0, |reflected, brightness| (brightness + reflected).min(1.0)))
    }
}

#[cfg(test)]
fn ambient_sphere() -> Scene {
    crate::script::parse("\
        looker [0 0 5] [0 0 0] 2 2
        sphere [0 0 -5] 1
        ambient 1
        diffuse 0
    ").unwrap()
}

#[test]
fn trace_hit_and_miss() {
    let scene = ambient_sphere();
    let tracer = Raytracer::new(&scene);

    assert_eq!(tracer.trace_primary(0.0, 0.0).unwrap(), 1.0);
    assert_eq!(tracer.trace_primary(1.0, 1.0).unwrap(), 0.0);
}

#[test]
fn trace_primary_checks_coordinates() {
    use crate::error::TraceError;

    let scene = ambient_sphere();
    let tracer = Raytracer::new(&scene);

    assert!(matches!(tracer.trace_primary(1.1, 0.0), Err(TraceError::Range(_))));
    assert!(matches!(tracer.trace_primary(0.0, -2.0), Err(TraceError::Range(_))));
}

#[test]
fn brightness_is_clamped() {
    let scene = crate::script::parse("\
        looker [0 0 5] [0 0 0] 2 2
        light [0 0 5]
        sphere [0 0 -5] 1
        ambient 1
        specular 1 1
    ").unwrap();
    let tracer = Raytracer::new(&scene);

    // ambient 1 + diffuse 0.95 + specular 1 would exceed 1.
    assert_eq!(tracer.trace_primary(0.0, 0.0).unwrap(), 1.0);
}

#[test]
fn sum_of_models_below_one() {
    let scene = crate::script::parse("\
        looker [0 0 5] [0 0 0] 2 2
        light [0 0 5]
        sphere [0 0 -5] 1
        ambient 0.1
        diffuse 0.5
    ").unwrap();
    let tracer = Raytracer::new(&scene);

    // The light sits on the camera, so the center pixel sees the full
    // diffuse ratio.
    let b = tracer.trace_primary(0.0, 0.0).unwrap();
    approx::assert_abs_diff_eq!(b, 0.6, epsilon = 1e-12);
}

#[test]
fn one_shadow_ray_for_diffuse_and_specular() {
    use crate::light::shadow_rays_cast;

    let scene_with = |diffuse: f64, specular: f64| crate::script::parse(&format!("
        looker [0 0 5] [0 0 0] 2 2
        light [0 0 5]
        sphere [0 0 -5] 1
        ambient 0.1
        diffuse {}
        specular {} 1
    ", diffuse, specular)).unwrap();

    let both = scene_with(0.5, 0.3);
    let before = shadow_rays_cast();
    let b = Raytracer::new(&both).trace_primary(0.0, 0.0).unwrap();
    assert_eq!(shadow_rays_cast() - before, 1);

    let diffuse = Raytracer::new(&scene_with(0.5, 0.0))
        .trace_primary(0.0, 0.0).unwrap();
    let specular = Raytracer::new(&scene_with(0.0, 0.3))
        .trace_primary(0.0, 0.0).unwrap();

    // Both models see the same unshadowed hit; ambient is counted once.
    approx::assert_abs_diff_eq!(b, 0.9, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(b, diffuse + specular - 0.1, epsilon = 1e-12);
}

#[cfg(test)]
fn mirrors(ratio: f64) -> Scene {
    crate::script::parse(&format!("
        looker [0 0 5] [0 0 0] 2 2
        plane [0 -1 0] <0 1 0>
        reflexion {}
        plane [0 1 0] <0 -1 0>
        reflexion {}
    ", ratio, ratio)).unwrap()
}

#[test]
fn long_reflexion_chain_between_mirrors() {
    let scene = mirrors(0.999);
    let tracer = Raytracer::new(&scene);

    // About 5500 bounces before the weight drops below the stop; each one
    // adds the default ambient ratio.
    assert_eq!(tracer.trace_primary(0.0, 0.5).unwrap(), 1.0);
}

#[test]
fn reflexion_chain_is_cut() {
    let scene = mirrors(1.0);
    let tracer = Raytracer::new(&scene);

    assert_eq!(tracer.trace_primary(0.3, -0.5).unwrap(), 1.0);
}

#[test]
fn chain_sums_from_far_end() {
    // Floor at 0.2 ambient mirroring into a sphere at 0.3 ambient, which is
    // itself not reflective: 0.2 + 0.3.
    let scene = crate::script::parse("
        looker [0 1 1] [0 0 0] 2 2
        plane [0 0 0] <0 1 0>
        ambient 0.2
        reflexion 0.5
        sphere [0 5 -5] 1
        ambient 0.3
    ").unwrap();
    let tracer = Raytracer::new(&scene);

    let ray = Ray::new(crate::tuple::Point::new(0.0, 1.0, 1.0),
        crate::tuple::Vector::new(0.0, -1.0, -1.0)).unwrap();
    approx::assert_abs_diff_eq!(tracer.trace_ray(&ray).unwrap(), 0.5,
        epsilon = 1e-12);
}
