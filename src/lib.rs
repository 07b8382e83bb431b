//! A grayscale raytracer for spheres and planes.
//!
//! A `scene::Scene` is assembled from primitives, an optional point light and
//! a `camera::Looker`. A `tracer::Raytracer` computes the brightness seen
//! along a ray by summing the `light::LightModel`s, and a `raster::Raster`
//! traces one primary ray per pixel, optionally on many threads.
//!
//! # Examples
//!
//! ```
//! use jraytracer::script;
//! use jraytracer::tracer::Raytracer;
//! use jraytracer::raster::{ Raster, ParallelRaster };
//!
//! let scene = script::parse(script::DEFAULT_SCENE).unwrap();
//! let mut raster = ParallelRaster::new(8, 8, 2).unwrap();
//! raster.render(&Raytracer::new(&scene)).unwrap();
//!
//! assert_eq!(raster.pixel(4, 4).unwrap(), 255);
//! assert_eq!(raster.pixel(0, 0).unwrap(), 0);
//! ```

pub mod consts;
pub mod error;

pub mod tuple;
pub mod ray;

pub mod surface;
pub mod primitive;
pub mod intersect;
pub mod camera;
pub mod scene;
pub mod script;

pub mod light;
pub mod tracer;

pub mod raster;
pub mod output;

/// Compares two floats up to `consts::EPSILON`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() <= consts::EPSILON
}
