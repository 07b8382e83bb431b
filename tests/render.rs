use jraytracer::error::TraceError;
use jraytracer::tuple::{ Point, Vector };
use jraytracer::ray::Ray;
use jraytracer::scene::Scene;
use jraytracer::script;
use jraytracer::light::{ LightModel, Shading };
use jraytracer::tracer::Raytracer;
use jraytracer::raster::{ Raster, ArrayRaster, ParallelRaster, Supersampled,
    CoordinateConverter };
use jraytracer::output::write_pgm;

fn ambient_sphere() -> Scene {
    script::parse("
        looker [0 0 5] [0 0 0] 2 2
        sphere [0 0 -5] 1
        ambient 1
        diffuse 0
    ").unwrap()
}

fn lit_scene() -> Scene {
    script::parse("
        looker [0 1 6] [0 0 0] 3 2
        light [-4 6 4]

        sphere [0 0 -4] 1.5
        specular 0.6 20
        reflexion 0.3

        sphere [2.5 -0.5 -3] 0.7
        ambient 0.2
        diffuse 0.6

        plane [0 -1.5 0] <0 1 0>
        diffuse 0.5
        reflexion 0.4
    ").unwrap()
}

fn render<R: Raster>(mut raster: R, scene: &Scene) -> R {
    raster.render(&Raytracer::new(scene)).unwrap();
    raster
}

fn samples(raster: &dyn Raster) -> Vec<u8> {
    let mut samples = Vec::new();
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            samples.push(raster.pixel(y, x).unwrap());
        }
    }
    samples
}

#[test]
fn ambient_sphere_is_black_or_white() {
    let scene = ambient_sphere();
    let tracer = Raytracer::new(&scene);
    let raster = render(ArrayRaster::new(15, 15).unwrap(), &scene);
    let converter = CoordinateConverter::new(15, 15);

    let mut hits = 0;
    for y in 0..15 {
        for x in 0..15 {
            let b = tracer.trace_primary(converter.horizontal(x),
                converter.vertical(y)).unwrap();
            let expected = if b == 1.0 {
                hits += 1;
                255
            } else {
                assert_eq!(b, 0.0);
                0
            };
            assert_eq!(raster.pixel(y, x).unwrap(), expected);
        }
    }

    assert!(hits > 0 && hits < 15 * 15);
    assert_eq!(raster.pixel(7, 7).unwrap(), 255);
}

#[test]
fn sphere_shadows_its_far_side() {
    let scene = script::parse("
        looker [0 0 5] [0 0 0] 2 2
        light [0 0 -20]
        sphere [0 0 -5] 1
        ambient 0
    ").unwrap();
    let tracer = Raytracer::new(&scene);

    // The camera sees the side facing away from the light.
    let front = Ray::new(Point::new(0.0, 0.0, 5.0), -Vector::Z).unwrap();
    let shading = Shading::new(front, scene.find_intersection(&front));
    assert!(shading.is_shadowed(&tracer).unwrap());
    assert_eq!(LightModel::Diffuse.calculate(&tracer, &shading).unwrap(), 0.0);
    assert_eq!(tracer.trace_primary(0.0, 0.0).unwrap(), 0.0);

    // The side facing the light is lit.
    let back = Ray::new(Point::new(0.0, 0.0, -20.0), Vector::Z).unwrap();
    let shading = Shading::new(back, scene.find_intersection(&back));
    assert!(!shading.is_shadowed(&tracer).unwrap());
    let diffuse = LightModel::Diffuse.calculate(&tracer, &shading).unwrap();
    approx::assert_abs_diff_eq!(diffuse, 0.95, epsilon = 1e-9);
}

#[test]
fn parallel_render_is_deterministic() {
    let scene = lit_scene();
    let reference = samples(&render(ArrayRaster::new(40, 30).unwrap(), &scene));
    assert!(reference.iter().any(|s| *s > 0));

    for threads in &[1, 2, 0] {
        let parallel = render(ParallelRaster::new(40, 30, *threads).unwrap(),
            &scene);
        assert_eq!(samples(&parallel), reference, "{} threads", threads);
    }
}

#[test]
fn supersampled_render_averages_inner() {
    let scene = lit_scene();
    let inner = samples(&render(ArrayRaster::new(8, 6).unwrap(), &scene));

    let outer = Supersampled::new(Box::new(ParallelRaster::new(8, 6, 2).unwrap()))
        .unwrap();
    let outer = render(outer, &scene);
    assert_eq!((outer.width(), outer.height()), (4, 3));

    for y in 0..3 {
        for x in 0..4 {
            let block = [
                inner[(2 * y) * 8 + 2 * x],
                inner[(2 * y) * 8 + 2 * x + 1],
                inner[(2 * y + 1) * 8 + 2 * x],
                inner[(2 * y + 1) * 8 + 2 * x + 1],
            ];
            let sum: f64 = block.iter().map(|s| *s as f64).sum();
            assert_eq!(outer.pixel(y, x).unwrap(), (sum / 4.0).round() as u8);
        }
    }
}

#[test]
fn odd_raster_cannot_be_supersampled() {
    let inner = ParallelRaster::new(5, 4, 2).unwrap();

    assert!(matches!(Supersampled::new(Box::new(inner)),
        Err(TraceError::Construction(_))));
}

#[test]
fn scene_without_looker_fails() {
    let r = script::parse("sphere [0 0 -5] 1\nambient 1\nlight [1 1 1]");

    assert!(matches!(r, Err(TraceError::Construction(_))));
}

#[test]
fn rendered_pgm() {
    let scene = ambient_sphere();
    let raster = render(ParallelRaster::new(3, 3, 0).unwrap(), &scene);

    let mut out = Vec::new();
    write_pgm(&raster, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(),
        "P2\n3 3\n255\n0 0 0 \n0 255 0 \n0 0 0 \n");
}

#[test]
fn facing_mirrors_render_on_workers() {
    let scene = script::parse("
        looker [0 0 5] [0 0 0] 2 2
        plane [0 -1 0] <0 1 0>
        reflexion 0.999
        plane [0 1 0] <0 -1 0>
        reflexion 0.999
    ").unwrap();

    // Every pixel bounces thousands of times between the mirrors, picking
    // up the default ambient ratio on each hit.
    let raster = render(ParallelRaster::new(4, 4, 2).unwrap(), &scene);
    assert!(samples(&raster).iter().all(|s| *s == 255));
}
