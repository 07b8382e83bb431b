use std::sync::atomic::{ AtomicIsize, Ordering };
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use log::{ info, trace };

use crate::consts::MAX_BRIGHTNESS;
use crate::error::{ TraceError, Result };
use crate::tracer::Raytracer;

/// A grid of brightness samples in [0, 255].
///
/// Pixels are addressed as `(row, column)`, i.e. `(y, x)`, with row 0 at the
/// bottom of the viewport. A raster is filled by `render` and only read
/// afterwards.
pub trait Raster {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// The sample at row `y`, column `x`.
    fn pixel(&self, y: usize, x: usize) -> Result<u8>;

    /// Traces every pixel of the raster.
    fn render(&mut self, tracer: &Raytracer) -> Result<()>;
}

/// Maps raster coordinates onto viewport coordinates in [-1, 1].
///
/// Pixel `i` of `n` lands on `i * 2/n - (1 - 1/n)`, which centers the pixels
/// around the viewport origin. A single pixel sits right on the origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoordinateConverter {
    horizontal_factor: f64,
    horizontal_shift: f64,
    vertical_factor: f64,
    vertical_shift: f64,
}

impl CoordinateConverter {
    pub fn new(width: usize, height: usize) -> CoordinateConverter {
        CoordinateConverter {
            horizontal_factor: Self::scale_factor(width),
            horizontal_shift: Self::shift(width),
            vertical_factor: Self::scale_factor(height),
            vertical_shift: Self::shift(height),
        }
    }

    pub fn horizontal(&self, x: usize) -> f64 {
        x as f64 * self.horizontal_factor - self.horizontal_shift
    }

    pub fn vertical(&self, y: usize) -> f64 {
        y as f64 * self.vertical_factor - self.vertical_shift
    }

    fn scale_factor(resolution: usize) -> f64 {
        if resolution == 1 {
            1.0
        } else {
            2.0 / resolution as f64
        }
    }

    fn shift(resolution: usize) -> f64 {
        1.0 - 1.0 / resolution as f64
    }
}

/// Converts a brightness in [0, 1] to a sample, truncating.
fn to_sample(brightness: f64) -> u8 {
    (brightness * MAX_BRIGHTNESS as f64) as u8
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width < 1 || height < 1 {
        return Err(TraceError::Construction(format!(
            "raster must be at least 1x1, got {}x{}", width, height
        )));
    }

    Ok(())
}

fn check_bounds(raster: &dyn Raster, y: usize, x: usize) -> Result<()> {
    if y >= raster.height() || x >= raster.width() {
        return Err(TraceError::Range(format!(
            "pixel ({}, {}) is outside of the {}x{} raster",
            y, x, raster.width(), raster.height()
        )));
    }

    Ok(())
}

/// A raster rendered on the calling thread, row by row from the bottom.
///
/// Rendering is deterministic and needs no synchronization at all, which makes
/// this raster the reference the parallel one is compared against.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayRaster {
    width: usize,
    height: usize,

    /// The samples, stored as a flattened row-major vector.
    pixels: Vec<u8>,
}

impl ArrayRaster {
    pub fn new(width: usize, height: usize) -> Result<ArrayRaster> {
        check_dimensions(width, height)?;

        Ok(ArrayRaster { width, height, pixels: vec![0; width * height] })
    }

    /// The samples of row `y`.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    fn write_row(&mut self, y: usize, samples: &[u8]) {
        let width = self.width;
        self.pixels[y * width..(y + 1) * width].copy_from_slice(samples);
    }
}

impl Raster for ArrayRaster {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixel(&self, y: usize, x: usize) -> Result<u8> {
        check_bounds(self, y, x)?;
        Ok(self.pixels[y * self.width + x])
    }

    fn render(&mut self, tracer: &Raytracer) -> Result<()> {
        let converter = CoordinateConverter::new(self.width, self.height);
        let start = Instant::now();

        for y in 0..self.height {
            for x in 0..self.width {
                let brightness = tracer.trace_primary(
                    converter.horizontal(x),
                    converter.vertical(y),
                )?;
                self.pixels[y * self.width + x] = to_sample(brightness);
            }
        }

        info!("Rendered {}x{} in {:.2?}", self.width, self.height,
            start.elapsed());
        Ok(())
    }
}

/// A raster rendered by a fixed pool of worker threads.
///
/// Workers claim rows from the top down through one shared atomic counter;
/// that counter is the only point where they synchronize. Each finished row
/// is sent back to the rendering thread, which is the only one writing into
/// the pixel buffer. Since every row is claimed exactly once, no row is
/// written twice.
#[derive(Clone, Debug, PartialEq)]
pub struct ParallelRaster {
    raster: ArrayRaster,
    threads: usize,
    paint_thread_ids: bool,
}

impl ParallelRaster {
    /// Creates a parallel raster. A thread count of 0 uses one thread per
    /// available CPU.
    pub fn new(width: usize, height: usize, threads: usize)
        -> Result<ParallelRaster> {
        let threads = if threads == 0 { num_cpus::get() } else { threads };

        Ok(ParallelRaster {
            raster: ArrayRaster::new(width, height)?,
            threads,
            paint_thread_ids: false,
        })
    }

    /// A parallel raster that paints each pixel with the index of the worker
    /// that claimed its row, scaled to [0, 255], instead of tracing it.
    pub fn thread_ids(width: usize, height: usize, threads: usize)
        -> Result<ParallelRaster> {
        let mut raster = ParallelRaster::new(width, height, threads)?;
        raster.paint_thread_ids = true;
        Ok(raster)
    }

    pub fn thread_count(&self) -> usize {
        self.threads
    }

    /// The rendered samples, as a single-threaded raster would hold them.
    pub fn into_inner(self) -> ArrayRaster {
        self.raster
    }
}

fn thread_id_sample(id: usize, threads: usize) -> u8 {
    if threads < 2 {
        return 0;
    }

    (MAX_BRIGHTNESS as f64 * id as f64 / (threads - 1) as f64) as u8
}

impl Raster for ParallelRaster {
    fn width(&self) -> usize {
        self.raster.width
    }

    fn height(&self) -> usize {
        self.raster.height
    }

    fn pixel(&self, y: usize, x: usize) -> Result<u8> {
        self.raster.pixel(y, x)
    }

    fn render(&mut self, tracer: &Raytracer) -> Result<()> {
        let width = self.raster.width;
        let height = self.raster.height;
        let threads = self.threads;
        let paint_thread_ids = self.paint_thread_ids;

        let converter = CoordinateConverter::new(width, height);
        let next_row = AtomicIsize::new(height as isize - 1);
        let (sender, receiver) = mpsc::channel::<(usize, Vec<u8>)>();
        let raster = &mut self.raster;

        info!("Rendering {}x{} using {} threads...", width, height, threads);
        let start = Instant::now();

        let results: Vec<Result<()>> = thread::scope(|scope| {
            let mut workers = Vec::with_capacity(threads);

            for id in 0..threads {
                let sender = sender.clone();
                let next_row = &next_row;
                let converter = &converter;

                workers.push(scope.spawn(move || -> Result<()> {
                    loop {
                        // Claim the next row, or learn that none remain.
                        let y = next_row.fetch_sub(1, Ordering::SeqCst);
                        if y < 0 {
                            return Ok(());
                        }

                        let y = y as usize;
                        trace!("Worker {} claimed row {}", id, y);

                        let mut samples = Vec::with_capacity(width);
                        for x in 0..width {
                            let sample = if paint_thread_ids {
                                thread_id_sample(id, threads)
                            } else {
                                to_sample(tracer.trace_primary(
                                    converter.horizontal(x),
                                    converter.vertical(y),
                                )?)
                            };
                            samples.push(sample);
                        }

                        // The receiver lives until every worker has finished.
                        let _ = sender.send((y, samples));
                    }
                }));
            }

            // Only the workers' senders remain; the loop below ends once the
            // last worker is done.
            drop(sender);
            for (y, samples) in receiver.iter() {
                raster.write_row(y, &samples);
            }

            workers.into_iter()
                .map(|worker| worker.join().unwrap_or_else(|_| Err(
                    TraceError::State("render worker panicked".to_string())
                )))
                .collect()
        });

        results.into_iter().collect::<Result<()>>()?;

        info!("...done in {:.2?}", start.elapsed());
        Ok(())
    }
}

/// Renders an inner raster at twice the resolution and averages each 2x2
/// block of it into one pixel.
pub struct Supersampled {
    inner: Box<dyn Raster>,
}

impl Supersampled {
    /// Wraps `inner`, whose width and height both have to be even.
    pub fn new(inner: Box<dyn Raster>) -> Result<Supersampled> {
        if inner.width() % 2 != 0 || inner.height() % 2 != 0 {
            return Err(TraceError::Construction(format!(
                "supersampled raster needs an even resolution, got {}x{}",
                inner.width(), inner.height()
            )));
        }

        Ok(Supersampled { inner })
    }
}

impl Raster for Supersampled {
    fn width(&self) -> usize {
        self.inner.width() / 2
    }

    fn height(&self) -> usize {
        self.inner.height() / 2
    }

    fn pixel(&self, y: usize, x: usize) -> Result<u8> {
        check_bounds(self, y, x)?;

        let (y, x) = (y * 2, x * 2);
        let sum = self.inner.pixel(y, x)? as f64
            + self.inner.pixel(y, x + 1)? as f64
            + self.inner.pixel(y + 1, x)? as f64
            + self.inner.pixel(y + 1, x + 1)? as f64;

        Ok((sum / 4.0).round() as u8)
    }

    fn render(&mut self, tracer: &Raytracer) -> Result<()> {
        self.inner.render(tracer)
    }
}

#[cfg(test)]
fn ambient_sphere() -> crate::scene::Scene {
    crate::script::parse("\
        looker [0 0 5] [0 0 0] 2 2
        sphere [0 0 -5] 1
        ambient 1
    ").unwrap()
}

/// A raster with fixed samples, for testing decorators.
#[cfg(test)]
struct FixedRaster {
    width: usize,
    samples: Vec<u8>,
}

#[cfg(test)]
impl Raster for FixedRaster {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.samples.len() / self.width
    }

    fn pixel(&self, y: usize, x: usize) -> Result<u8> {
        check_bounds(self, y, x)?;
        Ok(self.samples[y * self.width + x])
    }

    fn render(&mut self, _tracer: &Raytracer) -> Result<()> {
        Ok(())
    }
}

#[test]
fn converter_centers_pixels() {
    let c = CoordinateConverter::new(4, 1);

    assert_eq!(c.horizontal(0), -0.75);
    assert_eq!(c.horizontal(1), -0.25);
    assert_eq!(c.horizontal(2), 0.25);
    assert_eq!(c.horizontal(3), 0.75);
    assert_eq!(c.vertical(0), 0.0);
}

#[test]
fn raster_needs_pixels() {
    assert!(matches!(ArrayRaster::new(0, 5), Err(TraceError::Construction(_))));
    assert!(matches!(ArrayRaster::new(5, 0), Err(TraceError::Construction(_))));
    assert!(matches!(ParallelRaster::new(0, 0, 2),
        Err(TraceError::Construction(_))));
}

#[test]
fn pixel_access_is_bounded() {
    let r = ArrayRaster::new(3, 2).unwrap();

    assert_eq!(r.pixel(1, 2).unwrap(), 0);
    assert!(matches!(r.pixel(2, 0), Err(TraceError::Range(_))));
    assert!(matches!(r.pixel(0, 3), Err(TraceError::Range(_))));
}

#[test]
fn render_ambient_sphere() {
    let scene = ambient_sphere();
    let tracer = Raytracer::new(&scene);
    let mut r = ArrayRaster::new(5, 5).unwrap();
    r.render(&tracer).unwrap();

    assert_eq!(r.pixel(2, 2).unwrap(), 255);
    assert_eq!(r.pixel(0, 0).unwrap(), 0);
    assert_eq!(r.pixel(4, 4).unwrap(), 0);
}

#[test]
fn parallel_matches_sequential() {
    let scene = crate::script::parse("\
        looker [0 0 5] [0 0 0] 2 2
        light [3 4 5]
        sphere [0 0 -5] 1
        specular 0.4 15
        plane [0 -1 0] <0 1 0>
        reflexion 0.5
    ").unwrap();
    let tracer = Raytracer::new(&scene);

    let mut sequential = ArrayRaster::new(17, 13).unwrap();
    sequential.render(&tracer).unwrap();

    for threads in &[1, 2, 0] {
        let mut parallel = ParallelRaster::new(17, 13, *threads).unwrap();
        parallel.render(&tracer).unwrap();
        assert_eq!(parallel.into_inner(), sequential);
    }
}

#[test]
fn thread_count_zero_uses_all_cpus() {
    let r = ParallelRaster::new(2, 2, 0).unwrap();

    assert_eq!(r.thread_count(), num_cpus::get());
    assert_eq!(ParallelRaster::new(2, 2, 3).unwrap().thread_count(), 3);
}

#[test]
fn more_threads_than_rows() {
    let scene = ambient_sphere();
    let tracer = Raytracer::new(&scene);
    let mut r = ParallelRaster::new(3, 1, 8).unwrap();
    r.render(&tracer).unwrap();

    assert_eq!(r.pixel(0, 1).unwrap(), 255);
}

#[test]
fn thread_id_raster() {
    let scene = ambient_sphere();
    let tracer = Raytracer::new(&scene);

    let mut single = ParallelRaster::thread_ids(4, 4, 1).unwrap();
    single.render(&tracer).unwrap();
    for y in 0..4 {
        assert!(single.into_inner_ref().row(y).iter().all(|s| *s == 0));
    }

    let mut two = ParallelRaster::thread_ids(4, 8, 2).unwrap();
    two.render(&tracer).unwrap();
    for y in 0..8 {
        let row = two.into_inner_ref().row(y);
        assert!(row[0] == 0 || row[0] == 255);
        assert!(row.iter().all(|s| *s == row[0]));
    }
}

#[cfg(test)]
impl ParallelRaster {
    fn into_inner_ref(&self) -> &ArrayRaster {
        &self.raster
    }
}

#[test]
fn supersample_averages_blocks() {
    let inner = FixedRaster {
        width: 4,
        samples: vec![
            0, 255, 10, 10,
            255, 255, 10, 11,
            1, 2, 100, 101,
            2, 2, 0, 0,
        ],
    };
    let s = Supersampled::new(Box::new(inner)).unwrap();

    assert_eq!(s.width(), 2);
    assert_eq!(s.height(), 2);
    assert_eq!(s.pixel(0, 0).unwrap(), 191); // 765 / 4 = 191.25
    assert_eq!(s.pixel(0, 1).unwrap(), 10); // 41 / 4 = 10.25
    assert_eq!(s.pixel(1, 0).unwrap(), 2); // 7 / 4 = 1.75
    assert_eq!(s.pixel(1, 1).unwrap(), 51); // 201 / 4 = 50.25
    assert!(matches!(s.pixel(2, 0), Err(TraceError::Range(_))));
}

#[test]
fn supersample_needs_even_resolution() {
    let odd = ArrayRaster::new(4, 3).unwrap();

    assert!(matches!(Supersampled::new(Box::new(odd)),
        Err(TraceError::Construction(_))));
}

#[test]
fn supersample_renders_inner() {
    let scene = ambient_sphere();
    let tracer = Raytracer::new(&scene);
    let inner = ParallelRaster::new(6, 6, 2).unwrap();
    let mut s = Supersampled::new(Box::new(inner)).unwrap();
    s.render(&tracer).unwrap();

    assert_eq!(s.pixel(1, 1).unwrap(), 255);
    assert_eq!(s.pixel(0, 0).unwrap(), 0);
}
