//! Encoders for rendered rasters.
//!
//! Raster row 0 is the bottom of the viewport, while both formats store the
//! top line first, so rows are written from the last one down.

use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;

use image::GrayImage;
use log::info;

use crate::error::{ TraceError, Result };
use crate::raster::Raster;

/// Writes a raster as plain (ASCII) PGM.
///
/// # Examples
///
/// ```
/// # use jraytracer::raster::ArrayRaster;
/// # use jraytracer::output::write_pgm;
/// let raster = ArrayRaster::new(2, 1).unwrap();
/// let mut out = Vec::new();
/// write_pgm(&raster, &mut out).unwrap();
///
/// assert_eq!(String::from_utf8(out).unwrap(), "P2\n2 1\n255\n0 0 \n");
/// ```
pub fn write_pgm<W: Write>(raster: &dyn Raster, out: &mut W) -> Result<()> {
    writeln!(out, "P2")?;
    writeln!(out, "{} {}", raster.width(), raster.height())?;
    writeln!(out, "255")?; // Maximum gray value

    for y in (0..raster.height()).rev() {
        for x in 0..raster.width() {
            write!(out, "{} ", raster.pixel(y, x)?)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

/// Saves a raster to a PGM file.
pub fn save_pgm(raster: &dyn Raster, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_pgm(raster, &mut out)?;

    info!("Image saved as {}", path.display());
    Ok(())
}

/// Converts a raster into an 8-bit grayscale image, top line first.
pub fn to_gray_image(raster: &dyn Raster) -> Result<GrayImage> {
    let (width, height) = (raster.width(), raster.height());

    let mut samples = Vec::with_capacity(width * height);
    for y in (0..height).rev() {
        for x in 0..width {
            samples.push(raster.pixel(y, x)?);
        }
    }

    GrayImage::from_raw(width as u32, height as u32, samples).ok_or_else(||
        TraceError::Range(format!(
            "{}x{} raster does not fit into an image", width, height
        ))
    )
}

/// Saves a raster to a grayscale PNG file.
pub fn save_png(raster: &dyn Raster, path: &Path) -> Result<()> {
    to_gray_image(raster)?.save_with_format(path, image::ImageFormat::Png)?;

    info!("Image saved as {}", path.display());
    Ok(())
}

#[cfg(test)]
fn gradient() -> crate::raster::ArrayRaster {
    use crate::tracer::Raytracer;

    // Bright sphere in the lower half of a 2x4 raster.
    let scene = crate::script::parse("\
        looker [0 0 5] [0 0 0] 2 2
        sphere [0 -1 -5] 1.2
        ambient 1
    ").unwrap();
    let mut raster = crate::raster::ArrayRaster::new(2, 4).unwrap();
    raster.render(&Raytracer::new(&scene)).unwrap();
    raster
}

#[test]
fn pgm_rows_are_flipped() {
    let raster = gradient();
    let mut out = Vec::new();
    write_pgm(&raster, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..3], &["P2", "2 4", "255"]);
    assert_eq!(lines.len(), 3 + 4);

    // Raster row 0 is the last line of the file.
    let bottom: Vec<&str> = lines[6].split_whitespace().collect();
    assert_eq!(bottom, vec![
        raster.pixel(0, 0).unwrap().to_string(),
        raster.pixel(0, 1).unwrap().to_string(),
    ]);
    assert!(lines[6].ends_with(' '));
}

#[test]
fn gray_image_is_flipped() {
    let raster = gradient();
    let image = to_gray_image(&raster).unwrap();

    assert_eq!(image.dimensions(), (2, 4));
    for y in 0..4 {
        for x in 0..2 {
            assert_eq!(image.get_pixel(x, 3 - y)[0],
                raster.pixel(y as usize, x as usize).unwrap());
        }
    }
}

#[test]
fn png_is_written() {
    let raster = gradient();
    let path = std::env::temp_dir().join("jraytracer-output-test.png");
    save_png(&raster, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    std::fs::remove_file(&path).unwrap();
}
