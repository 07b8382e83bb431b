use std::fs;
use std::io;
use std::path::Path;
use std::process;

use clap::Parser;
use log::{ error, info };

use jraytracer::error::{ TraceError, Result };
use jraytracer::scene::Scene;
use jraytracer::script;
use jraytracer::tracer::Raytracer;
use jraytracer::raster::{ Raster, ArrayRaster, ParallelRaster, Supersampled };
use jraytracer::output;

mod cli;
mod logger;

use cli::{ Args, Format, RasterKind };

/// Loads the scene named on the command line, or the built-in one.
fn load_scene(path: Option<&Path>) -> Result<Scene> {
    let path = match path {
        Some(path) => path,
        None => {
            info!("No scene given, rendering the default scene");
            return script::parse(script::DEFAULT_SCENE);
        },
    };

    let source = fs::read_to_string(path)?;
    info!("Loading scene {}", path.display());

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Scene::from_json(&source),
        _ => script::parse(&source),
    }
}

fn build_raster(args: &Args) -> Result<Box<dyn Raster>> {
    let factor = if args.supersample { 2 } else { 1 };
    let (width, height) = (args.width * factor, args.height * factor);

    let raster: Box<dyn Raster> = match args.raster {
        RasterKind::Array => Box::new(ArrayRaster::new(width, height)?),
        RasterKind::Parallel => Box::new(
            ParallelRaster::new(width, height, args.threads)?
        ),
        RasterKind::ThreadId => Box::new(
            ParallelRaster::thread_ids(width, height, args.threads)?
        ),
    };

    if args.supersample {
        Ok(Box::new(Supersampled::new(raster)?))
    } else {
        Ok(raster)
    }
}

fn write_output(raster: &dyn Raster, args: &Args) -> Result<()> {
    match (args.format, args.output.as_deref()) {
        (Format::Pgm, Some(path)) => output::save_pgm(raster, path),
        (Format::Pgm, None) => output::write_pgm(raster, &mut io::stdout().lock()),
        (Format::Png, Some(path)) => output::save_png(raster, path),
        (Format::Png, None) => Err(TraceError::Construction(
            "PNG output needs an output file".to_string()
        )),
    }
}

fn run(args: &Args) -> Result<()> {
    let scene = load_scene(args.scene.as_deref())?;
    let tracer = Raytracer::new(&scene);

    let mut raster = build_raster(args)?;
    raster.render(&tracer)?;

    write_output(raster.as_ref(), args)
}

fn main() {
    let args = Args::parse();
    logger::init_logger(args.log_level.into());

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}
