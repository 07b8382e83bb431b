use std::path::PathBuf;

use clap::{ ArgEnum, Parser };
use log::LevelFilter;

use jraytracer::consts::DEFAULT_RESOLUTION;

#[derive(ArgEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// How the raster is filled.
#[derive(ArgEnum, Clone, Copy, Debug, PartialEq)]
pub enum RasterKind {
    /// One thread, row by row
    Array,
    /// A pool of worker threads claiming rows
    Parallel,
    /// Like `parallel`, but paints the index of the worker of each row
    ThreadId,
}

#[derive(ArgEnum, Clone, Copy, Debug, PartialEq)]
pub enum Format {
    Pgm,
    Png,
}

#[derive(Parser, Debug)]
#[clap(name = "jraytracer", version, about = "Renders grayscale images of spheres and planes")]
pub struct Args {
    /// Scene file; `.json` files hold a JSON description, anything else a
    /// scene script. Renders a built-in scene when omitted.
    pub scene: Option<PathBuf>,

    #[clap(long, arg_enum, default_value = "parallel")]
    pub raster: RasterKind,

    /// Image width in pixels
    #[clap(long, default_value_t = DEFAULT_RESOLUTION)]
    pub width: usize,

    /// Image height in pixels
    #[clap(long, default_value_t = DEFAULT_RESOLUTION)]
    pub height: usize,

    /// Number of render threads, 0 for one per CPU
    #[clap(long, short = 't', default_value_t = 0)]
    pub threads: usize,

    /// Render at twice the resolution and average 2x2 blocks
    #[clap(long, short = 's')]
    pub supersample: bool,

    #[clap(long, short = 'f', arg_enum, default_value = "pgm")]
    pub format: Format,

    /// Output file; PGM output goes to stdout when omitted
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[clap(long, arg_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[test]
fn defaults() {
    let args = Args::parse_from(&["jraytracer"]);

    assert_eq!(args.scene, None);
    assert_eq!(args.raster, RasterKind::Parallel);
    assert_eq!((args.width, args.height), (128, 128));
    assert_eq!(args.threads, 0);
    assert!(!args.supersample);
    assert_eq!(args.format, Format::Pgm);
    assert_eq!(args.log_level, LogLevel::Info);
}

#[test]
fn kebab_case_values() {
    let args = Args::parse_from(&[
        "jraytracer", "scene.txt", "--raster", "thread-id", "--format", "png",
        "-o", "out.png", "--log-level", "trace", "-s",
    ]);

    assert_eq!(args.scene, Some(PathBuf::from("scene.txt")));
    assert_eq!(args.raster, RasterKind::ThreadId);
    assert_eq!(args.format, Format::Png);
    assert_eq!(args.output, Some(PathBuf::from("out.png")));
    assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Trace);
    assert!(args.supersample);
}
