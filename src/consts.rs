// Floating point comparisons
pub const EPSILON: f64 = 1e-12;

// Intersections closer than this to a ray's origin are ignored, so a ray
// leaving a surface never hits that surface again at its own origin.
pub const MINIMUM_DISTANCE: f64 = 1e-10;

// Light transport
pub const DEFAULT_RAY_WEIGHT: f64 = 1.0;
pub const REFLEXION_WEIGHT_STOP: f64 = 1.0 / 256.0;

// Reflexion ratios of 1, or close enough to it, keep the weight above the
// stop practically forever. Chains are cut after this many bounces.
pub const MAX_REFLEXION_DEPTH: usize = 1 << 16;

// Rasters
pub const MAX_BRIGHTNESS: u8 = 255;
pub const DEFAULT_RESOLUTION: usize = 128;
