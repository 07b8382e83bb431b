use thiserror::Error;

/// Errors produced while building or rendering a scene.
///
/// Every variant marks a violated precondition. None of them are retried by
/// the engine; they propagate to whoever asked for the scene, ray or raster.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Some value could not be constructed from its inputs (zero ray
    /// direction, non-positive radius, degenerate camera, missing looker...).
    #[error("construction failed: {0}")]
    Construction(String),

    /// An arithmetic operation left its domain, e.g. normalizing a zero vector.
    #[error("domain error: {0}")]
    Domain(String),

    /// An operation conflicts with the current state, e.g. a surface property
    /// being set a second time.
    #[error("invalid state: {0}")]
    State(String),

    /// A value lies outside of its legal range.
    #[error("out of range: {0}")]
    Range(String),

    /// A scene script could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Result type used throughout the raytracer.
pub type Result<T> = std::result::Result<T, TraceError>;

#[test]
fn error_messages_name_their_kind() {
    let e = TraceError::Domain("vector has length 0".to_string());
    assert_eq!(e.to_string(), "domain error: vector has length 0");

    let e = TraceError::Parse { line: 3, message: "unknown".to_string() };
    assert_eq!(e.to_string(), "line 3: unknown");
}
