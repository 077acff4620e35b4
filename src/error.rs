use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BandError>;

/// Everything that can go wrong between opening a vasprun.xml and handing a
/// mesh to the render sink.
///
/// All variants are local to one request: a failed slice or plot leaves the
/// loaded dataset untouched and usable.
#[derive(Debug, Error)]
pub enum BandError {
    /// A required record is absent in the source document.
    #[error("required record not found at '{path}'")]
    DataNotFound { path: String },

    /// A text field did not parse as the expected number of floats.
    #[error("malformed record in '{field}': {detail}")]
    MalformedRecord { field: String, detail: String },

    /// The calculation was run without orbital projections (LORBIT off).
    /// Recoverable: band-by-orbital queries are unavailable, nothing else.
    #[error("orbital projection data not present in this calculation")]
    ProjectionUnavailable,

    /// The k-point count is not a perfect cube, so no regular grid can be
    /// reconstructed from it.
    #[error("{count} k-points do not form a {side}x{side}x{side} grid")]
    MalformedGrid { count: usize, side: usize },

    #[error("axis {axis} exceeds maximum of 2")]
    AxisOutOfRange { axis: usize },

    #[error("layer {layer} exceeds maximum of {max}")]
    LayerOutOfRange { layer: usize, max: usize },

    /// An array argument had the wrong shape for the requested operation.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    /// The layer selection matched no k-points; triangulating nothing is
    /// rejected before it reaches the interpolator.
    #[error("layer selection matched no k-points")]
    EmptyCrossSection,

    #[error("vasprun parse error: {0}")]
    Xml(#[from] crate::xml::XmlParseError),

    #[error("render payload serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}
