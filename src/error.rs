use std::io;

use thiserror::Error;

/// The distinct error kinds reported by the core, per the error taxonomy.
///
/// Every fallible entry point returns `Result<T, CoreError>`; nothing is
/// signalled implicitly through panics or sentinel return values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// XML parse or I/O failure while reading a map document.
    #[error("failed to load map document: {0}")]
    MapLoad(#[source] MapLoadError),

    /// The feature bounding rectangle supplied to the Grid Normalizer has
    /// zero extent on at least one axis.
    #[error("feature bounding rectangle has zero extent")]
    DegenerateBounds,

    /// Waypoint `index` is out of bounds or sits on an impassable cell.
    #[error("waypoint {index} is out of bounds or impassable")]
    InvalidWaypoint { index: usize },

    /// The pathfinder exhausted its open set without reaching the goal
    /// while connecting waypoints `from` and `to` (segment `index`).
    #[error("no path between waypoint {from} and {to} (segment {index})")]
    SegmentUnreachable {
        index: usize,
        from: u32,
        to: u32,
    },

    /// Cooperative cancellation was observed before the call completed.
    #[error("operation was cancelled")]
    Cancelled,

    /// `ObstacleConfig` text contained an unparseable line.
    #[error("bad obstacle config at line {line}: {text:?}")]
    BadConfig { line: usize, text: String },
}

/// Failure modes specific to reading an XML map document.
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed map document: {0}")]
    Malformed(String),
}

/// Non-fatal diagnostics accumulated during rasterization or orchestration.
///
/// These never fail a call; they are returned alongside the primary result
/// so a caller can surface them (or not) without the core making that
/// decision on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterWarning {
    /// A feature referenced a symbol code not present in the `ObstacleConfig`.
    UnknownSymbol { symbol_code: String },

    /// A curve-start coordinate flag was rasterized as a straight segment.
    CurveFlattened { symbol_code: String },

    /// A feature's geometry was degenerate (zero-length line, zero-area
    /// polygon) and was skipped entirely.
    DegenerateGeometrySkipped { symbol_code: String },

    /// A dash-flagged segment was rasterized as solid boundary.
    DashTreatedAsSolid { symbol_code: String },

    /// Two adjacent segments in the orchestrated path did not share an
    /// endpoint; the mismatch was kept rather than silently dropped.
    SegmentEndpointMismatch { segment_index: usize },
}

impl std::fmt::Display for RasterWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterWarning::UnknownSymbol { symbol_code } => {
                write!(f, "unknown symbol code {symbol_code:?}")
            }
            RasterWarning::CurveFlattened { symbol_code } => {
                write!(f, "curve flattened to straight segments for {symbol_code:?}")
            }
            RasterWarning::DegenerateGeometrySkipped { symbol_code } => {
                write!(f, "degenerate geometry skipped for {symbol_code:?}")
            }
            RasterWarning::DashTreatedAsSolid { symbol_code } => {
                write!(f, "dash segment treated as solid for {symbol_code:?}")
            }
            RasterWarning::SegmentEndpointMismatch { segment_index } => {
                write!(f, "segment {segment_index} endpoint mismatch at join")
            }
        }
    }
}
