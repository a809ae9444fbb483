use bevy_math::UVec2;
use log::{debug, warn};

use crate::cancel::CancellationToken;
use crate::cost::CostModel;
use crate::error::{CoreError, RasterWarning};
use crate::grid::Grid;
use crate::pathfind::{find_path, Path, PathOptions, PathfindError};

/// Route a sequence of waypoints `[w0, .., wk]` through the pathfinder,
/// one segment per consecutive pair, concatenating the results into a
/// single [`Path`].
///
/// Waypoints are validated up front: any out-of-bounds or impassable
/// waypoint aborts the whole call with [`CoreError::InvalidWaypoint`]
/// before a single pathfinder call is made. If a segment's first index
/// equals the running result's last index the duplicate is dropped;
/// otherwise the mismatch is kept and reported via
/// [`RasterWarning::SegmentEndpointMismatch`] rather than silently
/// papered over.
///
/// # Errors
/// Returns [`CoreError::InvalidWaypoint`] if any waypoint is invalid,
/// [`CoreError::SegmentUnreachable`] if any segment's pathfinder call
/// exhausts its open set, or [`CoreError::Cancelled`] if cancellation is
/// observed before or during a segment.
pub fn plan_route(
    grid: &Grid,
    cost_model: &CostModel,
    waypoints: &[UVec2],
    options: &PathOptions,
    cancel: &CancellationToken,
) -> Result<(Path, Vec<RasterWarning>), CoreError> {
    for (i, w) in waypoints.iter().enumerate() {
        if !grid.in_bounds_u(*w) || grid.cell(w.x, w.y).is_impassable() {
            return Err(CoreError::InvalidWaypoint { index: i });
        }
    }

    if waypoints.is_empty() {
        return Ok((
            Path {
                indices: Vec::new(),
                cost: 0.0,
                considered: 0,
            },
            Vec::new(),
        ));
    }
    if waypoints.len() == 1 {
        let w = waypoints[0];
        return Ok((
            Path {
                indices: vec![grid.idx(w.x, w.y)],
                cost: 0.0,
                considered: 1,
            },
            Vec::new(),
        ));
    }

    debug!("orchestrating route over {} waypoints", waypoints.len());

    let mut warnings = Vec::new();
    let mut indices: Vec<usize> = Vec::new();
    let mut cost = 0.0f32;
    let mut considered = 0u32;

    for (i, pair) in waypoints.windows(2).enumerate() {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let (a, b) = (pair[0], pair[1]);
        let segment = find_path(grid, cost_model, a, b, options, cancel).map_err(|e| match e {
            PathfindError::NotFound => CoreError::SegmentUnreachable {
                index: i,
                from: grid.idx(a.x, a.y) as u32,
                to: grid.idx(b.x, b.y) as u32,
            },
            PathfindError::Cancelled => CoreError::Cancelled,
        })?;

        match segment.indices.first() {
            Some(&first) if indices.last() == Some(&first) => {
                indices.extend(segment.indices.iter().skip(1));
            }
            Some(_) => {
                if !indices.is_empty() {
                    warn!("segment {i} endpoint mismatch at join, keeping both endpoints");
                    warnings.push(RasterWarning::SegmentEndpointMismatch { segment_index: i });
                }
                indices.extend(segment.indices.iter());
            }
            None => {}
        }
        cost += segment.cost;
        considered += segment.considered;
    }

    Ok((Path { indices, cost, considered }, warnings))
}
