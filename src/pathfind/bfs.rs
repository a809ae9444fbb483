use std::collections::VecDeque;

use bevy_math::UVec2;

use super::{neighbors8, reconstruct_indices, Path, PathfindError, PathfindResult};
use crate::cancel::CancellationToken;
use crate::grid::Grid;

/// Breadth-first search over hop count, ignoring terrain and slope.
/// Provided as a debug baseline, not a realistic traversal-time estimator.
pub(super) fn search(grid: &Grid, cancel: &CancellationToken, start: UVec2, end: UVec2) -> PathfindResult {
    let n = grid.len();
    let mut parent = vec![-1i64; n];
    let mut visited = vec![false; n];

    let start_idx = grid.idx(start.x, start.y);
    let end_idx = grid.idx(end.x, end.y);
    visited[start_idx] = true;

    let mut queue = VecDeque::new();
    queue.push_back(start_idx);
    let mut considered = 0u32;

    while let Some(current) = queue.pop_front() {
        if cancel.is_cancelled() {
            return Err(PathfindError::Cancelled);
        }
        considered += 1;
        if current == end_idx {
            let indices = reconstruct_indices(grid, &parent, end);
            let cost = (indices.len() - 1) as f32;
            return Ok(Path { indices, cost, considered });
        }
        let pos = grid.xy(current);
        for neighbor in neighbors8(grid, pos) {
            let neighbor_idx = grid.idx(neighbor.x, neighbor.y);
            if visited[neighbor_idx] || grid.cell(neighbor.x, neighbor.y).is_impassable() {
                continue;
            }
            visited[neighbor_idx] = true;
            parent[neighbor_idx] = current as i64;
            queue.push_back(neighbor_idx);
        }
    }

    Err(PathfindError::NotFound)
}
