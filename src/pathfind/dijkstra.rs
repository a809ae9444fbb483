use bevy_math::UVec2;

use super::{neighbors8, reconstruct_indices, Frontier, HeapEntry, Path, PathfindError, PathfindResult};
use crate::cancel::CancellationToken;
use crate::cost::CostModel;
use crate::grid::Grid;

/// Uniform-cost search: standard priority-queue expansion over 8-neighbors
/// using `edge_cost`, with no heuristic guidance.
pub(super) fn search(
    grid: &Grid,
    cost_model: &CostModel,
    cancel: &CancellationToken,
    start: UVec2,
    end: UVec2,
) -> PathfindResult {
    let n = grid.len();
    let mut g_score = vec![f32::INFINITY; n];
    let mut parent = vec![-1i64; n];
    let mut closed = vec![false; n];

    let start_idx = grid.idx(start.x, start.y);
    let end_idx = grid.idx(end.x, end.y);
    g_score[start_idx] = 0.0;

    let mut frontier = Frontier::new();
    let mut seq = 0u32;
    frontier.push(HeapEntry {
        estimated_cost: 0.0,
        heuristic: 0.0,
        seq,
        cell_index: start_idx,
    });

    let mut considered = 0u32;

    while let Some(entry) = frontier.pop() {
        if cancel.is_cancelled() {
            return Err(PathfindError::Cancelled);
        }
        let current = entry.cell_index;
        if closed[current] {
            continue;
        }
        closed[current] = true;
        considered += 1;

        if current == end_idx {
            return Ok(Path {
                indices: reconstruct_indices(grid, &parent, end),
                cost: g_score[current],
                considered,
            });
        }

        let current_pos = grid.xy(current);
        for neighbor in neighbors8(grid, current_pos) {
            let neighbor_idx = grid.idx(neighbor.x, neighbor.y);
            if closed[neighbor_idx] {
                continue;
            }
            let cost = cost_model.edge_cost(current_pos, neighbor);
            if !cost.is_finite() {
                continue;
            }
            let tentative = g_score[current] + cost;
            if tentative < g_score[neighbor_idx] {
                g_score[neighbor_idx] = tentative;
                parent[neighbor_idx] = current as i64;
                seq += 1;
                frontier.push(HeapEntry {
                    estimated_cost: tentative,
                    heuristic: 0.0,
                    seq,
                    cell_index: neighbor_idx,
                });
            }
        }
    }

    Err(PathfindError::NotFound)
}
