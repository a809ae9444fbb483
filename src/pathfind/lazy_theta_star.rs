use bevy_math::UVec2;

use super::{neighbors8, reconstruct_indices, Frontier, HeapEntry, Path, PathfindError, PathfindResult};
use crate::cancel::CancellationToken;
use crate::cost::{CostModel, Heuristic};
use crate::grid::Grid;

/// Any-angle search that defers the line-of-sight check Theta* pays on
/// every successor at every expansion. Successors are tentatively
/// reparented to `parent(current)` using the cheap, unverified
/// [`CostModel::direct_cost`] estimate; the assumption is checked only
/// once, when the node itself is popped for expansion, and repaired
/// against already-expanded neighbors if occluded.
pub(super) fn search(
    grid: &Grid,
    cost_model: &CostModel,
    cancel: &CancellationToken,
    start: UVec2,
    end: UVec2,
    heuristic: Heuristic,
) -> PathfindResult {
    let n = grid.len();
    let mut g_score = vec![f32::INFINITY; n];
    let mut parent = vec![-1i64; n];
    let mut closed = vec![false; n];

    let start_idx = grid.idx(start.x, start.y);
    let end_idx = grid.idx(end.x, end.y);
    g_score[start_idx] = 0.0;

    let log_cell_m = cost_model.log_cell_m();
    let mut frontier = Frontier::new();
    let mut seq = 0u32;
    let h0 = heuristic.estimate(start, end, log_cell_m);
    frontier.push(HeapEntry {
        estimated_cost: h0,
        heuristic: h0,
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

        let current_pos = grid.xy(current);

        // Verify (or repair) the lazily-assumed parent before this node's
        // own g_score is trusted for relaxing its successors.
        if current != start_idx {
            let assumed_parent_idx = parent[current] as usize;
            let assumed_parent_pos = grid.xy(assumed_parent_idx);
            if !cost_model.line_of_sight_cost(assumed_parent_pos, current_pos).is_finite() {
                repair(grid, cost_model, &mut g_score, &mut parent, &closed, current, current_pos);
            }
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

        let grandparent_idx = if parent[current] < 0 { current } else { parent[current] as usize };
        let grandparent_pos = grid.xy(grandparent_idx);

        for neighbor in neighbors8(grid, current_pos) {
            let neighbor_idx = grid.idx(neighbor.x, neighbor.y);
            if closed[neighbor_idx] {
                continue;
            }

            let path2_cost = cost_model.edge_cost(current_pos, neighbor);
            let tentative_path2 = if path2_cost.is_finite() {
                g_score[current] + path2_cost
            } else {
                f32::INFINITY
            };

            let direct = cost_model.direct_cost(grandparent_pos, neighbor);
            let tentative_path1 = if direct.is_finite() {
                g_score[grandparent_idx] + direct
            } else {
                f32::INFINITY
            };

            let (tentative, new_parent_idx) = if tentative_path1 <= tentative_path2 {
                (tentative_path1, grandparent_idx)
            } else {
                (tentative_path2, current)
            };

            if tentative < g_score[neighbor_idx] {
                g_score[neighbor_idx] = tentative;
                parent[neighbor_idx] = new_parent_idx as i64;
                let h = heuristic.estimate(neighbor, end, log_cell_m);
                seq += 1;
                frontier.push(HeapEntry {
                    estimated_cost: tentative + h,
                    heuristic: h,
                    seq,
                    cell_index: neighbor_idx,
                });
            }
        }
    }

    Err(PathfindError::NotFound)
}

/// The lazily-assumed line of sight from `parent(current)` was occluded.
/// Fall back to the best already-expanded (closed) 8-neighbor of
/// `current`, exactly as an ordinary A* relaxation would have chosen.
fn repair(
    grid: &Grid,
    cost_model: &CostModel,
    g_score: &mut [f32],
    parent: &mut [i64],
    closed: &[bool],
    current: usize,
    current_pos: UVec2,
) {
    let mut best_cost = f32::INFINITY;
    let mut best_parent = parent[current];
    for neighbor in neighbors8(grid, current_pos) {
        let neighbor_idx = grid.idx(neighbor.x, neighbor.y);
        if !closed[neighbor_idx] {
            continue;
        }
        let edge = cost_model.edge_cost(neighbor, current_pos);
        if !edge.is_finite() {
            continue;
        }
        let candidate = g_score[neighbor_idx] + edge;
        if candidate < best_cost {
            best_cost = candidate;
            best_parent = neighbor_idx as i64;
        }
    }
    if best_cost.is_finite() {
        g_score[current] = best_cost;
        parent[current] = best_parent;
    }
}
