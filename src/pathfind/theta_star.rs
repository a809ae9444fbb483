use bevy_math::UVec2;

use super::{neighbors8, reconstruct_indices, Frontier, HeapEntry, Path, PathfindError, PathfindResult};
use crate::cancel::CancellationToken;
use crate::cost::{CostModel, Heuristic};
use crate::grid::Grid;

/// Any-angle search: at every expansion of `current` with parent `p`,
/// attempt to reparent each successor directly to `p` when the straight
/// line-of-sight segment `p -> successor` is clear and no worse than the
/// conventional one-hop update. Falls back to the ordinary A* relaxation
/// otherwise.
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

            let los_cost = cost_model.line_of_sight_cost(grandparent_pos, neighbor);
            let tentative_path1 = if los_cost.is_finite() {
                g_score[grandparent_idx] + los_cost
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::elevation::ElevationSampler;
    use crate::pathfind::dijkstra;

    #[test]
    fn test_theta_star_open_grid_shortcuts_to_two_point_path() {
        let grid = Grid::new_open(50, 50);
        let elev = ElevationSampler::flat(1.0);
        let model = CostModel::new(&grid, &elev);
        let start = UVec2::new(0, 0);
        let end = UVec2::new(49, 49);
        let result = search(&grid, &model, &CancellationToken::new(), start, end, Heuristic::Euclidean).unwrap();
        assert_eq!(result.indices, vec![grid.idx(0, 0), grid.idx(49, 49)]);
    }

    #[test]
    fn test_theta_star_cost_no_worse_than_dijkstra() {
        let grid = Grid::new_open(20, 20);
        let elev = ElevationSampler::flat(1.0);
        let model = CostModel::new(&grid, &elev);
        let start = UVec2::new(0, 0);
        let end = UVec2::new(19, 7);
        let theta = search(&grid, &model, &CancellationToken::new(), start, end, Heuristic::Euclidean).unwrap();
        let dij = dijkstra::search(&grid, &model, &CancellationToken::new(), start, end).unwrap();
        assert!(theta.cost <= dij.cost + 1e-3);
    }

    #[test]
    fn test_theta_star_wall_is_unreachable() {
        let mut cells = vec![crate::grid::Cell::open(); 11];
        cells[5] = crate::grid::Cell::impassable("201", 0);
        let grid = Grid::from_cells(11, 1, cells);
        let elev = ElevationSampler::flat(1.0);
        let model = CostModel::new(&grid, &elev);
        let result = search(
            &grid,
            &model,
            &CancellationToken::new(),
            UVec2::new(0, 0),
            UVec2::new(10, 0),
            Heuristic::Euclidean,
        );
        assert_eq!(result, Err(PathfindError::NotFound));
    }
}
