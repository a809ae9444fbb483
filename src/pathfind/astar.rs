use bevy_math::UVec2;

use super::{neighbors8, reconstruct_indices, Frontier, HeapEntry, Path, PathfindError, PathfindResult};
use crate::cancel::CancellationToken;
use crate::cost::{CostModel, Heuristic};
use crate::grid::Grid;

/// Best-first A*: the same expansion as Dijkstra, but ordered by
/// `g(n) + h(n, goal)` so the search is guided toward the goal.
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
    fn test_astar_matches_dijkstra_cost_on_flat_grid() {
        let grid = Grid::new_open(12, 12);
        let elev = ElevationSampler::flat(1.0);
        let model = CostModel::new(&grid, &elev);
        let start = UVec2::new(1, 1);
        let end = UVec2::new(10, 8);

        let a_star = search(&grid, &model, &CancellationToken::new(), start, end, Heuristic::Euclidean).unwrap();
        let dij = dijkstra::search(&grid, &model, &CancellationToken::new(), start, end).unwrap();
        assert!((a_star.cost - dij.cost).abs() < 1e-4);
    }

    #[test]
    fn test_astar_min_cost_heuristic_also_matches() {
        let grid = Grid::new_open(12, 12);
        let elev = ElevationSampler::flat(1.0);
        let model = CostModel::new(&grid, &elev);
        let start = UVec2::new(0, 0);
        let end = UVec2::new(11, 11);

        let a_star = search(&grid, &model, &CancellationToken::new(), start, end, Heuristic::MinCost).unwrap();
        let dij = dijkstra::search(&grid, &model, &CancellationToken::new(), start, end).unwrap();
        assert!((a_star.cost - dij.cost).abs() < 1e-4);
    }

    #[test]
    fn test_astar_wall_is_unreachable() {
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
