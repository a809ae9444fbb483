//! Black-box end-to-end scenarios against the public API. Grids and
//! elevation fields are constructed directly, bypassing the Map Reader,
//! since these scenarios are specified in grid terms.

use bevy_math::UVec2;
use orienteer_path::{
    find_path, AlgorithmTag, Cell, CoreError, CostModel, ElevationAlignment, ElevationField,
    ElevationSampler, Grid, Heuristic, PathOptions, PathfindError,
};

fn flat(_grid: &Grid) -> ElevationSampler {
    ElevationSampler::flat(1.0)
}

#[test]
fn scenario_1_flat_diagonal_astar_euclidean() {
    let grid = Grid::new_open(10, 10);
    let elev = flat(&grid);
    let model = CostModel::new(&grid, &elev);
    let options = PathOptions::new(AlgorithmTag::AStar, Heuristic::Euclidean);
    let path = find_path(
        &grid,
        &model,
        UVec2::new(0, 0),
        UVec2::new(9, 9),
        &options,
        &Default::default(),
    )
    .unwrap();

    assert_eq!(path.len(), 10);
    assert_eq!(path.first(), Some(grid.idx(0, 0)));
    assert_eq!(path.last(), Some(grid.idx(9, 9)));
    for pair in path.indices.windows(2) {
        let a = grid.xy(pair[0]);
        let b = grid.xy(pair[1]);
        assert_eq!(b.x, a.x + 1);
        assert_eq!(b.y, a.y + 1);
    }
    let expected = 9.0 * std::f32::consts::SQRT_2;
    assert!((path.cost - expected).abs() < 1e-3, "cost {} vs {expected}", path.cost);
}

#[test]
fn scenario_2_single_wall_blocks_segment() {
    let mut cells = vec![Cell::open(); 11];
    cells[5] = Cell::impassable("201", 0);
    let grid = Grid::from_cells(11, 1, cells);
    let elev = flat(&grid);
    let model = CostModel::new(&grid, &elev);
    let options = PathOptions::default();
    let result = find_path(
        &grid,
        &model,
        UVec2::new(0, 0),
        UVec2::new(10, 0),
        &options,
        &Default::default(),
    );
    assert_eq!(result, Err(PathfindError::NotFound));
}

#[test]
fn scenario_3_wall_with_gap_is_passable_through_the_gap() {
    let mut cells = vec![Cell::open(); 11 * 3];
    for y in 0..3u32 {
        if y != 0 {
            cells[(y as usize) * 11 + 5] = Cell::impassable("201", 0);
        }
    }
    let grid = Grid::from_cells(11, 3, cells);
    let elev = flat(&grid);
    let model = CostModel::new(&grid, &elev);
    let options = PathOptions::default();
    let path = find_path(
        &grid,
        &model,
        UVec2::new(0, 0),
        UVec2::new(10, 0),
        &options,
        &Default::default(),
    )
    .unwrap();
    assert!(path.indices.contains(&grid.idx(5, 0)));
}

#[test]
fn scenario_4_dijkstra_and_astar_agree_on_flat_terrain() {
    let grid = Grid::new_open(100, 100);
    let elev = flat(&grid);
    let model = CostModel::new(&grid, &elev);
    let start = UVec2::new(0, 0);
    let end = UVec2::new(99, 99);

    let dijkstra = find_path(
        &grid,
        &model,
        start,
        end,
        &PathOptions::new(AlgorithmTag::Dijkstra, Heuristic::Euclidean),
        &Default::default(),
    )
    .unwrap();
    let astar = find_path(
        &grid,
        &model,
        start,
        end,
        &PathOptions::new(AlgorithmTag::AStar, Heuristic::Euclidean),
        &Default::default(),
    )
    .unwrap();

    assert!((dijkstra.cost - astar.cost).abs() < 1e-4, "{} vs {}", dijkstra.cost, astar.cost);
}

#[test]
fn scenario_5_uniform_slope_matches_closed_form_cost() {
    // 100 elevation samples, one per column, rising 10% of a 1m cell per step.
    let values: Vec<f32> = (0..100).map(|x| x as f32 * 0.10).collect();
    let field = ElevationField::new(100, 1, values, 0.0, 0.0, 1.0);
    let elev = ElevationSampler::new(field, ElevationAlignment::identity(1.0));
    let grid = Grid::new_open(100, 1);
    let model = CostModel::new(&grid, &elev);
    let options = PathOptions::new(AlgorithmTag::Dijkstra, Heuristic::Euclidean);
    let path = find_path(
        &grid,
        &model,
        UVec2::new(0, 0),
        UVec2::new(99, 0),
        &options,
        &Default::default(),
    )
    .unwrap();

    let log_cell_m = 1.0f32;
    let expected = 99.0 * log_cell_m * 1.0 / (-3.5f32 * (0.10f32 + 0.05).abs()).exp();
    assert!((path.cost - expected).abs() < 1e-2, "{} vs {expected}", path.cost);
}

#[test]
fn scenario_6_theta_star_open_grid_shortcuts_to_two_points() {
    let grid = Grid::new_open(50, 50);
    let elev = flat(&grid);
    let model = CostModel::new(&grid, &elev);
    let options = PathOptions::new(AlgorithmTag::ThetaStar, Heuristic::Euclidean);
    let path = find_path(
        &grid,
        &model,
        UVec2::new(0, 0),
        UVec2::new(49, 49),
        &options,
        &Default::default(),
    )
    .unwrap();
    assert_eq!(path.indices, vec![grid.idx(0, 0), grid.idx(49, 49)]);
}

#[test]
fn invalid_waypoint_is_rejected_before_search() {
    let mut cells = vec![Cell::open(); 16];
    cells[0] = Cell::impassable("201", 0);
    let grid = Grid::from_cells(4, 4, cells);
    let elev = flat(&grid);
    let model = CostModel::new(&grid, &elev);
    let result = find_path(
        &grid,
        &model,
        UVec2::new(0, 0),
        UVec2::new(3, 3),
        &PathOptions::default(),
        &Default::default(),
    );
    assert_eq!(result, Err(PathfindError::NotFound));
}

#[test]
fn start_equals_end_returns_single_index_path() {
    let grid = Grid::new_open(5, 5);
    let elev = flat(&grid);
    let model = CostModel::new(&grid, &elev);
    let path = find_path(
        &grid,
        &model,
        UVec2::new(2, 2),
        UVec2::new(2, 2),
        &PathOptions::default(),
        &Default::default(),
    )
    .unwrap();
    assert_eq!(path.indices, vec![grid.idx(2, 2)]);
}

#[test]
fn obstacle_config_bad_line_is_reported_with_line_number() {
    let result = orienteer_path::ObstacleConfig::parse("201: 2.0\nnonsense\n");
    assert!(matches!(result, Err(CoreError::BadConfig { line: 2, .. })));
}
