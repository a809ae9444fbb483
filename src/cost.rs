#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::{UVec2, Vec2};

use crate::elevation::ElevationSampler;
use crate::grid::{Grid, IMPASSABLE};

/// Tobler's hiking-function shift: a small positive bias favoring slight
/// descents. Preserved verbatim — see the design notes on slope sign
/// convention; implementers should not "correct" it.
const SLOPE_SHIFT: f32 = 0.05;
const SLOPE_STEEPNESS: f32 = 3.5;

/// The empirical lower bound on combined terrain × slope_penalty, used to
/// scale the octile distance into an admissible [`Heuristic::MinCost`]
/// estimate.
const MIN_COST_FACTOR: f32 = 0.8;

const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// A* heuristic selector. Ignored by BFS and Dijkstra.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    Euclidean,
    Manhattan,
    Diagonal,
    MinCost,
}

impl Heuristic {
    /// Estimate the remaining cost from `from` to `goal`, in the same
    /// units as [`CostModel::edge_cost`].
    #[must_use]
    pub fn estimate(&self, from: UVec2, goal: UVec2, log_cell_m: f32) -> f32 {
        let dx = (from.x as f32 - goal.x as f32).abs();
        let dy = (from.y as f32 - goal.y as f32).abs();
        match self {
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt() * log_cell_m,
            Heuristic::Manhattan => (dx + dy) * log_cell_m,
            Heuristic::Diagonal => octile_distance(dx, dy) * log_cell_m,
            Heuristic::MinCost => octile_distance(dx, dy) * log_cell_m * MIN_COST_FACTOR,
        }
    }
}

#[inline]
fn octile_distance(dx: f32, dy: f32) -> f32 {
    (dx + dy) + (SQRT_2 - 2.0) * dx.min(dy)
}

/// Pure function computing the cost of traversing between cells, combining
/// geometric distance, terrain multiplier, and a slope penalty derived
/// from Tobler's hiking function. Holds only the inputs every edge
/// evaluation needs; carries no mutable state, so a single instance is
/// freely shared across concurrent pathfinder calls.
#[derive(Debug, Clone, Copy)]
pub struct CostModel<'a> {
    grid: &'a Grid,
    elevation: &'a ElevationSampler,
}

impl<'a> CostModel<'a> {
    #[inline]
    #[must_use]
    pub fn new(grid: &'a Grid, elevation: &'a ElevationSampler) -> Self {
        Self { grid, elevation }
    }

    #[inline]
    #[must_use]
    pub fn log_cell_m(&self) -> f32 {
        self.elevation.log_cell_m()
    }

    /// Cost of the 8-connected edge between adjacent cells `a` and `b`.
    /// `+∞` if either endpoint is impassable.
    #[must_use]
    pub fn edge_cost(&self, a: UVec2, b: UVec2) -> f32 {
        let cell_a = self.grid.cell(a.x, a.y);
        let cell_b = self.grid.cell(b.x, b.y);
        if cell_a.is_impassable() || cell_b.is_impassable() {
            return IMPASSABLE;
        }

        let diagonal = a.x != b.x && a.y != b.y;
        let distance_cells = if diagonal { SQRT_2 } else { 1.0 };
        let distance_m = distance_cells * self.log_cell_m();

        self.segment_cost(
            cell_center(a),
            cell_center(b),
            distance_m,
            cell_a.multiplier(),
            cell_b.multiplier(),
        )
    }

    /// Cost of the straight line-of-sight segment between (possibly
    /// non-adjacent) cells `a` and `b`, sampled at a stride of at most one
    /// logical cell and aggregated trapezoidally. `+∞` if any sampled
    /// point falls on an impassable cell.
    #[must_use]
    pub fn line_of_sight_cost(&self, a: UVec2, b: UVec2) -> f32 {
        let pa = cell_center(a);
        let pb = cell_center(b);
        let length = pa.distance(pb);
        if length <= f32::EPSILON {
            return 0.0;
        }

        let steps = length.ceil().max(1.0) as u32;
        let mut samples: Vec<(Vec2, f32)> = Vec::with_capacity(steps as usize + 1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let point = pa.lerp(pb, t);
            let gx = point.x.floor().max(0.0) as u32;
            let gy = point.y.floor().max(0.0) as u32;
            if !self.grid.in_bounds_u(UVec2::new(gx, gy)) {
                return IMPASSABLE;
            }
            let cell = self.grid.cell(gx, gy);
            if cell.is_impassable() {
                return IMPASSABLE;
            }
            samples.push((point, cell.multiplier()));
        }

        let mut total = 0.0f32;
        for pair in samples.windows(2) {
            let (p0, m0) = pair[0];
            let (p1, m1) = pair[1];
            let sub_distance_m = p0.distance(p1) * self.log_cell_m();
            let cost = self.segment_cost(p0, p1, sub_distance_m, m0, m1);
            if !cost.is_finite() {
                return IMPASSABLE;
            }
            total += cost;
        }
        total
    }

    /// Unverified straight-line cost estimate between arbitrary (possibly
    /// distant, possibly occluded) cells `a` and `b`, used by Lazy Theta*
    /// to assign a tentative parent without paying for full line-of-sight
    /// sampling. Reads only the two endpoints' multipliers and
    /// elevations; does not check that the cells in between are
    /// traversable. Callers that need that guarantee should follow up
    /// with [`CostModel::line_of_sight_cost`].
    #[must_use]
    pub fn direct_cost(&self, a: UVec2, b: UVec2) -> f32 {
        let pa = cell_center(a);
        let pb = cell_center(b);
        let distance_m = pa.distance(pb) * self.log_cell_m();
        let m_a = self.grid.cell(a.x, a.y).multiplier();
        let m_b = self.grid.cell(b.x, b.y).multiplier();
        if !m_a.is_finite() || !m_b.is_finite() {
            return IMPASSABLE;
        }
        self.segment_cost(pa, pb, distance_m, m_a, m_b)
    }

    /// Shared arithmetic for a single sub-segment: distance already
    /// resolved to meters, multipliers already resolved at each endpoint.
    fn segment_cost(&self, pa: Vec2, pb: Vec2, distance_m: f32, m_a: f32, m_b: f32) -> f32 {
        if distance_m <= 0.0 {
            return 0.0;
        }
        let elev_a = self.elevation.elevation_at(pa.x, pa.y);
        let elev_b = self.elevation.elevation_at(pb.x, pb.y);
        let slope = (elev_b - elev_a) / distance_m;
        let slope_penalty = (-SLOPE_STEEPNESS * (slope + SLOPE_SHIFT).abs()).exp();
        let terrain = 0.5 * (m_a + m_b);
        distance_m * terrain / slope_penalty
    }
}

#[inline]
#[must_use]
fn cell_center(cell: UVec2) -> Vec2 {
    Vec2::new(cell.x as f32 + 0.5, cell.y as f32 + 0.5)
}
