mod astar;
mod bfs;
mod dijkstra;
mod lazy_theta_star;
mod theta_star;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_math::UVec2;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::cost::{CostModel, Heuristic};
use crate::direction::Direction;
use crate::grid::Grid;

/// The closed set of pathfinding algorithms this core dispatches between.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmTag {
    Bfs,
    Dijkstra,
    AStar,
    ThetaStar,
    LazyThetaStar,
}

/// Per-call pathfinder configuration. `heuristic` is ignored by `Bfs` and
/// `Dijkstra`.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOptions {
    pub algorithm: AlgorithmTag,
    pub heuristic: Heuristic,
}

impl PathOptions {
    #[inline]
    #[must_use]
    pub fn new(algorithm: AlgorithmTag, heuristic: Heuristic) -> Self {
        Self { algorithm, heuristic }
    }
}

impl Default for PathOptions {
    #[inline]
    fn default() -> Self {
        Self::new(AlgorithmTag::AStar, Heuristic::Euclidean)
    }
}

/// Why a pathfinder call did not produce a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathfindError {
    /// The open set was exhausted without reaching the goal.
    NotFound,
    /// Cooperative cancellation was observed mid-search.
    Cancelled,
}

/// A successful pathfinder result: the row-major cell indices from start to
/// goal (inclusive), the total traversal cost, and the number of cells
/// examined (a diagnostic, not part of the path semantics).
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub indices: Vec<usize>,
    pub cost: f32,
    pub considered: u32,
}

impl Path {
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

pub type PathfindResult = Result<Path, PathfindError>;

/// Dispatch to the algorithm named by `options.algorithm`.
///
/// If `start == end`, returns a single-cell path immediately. If either
/// endpoint is out of bounds or impassable, returns
/// [`PathfindError::NotFound`].
pub fn find_path(
    grid: &Grid,
    cost_model: &CostModel,
    start: UVec2,
    end: UVec2,
    options: &PathOptions,
    cancel: &CancellationToken,
) -> PathfindResult {
    if !endpoint_valid(grid, start) || !endpoint_valid(grid, end) {
        return Err(PathfindError::NotFound);
    }
    if start == end {
        return Ok(Path {
            indices: vec![grid.idx(start.x, start.y)],
            cost: 0.0,
            considered: 1,
        });
    }
    match options.algorithm {
        AlgorithmTag::Bfs => bfs::search(grid, cancel, start, end),
        AlgorithmTag::Dijkstra => dijkstra::search(grid, cost_model, cancel, start, end),
        AlgorithmTag::AStar => astar::search(grid, cost_model, cancel, start, end, options.heuristic),
        AlgorithmTag::ThetaStar => theta_star::search(grid, cost_model, cancel, start, end, options.heuristic),
        AlgorithmTag::LazyThetaStar => {
            lazy_theta_star::search(grid, cost_model, cancel, start, end, options.heuristic)
        }
    }
}

#[inline]
fn endpoint_valid(grid: &Grid, p: UVec2) -> bool {
    grid.in_bounds_u(p) && !grid.cell(p.x, p.y).is_impassable()
}

/// Enumerate the in-bounds 8-connected neighbors of `p`, in a fixed
/// deterministic direction order.
pub(crate) fn neighbors8(grid: &Grid, p: UVec2) -> impl Iterator<Item = UVec2> + '_ {
    Direction::ALL.iter().filter_map(move |d| {
        let moved = d.move_point(p.as_ivec2(), 1);
        if grid.in_bounds(moved.x as i64, moved.y as i64) {
            Some(UVec2::new(moved.x as u32, moved.y as u32))
        } else {
            None
        }
    })
}

/// Walk the min-index parent chain of (cell) to the root entry and reverse
/// it, yielding cell indices from start to `cell`.
pub(crate) fn reconstruct_indices(grid: &Grid, parent: &[i64], goal: UVec2) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = grid.idx(goal.x, goal.y);
    loop {
        path.push(current);
        let p = parent[current];
        if p < 0 {
            break;
        }
        current = p as usize;
    }
    path.reverse();
    path
}

/// A min-heap entry ordering first by estimated total cost (`f = g + h`),
/// then by heuristic (lower preferred, per the tie-breaking rule), then by
/// insertion order (earlier preferred) for determinism.
///
/// `BinaryHeap` is a max-heap, so comparisons here are inverted relative to
/// the natural "smaller is better" reading — the same trick used by the
/// textbook adaptation this crate's A* is built on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeapEntry {
    pub estimated_cost: f32,
    pub heuristic: f32,
    pub seq: u32,
    pub cell_index: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost == other.estimated_cost
            && self.heuristic == other.heuristic
            && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match other
            .estimated_cost
            .partial_cmp(&self.estimated_cost)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => match other.heuristic.partial_cmp(&self.heuristic).unwrap_or(Ordering::Equal) {
                Ordering::Equal => other.seq.cmp(&self.seq),
                ord => ord,
            },
            ord => ord,
        }
    }
}

pub(crate) type Frontier = BinaryHeap<HeapEntry>;
