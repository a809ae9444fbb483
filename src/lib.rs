//! Orienteer Path
//! ==============
//!
//! A weighted pathfinding core for orienteering maps: an ISOM-2017-2 map
//! document and an elevation raster go in, a time-optimal route through a
//! caller-supplied list of waypoints comes out. Traversal cost combines
//! geometric distance, per-symbol terrain multipliers, and a slope penalty
//! derived from Tobler's hiking function.
//!
//! The pipeline is four independent stages, each usable on its own:
//! [`map_reader`] parses the map document, [`rasterize`] burns its features
//! into a [`grid::Grid`] of per-cell cost multipliers, [`cost`] evaluates
//! edge and line-of-sight costs over that grid against an
//! [`elevation::ElevationSampler`], and [`pathfind`] searches it. The
//! [`orchestrator`] ties a caller's waypoint list to the pathfinder, one
//! segment at a time.

mod cancel;
mod cost;
mod direction;
mod elevation;
mod error;
mod feature;
mod grid;
mod map_reader;
mod normalize;
mod obstacle;
mod orchestrator;
mod pathfind;
mod rasterize;

pub use cancel::CancellationToken;
pub use cost::{CostModel, Heuristic};
pub use direction::Direction;
pub use elevation::{ElevationAlignment, ElevationField, ElevationSampler};
pub use error::{CoreError, MapLoadError, RasterWarning};
pub use feature::{CoordFlags, Feature, FeatureCoord, Geometry, Ring};
pub use grid::{Cell, Grid, IMPASSABLE};
pub use map_reader::{read_map, Georeferencing, MapDocument};
pub use normalize::NormalizationRecord;
pub use obstacle::ObstacleConfig;
pub use orchestrator::plan_route;
pub use pathfind::{find_path, AlgorithmTag, Path, PathOptions, PathfindError, PathfindResult};
pub use rasterize::rasterize;
