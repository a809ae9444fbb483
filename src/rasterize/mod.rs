mod boundary;
mod scanline;

use fxhash::FxHashMap;
use log::debug;
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::error::{CoreError, RasterWarning};
use crate::feature::{Feature, Geometry};
use crate::grid::{Cell, Grid};
use crate::normalize::NormalizationRecord;
use crate::obstacle::ObstacleConfig;

/// Produce the cost grid from parsed `Feature`s plus an `ObstacleConfig`,
/// via the two-pass boundary-then-fill algorithm. `layer_order` gives the
/// caller-supplied precedence among layers: index 0 is lowest priority.
/// Features tagged with a layer name absent from `layer_order` are treated
/// as layer 0.
///
/// # Errors
/// Returns [`CoreError::Cancelled`] if `cancel` is observed set during
/// rasterization; any work already merged into the grid is discarded.
pub fn rasterize(
    features: &[Feature],
    config: &ObstacleConfig,
    norm: &NormalizationRecord,
    width: u32,
    height: u32,
    layer_order: &[String],
    cancel: &CancellationToken,
) -> Result<(Grid, Vec<RasterWarning>), CoreError> {
    let layer_index: FxHashMap<&str, u32> = layer_order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i as u32))
        .collect();

    debug!(
        "rasterizing {} features across {} layers into a {}x{} grid",
        features.len(),
        layer_order.len(),
        width,
        height
    );

    let mut cells = vec![Cell::open(); width as usize * height as usize];
    let mut warnings = Vec::new();

    // Pass 1: boundary rasterization, embarrassingly parallel per feature.
    // Each feature writes into its own scratch buffer; buffers are merged
    // sequentially afterward in (layer order, document order).
    let mut boundary_results: Vec<(u32, Vec<(usize, Cell)>, Vec<RasterWarning>)> = features
        .par_iter()
        .map(|feature| {
            if cancel.is_cancelled() {
                return (0u32, Vec::new(), Vec::new());
            }
            let layer_idx = layer_index.get(feature.layer.as_str()).copied().unwrap_or(0);
            let mut local_warnings = Vec::new();
            let writes = boundary::rasterize_boundary(feature, norm, width, height, config, layer_idx, &mut local_warnings);
            (layer_idx, writes, local_warnings)
        })
        .collect();

    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }

    boundary_results.sort_by_key(|(layer_idx, _, _)| *layer_idx);
    for (_, writes, local_warnings) in boundary_results {
        for (index, cell) in writes {
            apply_write(&mut cells, index, cell);
        }
        warnings.extend(local_warnings);
    }

    // Pass 2: scanline area fill for closed, non-degenerate polygons.
    let mut polygon_results: Vec<(u32, Vec<(usize, Cell)>, Vec<RasterWarning>)> = features
        .par_iter()
        .filter_map(|feature| match &feature.geometry {
            Geometry::Polygon { outer, holes } => Some((feature, outer, holes)),
            _ => None,
        })
        .map(|(feature, outer, holes)| {
            if cancel.is_cancelled() {
                return (0u32, Vec::new(), Vec::new());
            }
            let layer_idx = layer_index.get(feature.layer.as_str()).copied().unwrap_or(0);
            let mut local_warnings = Vec::new();
            if outer.signed_area_x2().abs() <= f32::EPSILON {
                local_warnings.push(RasterWarning::DegenerateGeometrySkipped {
                    symbol_code: feature.symbol_code.clone(),
                });
                return (layer_idx, Vec::new(), local_warnings);
            }
            let multiplier = boundary::resolve_multiplier(&feature.symbol_code, config, &mut local_warnings);
            let writes = scanline::fill_polygon(outer, holes, norm, width, height, multiplier, &feature.symbol_code, layer_idx);
            (layer_idx, writes, local_warnings)
        })
        .collect();

    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }

    polygon_results.sort_by_key(|(layer_idx, _, _)| *layer_idx);
    for (_, writes, local_warnings) in polygon_results {
        for (index, cell) in writes {
            apply_write(&mut cells, index, cell);
        }
        warnings.extend(local_warnings);
    }

    debug!("rasterization complete: {} warnings", warnings.len());
    Ok((Grid::from_cells(width, height, cells), warnings))
}

/// Merge a single scratch write into the grid under construction, enforcing
/// the precedence rule: impassable dominates finite multipliers regardless
/// of write order; among finite writes, last write (in caller-supplied
/// merge order) wins.
#[inline]
fn apply_write(cells: &mut [Cell], index: usize, candidate: Cell) {
    if cells[index].is_impassable() {
        return;
    }
    cells[index] = candidate;
}

/// Reference merge used only to check the parallel merge in [`rasterize`]
/// against a strictly sequential one over the same per-feature writes.
/// Mirrors `rasterize`'s two passes with `.iter()` in place of `.par_iter()`;
/// everything else (sort-by-layer, then merge in that order) is identical.
#[cfg(test)]
fn rasterize_serial(
    features: &[Feature],
    config: &ObstacleConfig,
    norm: &NormalizationRecord,
    width: u32,
    height: u32,
    layer_order: &[String],
) -> Grid {
    let layer_index: FxHashMap<&str, u32> = layer_order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i as u32))
        .collect();

    let mut cells = vec![Cell::open(); width as usize * height as usize];

    let mut boundary_results: Vec<(u32, Vec<(usize, Cell)>, Vec<RasterWarning>)> = features
        .iter()
        .map(|feature| {
            let layer_idx = layer_index.get(feature.layer.as_str()).copied().unwrap_or(0);
            let mut local_warnings = Vec::new();
            let writes = boundary::rasterize_boundary(feature, norm, width, height, config, layer_idx, &mut local_warnings);
            (layer_idx, writes, local_warnings)
        })
        .collect();
    boundary_results.sort_by_key(|(layer_idx, _, _)| *layer_idx);
    for (_, writes, _) in boundary_results {
        for (index, cell) in writes {
            apply_write(&mut cells, index, cell);
        }
    }

    let mut polygon_results: Vec<(u32, Vec<(usize, Cell)>, Vec<RasterWarning>)> = features
        .iter()
        .filter_map(|feature| match &feature.geometry {
            Geometry::Polygon { outer, holes } => Some((feature, outer, holes)),
            _ => None,
        })
        .map(|(feature, outer, holes)| {
            let layer_idx = layer_index.get(feature.layer.as_str()).copied().unwrap_or(0);
            let mut local_warnings = Vec::new();
            if outer.signed_area_x2().abs() <= f32::EPSILON {
                return (layer_idx, Vec::new(), local_warnings);
            }
            let multiplier = boundary::resolve_multiplier(&feature.symbol_code, config, &mut local_warnings);
            let writes = scanline::fill_polygon(outer, holes, norm, width, height, multiplier, &feature.symbol_code, layer_idx);
            (layer_idx, writes, local_warnings)
        })
        .collect();
    polygon_results.sort_by_key(|(layer_idx, _, _)| *layer_idx);
    for (_, writes, _) in polygon_results {
        for (index, cell) in writes {
            apply_write(&mut cells, index, cell);
        }
    }

    Grid::from_cells(width, height, cells)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feature::{CoordFlags, FeatureCoord, Ring};
    use bevy_math::vec2;
    use proptest::prelude::*;

    fn coord(x: f32, y: f32) -> FeatureCoord {
        FeatureCoord {
            point: vec2(x, y),
            flags: CoordFlags::default(),
        }
    }

    /// A handful of overlapping point/line/area features spread across three
    /// layers, so the precedence rule (impassable dominates, then layer
    /// order, then document order) actually gets exercised by the merge.
    fn arb_feature() -> impl Strategy<Value = Feature> {
        let layer = prop_oneof![Just("vegetation"), Just("terrain"), Just("control")];
        let symbol = prop_oneof![Just("201"), Just("403"), Just("530"), Just("999")];
        let point = (0.0f32..10.0, 0.0f32..10.0).prop_map(|(x, y)| Geometry::Point(vec2(x, y)));
        let line = prop::collection::vec((0.0f32..10.0, 0.0f32..10.0), 2..5)
            .prop_map(|pts| Geometry::Polyline(pts.into_iter().map(|(x, y)| coord(x, y)).collect()));
        let area = (0.0f32..5.0, 0.0f32..5.0, 2.0f32..5.0).prop_map(|(x0, y0, side)| Geometry::Polygon {
            outer: Ring::new(vec![
                coord(x0, y0),
                coord(x0 + side, y0),
                coord(x0 + side, y0 + side),
                coord(x0, y0 + side),
            ]),
            holes: vec![],
        });
        (layer, symbol, prop_oneof![point, line, area])
            .prop_map(|(layer, symbol, geometry)| Feature::new(symbol, layer, geometry))
    }

    proptest! {
        #[test]
        fn prop_parallel_merge_matches_serial_merge(features in prop::collection::vec(arb_feature(), 1..12)) {
            let norm = NormalizationRecord::compute(0.0, 0.0, 10.0, 10.0, 10, 10).unwrap();
            let config = ObstacleConfig::from_pairs([("201", -1.0), ("403", 2.0), ("530", 1.5)]);
            let layer_order = vec!["vegetation".to_string(), "terrain".to_string(), "control".to_string()];

            let (parallel_grid, _) = rasterize(&features, &config, &norm, 10, 10, &layer_order, &CancellationToken::new()).unwrap();
            let serial_grid = rasterize_serial(&features, &config, &norm, 10, 10, &layer_order);

            prop_assert_eq!(parallel_grid, serial_grid);
        }
    }

    #[test]
    fn test_point_feature_stamps_single_cell() {
        let norm = NormalizationRecord::compute(0.0, 0.0, 10.0, 10.0, 10, 10).unwrap();
        let feature = Feature::new("530", "control", Geometry::Point(vec2(5.5, 5.5)));
        let config = ObstacleConfig::from_pairs([("530", 3.0)]);
        let (grid, warnings) = rasterize(
            &[feature],
            &config,
            &norm,
            10,
            10,
            &["control".to_string()],
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(grid.cell(5, 5).multiplier(), 3.0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_impassable_dominates_later_finite_write() {
        let norm = NormalizationRecord::compute(0.0, 0.0, 10.0, 10.0, 10, 10).unwrap();
        let wall = Feature::new(
            "201",
            "vegetation",
            Geometry::Polyline(vec![coord(2.0, 5.0), coord(8.0, 5.0)]),
        );
        let open_area = Feature::new(
            "403",
            "terrain",
            Geometry::Polygon {
                outer: Ring::new(vec![coord(0.0, 0.0), coord(10.0, 0.0), coord(10.0, 10.0), coord(0.0, 10.0)]),
                holes: vec![],
            },
        );
        let config = ObstacleConfig::from_pairs([("201", -1.0), ("403", 2.0)]);
        // Layer order places "terrain" (the fill) after "vegetation" (the
        // wall), yet impassable must still dominate.
        let (grid, _) = rasterize(
            &[wall, open_area],
            &config,
            &norm,
            10,
            10,
            &["vegetation".to_string(), "terrain".to_string()],
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(grid.cell(5, 5).is_impassable());
        assert_eq!(grid.cell(1, 1).multiplier(), 2.0);
    }

    #[test]
    fn test_unknown_symbol_warns_and_defaults_open() {
        let norm = NormalizationRecord::compute(0.0, 0.0, 10.0, 10.0, 10, 10).unwrap();
        let feature = Feature::new("999", "control", Geometry::Point(vec2(3.0, 3.0)));
        let config = ObstacleConfig::new();
        let (grid, warnings) = rasterize(
            &[feature],
            &config,
            &norm,
            10,
            10,
            &["control".to_string()],
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(grid.cell(3, 3).multiplier(), 1.0);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, RasterWarning::UnknownSymbol { symbol_code } if symbol_code == "999")));
    }

    #[test]
    fn test_cancelled_before_merge_returns_cancelled() {
        let norm = NormalizationRecord::compute(0.0, 0.0, 10.0, 10.0, 10, 10).unwrap();
        let feature = Feature::new("530", "control", Geometry::Point(vec2(5.0, 5.0)));
        let config = ObstacleConfig::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = rasterize(&[feature], &config, &norm, 10, 10, &["control".to_string()], &cancel);
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }
}
