use crate::error::RasterWarning;
use crate::feature::{Feature, FeatureCoord, Geometry, Ring};
use crate::grid::Cell;
use crate::normalize::NormalizationRecord;
use crate::obstacle::ObstacleConfig;

/// Bresenham boundary sampling, adapted from the integer midpoint-error
/// line walk used elsewhere in this crate's lineage. Visits every cell
/// from `(x0, y0)` to `(x1, y1)` inclusive of both endpoints.
fn plot_line<F: FnMut(i64, i64)>(x0: i64, y0: i64, x1: i64, y1: i64, mut plot: F) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let mut x = x0;
    let mut y = y0;
    let xi = if x1 < x0 { -1 } else { 1 };
    let yi = if y1 < y0 { -1 } else { 1 };
    let mut err = dx - dy;

    while x != x1 || y != y1 {
        plot(x, y);
        let e2 = err * 2;
        if e2 > -dy {
            err -= dy;
            x += xi;
        }
        if e2 < dx {
            err += dx;
            y += yi;
        }
    }
    plot(x1, y1);
}

/// Look up the symbol's cost multiplier, warning once (per call site) if
/// the code is not present in the `ObstacleConfig` and defaulting to open
/// terrain (`1.0`).
pub(super) fn resolve_multiplier(symbol_code: &str, config: &ObstacleConfig, warnings: &mut Vec<RasterWarning>) -> f32 {
    match config.multiplier(symbol_code) {
        Some(m) => m,
        None => {
            warnings.push(RasterWarning::UnknownSymbol {
                symbol_code: symbol_code.to_string(),
            });
            1.0
        }
    }
}

/// Rasterize one feature's boundary (pass 1): a point stamps a single
/// cell, a polyline draws its open chain of segments, a polygon draws its
/// outer ring and every hole ring, each as a closed loop.
pub(super) fn rasterize_boundary(
    feature: &Feature,
    norm: &NormalizationRecord,
    width: u32,
    height: u32,
    config: &ObstacleConfig,
    layer_idx: u32,
    warnings: &mut Vec<RasterWarning>,
) -> Vec<(usize, Cell)> {
    let mut writes = Vec::new();

    match &feature.geometry {
        Geometry::Point(p) => {
            let (cx, cy) = norm.to_cell(p.x, p.y);
            if in_bounds(cx, cy, width, height) {
                let multiplier = resolve_multiplier(&feature.symbol_code, config, warnings);
                writes.push((
                    cell_index(cx, cy, width),
                    Cell::new(multiplier, feature.symbol_code.clone(), layer_idx),
                ));
            }
        }
        Geometry::Polyline(coords) => {
            if coords.len() < 2 {
                warnings.push(RasterWarning::DegenerateGeometrySkipped {
                    symbol_code: feature.symbol_code.clone(),
                });
                return writes;
            }
            let multiplier = resolve_multiplier(&feature.symbol_code, config, warnings);
            rasterize_chain(coords, false, norm, width, height, multiplier, &feature.symbol_code, layer_idx, &mut writes);
            emit_style_warnings(feature, coords, warnings);
        }
        Geometry::Polygon { outer, holes } => {
            if outer.coords.len() < 3 {
                warnings.push(RasterWarning::DegenerateGeometrySkipped {
                    symbol_code: feature.symbol_code.clone(),
                });
                return writes;
            }
            let multiplier = resolve_multiplier(&feature.symbol_code, config, warnings);
            rasterize_chain(&outer.coords, true, norm, width, height, multiplier, &feature.symbol_code, layer_idx, &mut writes);
            emit_style_warnings(feature, &outer.coords, warnings);
            for hole in holes {
                if hole.coords.len() < 3 {
                    continue;
                }
                rasterize_chain(&hole.coords, true, norm, width, height, multiplier, &feature.symbol_code, layer_idx, &mut writes);
                emit_style_warnings(feature, &hole.coords, warnings);
            }
        }
    }

    writes
}

/// Draw every segment of a coordinate chain, skipping segments flagged as
/// gaps. `closed` also draws the wrap-around segment from the last
/// coordinate back to the first.
#[allow(clippy::too_many_arguments)]
fn rasterize_chain(
    coords: &[FeatureCoord],
    closed: bool,
    norm: &NormalizationRecord,
    width: u32,
    height: u32,
    multiplier: f32,
    symbol_code: &str,
    layer_idx: u32,
    writes: &mut Vec<(usize, Cell)>,
) {
    let n = coords.len();
    let segment_count = if closed { n } else { n - 1 };
    for i in 0..segment_count {
        let from = coords[i];
        let to = coords[(i + 1) % n];
        // The coordinate a segment leads into carries that segment's flags.
        if to.flags.gap {
            continue;
        }
        let (x0, y0) = norm.to_cell(from.point.x, from.point.y);
        let (x1, y1) = norm.to_cell(to.point.x, to.point.y);
        plot_line(x0, y0, x1, y1, |x, y| {
            if in_bounds(x, y, width, height) {
                writes.push((cell_index(x, y, width), Cell::new(multiplier, symbol_code, layer_idx)));
            }
        });
    }
}

/// Warn once per feature about lossy rendering choices: curve control
/// points flattened to straight segments, dash segments rasterized solid.
fn emit_style_warnings(feature: &Feature, coords: &[FeatureCoord], warnings: &mut Vec<RasterWarning>) {
    if coords.iter().any(|c| c.flags.curve_start) {
        warnings.push(RasterWarning::CurveFlattened {
            symbol_code: feature.symbol_code.clone(),
        });
    }
    if coords.iter().any(|c| c.flags.dash) {
        warnings.push(RasterWarning::DashTreatedAsSolid {
            symbol_code: feature.symbol_code.clone(),
        });
    }
}

#[inline]
fn in_bounds(x: i64, y: i64, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}

#[inline]
fn cell_index(x: i64, y: i64, width: u32) -> usize {
    (y as usize) * (width as usize) + (x as usize)
}
