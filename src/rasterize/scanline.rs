use crate::feature::Ring;
use crate::grid::Cell;
use crate::normalize::NormalizationRecord;

/// One edge of a ring, in continuous grid-cell units, spanning row range
/// `[ystart, yend)`.
struct PolyEdge {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    ystart: u32,
    yend: u32,
    x_at_yline: f32,
}

impl PolyEdge {
    /// x-intercept of this edge at the horizontal line through the center
    /// of row `yline`.
    #[inline]
    fn intersect_at(&self, yline: u32) -> f32 {
        let y = yline as f32 + 0.5;
        self.x0 + (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0)
    }
}

fn ring_edges(ring: &Ring, norm: &NormalizationRecord, height: u32) -> Vec<PolyEdge> {
    let n = ring.coords.len();
    let mut edges = Vec::with_capacity(n);
    for i in 0..n {
        let a = ring.coords[i].point;
        let b = ring.coords[(i + 1) % n].point;
        let pa = norm.to_grid(a.x, a.y);
        let pb = norm.to_grid(b.x, b.y);
        if (pa.y - pb.y).abs() <= f32::EPSILON {
            continue; // horizontal edges contribute no scanline crossings
        }
        let ystart = pa.y.min(pb.y).floor().max(0.0) as u32;
        let yend = pa.y.max(pb.y).ceil().min(height as f32) as u32;
        if ystart >= yend {
            continue;
        }
        edges.push(PolyEdge {
            x0: pa.x,
            y0: pa.y,
            x1: pb.x,
            y1: pb.y,
            ystart,
            yend,
            x_at_yline: 0.0,
        });
    }
    edges
}

/// Even-odd scanline fill of `outer` minus `holes` (pass 2). Active-edge-
/// list sweep directly adapted from this crate's map-rasterization
/// lineage: edges are brought into the active set as the sweep line
/// reaches their start row, retired once it passes their end row, and
/// filled in sorted pairs.
pub(super) fn fill_polygon(
    outer: &Ring,
    holes: &[Ring],
    norm: &NormalizationRecord,
    width: u32,
    height: u32,
    multiplier: f32,
    symbol_code: &str,
    layer_idx: u32,
) -> Vec<(usize, Cell)> {
    let mut edges = ring_edges(outer, norm, height);
    for hole in holes {
        edges.extend(ring_edges(hole, norm, height));
    }
    if edges.is_empty() {
        return Vec::new();
    }

    edges.sort_by_key(|e| e.ystart);

    let mut writes = Vec::new();
    let mut active: Vec<PolyEdge> = Vec::new();
    let ncols = width as f32;

    let mut yline = edges[0].ystart;
    while yline < height && (!active.is_empty() || !edges.is_empty()) {
        let split_idx = edges.partition_point(|e| e.ystart <= yline);
        active.extend(edges.drain(..split_idx));
        active.retain(|e| e.yend > yline);
        if active.is_empty() {
            yline += 1;
            continue;
        }

        for edge in active.iter_mut() {
            edge.x_at_yline = edge.intersect_at(yline);
        }
        active.sort_by(|a, b| a.x_at_yline.partial_cmp(&b.x_at_yline).unwrap_or(std::cmp::Ordering::Equal));

        for pair in active.chunks_exact(2) {
            let x1 = pair[0].x_at_yline;
            let x2 = pair[1].x_at_yline;
            let xstart = (x1 + 0.5).floor().clamp(0.0, ncols) as u32;
            let xend = (x2 + 0.5).floor().clamp(0.0, ncols) as u32;
            for x in xstart..xend {
                writes.push((
                    (yline as usize) * (width as usize) + x as usize,
                    Cell::new(multiplier, symbol_code, layer_idx),
                ));
            }
        }

        yline += 1;
    }

    writes
}
