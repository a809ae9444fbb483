use std::collections::HashSet;
use std::io::BufRead;

use bevy_math::{vec2, Vec2};
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{CoreError, MapLoadError};
use crate::feature::{CoordFlags, Feature, FeatureCoord, Geometry, Ring};

/// Georeferencing anchor, if the map document carried one: a real-world
/// reference point paired with its internal-unit anchor, plus the map
/// scale denominator (e.g. `10000` for 1:10000).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Georeferencing {
    pub ref_lat: f64,
    pub ref_lon: f64,
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub scale: u32,
}

/// The result of reading a map document: features restricted to the
/// requested layers, and optional georeferencing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapDocument {
    pub features: Vec<Feature>,
    pub georeferencing: Option<Georeferencing>,
}

impl MapDocument {
    /// The bounding rectangle of every coordinate across every parsed
    /// feature (polygon holes included), in internal units, as `(u_min,
    /// v_min, u_max, v_max)`. Feeds directly into
    /// [`crate::normalize::NormalizationRecord::compute`]. `None` if no
    /// feature carries any coordinate.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<(f32, f32, f32, f32)> {
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        let mut expand = |p: Vec2| {
            bounds = Some(match bounds {
                None => (p.x, p.y, p.x, p.y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
                }
            });
        };
        for feature in &self.features {
            match &feature.geometry {
                Geometry::Point(p) => expand(*p),
                Geometry::Polyline(coords) => coords.iter().for_each(|c| expand(c.point)),
                Geometry::Polygon { outer, holes } => {
                    outer.coords.iter().for_each(|c| expand(c.point));
                    for hole in holes {
                        hole.coords.iter().for_each(|c| expand(c.point));
                    }
                }
            }
        }
        bounds
    }
}

/// Parse an ISOM-2017-2 XML map document, keeping only features whose
/// layer name is in `wanted_layers`.
///
/// Schema: `<map>` → `<layers>` → `<layer name="...">` → `<object
/// type="point|line|area" symbol="...">` → `<coord x="..." y="..."
/// flags="..."/>`, plus an optional `<georeferencing>` with a
/// `<ref_point lat lon x y/>` child and a `scale` attribute. Elements
/// outside this schema are skipped, not rejected — a real ISOM-2017-2
/// document carries additional tags this reader does not need.
///
/// # Errors
/// Returns [`CoreError::MapLoad`] on malformed XML or I/O failure.
pub fn read_map<R: BufRead>(source: R, wanted_layers: &HashSet<String>) -> Result<MapDocument, CoreError> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let mut doc = MapDocument::default();
    let mut current_layer: Option<String> = None;
    let mut current_object: Option<PendingObject> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(|e| CoreError::MapLoad(MapLoadError::Xml(e)))? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let name = e.name();
                let local = std::str::from_utf8(name.as_ref())
                    .map_err(|_| CoreError::MapLoad(MapLoadError::Malformed("non-utf8 element name".into())))?
                    .to_string();
                match local.as_str() {
                    "layer" => {
                        current_layer = attr(&e, "name")?;
                    }
                    "object" => {
                        let layer = current_layer.clone().ok_or_else(|| {
                            CoreError::MapLoad(MapLoadError::Malformed("object outside a layer".into()))
                        })?;
                        let kind = attr(&e, "type")?.ok_or_else(|| {
                            CoreError::MapLoad(MapLoadError::Malformed("object missing type".into()))
                        })?;
                        let symbol = attr(&e, "symbol")?.unwrap_or_default();
                        current_object = Some(PendingObject {
                            layer,
                            kind,
                            symbol,
                            coords: Vec::new(),
                        });
                    }
                    "coord" => {
                        let Some(object) = current_object.as_mut() else {
                            continue;
                        };
                        let x: f32 = parse_attr(&e, "x")?;
                        let y: f32 = parse_attr(&e, "y")?;
                        let flag_bits: u32 = attr(&e, "flags")?.map(|s| s.parse().unwrap_or(0)).unwrap_or(0);
                        object.coords.push(FeatureCoord {
                            point: vec2(x, y),
                            flags: CoordFlags::from_bits(flag_bits),
                        });
                    }
                    "ref_point" => {
                        let ref_lat: f64 = parse_attr(&e, "lat")?;
                        let ref_lon: f64 = parse_attr(&e, "lon")?;
                        let anchor_x: f32 = parse_attr(&e, "x")?;
                        let anchor_y: f32 = parse_attr(&e, "y")?;
                        // `scale` lives on the enclosing `<georeferencing>`
                        // element; callers that need it must have already
                        // seen it, so store a placeholder and patch below.
                        doc.georeferencing = Some(Georeferencing {
                            ref_lat,
                            ref_lon,
                            anchor_x,
                            anchor_y,
                            scale: doc.georeferencing.map(|g| g.scale).unwrap_or(0),
                        });
                    }
                    "georeferencing" => {
                        let scale: u32 = attr(&e, "scale")?.and_then(|s| s.parse().ok()).unwrap_or(0);
                        doc.georeferencing = Some(Georeferencing {
                            ref_lat: 0.0,
                            ref_lon: 0.0,
                            anchor_x: 0.0,
                            anchor_y: 0.0,
                            scale,
                        });
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let local = std::str::from_utf8(e.name().as_ref()).unwrap_or_default();
                match local {
                    "object" => {
                        if let Some(object) = current_object.take() {
                            if wanted_layers.contains(&object.layer) {
                                if let Some(feature) = object.into_feature()? {
                                    doc.features.push(feature);
                                }
                            }
                        }
                    }
                    "layer" => current_layer = None,
                    _ => {}
                }
            }
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "parsed map document: {} features across {} requested layers",
        doc.features.len(),
        wanted_layers.len()
    );
    Ok(doc)
}

struct PendingObject {
    layer: String,
    kind: String,
    symbol: String,
    coords: Vec<FeatureCoord>,
}

impl PendingObject {
    fn into_feature(self) -> Result<Option<Feature>, CoreError> {
        let geometry = match self.kind.as_str() {
            "point" => match self.coords.first() {
                Some(c) => Geometry::Point(c.point),
                None => return Ok(None),
            },
            "line" => {
                if self.coords.is_empty() {
                    return Ok(None);
                }
                Geometry::Polyline(self.coords)
            }
            "area" => {
                if self.coords.is_empty() {
                    return Ok(None);
                }
                Geometry::Polygon {
                    outer: Ring::new(self.coords),
                    holes: Vec::new(),
                }
            }
            other => {
                warn!("object with unrecognized type {other:?} skipped");
                return Ok(None);
            }
        };
        Ok(Some(Feature::new(self.symbol, self.layer, geometry)))
    }
}

fn attr(e: &quick_xml::events::BytesStart, key: &str) -> Result<Option<String>, CoreError> {
    for a in e.attributes() {
        let a = a.map_err(|_| CoreError::MapLoad(MapLoadError::Malformed(format!("invalid attribute syntax on <{:?}>", e.name()))))?;
        if a.key.as_ref() == key.as_bytes() {
            let text = std::str::from_utf8(a.value.as_ref())
                .map_err(|_| CoreError::MapLoad(MapLoadError::Malformed(format!("non-utf8 value for attribute {key:?}"))))?;
            return Ok(Some(text.to_string()));
        }
    }
    Ok(None)
}

fn parse_attr<T: std::str::FromStr>(e: &quick_xml::events::BytesStart, key: &str) -> Result<T, CoreError> {
    let raw = attr(e, key)?.ok_or_else(|| CoreError::MapLoad(MapLoadError::Malformed(format!("missing attribute {key:?}"))))?;
    raw.parse()
        .map_err(|_| CoreError::MapLoad(MapLoadError::Malformed(format!("invalid value for attribute {key:?}: {raw:?}"))))
}

#[cfg(test)]
mod test {
    use super::*;

    fn layers(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parses_point_and_line_features_in_requested_layers() {
        let xml = r#"
            <map>
              <layers>
                <layer name="control">
                  <object type="point" symbol="530">
                    <coord x="5.5" y="5.5" flags="0"/>
                  </object>
                </layer>
                <layer name="vegetation">
                  <object type="line" symbol="201">
                    <coord x="1.0" y="1.0" flags="0"/>
                    <coord x="2.0" y="2.0" flags="0"/>
                  </object>
                </layer>
              </layers>
            </map>
        "#;
        let doc = read_map(xml.as_bytes(), &layers(&["control", "vegetation"])).unwrap();
        assert_eq!(doc.features.len(), 2);
        assert!(matches!(doc.features[0].geometry, Geometry::Point(_)));
        assert!(matches!(doc.features[1].geometry, Geometry::Polyline(_)));
    }

    #[test]
    fn test_layer_filter_drops_unrequested_layers() {
        let xml = r#"
            <map>
              <layers>
                <layer name="control">
                  <object type="point" symbol="530"><coord x="1" y="1" flags="0"/></object>
                </layer>
                <layer name="ignored">
                  <object type="point" symbol="530"><coord x="2" y="2" flags="0"/></object>
                </layer>
              </layers>
            </map>
        "#;
        let doc = read_map(xml.as_bytes(), &layers(&["control"])).unwrap();
        assert_eq!(doc.features.len(), 1);
    }

    #[test]
    fn test_coord_flags_parsed_from_bitfield() {
        let xml = r#"
            <map><layers><layer name="vegetation">
              <object type="line" symbol="201">
                <coord x="0" y="0" flags="0"/>
                <coord x="1" y="1" flags="5"/>
              </object>
            </layer></layers></map>
        "#;
        let doc = read_map(xml.as_bytes(), &layers(&["vegetation"])).unwrap();
        let Geometry::Polyline(coords) = &doc.features[0].geometry else {
            panic!("expected polyline");
        };
        assert!(coords[1].flags.gap);
        assert!(coords[1].flags.curve_start);
        assert!(!coords[1].flags.dash);
    }

    #[test]
    fn test_georeferencing_parsed() {
        let xml = r#"
            <map>
              <layers/>
              <georeferencing scale="10000">
                <ref_point lat="60.1" lon="24.9" x="0.0" y="0.0"/>
              </georeferencing>
            </map>
        "#;
        let doc = read_map(xml.as_bytes(), &layers(&[])).unwrap();
        let geo = doc.georeferencing.unwrap();
        assert_eq!(geo.scale, 10000);
        assert!((geo.ref_lat - 60.1).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        let xml = r#"<map><layers><layer name="x"></map>"#;
        let result = read_map(xml.as_bytes(), &layers(&["x"]));
        assert!(matches!(result, Err(CoreError::MapLoad(_))));
    }

    #[test]
    fn test_bounding_rect_covers_all_coords_including_holes() {
        let xml = r#"
            <map><layers>
              <layer name="control">
                <object type="point" symbol="530"><coord x="5.0" y="-2.0" flags="0"/></object>
              </layer>
              <layer name="terrain">
                <object type="area" symbol="403">
                  <coord x="0.0" y="0.0" flags="0"/>
                  <coord x="10.0" y="0.0" flags="0"/>
                  <coord x="10.0" y="10.0" flags="0"/>
                  <coord x="0.0" y="10.0" flags="0"/>
                </object>
              </layer>
            </layers></map>
        "#;
        let doc = read_map(xml.as_bytes(), &layers(&["control", "terrain"])).unwrap();
        let (min_x, min_y, max_x, max_y) = doc.bounding_rect().unwrap();
        assert_eq!((min_x, min_y, max_x, max_y), (0.0, -2.0, 10.0, 10.0));
    }

    #[test]
    fn test_bounding_rect_feeds_normalization_record() {
        use crate::normalize::NormalizationRecord;

        let xml = r#"
            <map><layers>
              <layer name="terrain">
                <object type="area" symbol="403">
                  <coord x="2.0" y="3.0" flags="0"/>
                  <coord x="8.0" y="3.0" flags="0"/>
                  <coord x="8.0" y="9.0" flags="0"/>
                  <coord x="2.0" y="9.0" flags="0"/>
                </object>
              </layer>
            </layers></map>
        "#;
        let doc = read_map(xml.as_bytes(), &layers(&["terrain"])).unwrap();
        let (u_min, v_min, u_max, v_max) = doc.bounding_rect().unwrap();
        let norm = NormalizationRecord::compute(u_min, v_min, u_max, v_max, 6, 6).unwrap();
        let (cx, cy) = norm.to_cell(2.0, 3.0);
        assert_eq!((cx, cy), (0, 0));
    }

    #[test]
    fn test_bounding_rect_is_none_without_features() {
        let doc = MapDocument::default();
        assert_eq!(doc.bounding_rect(), None);
    }
}
