//! Minimal TopoJSON decoder: enough to turn a world topology into outline
//! rings for the landing map.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::ExplorerError;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<Transform>,
    objects: HashMap<String, GeometrySlot>,
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

type Properties = Option<Map<String, JsonValue>>;

/// A geometry that may be absent. TopoJSON writes `"type": null` for
/// features without a shape.
#[derive(Debug)]
struct GeometrySlot(Option<Geometry>);

impl<'de> Deserialize<'de> for GeometrySlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        if !value.get("type").is_some_and(JsonValue::is_string) {
            return Ok(GeometrySlot(None));
        }
        Geometry::deserialize(value)
            .map(|geometry| GeometrySlot(Some(geometry)))
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    GeometryCollection {
        geometries: Vec<GeometrySlot>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Properties,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Properties,
    },
    LineString {
        arcs: Vec<i64>,
        #[serde(default)]
        properties: Properties,
    },
    MultiLineString {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Properties,
    },
    /// Points and anything else carry no outline.
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Decoded basemap
// ---------------------------------------------------------------------------

/// Outline of one feature, e.g. a continent.
#[derive(Debug, Clone, PartialEq)]
pub struct BasemapFeature {
    pub name: Option<String>,
    /// Each ring is a `[longitude, latitude]` polyline.
    pub rings: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Basemap {
    pub features: Vec<BasemapFeature>,
}

impl Basemap {
    pub fn ring_count(&self) -> usize {
        self.features.iter().map(|f| f.rings.len()).sum()
    }
}

/// Decode the object called `object` from a TopoJSON document.
pub fn decode_topojson(
    url: &str,
    document: &JsonValue,
    object: &str,
) -> Result<Basemap, ExplorerError> {
    let topology = Topology::deserialize(document)
        .map_err(|e| ExplorerError::remote(url, format!("invalid TopoJSON: {e}")))?;
    if topology.kind != "Topology" {
        return Err(ExplorerError::remote(
            url,
            format!("expected a Topology, found {:?}", topology.kind),
        ));
    }

    let slot = topology.objects.get(object).ok_or_else(|| {
        let mut known: Vec<&str> = topology.objects.keys().map(String::as_str).collect();
        known.sort_unstable();
        ExplorerError::remote(
            url,
            format!("no object {object:?} (available: {})", known.join(", ")),
        )
    })?;

    let arcs = decode_arcs(&topology);
    let mut features = Vec::new();
    if let Some(geometry) = &slot.0 {
        collect_features(geometry, &arcs, &mut features)
            .map_err(|reason| ExplorerError::remote(url, reason))?;
    }

    let basemap = Basemap { features };
    log::info!(
        "Decoded basemap {object:?}: {} features, {} rings",
        basemap.features.len(),
        basemap.ring_count()
    );
    Ok(basemap)
}

/// Absolute coordinates for every arc. Quantized topologies store positions
/// as deltas from the previous position.
fn decode_arcs(topology: &Topology) -> Vec<Vec<[f64; 2]>> {
    topology
        .arcs
        .iter()
        .map(|arc| match &topology.transform {
            Some(t) => {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| {
                        x += p[0];
                        y += p[1];
                        [x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1]]
                    })
                    .collect()
            }
            None => arc
                .iter()
                .filter(|p| p.len() >= 2)
                .map(|p| [p[0], p[1]])
                .collect(),
        })
        .collect()
}

/// Join arcs into one polyline. A negative index `i` means arc `!i` reversed;
/// the shared point between consecutive arcs is kept once.
fn stitch(indices: &[i64], arcs: &[Vec<[f64; 2]>]) -> Result<Vec<[f64; 2]>, String> {
    let mut line: Vec<[f64; 2]> = Vec::new();
    for &index in indices {
        let (position, reversed) = if index < 0 {
            ((!index) as usize, true)
        } else {
            (index as usize, false)
        };
        let arc = arcs
            .get(position)
            .ok_or_else(|| format!("arc index {index} out of range ({} arcs)", arcs.len()))?;

        let skip = usize::from(!line.is_empty());
        if reversed {
            line.extend(arc.iter().rev().skip(skip));
        } else {
            line.extend(arc.iter().skip(skip));
        }
    }
    Ok(line)
}

fn feature_name(properties: &Properties) -> Option<String> {
    let props = properties.as_ref()?;
    ["continent", "name", "NAME"]
        .iter()
        .find_map(|key| props.get(*key).and_then(JsonValue::as_str))
        .map(str::to_string)
}

fn collect_features(
    geometry: &Geometry,
    arcs: &[Vec<[f64; 2]>],
    out: &mut Vec<BasemapFeature>,
) -> Result<(), String> {
    let (properties, rings) = match geometry {
        Geometry::GeometryCollection { geometries } => {
            for g in geometries.iter().filter_map(|slot| slot.0.as_ref()) {
                collect_features(g, arcs, out)?;
            }
            return Ok(());
        }
        Geometry::Polygon { arcs: rings, properties } => (
            properties,
            rings.iter().map(|r| stitch(r, arcs)).collect::<Result<Vec<_>, _>>()?,
        ),
        Geometry::MultiPolygon { arcs: polygons, properties } => (
            properties,
            polygons
                .iter()
                .flatten()
                .map(|r| stitch(r, arcs))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Geometry::LineString { arcs: line, properties } => (properties, vec![stitch(line, arcs)?]),
        Geometry::MultiLineString { arcs: lines, properties } => (
            properties,
            lines.iter().map(|l| stitch(l, arcs)).collect::<Result<Vec<_>, _>>()?,
        ),
        Geometry::Other => return Ok(()),
    };

    out.push(BasemapFeature {
        name: feature_name(properties),
        rings,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Two quantized arcs forming a closed rectangle between (10, 20) and
    /// (11, 22).
    fn topology() -> JsonValue {
        json!({
            "type": "Topology",
            "transform": { "scale": [0.5, 2.0], "translate": [10.0, 20.0] },
            "objects": {
                "continent": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0, 1]],
                          "properties": { "continent": "Atlantis" } },
                        { "type": "LineString", "arcs": [-1] },
                        { "type": "MultiPolygon", "arcs": [[[0, 1]]] },
                        { "type": "Point", "coordinates": [0, 0] }
                    ]
                }
            },
            "arcs": [
                [[0, 0], [2, 0], [0, 1]],
                [[2, 1], [-2, 0], [0, -1]]
            ]
        })
    }

    #[test]
    fn decodes_quantized_polygon() {
        let basemap = decode_topojson("u", &topology(), "continent").unwrap();

        assert_eq!(basemap.features.len(), 3);
        let atlantis = &basemap.features[0];
        assert_eq!(atlantis.name.as_deref(), Some("Atlantis"));
        assert_eq!(
            atlantis.rings,
            vec![vec![
                [10.0, 20.0],
                [11.0, 20.0],
                [11.0, 22.0],
                [10.0, 22.0],
                [10.0, 20.0]
            ]]
        );
        assert_eq!(basemap.features[2].rings, atlantis.rings);
        assert_eq!(basemap.ring_count(), 3);
    }

    #[test]
    fn negative_index_reverses_arc() {
        let basemap = decode_topojson("u", &topology(), "continent").unwrap();
        assert_eq!(
            basemap.features[1].rings,
            vec![vec![[11.0, 22.0], [11.0, 20.0], [10.0, 20.0]]]
        );
        assert_eq!(basemap.features[1].name, None);
    }

    #[test]
    fn untransformed_arcs_are_absolute() {
        let doc = json!({
            "type": "Topology",
            "objects": { "land": { "type": "LineString", "arcs": [0] } },
            "arcs": [[[1.5, 2.5], [3.0, 4.0]]]
        });
        let basemap = decode_topojson("u", &doc, "land").unwrap();
        assert_eq!(basemap.features[0].rings, vec![vec![[1.5, 2.5], [3.0, 4.0]]]);
    }

    #[test]
    fn null_geometries_are_skipped() {
        let doc = json!({
            "type": "Topology",
            "objects": {
                "continent": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": null, "properties": { "continent": "Nowhere" } },
                        { "arcs": [0] },
                        { "type": "LineString", "arcs": [0] }
                    ]
                },
                "empty": { "type": null }
            },
            "arcs": [[[0.0, 0.0], [1.0, 1.0]]]
        });
        let basemap = decode_topojson("u", &doc, "continent").unwrap();
        assert_eq!(basemap.features.len(), 1);
        assert_eq!(basemap.ring_count(), 1);

        let empty = decode_topojson("u", &doc, "empty").unwrap();
        assert_eq!(empty, Basemap::default());
    }

    #[test]
    fn missing_object_lists_available_ones() {
        let err = decode_topojson("u", &topology(), "countries").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("countries"));
        assert!(message.contains("continent"));
    }

    #[test]
    fn bad_arc_index_is_an_error() {
        let doc = json!({
            "type": "Topology",
            "objects": { "land": { "type": "Polygon", "arcs": [[5]] } },
            "arcs": []
        });
        let err = decode_topojson("u", &doc, "land").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_geojson() {
        let doc = json!({ "type": "FeatureCollection", "objects": {}, "arcs": [] });
        assert!(decode_topojson("u", &doc, "continent").is_err());
    }
}
