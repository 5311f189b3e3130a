//! Polygon planning-unit layers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the attribute holding planning-unit costs.
pub const COST_ATTRIBUTE: &str = "cost";

/// A simple polygon given by its exterior ring.
///
/// The ring may be open or closed; the closing edge is implied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<[f64; 2]>,
}

impl Polygon {
    /// Creates a polygon from its exterior ring.
    pub fn new(exterior: Vec<[f64; 2]>) -> Self {
        Self { exterior }
    }

    /// Axis-aligned rectangle helper.
    pub fn rect(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::new(vec![[xmin, ymin], [xmax, ymin], [xmax, ymax], [xmin, ymax]])
    }

    /// Even-odd point-in-polygon test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let ring = &self.exterior;
        if ring.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let [xi, yi] = ring[i];
            let [xj, yj] = ring[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// A layer of polygons with index-aligned numeric attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonLayer {
    /// Polygon geometries, one per planning unit.
    pub polygons: Vec<Polygon>,

    /// Attribute columns keyed by name, each with one value per polygon.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<Option<f64>>>,
}

impl PolygonLayer {
    /// Creates a layer with the given polygons and cost attribute.
    pub fn with_costs(polygons: Vec<Polygon>, costs: Vec<Option<f64>>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(COST_ATTRIBUTE.to_string(), costs);
        Self {
            polygons,
            attributes,
        }
    }

    /// Number of polygons.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns true if the layer holds no polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Looks up an attribute column by name.
    pub fn attribute(&self, name: &str) -> Option<&[Option<f64>]> {
        self.attributes.get(name).map(Vec::as_slice)
    }
}
