//! Core data model: CRS-tagged feature collections and the argument shapes
//! accepted by the containment helpers.

use geo::{Geometry, MultiPolygon, Point, Polygon};
use serde_json::{Map, Value};

use crate::error::{GeoError, Result};

/// A coordinate reference system identifier, e.g. `"EPSG:4326"`.
///
/// Comparison ignores ASCII case, so `"epsg:4326"` and `"EPSG:4326"` name the
/// same system.
#[derive(Debug, Clone)]
pub struct Crs(String);

impl Crs {
    /// Geographic WGS84 coordinates.
    pub const WGS84: &'static str = "EPSG:4326";
    /// The planar projection used for centroid computation.
    pub const WEB_MERCATOR: &'static str = "EPSG:3857";

    pub fn new(code: impl Into<String>) -> Self {
        Crs(code.into())
    }

    pub fn wgs84() -> Self {
        Crs::new(Self::WGS84)
    }

    pub fn web_mercator() -> Self {
        Crs::new(Self::WEB_MERCATOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Crs {}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Crs {
    fn from(code: &str) -> Self {
        Crs(code.to_string())
    }
}

/// A single geometry with its attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Feature {
            geometry,
            properties: Map::new(),
        }
    }

    pub fn with_properties(geometry: Geometry<f64>, properties: Map<String, Value>) -> Self {
        Feature {
            geometry,
            properties,
        }
    }
}

/// An ordered sequence of features sharing one CRS.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub crs: Option<Crs>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>, crs: Option<Crs>) -> Self {
        FeatureCollection { features, crs }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// First record, or `EmptyCollection` naming which argument was empty.
    pub(crate) fn first(&self, what: &'static str) -> Result<&Feature> {
        self.features.first().ok_or(GeoError::EmptyCollection(what))
    }
}

/// The shapes accepted for a point parameter: a raw coordinate pair, a bare
/// point geometry, or a single-record point collection.
#[derive(Debug, Clone)]
pub enum PointArg<'a> {
    Coord(f64, f64),
    Point(Point<f64>),
    Collection(&'a FeatureCollection),
}

impl<'a> From<(f64, f64)> for PointArg<'a> {
    fn from((x, y): (f64, f64)) -> Self {
        PointArg::Coord(x, y)
    }
}

impl<'a> From<Point<f64>> for PointArg<'a> {
    fn from(point: Point<f64>) -> Self {
        PointArg::Point(point)
    }
}

impl<'a> From<&'a FeatureCollection> for PointArg<'a> {
    fn from(collection: &'a FeatureCollection) -> Self {
        PointArg::Collection(collection)
    }
}

impl<'a> PointArg<'a> {
    /// Resolve to a concrete point and the CRS it carries, if any.
    ///
    /// A collection's CRS overrides the explicit argument, even when the
    /// collection itself is untagged.
    pub(crate) fn resolve(self, explicit_crs: Option<&str>) -> Result<(Point<f64>, Option<Crs>)> {
        match self {
            PointArg::Coord(x, y) => Ok((Point::new(x, y), explicit_crs.map(Crs::from))),
            PointArg::Point(point) => Ok((point, explicit_crs.map(Crs::from))),
            PointArg::Collection(collection) => {
                let feature = collection.first("point argument")?;
                match &feature.geometry {
                    Geometry::Point(point) => Ok((*point, collection.crs.clone())),
                    _ => Err(GeoError::InvalidArgument(
                        "point argument collection does not start with a point geometry",
                    )),
                }
            }
        }
    }
}

/// The shapes accepted for the polygon side of a containment test: a bare
/// polygon or multipolygon, or a single-record collection holding one.
#[derive(Debug, Clone)]
pub enum AreaArg<'a> {
    Polygon(&'a Polygon<f64>),
    MultiPolygon(&'a MultiPolygon<f64>),
    Collection(&'a FeatureCollection),
}

impl<'a> From<&'a Polygon<f64>> for AreaArg<'a> {
    fn from(polygon: &'a Polygon<f64>) -> Self {
        AreaArg::Polygon(polygon)
    }
}

impl<'a> From<&'a MultiPolygon<f64>> for AreaArg<'a> {
    fn from(multi: &'a MultiPolygon<f64>) -> Self {
        AreaArg::MultiPolygon(multi)
    }
}

impl<'a> From<&'a FeatureCollection> for AreaArg<'a> {
    fn from(collection: &'a FeatureCollection) -> Self {
        AreaArg::Collection(collection)
    }
}

impl<'a> AreaArg<'a> {
    /// Resolve to a concrete geometry and the CRS it carries, if any.
    pub(crate) fn resolve(self, explicit_crs: Option<&str>) -> Result<(Geometry<f64>, Option<Crs>)> {
        match self {
            AreaArg::Polygon(polygon) => Ok((
                Geometry::Polygon(polygon.clone()),
                explicit_crs.map(Crs::from),
            )),
            AreaArg::MultiPolygon(multi) => Ok((
                Geometry::MultiPolygon(multi.clone()),
                explicit_crs.map(Crs::from),
            )),
            AreaArg::Collection(collection) => {
                let feature = collection.first("feature argument")?;
                match &feature.geometry {
                    Geometry::Polygon(_) | Geometry::MultiPolygon(_) => {
                        Ok((feature.geometry.clone(), collection.crs.clone()))
                    }
                    _ => Err(GeoError::InvalidArgument(
                        "feature argument collection does not start with a polygon geometry",
                    )),
                }
            }
        }
    }
}
