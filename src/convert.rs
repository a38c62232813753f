//! Format conversion: KML and GeoJSON readers, GeoJSON writers, and the
//! file-to-file `convert` entry point.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use geo::{Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use geojson::{Feature as GeoJsonFeature, FeatureCollection as GeoJsonFeatureCollection, GeoJson};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::collection::{Crs, Feature, FeatureCollection};
use crate::error::{GeoError, Result};
use crate::{read_collection, InputFormat};

/// Convert a geometry file to GeoJSON.
///
/// Reads `source` with its format-specific driver, writes the collection to
/// `dest` as GeoJSON (creating or overwriting the file), and returns the
/// in-memory collection so callers can keep working with it without re-reading
/// the file. No atomicity is guaranteed: a failed write can leave a partial
/// file behind.
///
/// Fails with [`GeoError::NotFound`] when `source` does not exist and with
/// [`GeoError::Conversion`] on any read or write failure; conversion failures
/// are also reported on stderr before the error is returned.
pub fn convert(source: &Path, dest: &Path) -> Result<FeatureCollection> {
    if !source.exists() {
        return Err(GeoError::NotFound(source.to_path_buf()));
    }

    let result = convert_inner(source, dest);
    match &result {
        Ok(collection) => println!(
            "Converted '{}' to '{}' ({} features)",
            source.display(),
            dest.display(),
            collection.len()
        ),
        Err(e) => eprintln!("An error occurred during conversion: {e}"),
    }
    result
}

fn convert_inner(source: &Path, dest: &Path) -> Result<FeatureCollection> {
    let format = InputFormat::from_path(source).ok_or_else(|| {
        GeoError::Conversion(format!("unsupported input format: '{}'", source.display()))
    })?;
    let collection = read_collection(source, format)?;
    write_geojson(&collection, dest)?;
    Ok(collection)
}

/// Read a GeoJSON file, keeping geometries and properties.
///
/// The result is tagged `EPSG:4326`: RFC 7946 fixes GeoJSON coordinates to
/// WGS84, and legacy `crs` members are not interpreted.
pub fn read_geojson(path: &Path) -> Result<FeatureCollection> {
    let file = File::open(path)
        .map_err(|e| GeoError::Conversion(format!("failed to open '{}': {e}", path.display())))?;
    let reader = BufReader::new(file);

    let geojson = GeoJson::from_reader(reader)
        .map_err(|e| GeoError::Conversion(format!("failed to parse '{}': {e}", path.display())))?;

    let mut features = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                push_geojson_feature(feature, &mut features, path)?;
            }
        }
        GeoJson::Feature(feature) => push_geojson_feature(feature, &mut features, path)?,
        GeoJson::Geometry(geometry) => {
            features.push(Feature::new(geo_geometry(geometry.value, path)?));
        }
    }

    Ok(FeatureCollection::new(features, Some(Crs::wgs84())))
}

fn push_geojson_feature(
    feature: GeoJsonFeature,
    features: &mut Vec<Feature>,
    path: &Path,
) -> Result<()> {
    // Features without a geometry are legal GeoJSON; there is nothing spatial
    // to keep, so they are skipped.
    if let Some(geometry) = feature.geometry {
        features.push(Feature::with_properties(
            geo_geometry(geometry.value, path)?,
            feature.properties.unwrap_or_default(),
        ));
    }
    Ok(())
}

fn geo_geometry(value: geojson::Value, path: &Path) -> Result<Geometry<f64>> {
    Geometry::<f64>::try_from(value).map_err(|e| {
        GeoError::Conversion(format!("unsupported geometry in '{}': {e}", path.display()))
    })
}

/// Read a KML file into a feature collection, one feature per placemark.
///
/// Placemark `name` and `description` become properties of the same name.
/// KML coordinates are WGS84 by definition, so the result is tagged
/// `EPSG:4326`.
pub fn read_kml(path: &Path) -> Result<FeatureCollection> {
    let mut content = String::new();
    File::open(path)
        .map_err(|e| GeoError::Conversion(format!("failed to open '{}': {e}", path.display())))?
        .read_to_string(&mut content)
        .map_err(|e| GeoError::Conversion(format!("failed to read '{}': {e}", path.display())))?;

    let document = kml::Kml::from_str(&content)
        .map_err(|e| GeoError::Conversion(format!("failed to parse '{}': {e}", path.display())))?;

    let mut features = Vec::new();
    collect_placemarks(&document, &mut features);
    Ok(FeatureCollection::new(features, Some(Crs::wgs84())))
}

/// Recursively walk the KML structure, collecting placemark features.
fn collect_placemarks(node: &kml::Kml, features: &mut Vec<Feature>) {
    match node {
        kml::Kml::KmlDocument(document) => {
            for element in &document.elements {
                collect_placemarks(element, features);
            }
        }
        kml::Kml::Document { elements, .. } => {
            for element in elements {
                collect_placemarks(element, features);
            }
        }
        kml::Kml::Folder(folder) => {
            for element in &folder.elements {
                collect_placemarks(element, features);
            }
        }
        kml::Kml::Placemark(placemark) => {
            if let Some(geometry) = placemark.geometry.as_ref().and_then(kml_geometry) {
                let mut properties = Map::new();
                if let Some(name) = &placemark.name {
                    properties.insert("name".to_string(), Value::from(name.clone()));
                }
                if let Some(description) = &placemark.description {
                    properties.insert("description".to_string(), Value::from(description.clone()));
                }
                features.push(Feature::with_properties(geometry, properties));
            }
        }
        // Styles, overlays and other elements carry no features
        _ => {}
    }
}

fn kml_geometry(geometry: &kml::types::Geometry) -> Option<Geometry<f64>> {
    use kml::types::Geometry as KmlGeometry;

    match geometry {
        KmlGeometry::Point(point) => {
            Some(Geometry::Point(Point::new(point.coord.x, point.coord.y)))
        }
        KmlGeometry::LineString(line) => {
            Some(Geometry::LineString(coords_to_linestring(&line.coords)))
        }
        KmlGeometry::LinearRing(ring) => {
            Some(Geometry::LineString(coords_to_linestring(&ring.coords)))
        }
        KmlGeometry::Polygon(polygon) => Some(Geometry::Polygon(kml_polygon(polygon))),
        KmlGeometry::MultiGeometry(multi) => kml_multi_geometry(multi),
        _ => None,
    }
}

fn coords_to_linestring(coords: &[kml::types::Coord]) -> LineString<f64> {
    LineString::new(coords.iter().map(|c| (c.x, c.y).into()).collect())
}

fn kml_polygon(polygon: &kml::types::Polygon) -> Polygon<f64> {
    let exterior = coords_to_linestring(&polygon.outer.coords);
    let holes = polygon
        .inner
        .iter()
        .map(|ring| coords_to_linestring(&ring.coords))
        .collect();
    Polygon::new(exterior, holes)
}

/// A `MultiGeometry` of one kind folds into the matching multi type; mixed
/// content stays a geometry collection.
fn kml_multi_geometry(multi: &kml::types::MultiGeometry) -> Option<Geometry<f64>> {
    let members: Vec<Geometry<f64>> = multi.geometries.iter().filter_map(kml_geometry).collect();
    if members.is_empty() {
        return None;
    }

    let polygons: Vec<Polygon<f64>> = members
        .iter()
        .filter_map(|g| match g {
            Geometry::Polygon(polygon) => Some(polygon.clone()),
            _ => None,
        })
        .collect();
    if polygons.len() == members.len() {
        return Some(Geometry::MultiPolygon(MultiPolygon(polygons)));
    }

    let points: Vec<Point<f64>> = members
        .iter()
        .filter_map(|g| match g {
            Geometry::Point(point) => Some(*point),
            _ => None,
        })
        .collect();
    if points.len() == members.len() {
        return Some(Geometry::MultiPoint(MultiPoint(points)));
    }

    let lines: Vec<LineString<f64>> = members
        .iter()
        .filter_map(|g| match g {
            Geometry::LineString(line) => Some(line.clone()),
            _ => None,
        })
        .collect();
    if lines.len() == members.len() {
        return Some(Geometry::MultiLineString(MultiLineString(lines)));
    }

    Some(Geometry::GeometryCollection(geo::GeometryCollection::from(
        members,
    )))
}

fn to_geojson(collection: &FeatureCollection) -> GeoJsonFeatureCollection {
    let features = collection
        .iter()
        .map(|feature| GeoJsonFeature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(
                &feature.geometry,
            ))),
            id: None,
            properties: Some(feature.properties.clone()),
            foreign_members: None,
        })
        .collect();

    GeoJsonFeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write a collection to a file as compact GeoJSON.
pub fn write_geojson(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| GeoError::Conversion(format!("failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer(file, &to_geojson(collection))
        .map_err(|e| GeoError::Conversion(format!("failed to write '{}': {e}", path.display())))?;
    Ok(())
}

/// Write a collection to a file as pretty-printed GeoJSON.
///
/// `indent` is the number of spaces per nesting level (`None` for the
/// conventional 2). Non-ASCII characters are written literally, not escaped.
/// Takes an already-loaded collection; there is no file-to-file entry point
/// for pretty output.
pub fn write_geojson_pretty(
    collection: &FeatureCollection,
    path: &Path,
    indent: Option<usize>,
) -> Result<()> {
    let indent = vec![b' '; indent.unwrap_or(2)];
    let file = File::create(path)
        .map_err(|e| GeoError::Conversion(format!("failed to create '{}': {e}", path.display())))?;

    let formatter = PrettyFormatter::with_indent(&indent);
    let mut serializer = serde_json::Serializer::with_formatter(file, formatter);
    to_geojson(collection)
        .serialize(&mut serializer)
        .map_err(|e| GeoError::Conversion(format!("failed to write '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Praça XV</name>
      <description>Ferry &lt;a href="http://example.com"&gt;terminal&lt;/a&gt;</description>
      <Point><coordinates>-43.1729,-22.9024,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>Aterro</name>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>
              -43.17,-22.91,0 -43.16,-22.91,0 -43.16,-22.92,0 -43.17,-22.92,0 -43.17,-22.91,0
            </coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Document>
</kml>"#;

    const MULTI_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Placemark>
    <name>Archipelago</name>
    <MultiGeometry>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>0,0,0 1,0,0 1,1,0 0,1,0 0,0,0</coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>2,2,0 3,2,0 3,3,0 2,3,0 2,2,0</coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </MultiGeometry>
  </Placemark>
</kml>"#;

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.kml");
        match convert(&missing, &dir.path().join("out.geojson")) {
            Err(GeoError::NotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_is_a_conversion_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("data.gpkg");
        std::fs::write(&source, b"not really").unwrap();
        match convert(&source, &dir.path().join("out.geojson")) {
            Err(GeoError::Conversion(message)) => assert!(message.contains("unsupported")),
            other => panic!("expected Conversion, got {other:?}"),
        }
    }

    #[test]
    fn malformed_input_is_a_conversion_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.geojson");
        std::fs::write(&source, "{ not geojson").unwrap();
        match convert(&source, &dir.path().join("out.geojson")) {
            Err(GeoError::Conversion(_)) => {}
            other => panic!("expected Conversion, got {other:?}"),
        }
    }

    #[test]
    fn kml_converts_to_geojson_and_returns_the_collection() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("districts.kml");
        std::fs::write(&source, SAMPLE_KML).unwrap();
        let dest = dir.path().join("districts.geojson");

        let collection = convert(&source, &dest).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.crs, Some(Crs::wgs84()));
        assert_eq!(collection.features[0].properties["name"], "Praça XV");
        assert!(matches!(collection.features[0].geometry, Geometry::Point(_)));
        assert!(matches!(
            collection.features[1].geometry,
            Geometry::Polygon(_)
        ));

        // Re-reading the destination yields the same records.
        let reread = read_geojson(&dest).unwrap();
        assert_eq!(reread.len(), collection.len());
        assert_eq!(reread.features[0].geometry, collection.features[0].geometry);
        assert_eq!(reread.features[1].geometry, collection.features[1].geometry);
        assert_eq!(reread.features[1].properties["name"], "Aterro");
    }

    #[test]
    fn multi_geometry_of_polygons_folds_to_multipolygon() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("islands.kml");
        std::fs::write(&source, MULTI_KML).unwrap();

        let collection = read_kml(&source).unwrap();
        assert_eq!(collection.len(), 1);
        match &collection.features[0].geometry {
            Geometry::MultiPolygon(multi) => assert_eq!(multi.0.len(), 2),
            other => panic!("expected a multipolygon, got {other:?}"),
        }
    }

    #[test]
    fn pretty_output_keeps_non_ascii_literal() {
        let dir = tempdir().unwrap();
        let mut properties = Map::new();
        properties.insert("name".to_string(), Value::from("Jardim Botânico"));
        let collection = FeatureCollection::new(
            vec![Feature::with_properties(
                Geometry::Point(Point::new(-43.2247, -22.9674)),
                properties,
            )],
            Some(Crs::wgs84()),
        );

        let dest = dir.path().join("pretty.geojson");
        write_geojson_pretty(&collection, &dest, Some(4)).unwrap();

        let written = std::fs::read_to_string(&dest).unwrap();
        assert!(written.contains("Jardim Botânico"));
        assert!(!written.contains("\\u"));
        // four-space indentation at the first nesting level
        assert!(written.contains("\n    \""));

        let reread = read_geojson(&dest).unwrap();
        assert_eq!(reread.len(), 1);
        assert_eq!(reread.features[0].properties["name"], "Jardim Botânico");
    }

    #[test]
    fn default_indent_is_two_spaces() {
        let dir = tempdir().unwrap();
        let collection = FeatureCollection::new(
            vec![Feature::new(Geometry::Point(Point::new(0.0, 0.0)))],
            Some(Crs::wgs84()),
        );
        let dest = dir.path().join("default.geojson");
        write_geojson_pretty(&collection, &dest, None).unwrap();

        let written = std::fs::read_to_string(&dest).unwrap();
        assert!(written.contains("\n  \""));
    }
}
