//! CRS reprojection helpers built on the `proj` collaborator.
//!
//! Transformations are applied coordinate-wise through `geo`'s `MapCoords`,
//! so a failure for any coordinate propagates instead of panicking.

use geo::algorithm::map_coords::MapCoords;
use geo::{Geometry, Point};
use proj::Proj;

use crate::collection::{Crs, Feature, FeatureCollection};
use crate::error::{GeoError, Result};

/// Build a CRS-to-CRS transformation.
///
/// `new_known_crs` normalizes axis order for visualization, so coordinates are
/// always (x, y) / (longitude, latitude) on both sides.
pub fn transformer(from: &Crs, to: &Crs) -> Result<Proj> {
    Proj::new_known_crs(from.as_str(), to.as_str(), None)
        .map_err(|e| GeoError::Projection(format!("cannot transform {from} -> {to}: {e}")))
}

/// Reproject a single point.
pub fn reproject_point(point: Point<f64>, from: &Crs, to: &Crs) -> Result<Point<f64>> {
    let proj = transformer(from, to)?;
    point
        .try_map_coords(|coord| proj.convert(coord))
        .map_err(|e| GeoError::Projection(e.to_string()))
}

/// Reproject any geometry coordinate-wise.
pub fn reproject_geometry(geometry: &Geometry<f64>, from: &Crs, to: &Crs) -> Result<Geometry<f64>> {
    let proj = transformer(from, to)?;
    apply(&proj, geometry)
}

pub(crate) fn apply(proj: &Proj, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
    geometry
        .try_map_coords(|coord| proj.convert(coord))
        .map_err(|e| GeoError::Projection(e.to_string()))
}

/// Reproject every feature in a collection, retagging it with the target CRS.
///
/// Record order and properties are preserved. A collection already in the
/// target CRS is returned as a retagged copy without touching coordinates.
pub fn reproject_collection(collection: &FeatureCollection, to: &Crs) -> Result<FeatureCollection> {
    let from = collection
        .crs
        .as_ref()
        .ok_or(GeoError::MissingCrs("cannot reproject a collection without a CRS"))?;

    if from == to {
        let mut retagged = collection.clone();
        retagged.crs = Some(to.clone());
        return Ok(retagged);
    }

    let proj = transformer(from, to)?;
    let mut features = Vec::with_capacity(collection.len());
    for feature in &collection.features {
        features.push(Feature::with_properties(
            apply(&proj, &feature.geometry)?,
            feature.properties.clone(),
        ));
    }

    Ok(FeatureCollection::new(features, Some(to.clone())))
}
