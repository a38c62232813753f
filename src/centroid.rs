//! Centroid computation with the planar detour through EPSG:3857.

use geo::algorithm::centroid::Centroid;
use geo::Geometry;

use crate::collection::{Crs, Feature, FeatureCollection};
use crate::error::{GeoError, Result};
use crate::reproject::reproject_collection;

/// Geometric centroids of every record, one per feature in input order.
///
/// The collection is reprojected to EPSG:3857 first: computing centroids
/// directly in a geographic CRS distorts the result for anything but tiny
/// extents. The centroid points are then reprojected to `target_crs` (`None`
/// for EPSG:4326) and returned as a bare point collection tagged with the
/// target CRS.
///
/// Fails with [`GeoError::MissingCrs`] when the input carries no CRS and with
/// [`GeoError::Centroid`] when the underlying library defines no centroid for
/// a record (degenerate geometry), naming the record's index.
pub fn centroids(
    features: &FeatureCollection,
    target_crs: Option<&str>,
) -> Result<FeatureCollection> {
    let target = Crs::new(target_crs.unwrap_or(Crs::WGS84));
    let mercator = Crs::web_mercator();

    let planar = reproject_collection(features, &mercator)?;

    let mut points = Vec::with_capacity(planar.len());
    for (index, feature) in planar.iter().enumerate() {
        let centroid = feature
            .geometry
            .centroid()
            .ok_or(GeoError::Centroid(index))?;
        points.push(Feature::new(Geometry::Point(centroid)));
    }

    reproject_collection(&FeatureCollection::new(points, Some(mercator)), &target)
}
