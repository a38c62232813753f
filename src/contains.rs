//! Containment checks: point-in-feature tests and the spatial join that finds
//! containing features in a collection.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::Point;
use rstar::{RTree, RTreeObject, AABB};

use crate::collection::{AreaArg, Crs, FeatureCollection, PointArg};
use crate::error::Result;
use crate::reproject::reproject_point;

/// Test whether a feature topologically contains a point.
///
/// Both arguments accept several shapes: a raw `(x, y)` pair, a bare geometry,
/// or a single-record collection. A collection's CRS overrides the matching
/// explicit argument. When both sides carry a CRS and they differ, the point
/// is reprojected into the feature's CRS before the test; when only one side
/// carries a CRS, no reprojection occurs and the test runs on the raw
/// coordinates as given.
///
/// Containment is boundary-exclusive: a point exactly on the boundary is not
/// contained.
pub fn point_in_feature<'a>(
    point: impl Into<PointArg<'a>>,
    feature: impl Into<AreaArg<'a>>,
    point_crs: Option<&str>,
    feature_crs: Option<&str>,
) -> Result<bool> {
    let (mut point, point_crs) = point.into().resolve(point_crs)?;
    let (feature_geometry, feature_crs) = feature.into().resolve(feature_crs)?;

    if let (Some(from), Some(to)) = (&point_crs, &feature_crs) {
        if from != to {
            point = reproject_point(point, from, to)?;
        }
    }

    Ok(feature_geometry.contains(&point))
}

struct FeatureEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for FeatureEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Indices of the features whose geometry contains the point.
///
/// The point inherits the collection's CRS when it carries none and is
/// reprojected into the collection's CRS when both are known and differ.
/// Candidates come from an R-tree over the feature envelopes and are refined
/// with the exact predicate ("within" from the point's perspective,
/// boundary-exclusive). A point matching nothing yields an empty vector,
/// never an error. Indices are deduplicated by construction and returned in
/// ascending order.
pub fn find_containing_indices<'a>(
    point: impl Into<PointArg<'a>>,
    features: &FeatureCollection,
) -> Result<Vec<usize>> {
    let (point, point_crs) = point.into().resolve(None)?;
    let point = align_point(point, point_crs, features)?;

    let envelopes: Vec<FeatureEnvelope> = features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            feature.geometry.bounding_rect().map(|rect| FeatureEnvelope {
                index,
                envelope: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
        })
        .collect();
    let tree = RTree::bulk_load(envelopes);

    let mut indices: Vec<usize> = tree
        .locate_in_envelope_intersecting(&AABB::from_point([point.x(), point.y()]))
        .filter(|candidate| features.features[candidate.index].geometry.contains(&point))
        .map(|candidate| candidate.index)
        .collect();
    indices.sort_unstable();
    Ok(indices)
}

/// The features that contain the point, cloned into a collection sharing the
/// input's CRS. Empty when nothing matches.
pub fn find_containing_feature<'a>(
    point: impl Into<PointArg<'a>>,
    features: &FeatureCollection,
) -> Result<FeatureCollection> {
    let indices = find_containing_indices(point, features)?;
    let matched = indices
        .iter()
        .map(|&index| features.features[index].clone())
        .collect();
    Ok(FeatureCollection::new(matched, features.crs.clone()))
}

// An untagged point is treated as already being in the collection's CRS, so
// alignment only reprojects when the point was tagged with a different system.
fn align_point(
    point: Point<f64>,
    point_crs: Option<Crs>,
    features: &FeatureCollection,
) -> Result<Point<f64>> {
    match (point_crs, &features.crs) {
        (Some(from), Some(to)) if &from != to => reproject_point(point, &from, to),
        _ => Ok(point),
    }
}
