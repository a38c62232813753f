//! Convenience helpers over the georust stack: geometry format conversion,
//! HTML description cleanup, containment queries, and centroid computation.
//!
//! Every function here is a thin orchestration layer: the codecs, the CRS
//! math, the HTML tokenizer and the topological predicates all come from the
//! underlying collaborator crates.
//!
//! ```no_run
//! use std::path::Path;
//! use geoprocess::{convert, find_containing_feature};
//!
//! let districts = convert(Path::new("districts.kml"), Path::new("districts.geojson"))?;
//! let hit = find_containing_feature((-43.1729, -22.9068), &districts)?;
//! println!("point falls in {} feature(s)", hit.len());
//! # Ok::<(), geoprocess::GeoError>(())
//! ```

use std::path::Path;

pub mod centroid;
pub mod collection;
pub mod contains;
pub mod convert;
pub mod error;
pub mod html;
pub mod reproject;

pub use centroid::centroids;
pub use collection::{AreaArg, Crs, Feature, FeatureCollection, PointArg};
pub use contains::{find_containing_feature, find_containing_indices, point_in_feature};
pub use convert::{convert, read_geojson, read_kml, write_geojson, write_geojson_pretty};
pub use error::{GeoError, Result};
pub use html::{extract_first_link, extract_text};
pub use reproject::{reproject_collection, reproject_geometry, reproject_point};

/// Input formats understood by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Kml,
    GeoJson,
}

impl InputFormat {
    /// Sniff the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<InputFormat> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("kml") {
            Some(InputFormat::Kml)
        } else if extension.eq_ignore_ascii_case("geojson") || extension.eq_ignore_ascii_case("json")
        {
            Some(InputFormat::GeoJson)
        } else {
            None
        }
    }
}

/// Read a feature collection from a file using its format-specific driver.
pub fn read_collection(path: &Path, format: InputFormat) -> Result<FeatureCollection> {
    match format {
        InputFormat::Kml => convert::read_kml(path),
        InputFormat::GeoJson => convert::read_geojson(path),
    }
}
