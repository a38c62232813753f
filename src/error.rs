//! Error types for the conversion and geometry helpers

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in geoprocess operations
#[derive(Debug, Error)]
pub enum GeoError {
    /// Input file path does not exist
    #[error("input file not found: '{}'", .0.display())]
    NotFound(PathBuf),

    /// Read, parse, write or serialize failure during format conversion
    #[error("conversion error: {0}")]
    Conversion(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CRS transformation failure
    #[error("projection error: {0}")]
    Projection(String),

    /// A single-geometry argument collection had no records
    #[error("empty feature collection: {0}")]
    EmptyCollection(&'static str),

    /// An argument collection did not hold the expected geometry type
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Reprojection was required but the collection carries no CRS
    #[error("collection has no CRS: {0}")]
    MissingCrs(&'static str),

    /// The underlying geometry library defines no centroid for this record
    #[error("no centroid defined for geometry at index {0}")]
    Centroid(usize),
}

/// Result type for geoprocess operations
pub type Result<T> = std::result::Result<T, GeoError>;
