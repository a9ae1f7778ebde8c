use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdIndexError {
    /// A tree was requested with zero dimensions.
    #[error("Dimensionality must be at least 1.")]
    InvalidDimensions,

    /// A point, bound or center had the wrong number of coordinates.
    #[error("Expected {expected} coordinates, got {actual}.")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A point carried a coordinate that cannot be ordered (NaN).
    #[error("Coordinate on axis {axis} is not comparable.")]
    InvalidCoordinate { axis: usize },

    /// The lower bound of a range query exceeds its upper bound.
    #[error("Lower bound exceeds upper bound on axis {axis}.")]
    InvalidBounds { axis: usize },

    /// A radius query was given a negative or NaN radius.
    #[error("Radius must be a non-negative number.")]
    InvalidRadius,

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, KdIndexError>;
