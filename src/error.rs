//! Error types for civicmap

use thiserror::Error;

/// Main error type for civicmap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("Spatial key error: {0}")]
    SpatialKey(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Coordinator error: {0}")]
    Coordinator(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// True for failures that mean the document store could not be reached
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<geohash::GeohashError> for Error {
    fn from(err: geohash::GeohashError) -> Self {
        Self::SpatialKey(err.to_string())
    }
}

/// Result type alias for civicmap operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_classification() {
        assert!(Error::StoreUnavailable("offline".to_string()).is_degraded());
        assert!(!Error::Coordinator("stopped".to_string()).is_degraded());
        assert!(!Error::Config("bad".to_string()).is_degraded());
    }

    #[test]
    fn test_conversions() {
        let io: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(matches!(io, Error::Io(_)));

        let json: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(json, Error::Json(_)));
    }
}
