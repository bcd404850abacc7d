//! Error handling for rackgen
//!
//! One error enum covers the whole pipeline: configuration problems found
//! while building the device, missing or undecodable bundle resources,
//! transport failures while loading the bundle, and render failures while
//! producing panel rasters.

use thiserror::Error;

/// Result type alias for rackgen operations
pub type Result<T> = std::result::Result<T, RackError>;

/// Main error type for rackgen operations
#[derive(Error, Debug)]
pub enum RackError {
    /// Invalid or missing device field (e.g. an unknown `device_type`)
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// A required bundle resource is absent (the built-in images are not optional)
    #[error("Asset not found: {path}")]
    AssetNotFound { path: String },

    /// Bundle could not be fetched or read
    #[error("Transport error: {detail}")]
    Transport {
        detail: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Bundle entry could not be decoded into a text or image resource
    #[error("Invalid bundle: {reason}")]
    InvalidBundle { reason: String },

    /// Panel raster could not be produced
    #[error("Render error: {reason}")]
    Render { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Archive Errors
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // Image codec Errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl RackError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            RackError::Configuration { .. } => "CONFIGURATION_ERROR",
            RackError::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            RackError::Transport { .. } => "TRANSPORT_ERROR",
            RackError::InvalidBundle { .. } => "INVALID_BUNDLE",
            RackError::Render { .. } => "RENDER_ERROR",
            RackError::Io(_) => "IO_ERROR",
            RackError::Serialization(_) => "SERIALIZATION_ERROR",
            RackError::Zip(_) => "ZIP_ERROR",
            RackError::Image(_) => "IMAGE_ERROR",
        }
    }

    /// Check if resubmitting the same request could succeed. The engine never
    /// retries internally; this only informs the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RackError::Configuration { .. } | RackError::Transport { .. }
        )
    }
}
