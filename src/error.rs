//! Error types for the export pipeline

use thiserror::Error;

/// Errors raised by the vector exporter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// The surface has no vector sub-element to serialize
    #[error("No vector element found on the render surface")]
    NotFound,
}

/// Errors raised while capturing a surface or composing the document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// The surface is not attached to a renderable context
    #[error("Render surface is detached")]
    Detached,

    /// The surface has a zero or negative extent
    #[error("Render surface is empty ({width}x{height})")]
    EmptySurface {
        /// Intrinsic width
        width: f32,
        /// Intrinsic height
        height: f32,
    },

    /// The vector markup could not be read by the rasterizer
    #[error("Failed to parse vector markup: {0}")]
    Parse(String),

    /// The bitmap could not be allocated
    #[error("Failed to allocate a {width}x{height} bitmap")]
    Allocation {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Writing the document failed
    #[error("Failed to encode document: {0}")]
    Encode(String),

    /// The background capture task did not complete
    #[error("Capture task failed: {0}")]
    Task(String),

    /// The page or capture parameters cannot produce a document
    #[error("Invalid export settings: {0}")]
    InvalidSettings(String),
}

/// Errors raised while offering an artifact to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    /// The user dismissed the save dialog
    #[error("Save cancelled")]
    Cancelled,

    /// The chosen file could not be written
    #[error("Failed to save {path}: {reason}")]
    Write {
        /// Destination picked in the dialog
        path: String,
        /// Underlying I/O error
        reason: String,
    },

    /// The platform refused to start the download
    #[error("Download failed: {0}")]
    Unavailable(String),
}
