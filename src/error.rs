//! Error types for broxml
//!
//! This module defines all error types used throughout the library.
//! Every error is raised synchronously at the point of detection; a failed
//! build never returns or writes a partial document.

use thiserror::Error;

/// Result type alias using broxml Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for broxml operations
#[derive(Error, Debug)]
pub enum Error {
    /// An attribute marked as obligated for the operation is absent
    #[error("missing required attribute '{attribute}' for {operation}")]
    MissingRequiredAttribute {
        /// Operation that was being validated
        operation: String,
        /// Name of the absent attribute
        attribute: String,
    },

    /// The requested source-document type is not supported
    #[error("source document type not supported: '{0}'")]
    UnsupportedSourceDocument(String),

    /// broId supplied for a start registration, or absent for a mutation
    #[error("invalid broId usage: {0}")]
    InvalidBroIdUsage(String),

    /// A geo-ohm cable must carry at least 2 electrodes
    #[error("geo-ohm cable {cable} has {count} electrode(s), at least 2 required")]
    InsufficientElectrodes {
        /// 0-based index of the offending cable
        cable: usize,
        /// Number of electrodes supplied
        count: usize,
    },

    /// A network start registration must carry at least 1 measuring point
    #[error("no measuring points provided, at least 1 measuring point required")]
    TooFewMeasuringPoints,

    /// A builder asked for a prefix the active namespace map does not define
    #[error("unknown namespace prefix: '{0}'")]
    UnknownNamespacePrefix(String),

    /// Serialized output requested before `generate` has run
    #[error("request has not been generated yet")]
    NotGenerated,

    /// XML serialization or parsing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a `MissingRequiredAttribute` error
    pub fn missing(operation: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            operation: operation.into(),
            attribute: attribute.into(),
        }
    }
}
