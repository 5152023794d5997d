//! # broxml
//!
//! Generation of XML registration requests for the Dutch BRO registry
//! (Basisregistratie Ondergrond), covering groundwater monitoring wells
//! (GMW), monitoring networks (GMN) and level dossiers (GLD).
//!
//! Callers supply an attribute bag describing a monitoring asset together
//! with a source-document type; the library validates the bag against the
//! operation's obligation rules and emits a schema-ordered, namespace-
//! qualified request document.
//!
//! ## Example
//!
//! ```rust,ignore
//! use broxml::{AttributeBag, RequestBuilder};
//!
//! let mut data = AttributeBag::new();
//! data.insert("requestReference".to_string(), "levering-001".into());
//! data.insert("qualityRegime".to_string(), "IMBRO".into());
//! data.insert("srcdocdata".to_string(), srcdocdata.into());
//!
//! let mut request = RequestBuilder::registration("GLD_StartRegistration", data)?;
//! request.generate()?;
//! request.write_to_file("startregistration.xml")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod catalog;
pub mod element;
pub mod error;
pub mod namespaces;
pub mod requests;
pub mod sourcedocs;

// Re-exports for convenience
pub use attributes::{AttributeBag, Obligation, Value};
pub use element::Element;
pub use error::{Error, Result};
pub use requests::{DeleteRequest, RequestBuilder, RequestKind, SourceDocument};

/// Version of the broxml library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
