//! Request envelopes
//!
//! Wraps one assembled `sourceDocument` in a registration or replace
//! request, and turns a previously generated request into a delete request.
//! Builders follow a single transition path: constructed → validated →
//! generated → optionally written. Writing re-uses the generated bytes and
//! never re-validates.

use std::path::Path;

use crate::attributes::{check_required, AttributeBag, Obligation, Value};
use crate::catalog::SchemaFamily;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::sourcedocs::{self, gld, gmn, gmw, SourceDocSpec};

/// Registrable source-document types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDocument {
    /// Well construction start registration
    GmwConstruction,
    /// Well lengthening
    GmwLengthening,
    /// Monitoring network start registration
    GmnStartRegistration,
    /// Measuring point addition to a network
    GmnMeasuringPoint,
    /// Level dossier start registration
    GldStartRegistration,
    /// Observation addition to a level dossier
    GldAddition,
}

impl SourceDocument {
    /// All supported source-document types
    pub const ALL: [SourceDocument; 6] = [
        SourceDocument::GmwConstruction,
        SourceDocument::GmwLengthening,
        SourceDocument::GmnStartRegistration,
        SourceDocument::GmnMeasuringPoint,
        SourceDocument::GldStartRegistration,
        SourceDocument::GldAddition,
    ];

    /// Schema-defined root tag of the source document
    pub fn tag(&self) -> &'static str {
        match self {
            SourceDocument::GmwConstruction => "GMW_Construction",
            SourceDocument::GmwLengthening => "GMW_Lengthening",
            SourceDocument::GmnStartRegistration => "GMN_StartRegistration",
            SourceDocument::GmnMeasuringPoint => "GMN_MeasuringPoint",
            SourceDocument::GldStartRegistration => "GLD_StartRegistration",
            SourceDocument::GldAddition => "GLD_Addition",
        }
    }

    /// Resolve a source-document tag, rejecting unsupported ones
    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|doc| doc.tag() == tag)
            .ok_or_else(|| Error::UnsupportedSourceDocument(tag.to_string()))
    }

    /// Schema family the document belongs to
    pub fn family(&self) -> SchemaFamily {
        match self {
            SourceDocument::GmwConstruction | SourceDocument::GmwLengthening => SchemaFamily::Gmw,
            SourceDocument::GmnStartRegistration | SourceDocument::GmnMeasuringPoint => SchemaFamily::Gmn,
            SourceDocument::GldStartRegistration | SourceDocument::GldAddition => SchemaFamily::Gld,
        }
    }

    /// Assembly spec for this document
    pub fn spec(&self) -> &'static SourceDocSpec {
        match self {
            SourceDocument::GmwConstruction => &gmw::GMW_CONSTRUCTION,
            SourceDocument::GmwLengthening => &gmw::GMW_LENGTHENING,
            SourceDocument::GmnStartRegistration => &gmn::GMN_START_REGISTRATION,
            SourceDocument::GmnMeasuringPoint => &gmn::GMN_MEASURING_POINT,
            SourceDocument::GldStartRegistration => &gld::GLD_START_REGISTRATION,
            SourceDocument::GldAddition => &gld::GLD_ADDITION,
        }
    }

    /// Whether this document registers a new object
    ///
    /// Start registrations must not carry a `broId` (the object does not
    /// exist in the registry yet); every other document mutates an existing
    /// object and requires one.
    pub fn is_start_registration(&self) -> bool {
        matches!(
            self,
            SourceDocument::GmwConstruction
                | SourceDocument::GmnStartRegistration
                | SourceDocument::GldStartRegistration
        )
    }
}

/// Kind of request envelope to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// First delivery of a source document
    Registration,
    /// Correction replacing a previously delivered document
    Replace,
}

impl RequestKind {
    /// Root tag of the envelope
    pub fn root_tag(&self) -> &'static str {
        match self {
            RequestKind::Registration => "registrationRequest",
            RequestKind::Replace => "replaceRequest",
        }
    }

    fn requirements(&self) -> &'static [(&'static str, Obligation)] {
        match self {
            RequestKind::Registration => &[
                ("deliveryAccountableParty", Obligation::Optional),
                ("broId", Obligation::Optional),
                ("qualityRegime", Obligation::Obligated),
                ("requestReference", Obligation::Obligated),
                ("srcdocdata", Obligation::Obligated),
            ],
            RequestKind::Replace => &[
                ("deliveryAccountableParty", Obligation::Optional),
                ("broId", Obligation::Optional),
                ("qualityRegime", Obligation::Obligated),
                ("requestReference", Obligation::Obligated),
                ("correctionReason", Obligation::Obligated),
                ("srcdocdata", Obligation::Obligated),
            ],
        }
    }
}

/// Builder for registration and replace requests
///
/// Request-level fields are validated at construction; `generate` assembles
/// and serializes the document once.
#[derive(Debug)]
pub struct RequestBuilder {
    kind: RequestKind,
    srcdoc: SourceDocument,
    data: AttributeBag,
    tree: Option<Element>,
    serialized: Option<Vec<u8>>,
}

impl RequestBuilder {
    /// Create a registration request builder
    pub fn registration(srcdoc_tag: &str, data: AttributeBag) -> Result<Self> {
        Self::new(RequestKind::Registration, srcdoc_tag, data)
    }

    /// Create a replace request builder
    pub fn replace(srcdoc_tag: &str, data: AttributeBag) -> Result<Self> {
        Self::new(RequestKind::Replace, srcdoc_tag, data)
    }

    /// Create a builder for the given request kind and source-document tag
    pub fn new(kind: RequestKind, srcdoc_tag: &str, data: AttributeBag) -> Result<Self> {
        let srcdoc = SourceDocument::from_tag(srcdoc_tag)?;
        let operation = format!("{} for {}", kind.root_tag(), srcdoc.tag());
        check_required(&data, kind.requirements(), &operation)?;

        Ok(Self {
            kind,
            srcdoc,
            data,
            tree: None,
            serialized: None,
        })
    }

    /// Build the envelope, assemble the source document and serialize
    ///
    /// Enforces the broId cross-field rule before any element is built.
    pub fn generate(&mut self) -> Result<()> {
        let has_bro_id = self.data.contains_key("broId");
        if self.srcdoc.is_start_registration() && has_bro_id {
            return Err(Error::InvalidBroIdUsage(format!(
                "'broId' is not allowed in combination with source document '{}'",
                self.srcdoc.tag()
            )));
        }
        if !self.srcdoc.is_start_registration() && !has_bro_id {
            return Err(Error::InvalidBroIdUsage(format!(
                "'broId' is required in combination with source document '{}'",
                self.srcdoc.tag()
            )));
        }

        let family = self.srcdoc.family();
        let catalog = family.catalog();

        let mut envelope = Element::new(QName::local(self.kind.root_tag()));
        envelope.push_attr("xmlns", catalog.default_namespace);
        for (prefix, uri) in catalog.namespaces.iter() {
            envelope.push_attr(format!("xmlns:{prefix}"), uri.clone());
        }
        envelope.push_attr("xsi:schemaLocation", catalog.schema_location);

        envelope.add_child(
            Element::new(QName::prefixed("brocom", "requestReference"))
                .with_text(self.text_field("requestReference")?),
        );
        if self.data.contains_key("deliveryAccountableParty") {
            envelope.add_child(
                Element::new(QName::prefixed("brocom", "deliveryAccountableParty"))
                    .with_text(self.text_field("deliveryAccountableParty")?),
            );
        }
        if has_bro_id {
            envelope.add_child(
                Element::new(QName::prefixed("brocom", "broId")).with_text(self.text_field("broId")?),
            );
        }
        envelope.add_child(
            Element::new(QName::prefixed("brocom", "qualityRegime"))
                .with_text(self.text_field("qualityRegime")?),
        );
        if self.kind == RequestKind::Replace {
            envelope.add_child(
                Element::new(QName::local("correctionReason"))
                    .with_attr("codeSpace", family.correction_reason_codespace())
                    .with_text(self.text_field("correctionReason")?),
            );
        }

        let operation = format!("{} for {}", self.kind.root_tag(), self.srcdoc.tag());
        let srcdocdata = self
            .data
            .get("srcdocdata")
            .and_then(Value::as_map)
            .ok_or_else(|| Error::missing(&operation, "srcdocdata"))?;
        envelope.add_child(sourcedocs::assemble(self.srcdoc.spec(), srcdocdata, catalog)?);

        self.serialized = Some(envelope.to_bytes(true)?);
        self.tree = Some(envelope);
        Ok(())
    }

    /// Serialized request, available after `generate`
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.serialized.as_deref()
    }

    /// Generated element tree, available after `generate`
    pub fn tree(&self) -> Option<&Element> {
        self.tree.as_ref()
    }

    /// Write the generated request to a file
    ///
    /// Does not re-validate or re-generate; fails with
    /// [`Error::NotGenerated`] if `generate` has not run.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.serialized.as_ref().ok_or(Error::NotGenerated)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn text_field(&self, key: &str) -> Result<String> {
        let operation = format!("{} for {}", self.kind.root_tag(), self.srcdoc.tag());
        sourcedocs::expect_text(&self.data, key, &operation)
    }
}

/// Delete request derived from an existing serialized request
///
/// Re-parses the document, renames every `*Request` element to
/// `deleteRequest` and overwrites or inserts the correction reason. No
/// other structural change is made.
#[derive(Debug)]
pub struct DeleteRequest {
    tree: Element,
    family: SchemaFamily,
    correction_reason: String,
    serialized: Option<Vec<u8>>,
}

impl DeleteRequest {
    /// Parse a previously generated request and prepare the transform
    ///
    /// Fails with [`Error::UnsupportedSourceDocument`] when the document
    /// contains no known source-document element. Matching is against local
    /// names only, so namespace prefixes cannot change the selection.
    pub fn from_serialized(xml: &[u8], correction_reason: impl Into<String>) -> Result<Self> {
        let tree = Element::parse(xml)?;
        let srcdoc = SourceDocument::ALL
            .into_iter()
            .find(|doc| tree.any(&|e| e.local_name() == doc.tag()))
            .ok_or_else(|| {
                Error::UnsupportedSourceDocument("no known source document in request".to_string())
            })?;

        Ok(Self {
            tree,
            family: srcdoc.family(),
            correction_reason: correction_reason.into(),
            serialized: None,
        })
    }

    /// Apply the transform and serialize
    pub fn generate(&mut self) -> Result<()> {
        self.tree.visit_mut(&mut |element| {
            if element.local_name().ends_with("Request") {
                element.qname = QName::local("deleteRequest");
            }
        });

        let reason = self.correction_reason.clone();
        if self.tree.any(&|element| element.local_name() == "correctionReason") {
            if let Some(element) =
                self.tree.find_mut(&|element| element.local_name() == "correctionReason")
            {
                element.set_text(reason);
            }
        } else {
            let element = Element::new(QName::local("correctionReason"))
                .with_attr("codeSpace", self.family.correction_reason_codespace())
                .with_text(reason);
            // Schema order: correctionReason directly follows qualityRegime
            let position = self
                .tree
                .child_position("qualityRegime")
                .map(|p| p + 1)
                .or_else(|| self.tree.child_position("sourceDocument"))
                .unwrap_or(self.tree.children.len());
            self.tree.insert_child(position, element);
        }

        self.serialized = Some(self.tree.to_bytes(true)?);
        Ok(())
    }

    /// Serialized delete request, available after `generate`
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.serialized.as_deref()
    }

    /// Transformed element tree
    pub fn tree(&self) -> &Element {
        &self.tree
    }

    /// Write the generated delete request to a file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.serialized.as_ref().ok_or(Error::NotGenerated)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn gld_start_bag() -> AttributeBag {
        let mut tube = AttributeBag::new();
        tube.insert("broId".to_string(), "GMW000000042583".into());
        tube.insert("tubeNumber".to_string(), "1".into());

        let mut srcdocdata = AttributeBag::new();
        srcdocdata.insert("objectIdAccountableParty".to_string(), "gld-001".into());
        srcdocdata.insert("monitoringPoint".to_string(), tube.into());

        let mut data = AttributeBag::new();
        data.insert("qualityRegime".to_string(), "IMBRO".into());
        data.insert("requestReference".to_string(), "levering-001".into());
        data.insert("srcdocdata".to_string(), srcdocdata.into());
        data
    }

    fn gld_addition_bag() -> AttributeBag {
        let mut metadata = AttributeBag::new();
        metadata.insert("observationType".to_string(), "reguliereMeting".into());
        metadata.insert("principalInvestigator".to_string(), "12345678".into());

        let mut pair = AttributeBag::new();
        pair.insert("time".to_string(), "2024-05-01T12:00:00+01:00".into());
        pair.insert("value".to_string(), "-2.13".into());

        let mut observation = AttributeBag::new();
        observation.insert("observationMetadata".to_string(), metadata.into());
        observation.insert("timeValuePairs".to_string(), vec![pair].into());

        let mut srcdocdata = AttributeBag::new();
        srcdocdata.insert("observation".to_string(), observation.into());

        let mut data = AttributeBag::new();
        data.insert("broId".to_string(), "GLD000000012345".into());
        data.insert("qualityRegime".to_string(), "IMBRO".into());
        data.insert("requestReference".to_string(), "levering-002".into());
        data.insert("srcdocdata".to_string(), srcdocdata.into());
        data
    }

    #[test]
    fn test_unknown_source_document_rejected() {
        let err = RequestBuilder::registration("GAR_StartRegistration", AttributeBag::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSourceDocument(_)));
    }

    #[test]
    fn test_request_fields_validated_at_construction() {
        let mut data = gld_start_bag();
        data.shift_remove("qualityRegime");
        let err = RequestBuilder::registration("GLD_StartRegistration", data).unwrap_err();
        match err {
            Error::MissingRequiredAttribute { attribute, .. } => assert_eq!(attribute, "qualityRegime"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_replace_requires_correction_reason() {
        let err = RequestBuilder::replace("GLD_Addition", gld_addition_bag()).unwrap_err();
        match err {
            Error::MissingRequiredAttribute { attribute, .. } => {
                assert_eq!(attribute, "correctionReason");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_start_registration_rejects_bro_id() {
        let mut data = gld_start_bag();
        data.insert("broId".to_string(), "GLD000000012345".into());
        let mut builder = RequestBuilder::registration("GLD_StartRegistration", data).unwrap();
        assert!(matches!(builder.generate(), Err(Error::InvalidBroIdUsage(_))));
    }

    #[test]
    fn test_addition_requires_bro_id() {
        let mut data = gld_addition_bag();
        data.shift_remove("broId");
        let mut builder = RequestBuilder::registration("GLD_Addition", data).unwrap();
        assert!(matches!(builder.generate(), Err(Error::InvalidBroIdUsage(_))));
    }

    #[test]
    fn test_registration_envelope_order() {
        let mut builder = RequestBuilder::registration("GLD_StartRegistration", gld_start_bag()).unwrap();
        builder.generate().unwrap();

        let tree = builder.tree().unwrap();
        assert_eq!(tree.local_name(), "registrationRequest");
        assert_eq!(tree.attr("xmlns"), Some("http://www.broservices.nl/xsd/isgld/1.0"));
        assert!(tree.attr("xsi:schemaLocation").unwrap().contains("isgld-messages.xsd"));

        let order: Vec<&str> = tree.children.iter().map(|c| c.local_name()).collect();
        assert_eq!(order, vec!["requestReference", "qualityRegime", "sourceDocument"]);
    }

    #[test]
    fn test_replace_envelope_carries_correction_reason() {
        let mut data = gld_addition_bag();
        data.insert("correctionReason".to_string(), "eigenCorrectie".into());
        let mut builder = RequestBuilder::replace("GLD_Addition", data).unwrap();
        builder.generate().unwrap();

        let tree = builder.tree().unwrap();
        assert_eq!(tree.local_name(), "replaceRequest");
        let order: Vec<&str> = tree.children.iter().map(|c| c.local_name()).collect();
        assert_eq!(
            order,
            vec!["requestReference", "broId", "qualityRegime", "correctionReason", "sourceDocument"]
        );

        let reason = tree.find_child("correctionReason").unwrap();
        assert_eq!(reason.attr("codeSpace"), Some("urn:bro:gld:CorrectionReason"));
        assert_eq!(reason.text.as_deref(), Some("eigenCorrectie"));
    }

    #[test]
    fn test_write_before_generate_fails() {
        let builder = RequestBuilder::registration("GLD_StartRegistration", gld_start_bag()).unwrap();
        let err = builder.write_to_file("/tmp/never-written.xml").unwrap_err();
        assert!(matches!(err, Error::NotGenerated));
    }

    #[test]
    fn test_delete_write_before_generate_fails() {
        let mut builder = RequestBuilder::registration("GLD_StartRegistration", gld_start_bag()).unwrap();
        builder.generate().unwrap();
        let delete = DeleteRequest::from_serialized(builder.as_bytes().unwrap(), "eigenCorrectie").unwrap();
        let err = delete.write_to_file("/tmp/never-written.xml").unwrap_err();
        assert!(matches!(err, Error::NotGenerated));
    }

    #[test]
    fn test_delete_transform_round_trip() {
        let mut builder = RequestBuilder::registration("GLD_StartRegistration", gld_start_bag()).unwrap();
        builder.generate().unwrap();

        let mut delete =
            DeleteRequest::from_serialized(builder.as_bytes().unwrap(), "eigenCorrectie").unwrap();
        delete.generate().unwrap();

        let tree = delete.tree();
        assert!(tree.local_name().ends_with("deleteRequest"));

        let reason = tree.find_child("correctionReason").unwrap();
        assert_eq!(reason.text.as_deref(), Some("eigenCorrectie"));
        assert_eq!(reason.attr("codeSpace"), Some("urn:bro:gld:CorrectionReason"));

        // Inserted directly after qualityRegime
        let quality = tree.child_position("qualityRegime").unwrap();
        assert_eq!(tree.child_position("correctionReason"), Some(quality + 1));
    }

    #[test]
    fn test_delete_transform_overwrites_existing_reason() {
        let mut data = gld_addition_bag();
        data.insert("correctionReason".to_string(), "oudeReden".into());
        let mut builder = RequestBuilder::replace("GLD_Addition", data).unwrap();
        builder.generate().unwrap();

        let mut delete =
            DeleteRequest::from_serialized(builder.as_bytes().unwrap(), "nieuweReden").unwrap();
        delete.generate().unwrap();

        let tree = delete.tree();
        assert_eq!(tree.local_name(), "deleteRequest");
        let reasons: Vec<&Element> = tree
            .children
            .iter()
            .filter(|c| c.local_name() == "correctionReason")
            .collect();
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].text.as_deref(), Some("nieuweReden"));
    }

    #[test]
    fn test_delete_transform_rejects_unknown_document() {
        let xml = b"<registrationRequest><sourceDocument><GAR_Unknown/></sourceDocument></registrationRequest>";
        let err = DeleteRequest::from_serialized(xml, "x").unwrap_err();
        assert!(matches!(err, Error::UnsupportedSourceDocument(_)));
    }
}
