//! Namespace, code-space and schema-location catalogs
//!
//! Read-only lookup tables per BRO schema family. The assembly engine only
//! consults these tables; it never computes namespace or vocabulary data.
//! URIs and URNs follow the registration-request schemas published at
//! <https://schema.broservices.nl/>.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::namespaces::{CodeSpaceMap, NamespaceMap};

/// brocommon 3.0 namespace, shared by every request envelope
pub const BROCOMMON_NAMESPACE: &str = "http://www.broservices.nl/xsd/brocommon/3.0";

/// GML 3.2 namespace
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// isgmw 1.1 namespace (well construction requests)
pub const ISGMW_NAMESPACE: &str = "http://www.broservices.nl/xsd/isgmw/1.1";

/// gmwcommon 1.1 namespace
pub const GMWCOMMON_NAMESPACE: &str = "http://www.broservices.nl/xsd/gmwcommon/1.1";

/// isgmn 1.0 namespace (monitoring network requests)
pub const ISGMN_NAMESPACE: &str = "http://www.broservices.nl/xsd/isgmn/1.0";

/// isgld 1.0 namespace (level dataset requests)
pub const ISGLD_NAMESPACE: &str = "http://www.broservices.nl/xsd/isgld/1.0";

/// gldcommon 1.0 namespace
pub const GLDCOMMON_NAMESPACE: &str = "http://www.broservices.nl/xsd/gldcommon/1.0";

/// The only supported coordinate reference system
pub const SRS_NAME: &str = "urn:ogc:def:crs:EPSG::28992";

/// BRO schema family a source document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFamily {
    /// Groundwater monitoring well (construction, lengthening)
    Gmw,
    /// Groundwater monitoring network
    Gmn,
    /// Groundwater level dossier
    Gld,
}

impl SchemaFamily {
    /// Short lowercase token used in code-space URNs
    pub fn token(&self) -> &'static str {
        match self {
            SchemaFamily::Gmw => "gmw",
            SchemaFamily::Gmn => "gmn",
            SchemaFamily::Gld => "gld",
        }
    }

    /// Fixed code-space URN for the correctionReason element
    pub fn correction_reason_codespace(&self) -> String {
        format!("urn:bro:{}:CorrectionReason", self.token())
    }

    /// Catalog for this family
    pub fn catalog(&self) -> &'static Catalog {
        match self {
            SchemaFamily::Gmw => &GMW_CATALOG,
            SchemaFamily::Gmn => &GMN_CATALOG,
            SchemaFamily::Gld => &GLD_CATALOG,
        }
    }
}

/// Bundle of lookup tables for one schema family
pub struct Catalog {
    /// Default (unprefixed) namespace of the request envelope
    pub default_namespace: &'static str,
    /// `xsi:schemaLocation` value for the request envelope
    pub schema_location: &'static str,
    /// Prefix to namespace URI map
    pub namespaces: &'static Lazy<NamespaceMap>,
    /// Attribute name to controlled-vocabulary URN map
    pub codespaces: &'static Lazy<CodeSpaceMap>,
}

fn map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// GMW: ns=isgmw, ns1=brocommon, ns2=gmwcommon, ns3=gml

static GMW_NAMESPACES: Lazy<NamespaceMap> = Lazy::new(|| {
    map(&[
        ("ns", ISGMW_NAMESPACE),
        ("ns1", BROCOMMON_NAMESPACE),
        ("ns2", GMWCOMMON_NAMESPACE),
        ("ns3", GML_NAMESPACE),
        ("brocom", BROCOMMON_NAMESPACE),
        ("gml", GML_NAMESPACE),
        ("xsi", XSI_NAMESPACE),
    ])
});

static GMW_CODESPACES: Lazy<CodeSpaceMap> = Lazy::new(|| {
    map(&[
        ("deliveryContext", "urn:bro:gmw:DeliveryContext"),
        ("constructionStandard", "urn:bro:gmw:ConstructionStandard"),
        ("initialFunction", "urn:bro:gmw:InitialFunction"),
        ("wellHeadProtector", "urn:bro:gmw:WellHeadProtector"),
        ("horizontalPositioningMethod", "urn:bro:gmw:HorizontalPositioningMethod"),
        ("localVerticalReferencePoint", "urn:bro:gmw:LocalVerticalReferencePoint"),
        ("verticalDatum", "urn:bro:gmw:VerticalDatum"),
        ("groundLevelPositioningMethod", "urn:bro:gmw:GroundLevelPositioningMethod"),
        ("tubeType", "urn:bro:gmw:TubeType"),
        ("tubeStatus", "urn:bro:gmw:TubeStatus"),
        ("tubeTopPositioningMethod", "urn:bro:gmw:TubeTopPositioningMethod"),
        ("tubePackingMaterial", "urn:bro:gmw:TubePackingMaterial"),
        ("tubeMaterial", "urn:bro:gmw:TubeMaterial"),
        ("glue", "urn:bro:gmw:Glue"),
        ("sockMaterial", "urn:bro:gmw:SockMaterial"),
        ("electrodePackingMaterial", "urn:bro:gmw:ElectrodePackingMaterial"),
        ("electrodeStatus", "urn:bro:gmw:ElectrodeStatus"),
    ])
});

/// GMW 1.1 lookup tables
pub static GMW_CATALOG: Catalog = Catalog {
    default_namespace: ISGMW_NAMESPACE,
    schema_location: "http://www.broservices.nl/xsd/isgmw/1.1 https://schema.broservices.nl/xsd/isgmw/1.1/isgmw-messages.xsd",
    namespaces: &GMW_NAMESPACES,
    codespaces: &GMW_CODESPACES,
};

// GMN: ns=isgmn

static GMN_NAMESPACES: Lazy<NamespaceMap> = Lazy::new(|| {
    map(&[
        ("ns", ISGMN_NAMESPACE),
        ("brocom", BROCOMMON_NAMESPACE),
        ("gml", GML_NAMESPACE),
        ("xsi", XSI_NAMESPACE),
    ])
});

static GMN_CODESPACES: Lazy<CodeSpaceMap> = Lazy::new(|| {
    map(&[
        ("deliveryContext", "urn:bro:gmn:DeliveryContext"),
        ("monitoringPurpose", "urn:bro:gmn:MonitoringPurpose"),
        ("groundwaterAspect", "urn:bro:gmn:GroundwaterAspect"),
    ])
});

/// GMN 1.0 lookup tables
pub static GMN_CATALOG: Catalog = Catalog {
    default_namespace: ISGMN_NAMESPACE,
    schema_location: "http://www.broservices.nl/xsd/isgmn/1.0 https://schema.broservices.nl/xsd/isgmn/1.0/isgmn-messages.xsd",
    namespaces: &GMN_NAMESPACES,
    codespaces: &GMN_CODESPACES,
};

// GLD: ns=isgld, ns2=gldcommon

static GLD_NAMESPACES: Lazy<NamespaceMap> = Lazy::new(|| {
    map(&[
        ("ns", ISGLD_NAMESPACE),
        ("ns2", GLDCOMMON_NAMESPACE),
        ("brocom", BROCOMMON_NAMESPACE),
        ("gml", GML_NAMESPACE),
        ("xsi", XSI_NAMESPACE),
    ])
});

static GLD_CODESPACES: Lazy<CodeSpaceMap> = Lazy::new(|| {
    map(&[
        ("observationType", "urn:bro:gld:ObservationType"),
        ("principalInvestigator", "urn:bro:gld:PrincipalInvestigator"),
    ])
});

/// GLD 1.0 lookup tables
pub static GLD_CATALOG: Catalog = Catalog {
    default_namespace: ISGLD_NAMESPACE,
    schema_location: "http://www.broservices.nl/xsd/isgld/1.0 https://schema.broservices.nl/xsd/isgld/1.0/isgld-messages.xsd",
    namespaces: &GLD_NAMESPACES,
    codespaces: &GLD_CODESPACES,
};
