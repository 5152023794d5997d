//! GLD source documents: groundwater level dossiers
//!
//! Specs for `GLD_StartRegistration` (opening a level dossier on a
//! monitoring tube) and `GLD_Addition` (appending an observation with its
//! time/value pairs).

use uuid::Uuid;

use crate::attributes::{check_required, AttributeBag, Obligation};
use crate::catalog::Catalog;
use crate::element::Element;
use crate::error::Result;
use crate::namespaces::qname;
use crate::sourcedocs::{expect_list, expect_map, expect_text, FieldRule, SourceDocSpec};

use Obligation::{Obligated, Optional};

/// Opening a level dossier for one monitoring tube
pub static GLD_START_REGISTRATION: SourceDocSpec = SourceDocSpec {
    operation: "gld_startregistration",
    root_tag: "GLD_StartRegistration",
    fields: &[
        FieldRule::Simple { key: "objectIdAccountableParty", obligation: Obligated },
        FieldRule::Simple { key: "groundwaterMonitoringNet", obligation: Optional },
        FieldRule::Built { key: "monitoringPoint", obligation: Obligated, build: monitoring_point },
    ],
};

/// Appending one observation to an existing dossier
pub static GLD_ADDITION: SourceDocSpec = SourceDocSpec {
    operation: "gld_addition",
    root_tag: "GLD_Addition",
    fields: &[
        FieldRule::Built { key: "observation", obligation: Obligated, build: observation },
    ],
};

/// Reference to the GMW monitoring tube the dossier observes
fn monitoring_point(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    const OPERATION: &str = "gld_startregistration";
    let slice = expect_map(data, "monitoringPoint", OPERATION)?;
    check_required(slice, &[("broId", Obligated), ("tubeNumber", Obligated)], OPERATION)?;

    let mut wrapper = Element::new(qname(catalog.namespaces, "ns", "monitoringPoint")?);
    let mut tube = Element::new(qname(catalog.namespaces, "ns2", "GroundwaterMonitoringTube")?)
        .with_attr("gml:id", format!("id-{}", Uuid::new_v4()));
    tube.add_child(
        Element::new(qname(catalog.namespaces, "ns2", "broId")?)
            .with_text(expect_text(slice, "broId", OPERATION)?),
    );
    tube.add_child(
        Element::new(qname(catalog.namespaces, "ns2", "tubeNumber")?)
            .with_text(expect_text(slice, "tubeNumber", OPERATION)?),
    );
    wrapper.add_child(tube);
    Ok(vec![wrapper])
}

/// One observation: metadata plus the ordered time/value pairs
fn observation(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    const OPERATION: &str = "gld_addition";
    let slice = expect_map(data, "observation", OPERATION)?;
    check_required(
        slice,
        &[("observationMetadata", Obligated), ("timeValuePairs", Obligated)],
        OPERATION,
    )?;

    let mut wrapper = Element::new(qname(catalog.namespaces, "ns", "observation")?)
        .with_attr("gml:id", format!("id-{}", Uuid::new_v4()));

    let metadata = expect_map(slice, "observationMetadata", OPERATION)?;
    check_required(
        metadata,
        &[("observationType", Obligated), ("principalInvestigator", Obligated)],
        OPERATION,
    )?;
    let mut metadata_el = Element::new(qname(catalog.namespaces, "ns2", "observationMetadata")?);
    for key in ["observationType", "principalInvestigator"] {
        let mut child = Element::new(qname(catalog.namespaces, "ns2", key)?)
            .with_text(expect_text(metadata, key, OPERATION)?);
        if let Some(urn) = catalog.codespaces.get(key) {
            child.attributes.insert(0, ("codeSpace".to_string(), urn.clone()));
        }
        metadata_el.add_child(child);
    }
    wrapper.add_child(metadata_el);

    let pairs = expect_list(slice, "timeValuePairs", OPERATION)?;
    let mut result = Element::new(qname(catalog.namespaces, "ns2", "result")?);
    for (index, pair) in pairs.iter().enumerate() {
        let label = format!("{OPERATION}, timeValuePair {index}");
        check_required(pair, &[("time", Obligated), ("value", Obligated)], &label)?;
        let mut pair_el = Element::new(qname(catalog.namespaces, "ns2", "timeValuePair")?);
        pair_el.add_child(
            Element::new(qname(catalog.namespaces, "ns2", "time")?)
                .with_text(expect_text(pair, "time", &label)?),
        );
        pair_el.add_child(
            Element::new(qname(catalog.namespaces, "ns2", "value")?)
                .with_attr("uom", "m")
                .with_text(expect_text(pair, "value", &label)?),
        );
        result.add_child(pair_el);
    }
    wrapper.add_child(result);

    Ok(vec![wrapper])
}
