//! GMW source documents: well construction and lengthening
//!
//! Builders for the well-construction constructables (delivered location,
//! vertical position, monitoring tubes with their screens, cables and
//! electrodes) plus the declarative specs for `GMW_Construction` and
//! `GMW_Lengthening`.
//!
//! Schema reference: <https://schema.broservices.nl/xsd/isgmw/1.1/isgmw-messages.xsd>

use uuid::Uuid;

use crate::attributes::{check_required, AttributeBag, Obligation};
use crate::catalog::{Catalog, SRS_NAME};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::qname;
use crate::sourcedocs::{expect_list, expect_map, expect_text, FieldRule, SourceDocSpec};

use Obligation::{Obligated, Optional};

/// Well construction start registration
pub static GMW_CONSTRUCTION: SourceDocSpec = SourceDocSpec {
    operation: "gmw_construction",
    root_tag: "GMW_Construction",
    fields: &[
        FieldRule::Simple { key: "objectIdAccountableParty", obligation: Obligated },
        FieldRule::Simple { key: "deliveryContext", obligation: Obligated },
        FieldRule::Simple { key: "constructionStandard", obligation: Obligated },
        FieldRule::Simple { key: "initialFunction", obligation: Obligated },
        FieldRule::Simple { key: "numberOfMonitoringTubes", obligation: Obligated },
        FieldRule::Simple { key: "groundLevelStable", obligation: Obligated },
        FieldRule::Simple { key: "wellStability", obligation: Optional },
        FieldRule::Simple { key: "owner", obligation: Obligated },
        FieldRule::Simple { key: "maintenanceResponsibleParty", obligation: Optional },
        FieldRule::Simple { key: "wellHeadProtector", obligation: Obligated },
        FieldRule::Built { key: "wellConstructionDate", obligation: Obligated, build: well_construction_date },
        FieldRule::Built { key: "deliveredLocation", obligation: Obligated, build: delivered_location },
        FieldRule::Built { key: "deliveredVerticalPosition", obligation: Obligated, build: delivered_vertical_position },
        FieldRule::Built { key: "monitoringTubes", obligation: Obligated, build: monitoring_tubes },
    ],
};

/// Well lengthening (prolongation of an existing registered well)
pub static GMW_LENGTHENING: SourceDocSpec = SourceDocSpec {
    operation: "gmw_lengthening",
    root_tag: "GMW_Lengthening",
    fields: &[
        FieldRule::Built { key: "eventDate", obligation: Obligated, build: event_date },
        FieldRule::Simple { key: "wellHeadProtector", obligation: Optional },
        FieldRule::Built { key: "monitoringTubes", obligation: Obligated, build: monitoring_tubes },
    ],
};

fn well_construction_date(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    let text = expect_text(data, "wellConstructionDate", "gmw_construction")?;
    let mut wrapper = Element::new(qname(catalog.namespaces, "ns", "wellConstructionDate")?);
    wrapper.add_child(Element::new(qname(catalog.namespaces, "ns1", "date")?).with_text(text));
    Ok(vec![wrapper])
}

fn event_date(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    let text = expect_text(data, "eventDate", "gmw_lengthening")?;
    let mut wrapper = Element::new(qname(catalog.namespaces, "ns", "eventDate")?);
    wrapper.add_child(Element::new(qname(catalog.namespaces, "ns1", "date")?).with_text(text));
    Ok(vec![wrapper])
}

/// Delivered location, restricted to EPSG::28992
///
/// The inner `ns2:location` carries a fresh `ns3:id` on every invocation;
/// coordinates are emitted as `"{X} {Y}"` with a single space.
fn delivered_location(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    const OPERATION: &str = "delivered_location";
    let slice = expect_map(data, "deliveredLocation", "gmw_construction")?;
    check_required(
        slice,
        &[
            ("X", Obligated),
            ("Y", Obligated),
            ("horizontalPositioningMethod", Obligated),
        ],
        OPERATION,
    )?;

    let mut delivered = Element::new(qname(catalog.namespaces, "ns", "deliveredLocation")?);

    let mut location = Element::new(qname(catalog.namespaces, "ns2", "location")?)
        .with_attr("ns3:id", format!("id-{}", Uuid::new_v4()))
        .with_attr("srsName", SRS_NAME);
    let pos = format!(
        "{} {}",
        expect_text(slice, "X", OPERATION)?,
        expect_text(slice, "Y", OPERATION)?
    );
    location.add_child(Element::new(qname(catalog.namespaces, "ns3", "pos")?).with_text(pos));
    delivered.add_child(location);

    delivered.add_child(codespace_element(
        catalog,
        "ns2",
        "horizontalPositioningMethod",
        expect_text(slice, "horizontalPositioningMethod", OPERATION)?,
    )?);

    Ok(vec![delivered])
}

fn delivered_vertical_position(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    const OPERATION: &str = "delivered_vertical_position";
    let slice = expect_map(data, "deliveredVerticalPosition", "gmw_construction")?;
    check_required(
        slice,
        &[
            ("localVerticalReferencePoint", Obligated),
            ("offset", Obligated),
            ("verticalDatum", Obligated),
            ("groundLevelPosition", Obligated),
            ("groundLevelPositioningMethod", Obligated),
        ],
        OPERATION,
    )?;

    let mut delivered = Element::new(qname(catalog.namespaces, "ns", "deliveredVerticalPosition")?);
    delivered.add_child(codespace_element(
        catalog,
        "ns2",
        "localVerticalReferencePoint",
        expect_text(slice, "localVerticalReferencePoint", OPERATION)?,
    )?);
    delivered.add_child(uom_element(catalog, "ns2", "offset", "m", expect_text(slice, "offset", OPERATION)?)?);
    delivered.add_child(codespace_element(
        catalog,
        "ns2",
        "verticalDatum",
        expect_text(slice, "verticalDatum", OPERATION)?,
    )?);
    delivered.add_child(uom_element(
        catalog,
        "ns2",
        "groundLevelPosition",
        "m",
        expect_text(slice, "groundLevelPosition", OPERATION)?,
    )?);
    delivered.add_child(codespace_element(
        catalog,
        "ns2",
        "groundLevelPositioningMethod",
        expect_text(slice, "groundLevelPositioningMethod", OPERATION)?,
    )?);

    Ok(vec![delivered])
}

fn material_used(tube: &AttributeBag, catalog: &Catalog, operation: &str) -> Result<Element> {
    let slice = expect_map(tube, "materialUsed", operation)?;
    check_required(
        slice,
        &[
            ("tubePackingMaterial", Obligated),
            ("tubeMaterial", Obligated),
            ("glue", Obligated),
        ],
        operation,
    )?;

    let mut material = Element::new(qname(catalog.namespaces, "ns", "materialUsed")?);
    for key in ["tubePackingMaterial", "tubeMaterial", "glue"] {
        material.add_child(codespace_element(catalog, "ns2", key, expect_text(slice, key, operation)?)?);
    }
    Ok(material)
}

fn screen(tube: &AttributeBag, catalog: &Catalog, operation: &str) -> Result<Element> {
    let slice = expect_map(tube, "screen", operation)?;
    check_required(
        slice,
        &[("screenLength", Obligated), ("sockMaterial", Obligated)],
        operation,
    )?;

    let mut element = Element::new(qname(catalog.namespaces, "ns", "screen")?);
    element.add_child(uom_element(
        catalog,
        "ns",
        "screenLength",
        "m",
        expect_text(slice, "screenLength", operation)?,
    )?);
    element.add_child(codespace_element(
        catalog,
        "ns",
        "sockMaterial",
        expect_text(slice, "sockMaterial", operation)?,
    )?);
    Ok(element)
}

fn plain_tube_part(tube: &AttributeBag, catalog: &Catalog, operation: &str) -> Result<Element> {
    let slice = expect_map(tube, "plainTubePart", operation)?;
    check_required(slice, &[("plainTubePartLength", Obligated)], operation)?;

    let mut element = Element::new(qname(catalog.namespaces, "ns", "plainTubePart")?);
    element.add_child(uom_element(
        catalog,
        "ns2",
        "plainTubePartLength",
        "m",
        expect_text(slice, "plainTubePartLength", operation)?,
    )?);
    Ok(element)
}

fn sediment_sump(tube: &AttributeBag, catalog: &Catalog, operation: &str) -> Result<Element> {
    let slice = expect_map(tube, "sedimentSump", operation)?;
    check_required(slice, &[("sedimentSumpLength", Obligated)], operation)?;

    let mut element = Element::new(qname(catalog.namespaces, "ns", "sedimentSump")?);
    element.add_child(uom_element(
        catalog,
        "ns2",
        "sedimentSumpLength",
        "m",
        expect_text(slice, "sedimentSumpLength", operation)?,
    )?);
    Ok(element)
}

fn electrode(data: &AttributeBag, catalog: &Catalog, operation: &str) -> Result<Element> {
    check_required(
        data,
        &[
            ("electrodeNumber", Obligated),
            ("electrodePackingMaterial", Obligated),
            ("electrodeStatus", Obligated),
            ("electrodePosition", Obligated),
        ],
        operation,
    )?;

    let mut element = Element::new(qname(catalog.namespaces, "ns", "electrode")?);
    element.add_child(plain(catalog, "ns2", "electrodeNumber", expect_text(data, "electrodeNumber", operation)?)?);
    element.add_child(codespace_element(
        catalog,
        "ns2",
        "electrodePackingMaterial",
        expect_text(data, "electrodePackingMaterial", operation)?,
    )?);
    element.add_child(codespace_element(
        catalog,
        "ns2",
        "electrodeStatus",
        expect_text(data, "electrodeStatus", operation)?,
    )?);
    element.add_child(uom_element(
        catalog,
        "ns2",
        "electrodePosition",
        "m",
        expect_text(data, "electrodePosition", operation)?,
    )?);
    Ok(element)
}

/// Geo-ohm cable: 1-based cable number from sequence position, at least 2
/// electrodes (schema minimum cardinality)
fn geo_ohm_cable(
    cable: &AttributeBag,
    index: usize,
    catalog: &Catalog,
    operation: &str,
) -> Result<Element> {
    let electrodes = expect_list(cable, "electrodes", operation)?;
    if electrodes.len() < 2 {
        return Err(Error::InsufficientElectrodes {
            cable: index,
            count: electrodes.len(),
        });
    }

    let mut element = Element::new(qname(catalog.namespaces, "ns", "geoOhmCable")?);
    element.add_child(plain(catalog, "ns", "cableNumber", (index + 1).to_string())?);
    for (electrode_index, electrode_data) in electrodes.iter().enumerate() {
        let label = format!("{operation}, electrode {electrode_index}");
        element.add_child(electrode(electrode_data, catalog, &label)?);
    }
    Ok(element)
}

fn monitoring_tube(tube: &AttributeBag, index: usize, catalog: &Catalog) -> Result<Element> {
    let operation = format!("monitoringTube {index}");
    check_required(
        tube,
        &[
            ("tubeNumber", Obligated),
            ("tubeType", Obligated),
            ("artesianWellCapPresent", Obligated),
            ("sedimentSumpPresent", Obligated),
            ("numberOfGeoOhmCables", Obligated),
            ("tubeTopDiameter", Obligated),
            ("variableDiameter", Obligated),
            ("tubeStatus", Obligated),
            ("tubeTopPosition", Obligated),
            ("tubeTopPositioningMethod", Obligated),
            ("materialUsed", Obligated),
            ("screen", Obligated),
            ("plainTubePart", Obligated),
            ("sedimentSump", Optional),
            ("geoOhmCables", Optional),
        ],
        &operation,
    )?;

    let mut element = Element::new(qname(catalog.namespaces, "ns", "monitoringTube")?);

    element.add_child(plain(catalog, "ns", "tubeNumber", expect_text(tube, "tubeNumber", &operation)?)?);
    element.add_child(codespace_element(catalog, "ns", "tubeType", expect_text(tube, "tubeType", &operation)?)?);
    element.add_child(plain(
        catalog,
        "ns",
        "artesianWellCapPresent",
        expect_text(tube, "artesianWellCapPresent", &operation)?,
    )?);
    element.add_child(plain(
        catalog,
        "ns",
        "sedimentSumpPresent",
        expect_text(tube, "sedimentSumpPresent", &operation)?,
    )?);
    element.add_child(plain(
        catalog,
        "ns",
        "numberOfGeoOhmCables",
        expect_text(tube, "numberOfGeoOhmCables", &operation)?,
    )?);
    element.add_child(uom_element(
        catalog,
        "ns",
        "tubeTopDiameter",
        "mm",
        expect_text(tube, "tubeTopDiameter", &operation)?,
    )?);
    element.add_child(plain(
        catalog,
        "ns",
        "variableDiameter",
        expect_text(tube, "variableDiameter", &operation)?,
    )?);
    element.add_child(codespace_element(
        catalog,
        "ns",
        "tubeStatus",
        expect_text(tube, "tubeStatus", &operation)?,
    )?);
    element.add_child(uom_element(
        catalog,
        "ns",
        "tubeTopPosition",
        "m",
        expect_text(tube, "tubeTopPosition", &operation)?,
    )?);
    element.add_child(codespace_element(
        catalog,
        "ns",
        "tubeTopPositioningMethod",
        expect_text(tube, "tubeTopPositioningMethod", &operation)?,
    )?);

    element.add_child(material_used(tube, catalog, &operation)?);
    element.add_child(screen(tube, catalog, &operation)?);
    element.add_child(plain_tube_part(tube, catalog, &operation)?);

    // Conditional constructables: presence of the key decides, absence is
    // never an error
    if tube.contains_key("sedimentSump") {
        element.add_child(sediment_sump(tube, catalog, &operation)?);
    }
    if tube.contains_key("geoOhmCables") {
        let cables = expect_list(tube, "geoOhmCables", &operation)?;
        for (cable_index, cable) in cables.iter().enumerate() {
            let label = format!("{operation}, geoOhmCable {cable_index}");
            element.add_child(geo_ohm_cable(cable, cable_index, catalog, &label)?);
        }
    }

    Ok(element)
}

fn monitoring_tubes(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    let tubes = expect_list(data, "monitoringTubes", "gmw_construction")?;
    tubes
        .iter()
        .enumerate()
        .map(|(index, tube)| monitoring_tube(tube, index, catalog))
        .collect()
}

fn plain(catalog: &Catalog, prefix: &str, name: &str, text: String) -> Result<Element> {
    Ok(Element::new(qname(catalog.namespaces, prefix, name)?).with_text(text))
}

fn uom_element(catalog: &Catalog, prefix: &str, name: &str, uom: &str, text: String) -> Result<Element> {
    Ok(Element::new(qname(catalog.namespaces, prefix, name)?)
        .with_attr("uom", uom)
        .with_text(text))
}

fn codespace_element(catalog: &Catalog, prefix: &str, name: &str, text: String) -> Result<Element> {
    let mut element = Element::new(qname(catalog.namespaces, prefix, name)?).with_text(text);
    if let Some(urn) = catalog.codespaces.get(name) {
        element.attributes.insert(0, ("codeSpace".to_string(), urn.clone()));
    }
    Ok(element)
}
