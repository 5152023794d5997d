//! GMN source documents: monitoring network registration
//!
//! Specs for `GMN_StartRegistration` (a new network with its measuring
//! points) and `GMN_MeasuringPoint` (adding one measuring point to an
//! existing network).

use crate::attributes::{check_required, AttributeBag, Obligation};
use crate::catalog::Catalog;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::{qname, QName};
use crate::sourcedocs::{expect_list, expect_map, expect_text, FieldRule, SourceDocSpec};

use Obligation::Obligated;

/// Network start registration; at least one measuring point is required
pub static GMN_START_REGISTRATION: SourceDocSpec = SourceDocSpec {
    operation: "gmn_startregistration",
    root_tag: "GMN_StartRegistration",
    fields: &[
        FieldRule::Simple { key: "objectIdAccountableParty", obligation: Obligated },
        FieldRule::Simple { key: "name", obligation: Obligated },
        FieldRule::Simple { key: "deliveryContext", obligation: Obligated },
        FieldRule::Simple { key: "monitoringPurpose", obligation: Obligated },
        FieldRule::Simple { key: "groundwaterAspect", obligation: Obligated },
        FieldRule::Built { key: "startDateMonitoring", obligation: Obligated, build: start_date_monitoring },
        FieldRule::Built { key: "measuringPoints", obligation: Obligated, build: measuring_points },
    ],
};

/// Addition of a single measuring point to a registered network
pub static GMN_MEASURING_POINT: SourceDocSpec = SourceDocSpec {
    operation: "gmn_measuringpoint",
    root_tag: "GMN_MeasuringPoint",
    fields: &[
        FieldRule::Built { key: "eventDate", obligation: Obligated, build: event_date },
        FieldRule::Built { key: "measuringPoint", obligation: Obligated, build: single_measuring_point },
    ],
};

fn start_date_monitoring(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    let text = expect_text(data, "startDateMonitoring", "gmn_startregistration")?;
    let mut wrapper = Element::new(qname(catalog.namespaces, "ns", "startDateMonitoring")?);
    wrapper.add_child(Element::new(qname(catalog.namespaces, "brocom", "date")?).with_text(text));
    Ok(vec![wrapper])
}

fn event_date(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    let text = expect_text(data, "eventDate", "gmn_measuringpoint")?;
    let mut wrapper = Element::new(qname(catalog.namespaces, "ns", "eventDate")?);
    wrapper.add_child(Element::new(qname(catalog.namespaces, "brocom", "date")?).with_text(text));
    Ok(vec![wrapper])
}

/// One measuring point: the code plus a reference to the monitoring tube it
/// observes. The inner `MeasuringPoint` carries a sequence-position-derived
/// `gml:id` (`measuringPoint0`, `measuringPoint1`, ...).
fn measuring_point(
    data: &AttributeBag,
    index: usize,
    catalog: &Catalog,
    operation: &str,
) -> Result<Element> {
    check_required(
        data,
        &[("measuringPointCode", Obligated), ("monitoringTube", Obligated)],
        operation,
    )?;

    let mut wrapper = Element::new(qname(catalog.namespaces, "ns", "measuringPoint")?);
    let mut point = Element::new(QName::local("MeasuringPoint"))
        .with_attr("gml:id", format!("measuringPoint{index}"));
    point.add_child(
        Element::new(QName::local("measuringPointCode"))
            .with_text(expect_text(data, "measuringPointCode", operation)?),
    );

    let tube = expect_map(data, "monitoringTube", operation)?;
    check_required(tube, &[("broId", Obligated), ("tubeNumber", Obligated)], operation)?;
    let mut tube_wrapper = Element::new(QName::local("monitoringTube"));
    let mut tube_ref = Element::new(QName::local("GroundwaterMonitoringTube"));
    tube_ref.add_child(Element::new(QName::local("broId")).with_text(expect_text(tube, "broId", operation)?));
    tube_ref.add_child(
        Element::new(QName::local("tubeNumber")).with_text(expect_text(tube, "tubeNumber", operation)?),
    );
    tube_wrapper.add_child(tube_ref);
    point.add_child(tube_wrapper);

    wrapper.add_child(point);
    Ok(wrapper)
}

/// Repeatable measuring points for a start registration, minimum cardinality 1
fn measuring_points(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    const OPERATION: &str = "gmn_startregistration";
    let points = expect_list(data, "measuringPoints", OPERATION)?;
    if points.is_empty() {
        return Err(Error::TooFewMeasuringPoints);
    }

    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let label = format!("{OPERATION}, measuringPoint {index}");
            measuring_point(point, index, catalog, &label)
        })
        .collect()
}

fn single_measuring_point(data: &AttributeBag, catalog: &Catalog) -> Result<Vec<Element>> {
    const OPERATION: &str = "gmn_measuringpoint";
    let point = expect_map(data, "measuringPoint", OPERATION)?;
    Ok(vec![measuring_point(point, 0, catalog, OPERATION)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GMN_CATALOG;
    use crate::sourcedocs::assemble;

    fn point_bag(code: &str) -> AttributeBag {
        let mut tube = AttributeBag::new();
        tube.insert("broId".to_string(), "GMW000000042583".into());
        tube.insert("tubeNumber".to_string(), "1".into());

        let mut point = AttributeBag::new();
        point.insert("measuringPointCode".to_string(), code.into());
        point.insert("monitoringTube".to_string(), tube.into());
        point
    }

    fn start_bag(points: Vec<AttributeBag>) -> AttributeBag {
        let mut data = AttributeBag::new();
        data.insert("objectIdAccountableParty".to_string(), "meetnet-1".into());
        data.insert("name".to_string(), "Meetnet Utrecht".into());
        data.insert("deliveryContext".to_string(), "kaderrichtlijnWater".into());
        data.insert("monitoringPurpose".to_string(), "strategischBeheerKwantiteitRegionaal".into());
        data.insert("groundwaterAspect".to_string(), "kwantiteit".into());
        data.insert("startDateMonitoring".to_string(), "2024-01-01".into());
        data.insert("measuringPoints".to_string(), points.into());
        data
    }

    #[test]
    fn test_empty_measuring_points_rejected() {
        let err = assemble(&GMN_START_REGISTRATION, &start_bag(vec![]), &GMN_CATALOG).unwrap_err();
        assert!(matches!(err, Error::TooFewMeasuringPoints));
    }

    #[test]
    fn test_single_point_gets_position_id() {
        let doc = assemble(
            &GMN_START_REGISTRATION,
            &start_bag(vec![point_bag("MP001")]),
            &GMN_CATALOG,
        )
        .unwrap();
        let root = &doc.children[0];
        assert_eq!(root.local_name(), "GMN_StartRegistration");

        let wrapper = root.find_child("measuringPoint").unwrap();
        let point = wrapper.find_child("MeasuringPoint").unwrap();
        assert_eq!(point.attr("gml:id"), Some("measuringPoint0"));
        assert_eq!(
            point.find_child("measuringPointCode").unwrap().text.as_deref(),
            Some("MP001")
        );
    }

    #[test]
    fn test_points_keep_input_order() {
        let doc = assemble(
            &GMN_START_REGISTRATION,
            &start_bag(vec![point_bag("MP001"), point_bag("MP002")]),
            &GMN_CATALOG,
        )
        .unwrap();
        let root = &doc.children[0];
        let codes: Vec<&str> = root
            .children
            .iter()
            .filter(|c| c.local_name() == "measuringPoint")
            .map(|w| {
                w.find_child("MeasuringPoint")
                    .unwrap()
                    .find_child("measuringPointCode")
                    .unwrap()
                    .text
                    .as_deref()
                    .unwrap()
            })
            .collect();
        assert_eq!(codes, vec!["MP001", "MP002"]);
    }

    #[test]
    fn test_codespaces_on_network_vocabularies() {
        let doc = assemble(
            &GMN_START_REGISTRATION,
            &start_bag(vec![point_bag("MP001")]),
            &GMN_CATALOG,
        )
        .unwrap();
        let root = &doc.children[0];
        assert_eq!(
            root.find_child("monitoringPurpose").unwrap().attr("codeSpace"),
            Some("urn:bro:gmn:MonitoringPurpose")
        );
        assert_eq!(
            root.find_child("groundwaterAspect").unwrap().attr("codeSpace"),
            Some("urn:bro:gmn:GroundwaterAspect")
        );
    }

    #[test]
    fn test_measuring_point_document() {
        let mut data = AttributeBag::new();
        data.insert("eventDate".to_string(), "2024-05-20".into());
        data.insert("measuringPoint".to_string(), point_bag("MP003").into());

        let doc = assemble(&GMN_MEASURING_POINT, &data, &GMN_CATALOG).unwrap();
        let root = &doc.children[0];
        assert_eq!(root.local_name(), "GMN_MeasuringPoint");

        let order: Vec<&str> = root.children.iter().map(|c| c.local_name()).collect();
        assert_eq!(order, vec!["eventDate", "measuringPoint"]);

        let date = root.find_child("eventDate").unwrap().find_child("date").unwrap();
        assert_eq!(date.qname.qualified(), "brocom:date");
    }

    #[test]
    fn test_missing_tube_reference_fails() {
        let mut point = point_bag("MP001");
        point.shift_remove("monitoringTube");
        let err = assemble(&GMN_START_REGISTRATION, &start_bag(vec![point]), &GMN_CATALOG).unwrap_err();
        match err {
            Error::MissingRequiredAttribute { attribute, .. } => {
                assert_eq!(attribute, "monitoringTube");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
