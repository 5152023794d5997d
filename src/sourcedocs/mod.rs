//! Source-document assembly
//!
//! One declarative spec per registrable operation: an ordered list of field
//! rules interpreted by a single generic routine. The rule list fixes the
//! child order of the generated `sourceDocument`; input-bag order never
//! leaks into the output.

pub mod gld;
pub mod gmn;
pub mod gmw;

use crate::attributes::{check_required, AttributeBag, Obligation, Value};
use crate::catalog::Catalog;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;

/// Dedicated builder: consumes its slice of the operation bag and produces
/// one or more sibling elements
pub type BuilderFn = fn(&AttributeBag, &Catalog) -> Result<Vec<Element>>;

/// One entry in an operation's ordered field list
pub enum FieldRule {
    /// Plain child element named after the key, `codeSpace` attached when
    /// the key has a controlled vocabulary in the family catalog
    Simple {
        /// Attribute name, doubles as the element name
        key: &'static str,
        /// Obligation level
        obligation: Obligation,
    },
    /// Composite or repeatable structure with a dedicated builder
    Built {
        /// Attribute name the builder consumes
        key: &'static str,
        /// Obligation level
        obligation: Obligation,
        /// Builder function
        build: BuilderFn,
    },
}

impl FieldRule {
    fn key(&self) -> &'static str {
        match self {
            FieldRule::Simple { key, .. } | FieldRule::Built { key, .. } => key,
        }
    }

    fn obligation(&self) -> Obligation {
        match self {
            FieldRule::Simple { obligation, .. } | FieldRule::Built { obligation, .. } => *obligation,
        }
    }
}

/// Declarative spec for one (entity type, operation) pair
pub struct SourceDocSpec {
    /// Operation name used in error messages
    pub operation: &'static str,
    /// Schema-named variant root, e.g. `GMW_Construction`
    pub root_tag: &'static str,
    /// Field rules in schema-declared sequence order
    pub fields: &'static [FieldRule],
}

impl SourceDocSpec {
    /// Requirement spec derived from the field rules
    pub fn requirements(&self) -> Vec<(&'static str, Obligation)> {
        self.fields.iter().map(|f| (f.key(), f.obligation())).collect()
    }
}

/// Assemble a `sourceDocument` tree for one operation
///
/// Validates the bag first; no element is built from invalid input. Fields
/// are then emitted strictly in rule-list order: simple elements for scalar
/// keys, builder output for composite and repeatable keys. Optional keys
/// absent from the bag are skipped silently.
pub fn assemble(spec: &SourceDocSpec, data: &AttributeBag, catalog: &Catalog) -> Result<Element> {
    let requirements = spec.requirements();
    check_required(data, &requirements, spec.operation)?;

    let mut source_document = Element::new(QName::local("sourceDocument"));
    // Fixed placeholder geometry identifier on the variant root
    let mut root = Element::new(QName::local(spec.root_tag)).with_attr("gml:id", "id_0001");

    for field in spec.fields {
        match field {
            FieldRule::Simple { key, .. } => {
                if data.contains_key(*key) {
                    // Scalar coercion only; a nested value under a simple
                    // key has no text form and is an error
                    let text = expect_text(data, key, spec.operation)?;
                    let mut child = Element::new(QName::local(*key)).with_text(text);
                    if let Some(urn) = catalog.codespaces.get(*key) {
                        child.attributes.insert(0, ("codeSpace".to_string(), urn.clone()));
                    }
                    root.add_child(child);
                }
            }
            FieldRule::Built { key, build, .. } => {
                if data.contains_key(*key) {
                    for element in build(data, catalog)? {
                        root.add_child(element);
                    }
                }
            }
        }
    }

    source_document.add_child(root);
    Ok(source_document)
}

/// Fetch a nested mapping, failing with the operation-scoped missing error
pub(crate) fn expect_map<'a>(
    data: &'a AttributeBag,
    key: &str,
    operation: &str,
) -> Result<&'a AttributeBag> {
    data.get(key)
        .and_then(Value::as_map)
        .ok_or_else(|| Error::missing(operation, key))
}

/// Fetch a sequence of mappings, failing with the operation-scoped missing error
pub(crate) fn expect_list<'a>(
    data: &'a AttributeBag,
    key: &str,
    operation: &str,
) -> Result<&'a [AttributeBag]> {
    data.get(key)
        .and_then(Value::as_list)
        .ok_or_else(|| Error::missing(operation, key))
}

/// Fetch a scalar as text, failing with the operation-scoped missing error
pub(crate) fn expect_text(data: &AttributeBag, key: &str, operation: &str) -> Result<String> {
    data.get(key)
        .and_then(Value::as_text)
        .ok_or_else(|| Error::missing(operation, key))
}
