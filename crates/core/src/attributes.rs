//! Visit attributes and their per-type constraints.
//!
//! Attributes extend a visit with typed key/value data. Each [`VisitAttributeType`] declares a
//! datatype and how many times it may occur on one visit. Two checks live here:
//!
//! - [`validate_attribute_values`] flags attributes whose value does not fit their type. These are
//!   soft errors on the `attributes` field.
//! - [`validate_occurrences`] enforces `min_occurs`/`max_occurs`. A violation is fatal: the whole
//!   save is refused rather than one field being annotated.

use crate::constants::ATTRIBUTE_INVALID;
use crate::field_errors::{Field, FieldErrors};
use crate::visit::Visit;
use crate::{VisitError, VisitResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use visit_types::{AttributeTypeId, Name};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDatatype {
    FreeText,
    Boolean,
    Date,
    Integer,
}

impl AttributeDatatype {
    pub fn accepts(self, value: &AttributeValue) -> bool {
        value.datatype() == self
    }
}

/// A typed attribute value.
///
/// Serialised adjacently tagged, e.g. `{ type: date, value: 2014-02-05 }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    FreeText(String),
    Boolean(bool),
    Date(NaiveDate),
    Integer(i64),
}

impl AttributeValue {
    pub fn datatype(&self) -> AttributeDatatype {
        match self {
            AttributeValue::FreeText(_) => AttributeDatatype::FreeText,
            AttributeValue::Boolean(_) => AttributeDatatype::Boolean,
            AttributeValue::Date(_) => AttributeDatatype::Date,
            AttributeValue::Integer(_) => AttributeDatatype::Integer,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitAttributeType {
    pub id: AttributeTypeId,
    pub name: Name,
    pub datatype: AttributeDatatype,
    #[serde(default)]
    pub min_occurs: u32,
    /// `None` means unbounded.
    #[serde(default)]
    pub max_occurs: Option<u32>,
    /// Retired types are kept for history and no longer constrain new visits.
    #[serde(default)]
    pub retired: bool,
}

impl VisitAttributeType {
    pub fn new(name: Name, datatype: AttributeDatatype) -> Self {
        Self {
            id: AttributeTypeId::new(),
            name,
            datatype,
            min_occurs: 0,
            max_occurs: None,
            retired: false,
        }
    }

    pub fn with_occurs(mut self, min_occurs: u32, max_occurs: Option<u32>) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitAttribute {
    pub attribute_type: AttributeTypeId,
    pub value: AttributeValue,
    #[serde(default)]
    pub voided: bool,
}

impl VisitAttribute {
    pub fn new(attribute_type: AttributeTypeId, value: AttributeValue) -> Self {
        Self {
            attribute_type,
            value,
            voided: false,
        }
    }
}

/// Flags each active attribute whose type is unknown or whose value does not match its datatype.
pub fn validate_attribute_values(
    visit: &Visit,
    attribute_types: &[VisitAttributeType],
    errors: &mut FieldErrors,
) {
    let by_id: HashMap<AttributeTypeId, &VisitAttributeType> =
        attribute_types.iter().map(|t| (t.id, t)).collect();

    for attribute in visit.active_attributes() {
        match by_id.get(&attribute.attribute_type) {
            None => errors.reject_with_message(
                Field::Attributes,
                ATTRIBUTE_INVALID,
                format!("unknown attribute type {}", attribute.attribute_type),
            ),
            Some(attribute_type) if !attribute_type.datatype.accepts(&attribute.value) => errors
                .reject_with_message(
                    Field::Attributes,
                    ATTRIBUTE_INVALID,
                    format!(
                        "attribute '{}' expects a {:?} value",
                        attribute_type.name, attribute_type.datatype
                    ),
                ),
            Some(_) => {}
        }
    }
}

/// Checks every non-retired attribute type's occurrence bounds against the visit.
///
/// # Errors
///
/// Returns [`VisitError::AttributeBelowMinOccurs`] or [`VisitError::AttributeAboveMaxOccurs`]
/// for the first type whose bounds are violated.
pub fn validate_occurrences(
    visit: &Visit,
    attribute_types: &[VisitAttributeType],
) -> VisitResult<()> {
    let mut counts: HashMap<AttributeTypeId, usize> = HashMap::new();
    for attribute in visit.active_attributes() {
        *counts.entry(attribute.attribute_type).or_default() += 1;
    }

    for attribute_type in attribute_types.iter().filter(|t| !t.retired) {
        let count = counts.get(&attribute_type.id).copied().unwrap_or(0);

        if count < attribute_type.min_occurs as usize {
            return Err(VisitError::AttributeBelowMinOccurs {
                attribute_type: attribute_type.name.to_string(),
                count,
                min_occurs: attribute_type.min_occurs,
            });
        }

        if let Some(max_occurs) = attribute_type.max_occurs {
            if count > max_occurs as usize {
                return Err(VisitError::AttributeAboveMaxOccurs {
                    attribute_type: attribute_type.name.to_string(),
                    count,
                    max_occurs,
                });
            }
        }
    }

    Ok(())
}
