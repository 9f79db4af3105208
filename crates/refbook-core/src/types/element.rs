//! Element types.

use serde::{Deserialize, Serialize};

use super::check_field;
use crate::error::RefbookResult;

/// Maximum length of an element code.
pub const ELEMENT_CODE_MAX_LEN: usize = 100;
/// Maximum length of an element value.
pub const ELEMENT_VALUE_MAX_LEN: usize = 300;

/// One coded entry within a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Surrogate identifier.
    pub id: i64,
    /// Owning version.
    pub version_id: i64,
    /// Code, unique within the version.
    pub code: String,
    pub value: String,
}

/// An element that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewElement {
    pub version_id: i64,
    pub code: String,
    pub value: String,
}

impl NewElement {
    pub fn new(version_id: i64, code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            version_id,
            code: code.into(),
            value: value.into(),
        }
    }

    pub fn validate(&self) -> RefbookResult<()> {
        check_field("element code", &self.code, ELEMENT_CODE_MAX_LEN)?;
        check_field("element value", &self.value, ELEMENT_VALUE_MAX_LEN)
    }
}

/// Element as returned by `GET /refbooks/{id}/elements/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementView {
    pub code: String,
    pub value: String,
}

impl From<Element> for ElementView {
    fn from(element: Element) -> Self {
        Self {
            code: element.code,
            value: element.value,
        }
    }
}

/// Outcome of checking a code/value pair against a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCheck {
    Found,
    NotFound,
}

impl ElementCheck {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }
}
