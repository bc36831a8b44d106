// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Filter requests
//!
//! The serializable form of an element query. A request tree is only data;
//! the engine validates it into an evaluable query before anything runs.
//!
//! # JSON form
//!
//! ```json
//! {
//!   "request": "logical_or",
//!   "requests": [
//!     { "request": "type", "domain_type": "PanelPlanar" },
//!     { "request": "parameter", "parameter_name": "Mark", "comparison": "equal",
//!       "value": { "Text": "A1" }, "tolerance": 0.0 }
//!   ]
//! }
//! ```

use crate::{DomainType, ElementId, ParameterValue, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default numeric tolerance for parameter comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_true() -> bool {
    true
}

/// Parameter comparison operator
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparison {
    /// Compare two numbers with an absolute tolerance
    ///
    /// Values within `tolerance` of each other are equal, so `Greater` and
    /// `Less` require a difference strictly larger than the tolerance.
    pub fn compare_numbers(&self, actual: f64, reference: f64, tolerance: f64) -> bool {
        let difference = actual - reference;
        match self {
            Comparison::Equal => difference.abs() <= tolerance,
            Comparison::Greater => difference > tolerance,
            Comparison::Less => -difference > tolerance,
            Comparison::GreaterOrEqual => difference >= -tolerance,
            Comparison::LessOrEqual => difference <= tolerance,
        }
    }

    /// Compare two strings (exact for `Equal`, lexical otherwise)
    pub fn compare_text(&self, actual: &str, reference: &str) -> bool {
        match self {
            Comparison::Equal => actual == reference,
            Comparison::Greater => actual > reference,
            Comparison::Less => actual < reference,
            Comparison::GreaterOrEqual => actual >= reference,
            Comparison::LessOrEqual => actual <= reference,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Comparison::Equal => "==",
            Comparison::Greater => ">",
            Comparison::Less => "<",
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
        };
        write!(f, "{}", symbol)
    }
}

/// Operator combining child queries
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

/// A request selecting host elements
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum FilterRequest {
    /// Elements that classify to a domain type
    Type { domain_type: DomainType },

    /// Elements in a category, by UI or `OST_` name
    Category { category_name: String },

    /// Elements on a named workset
    Workset { workset_name: String },

    /// Elements whose named parameter satisfies a comparison
    Parameter {
        parameter_name: String,
        comparison: Comparison,
        value: ParameterValue,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },

    /// Elements with the given integer ids
    ElementIds { element_ids: Vec<ElementId> },

    /// Elements with the given string unique ids
    UniqueIds { unique_ids: Vec<String> },

    /// The current UI selection
    Selection {
        #[serde(default = "default_true")]
        include_selected: bool,
    },

    /// Instances of a family, optionally narrowed to one type
    FamilyType {
        family_name: String,
        #[serde(default)]
        type_name: Option<String>,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    /// Elements matched by every child request
    LogicalAnd { requests: Vec<FilterRequest> },

    /// Elements matched by any child request
    LogicalOr { requests: Vec<FilterRequest> },
}

impl FilterRequest {
    /// Request elements classifying to `domain_type`
    pub fn by_type(domain_type: DomainType) -> Self {
        FilterRequest::Type { domain_type }
    }

    /// Request elements in a category
    pub fn by_category(category_name: impl Into<String>) -> Self {
        FilterRequest::Category {
            category_name: category_name.into(),
        }
    }

    /// Request elements on a workset
    pub fn by_workset(workset_name: impl Into<String>) -> Self {
        FilterRequest::Workset {
            workset_name: workset_name.into(),
        }
    }

    /// Request elements by parameter comparison
    pub fn parameter(
        parameter_name: impl Into<String>,
        comparison: Comparison,
        value: ParameterValue,
        tolerance: f64,
    ) -> Self {
        FilterRequest::Parameter {
            parameter_name: parameter_name.into(),
            comparison,
            value,
            tolerance,
        }
    }

    /// Request elements by integer id
    pub fn by_element_ids(ids: impl IntoIterator<Item = ElementId>) -> Self {
        FilterRequest::ElementIds {
            element_ids: ids.into_iter().collect(),
        }
    }

    /// Request elements by string unique id
    pub fn by_unique_ids<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        FilterRequest::UniqueIds {
            unique_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Request the current UI selection
    pub fn selection() -> Self {
        FilterRequest::Selection {
            include_selected: true,
        }
    }

    /// Request instances of a family (case-sensitive)
    pub fn by_family(family_name: impl Into<String>, type_name: Option<String>) -> Self {
        FilterRequest::FamilyType {
            family_name: family_name.into(),
            type_name,
            case_sensitive: true,
        }
    }

    /// Combine requests with AND
    pub fn and(requests: Vec<FilterRequest>) -> Self {
        FilterRequest::LogicalAnd { requests }
    }

    /// Combine requests with OR
    pub fn or(requests: Vec<FilterRequest>) -> Self {
        FilterRequest::LogicalOr { requests }
    }

    /// Operator of a logical request, `None` for leaves
    pub fn operator(&self) -> Option<LogicalOperator> {
        match self {
            FilterRequest::LogicalAnd { .. } => Some(LogicalOperator::And),
            FilterRequest::LogicalOr { .. } => Some(LogicalOperator::Or),
            _ => None,
        }
    }

    /// Count leaf requests in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterRequest::LogicalAnd { requests } | FilterRequest::LogicalOr { requests } => {
                requests.iter().map(FilterRequest::leaf_count).sum()
            }
            _ => 1,
        }
    }

    /// Load a request tree from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the request tree to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
