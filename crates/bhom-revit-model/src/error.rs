// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for adapter operations

use crate::{DomainType, ElementId};
use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors that can occur while building queries or converting elements
///
/// Only structural problems (a malformed request tree, bad settings, a
/// broken element collection) surface to callers as `Err`. Per-element
/// conversion failures are turned into session warnings by the engine.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Structurally invalid filter request
    #[error("Malformed filter request: {0}")]
    MalformedRequest(String),

    /// Category name that does not resolve to a known host category
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Comparison value that cannot be compared
    #[error("Invalid comparison value for parameter '{parameter}': {message}")]
    InvalidValue { parameter: String, message: String },

    /// Negative or non-finite tolerance
    #[error("Invalid tolerance {tolerance} for parameter '{parameter}'")]
    InvalidTolerance { parameter: String, tolerance: f64 },

    /// Two host elements share an integer id
    #[error("Duplicate element id {0}")]
    DuplicateElement(ElementId),

    /// Element not found in the host document
    #[error("Element {0} not found")]
    ElementNotFound(ElementId),

    /// External per-type converter failed
    #[error("Failed to convert element {element} to {domain_type}: {message}")]
    Conversion {
        element: ElementId,
        domain_type: DomainType,
        message: String,
    },

    /// No converter registered for a classified domain type
    #[error("No converter registered for {0}")]
    MissingConverter(DomainType),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl AdapterError {
    /// Create a malformed request error
    pub fn malformed(msg: impl Into<String>) -> Self {
        AdapterError::MalformedRequest(msg.into())
    }

    /// Create an invalid comparison value error
    pub fn invalid_value(parameter: impl Into<String>, msg: impl Into<String>) -> Self {
        AdapterError::InvalidValue {
            parameter: parameter.into(),
            message: msg.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(element: ElementId, domain_type: DomainType, msg: impl Into<String>) -> Self {
        AdapterError::Conversion {
            element,
            domain_type,
            message: msg.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        AdapterError::Other(msg.into())
    }
}
