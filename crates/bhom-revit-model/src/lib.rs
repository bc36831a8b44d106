// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BHoM Revit Model - Shared types and collaborator traits for the adapter core
//!
//! This crate describes the two sides the adapter translates between: host
//! elements as the CAD host exposes them, and the vendor-neutral domain objects
//! (BHoM) they are converted into. It holds no conversion logic; the engine
//! crate implements classification, caching and query evaluation on top of it.
//!
//! # Architecture
//!
//! - [`HostElement`] - Read-only snapshot of a host entity (ids, category, runtime type, parameters)
//! - [`DomainType`] / [`DomainObject`] - Target classes and the objects produced for them
//! - [`FilterRequest`] - Serializable query tree used to select host elements
//! - [`PullSettings`] / [`PushSettings`] / [`SelectionSettings`] - Adapter configuration
//! - [`ElementCollector`] - Host element enumeration collaborator
//!
//! # Example
//!
//! ```ignore
//! use bhom_revit_model::{FilterRequest, DomainType, Comparison, ParameterValue};
//!
//! let request = FilterRequest::or(vec![
//!     FilterRequest::by_type(DomainType::PanelPlanar),
//!     FilterRequest::parameter("Mark", Comparison::Equal, ParameterValue::text("A1"), 0.0),
//! ]);
//! let json = request.to_json()?;
//! ```

pub mod domain;
pub mod error;
pub mod requests;
pub mod settings;
pub mod traits;
pub mod types;

// Re-export all public types
pub use domain::*;
pub use error::*;
pub use requests::*;
pub use settings::*;
pub use traits::*;
pub use types::*;
