// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BHoM Revit Engine - Object mapping and query resolution for the adapter
//!
//! This crate implements the core of the adapter on top of the types and
//! traits in `bhom-revit-model`.
//!
//! # Components
//!
//! - [`TypeClassifier`] - Ordered rule table mapping host elements to domain types
//! - [`ReferenceObjectCache`] - Per-session store of already converted objects
//! - [`QueryEvaluator`] - Bottom-up evaluation of AND/OR filter trees
//! - [`ConversionDispatcher`] - Classify, look up the cache, convert, store
//! - [`Session`] - Explicit context threaded through every operation
//!
//! # Example
//!
//! ```ignore
//! use bhom_revit_engine::{pull_query, ConversionDispatcher, ElementCollection, Session};
//! use bhom_revit_model::{DomainType, FilterRequest};
//!
//! let document = ElementCollection::new(elements)?;
//! let mut dispatcher = ConversionDispatcher::new();
//! dispatcher.register(Arc::new(WallConverter));
//!
//! let mut session = Session::new(&document);
//! let outcome = pull_query(&mut session, &dispatcher, &FilterRequest::by_type(DomainType::PanelPlanar))?;
//! for warning in &outcome.warnings {
//!     eprintln!("{}", warning);
//! }
//! ```

pub mod adapter;
pub mod cache;
pub mod classifier;
pub mod collection;
pub mod dispatcher;
pub mod evaluator;
pub mod identifiers;
pub mod query;
pub mod selection;
pub mod session;

pub use adapter::{pull_elements, pull_query, pull_selection, PullOutcome};
pub use cache::{ReferenceId, ReferenceKey, ReferenceObjectCache, ReferenceScope};
pub use classifier::{
    validate_family_name_rules, validate_rules, ClassificationRule, FamilyNameConflict,
    FamilyNameRule, RuleConflict, TypeClassifier,
};
pub use collection::ElementCollection;
pub use dispatcher::{ConversionContext, ConversionDispatcher, ElementConverter};
pub use evaluator::{MatchRecord, QueryEvaluator, QueryResult};
pub use identifiers::{push_target, PushTarget};
pub use query::{Criterion, LeafId, Query, QueryBuilder, QueryNode};
pub use selection::resolve_selection;
pub use session::Session;
