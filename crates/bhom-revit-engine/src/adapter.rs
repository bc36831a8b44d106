// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pull pipeline
//!
//! Query or selection -> element ids -> dispatcher -> domain objects.

use crate::dispatcher::ConversionDispatcher;
use crate::evaluator::QueryEvaluator;
use crate::query::Query;
use crate::selection::resolve_selection;
use crate::session::Session;
use bhom_revit_model::{AdapterError, DomainObject, ElementId, FilterRequest, Result};
use serde::Serialize;
use std::sync::Arc;

/// Result of one pull
#[derive(Debug, Default, Serialize)]
pub struct PullOutcome {
    /// Converted objects, grouped by element in ascending id order
    pub objects: Vec<Arc<DomainObject>>,
    /// Warnings raised during this pull
    pub warnings: Vec<String>,
    /// Elements skipped because no domain type applies
    pub unclassified: usize,
}

impl PullOutcome {
    /// Check if the pull raised no warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Serialize the outcome for the host
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Pull the elements matched by a filter request
///
/// Only a malformed request is an error; per-element problems are reported
/// in the outcome.
pub fn pull_query(
    session: &mut Session<'_>,
    dispatcher: &ConversionDispatcher,
    request: &FilterRequest,
) -> Result<PullOutcome> {
    let query = Query::from_request(request)?;
    let ids = {
        let evaluator = QueryEvaluator::new(session.classifier(), session.collector());
        evaluator.evaluate(&query).ids()
    };
    log::debug!("Query matched {} elements", ids.len());
    Ok(pull_elements(session, dispatcher, ids))
}

/// Pull the elements named by the session's selection settings
pub fn pull_selection(session: &mut Session<'_>, dispatcher: &ConversionDispatcher) -> PullOutcome {
    let ids = resolve_selection(&session.settings().selection, session.collector());
    log::debug!("Selection resolved to {} elements", ids.len());
    pull_elements(session, dispatcher, ids)
}

/// Pull a list of elements by id, in ascending id order
///
/// Ids missing from the document produce a warning and are skipped.
pub fn pull_elements(
    session: &mut Session<'_>,
    dispatcher: &ConversionDispatcher,
    mut ids: Vec<ElementId>,
) -> PullOutcome {
    ids.sort_unstable();
    ids.dedup();

    let warnings_before = session.warnings().len();
    let unclassified_before = session.unclassified_count();
    let collector = session.collector();

    let mut objects = Vec::new();
    for id in ids {
        match collector.get(id) {
            Some(element) => objects.extend(dispatcher.convert(session, element)),
            None => session.warn(AdapterError::ElementNotFound(id).to_string()),
        }
    }

    PullOutcome {
        objects,
        warnings: session.warnings()[warnings_before..].to_vec(),
        unclassified: session.unclassified_count() - unclassified_before,
    }
}
