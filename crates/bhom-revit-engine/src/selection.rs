// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection settings resolution

use bhom_revit_model::{ElementCollector, ElementId, SelectionSettings, WorksetId};
use rustc_hash::FxHashSet;

/// Resolve selection settings to element ids
///
/// Every option expands the candidate set independently: explicit ids,
/// unique ids, the current UI selection, the active workset and the named
/// workset. Ids not present in the document are dropped. The union is
/// deduplicated and returned in first-seen order.
pub fn resolve_selection(
    settings: &SelectionSettings,
    collector: &dyn ElementCollector,
) -> Vec<ElementId> {
    let mut seen = FxHashSet::default();
    let mut resolved = Vec::new();
    let mut push = |id: ElementId| {
        if seen.insert(id) {
            resolved.push(id);
        }
    };

    for id in &settings.element_ids {
        match collector.get(*id) {
            Some(element) => push(element.id),
            None => log::debug!("Selected element {} not found", id),
        }
    }

    for unique_id in &settings.unique_ids {
        match collector.get_by_unique_id(unique_id) {
            Some(element) => push(element.id),
            None => log::debug!("Selected unique id {} not found", unique_id),
        }
    }

    if settings.include_selected {
        for id in collector.selection() {
            if collector.get(id).is_some() {
                push(id);
            }
        }
    }

    let mut worksets: Vec<WorksetId> = Vec::new();
    if settings.workset.active_workset {
        match collector.active_workset() {
            Some(active) => worksets.push(active),
            None => log::debug!("Document has no active workset"),
        }
    }
    if let Some(name) = &settings.workset.workset_name {
        match collector.workset_id(name) {
            Some(id) => worksets.push(id),
            None => log::debug!("Workset '{}' not found", name),
        }
    }
    if !worksets.is_empty() {
        for element in collector.elements_in_worksets(&worksets) {
            push(element.id);
        }
    }

    resolved
}
