// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator traits
//!
//! The adapter core never talks to the host API directly. Element access goes
//! through [`ElementCollector`], which a host plugin implements over the live
//! document and tests implement over an in-memory element set.

use crate::{BuiltInCategory, ElementId, HostElement, RuntimeType, WorksetId};

/// Host element enumeration
///
/// All calls happen on the host's document thread, so implementations are
/// not required to be `Send` or `Sync`.
///
/// # Example
///
/// ```ignore
/// use bhom_revit_model::{ElementCollector, RuntimeType};
///
/// let collector: &dyn ElementCollector = session.collector();
/// for wall in collector.elements_of_type(RuntimeType::Wall) {
///     println!("{} {}", wall.id, wall.unique_id);
/// }
/// ```
pub trait ElementCollector {
    /// Get an element by integer id
    fn get(&self, id: ElementId) -> Option<&HostElement>;

    /// Get an element by string unique id
    fn get_by_unique_id(&self, unique_id: &str) -> Option<&HostElement>;

    /// Get all elements in document order
    fn all_elements(&self) -> Vec<&HostElement>;

    /// Get elements of one runtime class
    ///
    /// # Arguments
    /// * `runtime_type` - Host class to collect
    ///
    /// # Returns
    /// Matching elements in document order
    fn elements_of_type(&self, runtime_type: RuntimeType) -> Vec<&HostElement>;

    /// Get elements in one category
    ///
    /// # Arguments
    /// * `category` - Built-in category to collect
    ///
    /// # Returns
    /// Matching elements (instances and types) in document order
    fn elements_of_category(&self, category: BuiltInCategory) -> Vec<&HostElement>;

    /// Get elements living on any of the given worksets
    fn elements_in_worksets(&self, worksets: &[WorksetId]) -> Vec<&HostElement>;

    /// Resolve a workset name to its id
    fn workset_id(&self, name: &str) -> Option<WorksetId>;

    /// Get the active workset, if the document is workshared
    fn active_workset(&self) -> Option<WorksetId>;

    /// Get the ids of the current UI selection
    ///
    /// Headless hosts have no selection.
    fn selection(&self) -> Vec<ElementId> {
        Vec::new()
    }

    /// Number of elements in the document
    fn element_count(&self) -> usize {
        self.all_elements().len()
    }
}
