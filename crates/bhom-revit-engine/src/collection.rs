// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory element collection
//!
//! [`ElementCollector`] over an owned snapshot of host elements, indexed by
//! id, unique id, runtime type and category. Used for headless pulls and
//! throughout the tests.

use bhom_revit_model::{
    AdapterError, BuiltInCategory, ElementCollector, ElementId, HostElement, Result, RuntimeType,
    WorksetId,
};
use rustc_hash::FxHashMap;

/// Indexed snapshot of host elements
pub struct ElementCollection {
    /// Elements in document order
    elements: Vec<HostElement>,
    /// Element id -> position
    id_index: FxHashMap<ElementId, usize>,
    /// Unique id -> position
    unique_index: FxHashMap<String, usize>,
    /// Runtime type -> positions
    type_index: FxHashMap<RuntimeType, Vec<usize>>,
    /// Category -> positions
    category_index: FxHashMap<BuiltInCategory, Vec<usize>>,
    /// Workset names
    worksets: FxHashMap<WorksetId, String>,
    active_workset: Option<WorksetId>,
    selection: Vec<ElementId>,
}

impl ElementCollection {
    /// Index a set of elements
    ///
    /// Fails if two elements share an integer id or a unique id.
    pub fn new(elements: Vec<HostElement>) -> Result<Self> {
        let mut id_index = FxHashMap::default();
        let mut unique_index = FxHashMap::default();
        let mut type_index: FxHashMap<RuntimeType, Vec<usize>> = FxHashMap::default();
        let mut category_index: FxHashMap<BuiltInCategory, Vec<usize>> = FxHashMap::default();

        for (position, element) in elements.iter().enumerate() {
            if id_index.insert(element.id, position).is_some() {
                return Err(AdapterError::DuplicateElement(element.id));
            }
            if unique_index
                .insert(element.unique_id.clone(), position)
                .is_some()
            {
                return Err(AdapterError::DuplicateElement(element.id));
            }
            type_index
                .entry(element.runtime_type)
                .or_default()
                .push(position);
            if let Some(category) = element.category {
                category_index.entry(category).or_default().push(position);
            }
        }

        Ok(Self {
            elements,
            id_index,
            unique_index,
            type_index,
            category_index,
            worksets: FxHashMap::default(),
            active_workset: None,
            selection: Vec::new(),
        })
    }

    /// Register a workset name
    pub fn with_workset(mut self, id: WorksetId, name: impl Into<String>) -> Self {
        self.worksets.insert(id, name.into());
        self
    }

    /// Set the active workset
    pub fn with_active_workset(mut self, id: WorksetId) -> Self {
        self.active_workset = Some(id);
        self
    }

    /// Set the current UI selection
    pub fn with_selection(mut self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        self.selection = ids.into_iter().collect();
        self
    }

    /// Number of indexed elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn at(&self, positions: Option<&Vec<usize>>) -> Vec<&HostElement> {
        positions
            .map(|positions| positions.iter().map(|&p| &self.elements[p]).collect())
            .unwrap_or_default()
    }
}

impl ElementCollector for ElementCollection {
    fn get(&self, id: ElementId) -> Option<&HostElement> {
        self.id_index.get(&id).map(|&p| &self.elements[p])
    }

    fn get_by_unique_id(&self, unique_id: &str) -> Option<&HostElement> {
        self.unique_index.get(unique_id).map(|&p| &self.elements[p])
    }

    fn all_elements(&self) -> Vec<&HostElement> {
        self.elements.iter().collect()
    }

    fn elements_of_type(&self, runtime_type: RuntimeType) -> Vec<&HostElement> {
        self.at(self.type_index.get(&runtime_type))
    }

    fn elements_of_category(&self, category: BuiltInCategory) -> Vec<&HostElement> {
        self.at(self.category_index.get(&category))
    }

    fn elements_in_worksets(&self, worksets: &[WorksetId]) -> Vec<&HostElement> {
        self.elements
            .iter()
            .filter(|e| e.workset.map(|w| worksets.contains(&w)).unwrap_or(false))
            .collect()
    }

    fn workset_id(&self, name: &str) -> Option<WorksetId> {
        self.worksets
            .iter()
            .find(|(_, workset_name)| workset_name.as_str() == name)
            .map(|(id, _)| *id)
    }

    fn active_workset(&self) -> Option<WorksetId> {
        self.active_workset
    }

    fn selection(&self) -> Vec<ElementId> {
        self.selection.clone()
    }

    fn element_count(&self) -> usize {
        self.elements.len()
    }
}
