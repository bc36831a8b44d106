// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adapter configuration
//!
//! All settings deserialize from JSON with missing fields taking the host
//! adapter defaults.

use crate::{Discipline, ElementId, Result};
use serde::{Deserialize, Serialize};

/// Settings for converting host elements into domain objects
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullSettings {
    /// Sub-model used to resolve mixed-use elements
    pub discipline: Discipline,
    /// Copy host parameters into the custom-data bag
    pub copy_custom_data: bool,
    /// Convert numeric values out of host units
    pub convert_units: bool,
}

impl Default for PullSettings {
    fn default() -> Self {
        Self {
            discipline: Discipline::Environmental,
            copy_custom_data: true,
            convert_units: true,
        }
    }
}

impl PullSettings {
    /// Set discipline
    pub fn with_discipline(mut self, discipline: Discipline) -> Self {
        self.discipline = discipline;
        self
    }

    /// Enable/disable custom-data copy
    pub fn with_copy_custom_data(mut self, enabled: bool) -> Self {
        self.copy_custom_data = enabled;
        self
    }

    /// Enable/disable unit conversion
    pub fn with_convert_units(mut self, enabled: bool) -> Self {
        self.convert_units = enabled;
        self
    }
}

/// Settings for writing domain objects back into the host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    /// Copy the custom-data bag into host parameters
    pub copy_custom_data: bool,
    /// Convert numeric values into host units
    pub convert_units: bool,
    /// Overwrite an existing mapped element instead of always creating one
    pub replace: bool,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            copy_custom_data: true,
            convert_units: true,
            replace: true,
        }
    }
}

impl PushSettings {
    /// Enable/disable replacing existing elements
    pub fn with_replace(mut self, enabled: bool) -> Self {
        self.replace = enabled;
        self
    }

    /// Enable/disable custom-data copy
    pub fn with_copy_custom_data(mut self, enabled: bool) -> Self {
        self.copy_custom_data = enabled;
        self
    }
}

/// Workset part of a selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorksetSettings {
    /// Include every element on the active workset
    pub active_workset: bool,
    /// Include every element on the workset with this name
    pub workset_name: Option<String>,
}

/// Explicit element selection
///
/// Each option independently expands the candidate set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SelectionSettings {
    pub element_ids: Vec<ElementId>,
    pub unique_ids: Vec<String>,
    /// Include the current UI selection
    pub include_selected: bool,
    pub workset: WorksetSettings,
}

impl SelectionSettings {
    /// Select by integer ids
    pub fn with_element_ids(mut self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        self.element_ids.extend(ids);
        self
    }

    /// Select by string unique ids
    pub fn with_unique_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.unique_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Include the current UI selection
    pub fn with_include_selected(mut self, enabled: bool) -> Self {
        self.include_selected = enabled;
        self
    }

    /// Include the active workset
    pub fn with_active_workset(mut self, enabled: bool) -> Self {
        self.workset.active_workset = enabled;
        self
    }

    /// Include a named workset
    pub fn with_workset_name(mut self, name: impl Into<String>) -> Self {
        self.workset.workset_name = Some(name.into());
        self
    }

    /// Check if no option selects anything
    pub fn is_empty(&self) -> bool {
        self.element_ids.is_empty()
            && self.unique_ids.is_empty()
            && !self.include_selected
            && !self.workset.active_workset
            && self.workset.workset_name.is_none()
    }
}

/// Complete adapter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdapterSettings {
    pub pull: PullSettings,
    pub push: PushSettings,
    pub selection: SelectionSettings,
}

impl AdapterSettings {
    /// Load settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
