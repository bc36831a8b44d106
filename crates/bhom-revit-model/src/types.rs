// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-side types
//!
//! This module describes host elements the way the adapter core sees them:
//! a read-only snapshot of identifiers, category, runtime class and parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host integer element identifier
///
/// Stable within a single session. Two elements of different kinds never
/// share an id inside one document, but ids are not stable across sessions;
/// use the string unique id for round-tripping.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct ElementId(pub i32);

impl ElementId {
    /// The host's "no element" sentinel
    pub const INVALID: ElementId = ElementId(-1);

    /// Check whether this id refers to a real element
    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ElementId {
    fn from(id: i32) -> Self {
        ElementId(id)
    }
}

impl From<ElementId> for i32 {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

/// Host workset identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct WorksetId(pub i32);

impl fmt::Display for WorksetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host built-in category
///
/// Only the categories the adapter classifies or filters on are listed.
/// Anything else is carried as `None` on the element.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum BuiltInCategory {
    // ========================================================================
    // Architecture
    // ========================================================================
    Walls,
    Floors,
    Ceilings,
    Roofs,
    Windows,
    Doors,
    GenericModel,

    // ========================================================================
    // Structure
    // ========================================================================
    StructuralFraming,
    StructuralColumns,
    Columns,
    VerticalBracing,
    Truss,
    StructuralTruss,
    HorizontalBracing,
    Purlin,
    Joist,
    Girder,
    StructuralStiffener,
    StructuralFramingOther,
    StructuralFoundation,

    // ========================================================================
    // MEP
    // ========================================================================
    DuctCurves,
    PipeCurves,
    MepSpaces,

    // ========================================================================
    // Datum, views and project data
    // ========================================================================
    Rooms,
    Levels,
    Grids,
    Sheets,
    Viewports,
    Views,
    ProjectInformation,
    Materials,
}

impl BuiltInCategory {
    /// Every known category, in declaration order
    pub const ALL: &'static [BuiltInCategory] = &[
        BuiltInCategory::Walls,
        BuiltInCategory::Floors,
        BuiltInCategory::Ceilings,
        BuiltInCategory::Roofs,
        BuiltInCategory::Windows,
        BuiltInCategory::Doors,
        BuiltInCategory::GenericModel,
        BuiltInCategory::StructuralFraming,
        BuiltInCategory::StructuralColumns,
        BuiltInCategory::Columns,
        BuiltInCategory::VerticalBracing,
        BuiltInCategory::Truss,
        BuiltInCategory::StructuralTruss,
        BuiltInCategory::HorizontalBracing,
        BuiltInCategory::Purlin,
        BuiltInCategory::Joist,
        BuiltInCategory::Girder,
        BuiltInCategory::StructuralStiffener,
        BuiltInCategory::StructuralFramingOther,
        BuiltInCategory::StructuralFoundation,
        BuiltInCategory::DuctCurves,
        BuiltInCategory::PipeCurves,
        BuiltInCategory::MepSpaces,
        BuiltInCategory::Rooms,
        BuiltInCategory::Levels,
        BuiltInCategory::Grids,
        BuiltInCategory::Sheets,
        BuiltInCategory::Viewports,
        BuiltInCategory::Views,
        BuiltInCategory::ProjectInformation,
        BuiltInCategory::Materials,
    ];

    /// Category name as shown in the host UI
    pub fn name(&self) -> &'static str {
        match self {
            BuiltInCategory::Walls => "Walls",
            BuiltInCategory::Floors => "Floors",
            BuiltInCategory::Ceilings => "Ceilings",
            BuiltInCategory::Roofs => "Roofs",
            BuiltInCategory::Windows => "Windows",
            BuiltInCategory::Doors => "Doors",
            BuiltInCategory::GenericModel => "Generic Models",
            BuiltInCategory::StructuralFraming => "Structural Framing",
            BuiltInCategory::StructuralColumns => "Structural Columns",
            BuiltInCategory::Columns => "Columns",
            BuiltInCategory::VerticalBracing => "Vertical Bracing",
            BuiltInCategory::Truss => "Trusses",
            BuiltInCategory::StructuralTruss => "Structural Trusses",
            BuiltInCategory::HorizontalBracing => "Horizontal Bracing",
            BuiltInCategory::Purlin => "Purlins",
            BuiltInCategory::Joist => "Joists",
            BuiltInCategory::Girder => "Girders",
            BuiltInCategory::StructuralStiffener => "Structural Stiffeners",
            BuiltInCategory::StructuralFramingOther => "Other Structural Framing",
            BuiltInCategory::StructuralFoundation => "Structural Foundations",
            BuiltInCategory::DuctCurves => "Ducts",
            BuiltInCategory::PipeCurves => "Pipes",
            BuiltInCategory::MepSpaces => "Spaces",
            BuiltInCategory::Rooms => "Rooms",
            BuiltInCategory::Levels => "Levels",
            BuiltInCategory::Grids => "Grids",
            BuiltInCategory::Sheets => "Sheets",
            BuiltInCategory::Viewports => "Viewports",
            BuiltInCategory::Views => "Views",
            BuiltInCategory::ProjectInformation => "Project Information",
            BuiltInCategory::Materials => "Materials",
        }
    }

    /// Host API enumeration name (e.g. `OST_Walls`)
    pub fn ost_name(&self) -> &'static str {
        match self {
            BuiltInCategory::Walls => "OST_Walls",
            BuiltInCategory::Floors => "OST_Floors",
            BuiltInCategory::Ceilings => "OST_Ceilings",
            BuiltInCategory::Roofs => "OST_Roofs",
            BuiltInCategory::Windows => "OST_Windows",
            BuiltInCategory::Doors => "OST_Doors",
            BuiltInCategory::GenericModel => "OST_GenericModel",
            BuiltInCategory::StructuralFraming => "OST_StructuralFraming",
            BuiltInCategory::StructuralColumns => "OST_StructuralColumns",
            BuiltInCategory::Columns => "OST_Columns",
            BuiltInCategory::VerticalBracing => "OST_VerticalBracing",
            BuiltInCategory::Truss => "OST_Truss",
            BuiltInCategory::StructuralTruss => "OST_StructuralTruss",
            BuiltInCategory::HorizontalBracing => "OST_HorizontalBracing",
            BuiltInCategory::Purlin => "OST_Purlin",
            BuiltInCategory::Joist => "OST_Joist",
            BuiltInCategory::Girder => "OST_Girder",
            BuiltInCategory::StructuralStiffener => "OST_StructuralStiffener",
            BuiltInCategory::StructuralFramingOther => "OST_StructuralFramingOther",
            BuiltInCategory::StructuralFoundation => "OST_StructuralFoundation",
            BuiltInCategory::DuctCurves => "OST_DuctCurves",
            BuiltInCategory::PipeCurves => "OST_PipeCurves",
            BuiltInCategory::MepSpaces => "OST_MEPSpaces",
            BuiltInCategory::Rooms => "OST_Rooms",
            BuiltInCategory::Levels => "OST_Levels",
            BuiltInCategory::Grids => "OST_Grids",
            BuiltInCategory::Sheets => "OST_Sheets",
            BuiltInCategory::Viewports => "OST_Viewports",
            BuiltInCategory::Views => "OST_Views",
            BuiltInCategory::ProjectInformation => "OST_ProjectInformation",
            BuiltInCategory::Materials => "OST_Materials",
        }
    }

    /// Resolve a category from its UI name or `OST_` name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL.iter().copied().find(|category| {
            category.name().eq_ignore_ascii_case(needle)
                || category.ost_name().eq_ignore_ascii_case(needle)
        })
    }

    /// Check if this category holds structural framing members
    pub fn is_structural_framing(&self) -> bool {
        matches!(
            self,
            BuiltInCategory::StructuralFraming
                | BuiltInCategory::StructuralColumns
                | BuiltInCategory::Columns
                | BuiltInCategory::VerticalBracing
                | BuiltInCategory::Truss
                | BuiltInCategory::StructuralTruss
                | BuiltInCategory::HorizontalBracing
                | BuiltInCategory::Purlin
                | BuiltInCategory::Joist
                | BuiltInCategory::Girder
                | BuiltInCategory::StructuralStiffener
                | BuiltInCategory::StructuralFramingOther
        )
    }
}

impl fmt::Display for BuiltInCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Host runtime class of an element
///
/// Closed set of host classes the adapter distinguishes. Classes the adapter
/// never maps are collapsed into `Other`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum RuntimeType {
    // Loadable families
    FamilyInstance,
    FamilySymbol,

    // Host objects and their types
    Wall,
    WallType,
    Floor,
    FloorType,
    Ceiling,
    CeilingType,
    Roof,
    RoofType,
    CurtainSystem,
    CurtainSystemType,
    Panel,
    PanelType,
    Mullion,
    MullionType,

    // MEP curves and their types
    Duct,
    DuctType,
    FlexDuct,
    FlexDuctType,
    DuctInsulation,
    DuctInsulationType,
    Pipe,
    PipeType,
    FlexPipe,
    FlexPipeType,
    PipeInsulation,
    PipeInsulationType,
    Conduit,
    ConduitType,
    CableTray,
    CableTrayType,

    // Spatial elements
    Space,
    Room,

    // Datums, views and project data
    Level,
    Grid,
    ViewSheet,
    Viewport,
    ViewPlan,
    ProjectInfo,
    Material,

    /// Any host class the adapter does not distinguish
    Other,
}

impl RuntimeType {
    /// Every runtime type, in declaration order
    pub const ALL: &'static [RuntimeType] = &[
        RuntimeType::FamilyInstance,
        RuntimeType::FamilySymbol,
        RuntimeType::Wall,
        RuntimeType::WallType,
        RuntimeType::Floor,
        RuntimeType::FloorType,
        RuntimeType::Ceiling,
        RuntimeType::CeilingType,
        RuntimeType::Roof,
        RuntimeType::RoofType,
        RuntimeType::CurtainSystem,
        RuntimeType::CurtainSystemType,
        RuntimeType::Panel,
        RuntimeType::PanelType,
        RuntimeType::Mullion,
        RuntimeType::MullionType,
        RuntimeType::Duct,
        RuntimeType::DuctType,
        RuntimeType::FlexDuct,
        RuntimeType::FlexDuctType,
        RuntimeType::DuctInsulation,
        RuntimeType::DuctInsulationType,
        RuntimeType::Pipe,
        RuntimeType::PipeType,
        RuntimeType::FlexPipe,
        RuntimeType::FlexPipeType,
        RuntimeType::PipeInsulation,
        RuntimeType::PipeInsulationType,
        RuntimeType::Conduit,
        RuntimeType::ConduitType,
        RuntimeType::CableTray,
        RuntimeType::CableTrayType,
        RuntimeType::Space,
        RuntimeType::Room,
        RuntimeType::Level,
        RuntimeType::Grid,
        RuntimeType::ViewSheet,
        RuntimeType::Viewport,
        RuntimeType::ViewPlan,
        RuntimeType::ProjectInfo,
        RuntimeType::Material,
        RuntimeType::Other,
    ];

    /// Check if this is an element-type object (a family symbol or system type)
    pub fn is_element_type(&self) -> bool {
        matches!(
            self,
            RuntimeType::FamilySymbol
                | RuntimeType::WallType
                | RuntimeType::FloorType
                | RuntimeType::CeilingType
                | RuntimeType::RoofType
                | RuntimeType::CurtainSystemType
                | RuntimeType::PanelType
                | RuntimeType::MullionType
                | RuntimeType::DuctType
                | RuntimeType::FlexDuctType
                | RuntimeType::DuctInsulationType
                | RuntimeType::PipeType
                | RuntimeType::FlexPipeType
                | RuntimeType::PipeInsulationType
                | RuntimeType::ConduitType
                | RuntimeType::CableTrayType
        )
    }

    /// Runtime type of the instances an element-type object types
    ///
    /// Returns `None` for instance classes and for types whose instances
    /// cannot be collected by class.
    pub fn instance_type(&self) -> Option<RuntimeType> {
        match self {
            RuntimeType::FamilySymbol => Some(RuntimeType::FamilyInstance),
            RuntimeType::WallType => Some(RuntimeType::Wall),
            RuntimeType::FloorType => Some(RuntimeType::Floor),
            RuntimeType::CeilingType => Some(RuntimeType::Ceiling),
            RuntimeType::RoofType => Some(RuntimeType::Roof),
            RuntimeType::CurtainSystemType => Some(RuntimeType::CurtainSystem),
            RuntimeType::PanelType => Some(RuntimeType::Panel),
            RuntimeType::MullionType => Some(RuntimeType::Mullion),
            RuntimeType::DuctType => Some(RuntimeType::Duct),
            RuntimeType::FlexDuctType => Some(RuntimeType::FlexDuct),
            RuntimeType::DuctInsulationType => Some(RuntimeType::DuctInsulation),
            RuntimeType::PipeType => Some(RuntimeType::Pipe),
            RuntimeType::FlexPipeType => Some(RuntimeType::FlexPipe),
            RuntimeType::PipeInsulationType => Some(RuntimeType::PipeInsulation),
            RuntimeType::ConduitType => Some(RuntimeType::Conduit),
            RuntimeType::CableTrayType => Some(RuntimeType::CableTray),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Host parameter value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// Floating point value (lengths, areas, ...)
    Double(f64),
    /// Integer value
    Integer(i64),
    /// Text value
    Text(String),
    /// Yes/No value
    Bool(bool),
    /// Reference to another element
    ElementId(ElementId),
}

impl ParameterValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        ParameterValue::Text(value.into())
    }

    /// Try to get as a number
    ///
    /// Integers widen to `f64`; text, booleans and element references are
    /// not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(v) => Some(*v),
            ParameterValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as element reference
    pub fn as_element_id(&self) -> Option<ElementId> {
        match self {
            ParameterValue::ElementId(id) => Some(*id),
            _ => None,
        }
    }

    /// Convert to a JSON value for a custom-data bag
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParameterValue::Double(v) => serde_json::json!(v),
            ParameterValue::Integer(v) => serde_json::json!(v),
            ParameterValue::Text(s) => serde_json::json!(s),
            ParameterValue::Bool(b) => serde_json::json!(b),
            ParameterValue::ElementId(id) => serde_json::json!(id.0),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Double(v) => write!(f, "{}", v),
            ParameterValue::Integer(v) => write!(f, "{}", v),
            ParameterValue::Text(s) => write!(f, "{}", s),
            ParameterValue::Bool(b) => write!(f, "{}", if *b { "Yes" } else { "No" }),
            ParameterValue::ElementId(id) => write!(f, "{}", id),
        }
    }
}

/// A named host parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name as shown in the host UI
    pub name: String,
    /// Parameter value
    pub value: ParameterValue,
}

impl Parameter {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Read-only snapshot of a host element
///
/// The core never mutates host elements; it only reads identifiers,
/// classification attributes and parameters from them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostElement {
    /// Integer id (stable within a session)
    pub id: ElementId,
    /// String unique id (stable across sessions)
    pub unique_id: String,
    /// Built-in category, if the element has a known one
    pub category: Option<BuiltInCategory>,
    /// Host runtime class
    pub runtime_type: RuntimeType,
    /// Family name (for family instances, symbols and system types)
    pub family_name: Option<String>,
    /// Type name
    pub type_name: Option<String>,
    /// Structural section shape code (for structural profiles)
    pub shape_code: Option<i32>,
    /// Id of the element-type object this element is an instance of
    pub type_id: Option<ElementId>,
    /// Workset the element lives on
    pub workset: Option<WorksetId>,
    /// Parameters in host order
    pub parameters: Vec<Parameter>,
}

impl HostElement {
    /// Create a new element with no category, names or parameters
    pub fn new(id: impl Into<ElementId>, unique_id: impl Into<String>, runtime_type: RuntimeType) -> Self {
        Self {
            id: id.into(),
            unique_id: unique_id.into(),
            category: None,
            runtime_type,
            family_name: None,
            type_name: None,
            shape_code: None,
            type_id: None,
            workset: None,
            parameters: Vec::new(),
        }
    }

    /// Set category
    pub fn with_category(mut self, category: BuiltInCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Set family name
    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    /// Set type name
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set structural section shape code
    pub fn with_shape_code(mut self, shape_code: i32) -> Self {
        self.shape_code = Some(shape_code);
        self
    }

    /// Set the element-type object id
    pub fn with_type_id(mut self, type_id: impl Into<ElementId>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    /// Set workset
    pub fn with_workset(mut self, workset: WorksetId) -> Self {
        self.workset = Some(workset);
        self
    }

    /// Add a parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    /// Get the first parameter value with the given name
    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Check if this element is an element-type object
    pub fn is_element_type(&self) -> bool {
        self.runtime_type.is_element_type()
    }
}

impl FromStr for BuiltInCategory {
    type Err = crate::AdapterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::AdapterError::UnknownCategory(s.to_string()))
    }
}
