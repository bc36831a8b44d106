// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain-side types
//!
//! Target classes of the vendor-neutral building-object model and the objects
//! produced for them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Custom-data key holding the host string unique id
pub const ADAPTER_ID_KEY: &str = "Revit_UniqueId";

/// Custom-data key holding the host integer element id
pub const ELEMENT_ID_KEY: &str = "Revit_ElementId";

/// Coarse domain-model partition used to resolve mixed-use elements
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum Discipline {
    Structural,
    #[default]
    Environmental,
    Architecture,
}

impl Discipline {
    /// Parse a discipline name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structural" => Some(Discipline::Structural),
            "environmental" => Some(Discipline::Environmental),
            "architecture" | "architectural" => Some(Discipline::Architecture),
            _ => None,
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Target domain class
///
/// `Profile` is abstract: nothing classifies to it directly, but every
/// concrete section profile is assignable to it, so cache lookups can ask
/// for "any profile".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum DomainType {
    // Physical and environmental elements
    BuildingElement,
    BuildingElementProperties,
    Space,
    Duct,

    // Structural elements and properties
    PanelPlanar,
    SurfaceProperty,
    FramingElement,

    // Datums, documentation and project data
    Level,
    Grid,
    Sheet,
    Viewport,
    ViewPlan,
    Building,

    // Section profiles
    Profile,
    RectangleProfile,
    TubeProfile,
    ISectionProfile,
    ChannelProfile,
    AngleProfile,
    CircleProfile,
    BoxProfile,
    FabricatedISectionProfile,
    TSectionProfile,
    ZSectionProfile,
}

impl DomainType {
    /// Every domain type, in declaration order
    pub const ALL: &'static [DomainType] = &[
        DomainType::BuildingElement,
        DomainType::BuildingElementProperties,
        DomainType::Space,
        DomainType::Duct,
        DomainType::PanelPlanar,
        DomainType::SurfaceProperty,
        DomainType::FramingElement,
        DomainType::Level,
        DomainType::Grid,
        DomainType::Sheet,
        DomainType::Viewport,
        DomainType::ViewPlan,
        DomainType::Building,
        DomainType::Profile,
        DomainType::RectangleProfile,
        DomainType::TubeProfile,
        DomainType::ISectionProfile,
        DomainType::ChannelProfile,
        DomainType::AngleProfile,
        DomainType::CircleProfile,
        DomainType::BoxProfile,
        DomainType::FabricatedISectionProfile,
        DomainType::TSectionProfile,
        DomainType::ZSectionProfile,
    ];

    /// Class name
    pub fn name(&self) -> &'static str {
        match self {
            DomainType::BuildingElement => "BuildingElement",
            DomainType::BuildingElementProperties => "BuildingElementProperties",
            DomainType::Space => "Space",
            DomainType::Duct => "Duct",
            DomainType::PanelPlanar => "PanelPlanar",
            DomainType::SurfaceProperty => "SurfaceProperty",
            DomainType::FramingElement => "FramingElement",
            DomainType::Level => "Level",
            DomainType::Grid => "Grid",
            DomainType::Sheet => "Sheet",
            DomainType::Viewport => "Viewport",
            DomainType::ViewPlan => "ViewPlan",
            DomainType::Building => "Building",
            DomainType::Profile => "Profile",
            DomainType::RectangleProfile => "RectangleProfile",
            DomainType::TubeProfile => "TubeProfile",
            DomainType::ISectionProfile => "ISectionProfile",
            DomainType::ChannelProfile => "ChannelProfile",
            DomainType::AngleProfile => "AngleProfile",
            DomainType::CircleProfile => "CircleProfile",
            DomainType::BoxProfile => "BoxProfile",
            DomainType::FabricatedISectionProfile => "FabricatedISectionProfile",
            DomainType::TSectionProfile => "TSectionProfile",
            DomainType::ZSectionProfile => "ZSectionProfile",
        }
    }

    /// Parse a class name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(needle))
    }

    /// Check if this is a section profile (including the abstract supertype)
    pub fn is_profile(&self) -> bool {
        matches!(
            self,
            DomainType::Profile
                | DomainType::RectangleProfile
                | DomainType::TubeProfile
                | DomainType::ISectionProfile
                | DomainType::ChannelProfile
                | DomainType::AngleProfile
                | DomainType::CircleProfile
                | DomainType::BoxProfile
                | DomainType::FabricatedISectionProfile
                | DomainType::TSectionProfile
                | DomainType::ZSectionProfile
        )
    }

    /// Check if an object of this type can be used where `target` is expected
    pub fn is_assignable_to(&self, target: DomainType) -> bool {
        *self == target || (target == DomainType::Profile && self.is_profile())
    }

    /// Disciplines whose sub-model contains this type
    pub fn disciplines(&self) -> &'static [Discipline] {
        use Discipline::*;
        match self {
            DomainType::BuildingElement | DomainType::BuildingElementProperties => {
                &[Environmental, Architecture]
            }
            DomainType::Space | DomainType::Duct => &[Environmental],
            DomainType::PanelPlanar | DomainType::SurfaceProperty | DomainType::FramingElement => {
                &[Structural]
            }
            t if t.is_profile() => &[Structural],
            _ => &[Structural, Environmental, Architecture],
        }
    }

    /// Check if this type belongs to the given discipline's sub-model
    pub fn applies_to(&self, discipline: Discipline) -> bool {
        self.disciplines().contains(&discipline)
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A converted domain object
///
/// Field-level content is owned by the per-type converters; the core only
/// needs the type tag, a display name and the generic custom-data bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainObject {
    /// Concrete domain class
    pub domain_type: DomainType,
    /// Display name
    pub name: String,
    /// Generic key-value bag
    #[serde(default)]
    pub custom_data: BTreeMap<String, serde_json::Value>,
}

impl DomainObject {
    /// Create a new object with an empty custom-data bag
    pub fn new(domain_type: DomainType, name: impl Into<String>) -> Self {
        Self {
            domain_type,
            name: name.into(),
            custom_data: BTreeMap::new(),
        }
    }

    /// Add a custom-data entry
    pub fn with_custom_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom_data.insert(key.into(), value);
        self
    }

    /// Check if this object can be used where `target` is expected
    pub fn is_a(&self, target: DomainType) -> bool {
        self.domain_type.is_assignable_to(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_assignability() {
        assert!(DomainType::ISectionProfile.is_assignable_to(DomainType::Profile));
        assert!(DomainType::Profile.is_assignable_to(DomainType::Profile));
        assert!(!DomainType::Profile.is_assignable_to(DomainType::ISectionProfile));
        assert!(!DomainType::PanelPlanar.is_assignable_to(DomainType::Profile));
        assert!(!DomainType::BoxProfile.is_assignable_to(DomainType::TubeProfile));
    }

    #[test]
    fn test_disciplines() {
        assert!(DomainType::PanelPlanar.applies_to(Discipline::Structural));
        assert!(!DomainType::PanelPlanar.applies_to(Discipline::Environmental));
        assert!(DomainType::BuildingElement.applies_to(Discipline::Environmental));
        assert!(DomainType::Level.applies_to(Discipline::Architecture));
        for t in DomainType::ALL {
            assert!(!t.disciplines().is_empty(), "{} has no discipline", t);
        }
    }

    #[test]
    fn test_parse_names() {
        for t in DomainType::ALL {
            assert_eq!(DomainType::parse(t.name()), Some(*t));
        }
        assert_eq!(DomainType::parse("panelplanar"), Some(DomainType::PanelPlanar));
        assert_eq!(Discipline::parse("STRUCTURAL"), Some(Discipline::Structural));
        assert_eq!(Discipline::parse("mechanical"), None);
    }

    #[test]
    fn test_domain_object_serde() {
        let obj = DomainObject::new(DomainType::Level, "Level 1")
            .with_custom_data(ADAPTER_ID_KEY, serde_json::json!("abc-123"));
        let json = serde_json::to_string(&obj).unwrap();
        let back: DomainObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obj);
        assert!(back.is_a(DomainType::Level));
    }
}
