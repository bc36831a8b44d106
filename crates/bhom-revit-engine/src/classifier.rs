// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type Classifier - Maps host elements to candidate domain types
//!
//! Classification is a pure function of a static, ordered rule table:
//!
//! 1. Element rules are tried in table order. The first rule whose runtime
//!    type and category predicates both hold wins; its full result list is
//!    returned and later rules are never consulted.
//! 2. Structural family symbols no rule claims fall through to the section
//!    profile lookup: the numeric shape code first, then the family name
//!    matched against suffix patterns, longest pattern first.
//! 3. Anything else classifies to an empty list, meaning "do not convert".

use bhom_revit_model::{BuiltInCategory, DomainType, HostElement, RuntimeType};
use std::fmt;

use bhom_revit_model::BuiltInCategory as Cat;
use bhom_revit_model::DomainType as D;
use bhom_revit_model::RuntimeType as R;

/// Categories holding structural framing members
const FRAMING_CATEGORIES: &[BuiltInCategory] = &[
    Cat::StructuralFraming,
    Cat::StructuralColumns,
    Cat::Columns,
    Cat::VerticalBracing,
    Cat::Truss,
    Cat::StructuralTruss,
    Cat::HorizontalBracing,
    Cat::Purlin,
    Cat::Joist,
    Cat::Girder,
    Cat::StructuralStiffener,
    Cat::StructuralFramingOther,
];

const OPENING_CATEGORIES: &[BuiltInCategory] = &[Cat::Windows, Cat::Doors];

/// One entry of the element classification table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Rule name used in diagnostics
    pub name: &'static str,
    /// Runtime types the rule applies to
    pub runtime_types: &'static [RuntimeType],
    /// Categories the rule applies to (`None` matches any category)
    pub categories: Option<&'static [BuiltInCategory]>,
    /// Domain types produced when the rule matches
    pub result: &'static [DomainType],
}

impl ClassificationRule {
    const fn new(
        name: &'static str,
        runtime_types: &'static [RuntimeType],
        categories: Option<&'static [BuiltInCategory]>,
        result: &'static [DomainType],
    ) -> Self {
        Self {
            name,
            runtime_types,
            categories,
            result,
        }
    }

    /// Check if the rule's predicate holds for an element
    pub fn matches(&self, element: &HostElement) -> bool {
        if !self.runtime_types.contains(&element.runtime_type) {
            return false;
        }
        match (self.categories, element.category) {
            (None, _) => true,
            (Some(categories), Some(category)) => categories.contains(&category),
            (Some(_), None) => false,
        }
    }

    /// Check if some element could satisfy both this rule and `other`
    pub fn overlaps(&self, other: &ClassificationRule) -> bool {
        let shares_type = self
            .runtime_types
            .iter()
            .any(|t| other.runtime_types.contains(t));
        if !shares_type {
            return false;
        }
        match (self.categories, other.categories) {
            (Some(a), Some(b)) => a.iter().any(|c| b.contains(c)),
            _ => true,
        }
    }
}

/// Element classification table, in priority order
#[rustfmt::skip]
pub const ELEMENT_RULES: &[ClassificationRule] = &[
    ClassificationRule::new("framing_instance", &[R::FamilyInstance], Some(FRAMING_CATEGORIES), &[D::FramingElement]),
    ClassificationRule::new("opening_instance", &[R::FamilyInstance], Some(OPENING_CATEGORIES), &[D::BuildingElement]),
    ClassificationRule::new("opening_symbol", &[R::FamilySymbol], Some(OPENING_CATEGORIES), &[D::BuildingElementProperties]),
    ClassificationRule::new("ceiling_type", &[R::CeilingType], None, &[D::BuildingElementProperties]),
    ClassificationRule::new("surface_type", &[R::WallType, R::FloorType, R::RoofType], None, &[D::BuildingElementProperties, D::SurfaceProperty]),
    ClassificationRule::new("space", &[R::Space], None, &[D::Space]),
    ClassificationRule::new("wall", &[R::Wall], None, &[D::BuildingElement, D::PanelPlanar]),
    ClassificationRule::new("ceiling", &[R::Ceiling], None, &[D::BuildingElement]),
    ClassificationRule::new("roof", &[R::Roof], None, &[D::BuildingElement]),
    ClassificationRule::new("floor", &[R::Floor], None, &[D::BuildingElement]),
    ClassificationRule::new("level", &[R::Level], None, &[D::Level]),
    ClassificationRule::new("grid", &[R::Grid], None, &[D::Grid]),
    ClassificationRule::new("sheet", &[R::ViewSheet], None, &[D::Sheet]),
    ClassificationRule::new("viewport", &[R::Viewport], None, &[D::Viewport]),
    ClassificationRule::new("view_plan", &[R::ViewPlan], None, &[D::ViewPlan]),
    ClassificationRule::new("project_info", &[R::ProjectInfo], None, &[D::Building]),
    ClassificationRule::new("duct", &[R::Duct], None, &[D::Duct]),
];

/// Profile type for a structural section shape code
pub fn profile_for_shape_code(shape_code: i32) -> Option<DomainType> {
    match shape_code {
        2 | 12 | 31 => Some(D::RectangleProfile),
        5 | 15 => Some(D::TubeProfile),
        6 | 8 => Some(D::ISectionProfile),
        9 | 20 => Some(D::ChannelProfile),
        11 | 23 => Some(D::AngleProfile),
        13 | 35 => Some(D::CircleProfile),
        14 => Some(D::BoxProfile),
        16 => Some(D::FabricatedISectionProfile),
        17 | 19 | 33 => Some(D::TSectionProfile),
        25 => Some(D::ZSectionProfile),
        _ => None,
    }
}

/// How a family-name pattern is matched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// Whole family name equals the pattern
    Exact,
    /// Family name ends with the pattern
    Suffix,
}

/// Family-name pattern mapped to a profile type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FamilyNameRule {
    pub pattern: &'static str,
    pub kind: PatternKind,
    pub profile: DomainType,
}

impl FamilyNameRule {
    const fn suffix(pattern: &'static str, profile: DomainType) -> Self {
        Self {
            pattern,
            kind: PatternKind::Suffix,
            profile,
        }
    }

    const fn exact(pattern: &'static str, profile: DomainType) -> Self {
        Self {
            pattern,
            kind: PatternKind::Exact,
            profile,
        }
    }

    /// Check if a family name satisfies this pattern
    pub fn matches(&self, family_name: &str) -> bool {
        match self.kind {
            PatternKind::Exact => family_name == self.pattern,
            PatternKind::Suffix => family_name.ends_with(self.pattern),
        }
    }
}

/// Family-name patterns of the loadable structural section libraries
///
/// Kept in library order; the classifier never relies on this order for
/// correctness (see [`TypeClassifier::new`]).
pub const FAMILY_NAME_RULES: &[FamilyNameRule] = &[
    // Concrete, precast and timber
    FamilyNameRule::suffix("_Concrete-RectangularBeam", D::RectangleProfile),
    FamilyNameRule::suffix("_ConcreteRectangular", D::RectangleProfile),
    FamilyNameRule::suffix("_ConcreteRectangularWithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_ConcreteSquare", D::RectangleProfile),
    FamilyNameRule::suffix("_ConcreteSquareWithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_Precast-RectangularBeam", D::RectangleProfile),
    FamilyNameRule::suffix("_Precast-RectangularColumn", D::RectangleProfile),
    FamilyNameRule::suffix("_ConcreteRectangular-PrecastWithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_ConcreteRectangular-Precast", D::RectangleProfile),
    FamilyNameRule::suffix("_Precast-SquareColumnWithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_Precast-SquareColumn", D::RectangleProfile),
    FamilyNameRule::suffix("_Precast-RectangularColumnWithCL", D::RectangleProfile),
    FamilyNameRule::exact("BHm_StructuralFraming_Timber", D::RectangleProfile),
    FamilyNameRule::exact("BHm_StructuralColumns_Timber", D::RectangleProfile),
    FamilyNameRule::suffix("_LaminatedVeneerLumber", D::RectangleProfile),
    FamilyNameRule::suffix("_ParallelStrandLumberWithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_ParallelStrandLumber", D::RectangleProfile),
    FamilyNameRule::suffix("_Glulam(1)", D::RectangleProfile),
    FamilyNameRule::suffix("_Glulam(1)WithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_Glulam(2)", D::RectangleProfile),
    FamilyNameRule::suffix("_Glulam(2)WithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_DimensionLumber", D::RectangleProfile),
    FamilyNameRule::suffix("_DimensionLumberWithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_TimberWithCL", D::RectangleProfile),
    FamilyNameRule::suffix("_Plate", D::RectangleProfile),
    // Rolled I and H sections
    FamilyNameRule::suffix("_RSJ-RolledSteelJoists", D::ISectionProfile),
    FamilyNameRule::suffix("_UC-UniversalColumns", D::ISectionProfile),
    FamilyNameRule::suffix("_UC-UniversalColumns-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_UB-UniversalBeams", D::ISectionProfile),
    FamilyNameRule::suffix("_UB-UniversalBeams-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_UBP-UniversalBearingPile", D::ISectionProfile),
    FamilyNameRule::suffix("_UBP-UniversalBearingPile-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_ASB-Beams", D::ISectionProfile),
    FamilyNameRule::suffix("_UKC-UKColumns", D::ISectionProfile),
    FamilyNameRule::suffix("_UKC-UKColumns-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_UKB-UKBeams", D::ISectionProfile),
    FamilyNameRule::suffix("_UKB-UKBeams-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_UKBP-UKBearingPiles", D::ISectionProfile),
    FamilyNameRule::suffix("_UKBP-UKBearingPiles-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_IPN-Beams", D::ISectionProfile),
    FamilyNameRule::suffix("_IPN-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_IPE-Beams", D::ISectionProfile),
    FamilyNameRule::suffix("_IPE-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_H-WideFlangeBeams", D::ISectionProfile),
    FamilyNameRule::suffix("_H-WideFlange-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_M-MiscellaneousWideFlange-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_W-WideFlange-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_HP-BearingPile-Column", D::ISectionProfile),
    FamilyNameRule::suffix("_RSJ-RolledSteelJoists-Column", D::ISectionProfile),
    // Solid rounds
    FamilyNameRule::suffix("_RoundBar", D::CircleProfile),
    FamilyNameRule::suffix("_ConcreteRound", D::CircleProfile),
    FamilyNameRule::suffix("_ConcreteRoundWithCL", D::CircleProfile),
    // Fabricated I sections
    FamilyNameRule::suffix("_PlateGirder", D::FabricatedISectionProfile),
    FamilyNameRule::suffix("_WeldedWideFlange", D::FabricatedISectionProfile),
    FamilyNameRule::suffix("_WeldedReducedFlange", D::FabricatedISectionProfile),
    FamilyNameRule::suffix("_Plate-Column", D::FabricatedISectionProfile),
    FamilyNameRule::suffix("_WWF-WeldedWideFlange-Column", D::FabricatedISectionProfile),
    FamilyNameRule::suffix("_WRF-WeldedReducedFlange-Column", D::FabricatedISectionProfile),
    // Angles
    FamilyNameRule::suffix("_L-Angles", D::AngleProfile),
    FamilyNameRule::suffix("_L-EqualLegAngles", D::AngleProfile),
    FamilyNameRule::suffix("_L-EqualLegAngles-Column", D::AngleProfile),
    FamilyNameRule::suffix("_L-UnequalLegAngles", D::AngleProfile),
    FamilyNameRule::suffix("_L-UnequalLegAngles-Column", D::AngleProfile),
    FamilyNameRule::suffix("_UKA-UKAngles", D::AngleProfile),
    FamilyNameRule::suffix("_UKA-UKAngles-Column", D::AngleProfile),
    // Channels
    FamilyNameRule::suffix("_C-Channels", D::ChannelProfile),
    FamilyNameRule::suffix("_UKPFC-ParallelFlangeChannels", D::ChannelProfile),
    FamilyNameRule::suffix("_UKPFC-ParallelFlangeChannels-Column", D::ChannelProfile),
    FamilyNameRule::suffix("_PFC-ParallelFlangeChannels", D::ChannelProfile),
    FamilyNameRule::suffix("_PFC-ParallelFlangeChannels-Column", D::ChannelProfile),
    FamilyNameRule::suffix("_U-ParallelFlangeChannels", D::ChannelProfile),
    FamilyNameRule::suffix("_U-Channels", D::ChannelProfile),
    // Tees
    FamilyNameRule::suffix("_Precast-SingleTee", D::TSectionProfile),
    FamilyNameRule::suffix("_UKT-UKTeesSplitfromUKC", D::TSectionProfile),
    FamilyNameRule::suffix("_UKT-UKTeesSplitfromUKC-Column", D::TSectionProfile),
    FamilyNameRule::suffix("_UKT-UKTeesSplitfromUKB", D::TSectionProfile),
    FamilyNameRule::suffix("_UKT-UKTeesSplitfromUKB-Column", D::TSectionProfile),
    FamilyNameRule::suffix("_T-TeesfromUniversalColumns", D::TSectionProfile),
    FamilyNameRule::suffix("_T-TeesfromUniversalColumns-Column", D::TSectionProfile),
    FamilyNameRule::suffix("_T-TeesfromUniversalBeams", D::TSectionProfile),
    FamilyNameRule::suffix("_T-TeesfromUniversalBeams-Column", D::TSectionProfile),
    FamilyNameRule::suffix("_MH-TeesfromH-Beams", D::TSectionProfile),
    FamilyNameRule::suffix("_T-Tees", D::TSectionProfile),
    FamilyNameRule::suffix("_MIPE-TeesfromIPE", D::TSectionProfile),
    // Square and rectangular hollow sections
    FamilyNameRule::suffix("_SquareHollowSections", D::BoxProfile),
    FamilyNameRule::suffix("_SquareHollowSections-Column", D::BoxProfile),
    FamilyNameRule::suffix("_RectangularHollowSections", D::BoxProfile),
    FamilyNameRule::suffix("_RectangularHollowSections-Column", D::BoxProfile),
    FamilyNameRule::suffix("_SHS-SquareHollowSections(Cold)", D::BoxProfile),
    FamilyNameRule::suffix("_SHS-SquareHollowSections-Column(Cold)", D::BoxProfile),
    FamilyNameRule::suffix("_SHS-SquareHollowSections", D::BoxProfile),
    FamilyNameRule::suffix("_SHS-SquareHollowSections-Column", D::BoxProfile),
    FamilyNameRule::suffix("_RHS-RectangularHollowSections(Cold)", D::BoxProfile),
    FamilyNameRule::suffix("_RHS-RectangularHollowSections-Column(Cold)", D::BoxProfile),
    FamilyNameRule::suffix("_RHS-RectangularHollowSections", D::BoxProfile),
    FamilyNameRule::suffix("_RHS-RectangularHollowSections-Column", D::BoxProfile),
    FamilyNameRule::suffix("_RectangularandSquareHollowSections", D::BoxProfile),
    FamilyNameRule::suffix("_RectangularandSquareHollowSections-Column", D::BoxProfile),
    // Circular hollow sections
    FamilyNameRule::suffix("_CircularHollowSections", D::TubeProfile),
    FamilyNameRule::suffix("_CircularHollowSections-Column", D::TubeProfile),
    FamilyNameRule::suffix("_CHS-CircularHollowSections(Cold)", D::TubeProfile),
    FamilyNameRule::suffix("_CHS-CircularHollowSections-Column(Cold)", D::TubeProfile),
    FamilyNameRule::suffix("_CHS-CircularHollowSections", D::TubeProfile),
    FamilyNameRule::suffix("_CHS-CircularHollowSections-Column", D::TubeProfile),
    // TODO: duplicates the first circular hollow entry, remove with the next library sync
    FamilyNameRule::suffix("_CircularHollowSections", D::TubeProfile),
    FamilyNameRule::suffix("_Pipe-Column", D::TubeProfile),
];

/// Overlap between two element rules
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleConflict {
    pub first: &'static str,
    pub second: &'static str,
}

impl fmt::Display for RuleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rules '{}' and '{}' overlap", self.first, self.second)
    }
}

/// Problem found in a family-name table
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FamilyNameConflict {
    /// The same pattern appears twice
    Duplicate {
        pattern: &'static str,
        first: usize,
        second: usize,
    },
    /// An earlier pattern matches every name a later, longer pattern matches
    Shadowed {
        shorter: &'static str,
        longer: &'static str,
        shorter_index: usize,
        longer_index: usize,
    },
}

impl fmt::Display for FamilyNameConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FamilyNameConflict::Duplicate {
                pattern,
                first,
                second,
            } => write!(f, "pattern '{}' repeated at {} and {}", pattern, first, second),
            FamilyNameConflict::Shadowed {
                shorter,
                longer,
                shorter_index,
                longer_index,
            } => write!(
                f,
                "pattern '{}' ({}) shadows '{}' ({})",
                shorter, shorter_index, longer, longer_index
            ),
        }
    }
}

/// Report every pair of element rules whose predicates overlap
pub fn validate_rules(rules: &[ClassificationRule]) -> Vec<RuleConflict> {
    let mut conflicts = Vec::new();
    for (i, first) in rules.iter().enumerate() {
        for second in &rules[i + 1..] {
            if first.overlaps(second) {
                conflicts.push(RuleConflict {
                    first: first.name,
                    second: second.name,
                });
            }
        }
    }
    conflicts
}

/// Report duplicate and shadowed patterns in table order
///
/// A pattern is shadowed when an earlier suffix pattern would also match
/// every name the later one matches, so first-match evaluation in table
/// order could never reach it.
pub fn validate_family_name_rules(rules: &[FamilyNameRule]) -> Vec<FamilyNameConflict> {
    let mut conflicts = Vec::new();
    for (i, earlier) in rules.iter().enumerate() {
        for (offset, later) in rules[i + 1..].iter().enumerate() {
            let j = i + 1 + offset;
            if earlier.pattern == later.pattern && earlier.kind == later.kind {
                conflicts.push(FamilyNameConflict::Duplicate {
                    pattern: earlier.pattern,
                    first: i,
                    second: j,
                });
            } else if earlier.kind == PatternKind::Suffix && later.pattern.ends_with(earlier.pattern)
            {
                conflicts.push(FamilyNameConflict::Shadowed {
                    shorter: earlier.pattern,
                    longer: later.pattern,
                    shorter_index: i,
                    longer_index: j,
                });
            }
        }
    }
    conflicts
}

/// Type classifier
///
/// Holds the element rule table and the family-name patterns in evaluation
/// order. Construction is cheap; a session usually owns one.
pub struct TypeClassifier {
    rules: &'static [ClassificationRule],
    family_names: Vec<&'static FamilyNameRule>,
}

impl TypeClassifier {
    /// Create a classifier over the built-in tables
    ///
    /// Family-name patterns are evaluated exact names first, then suffixes
    /// by descending length, so a shorter suffix can never preempt a longer
    /// one that ends with it. Table problems are logged, not fatal.
    pub fn new() -> Self {
        Self::with_tables(ELEMENT_RULES, FAMILY_NAME_RULES)
    }

    /// Create a classifier over custom tables
    pub fn with_tables(
        rules: &'static [ClassificationRule],
        family_names: &'static [FamilyNameRule],
    ) -> Self {
        for conflict in validate_rules(rules) {
            log::warn!("Classification table: {}", conflict);
        }
        for conflict in validate_family_name_rules(family_names) {
            log::debug!("Family-name table: {}", conflict);
        }

        let mut ordered: Vec<&'static FamilyNameRule> = family_names.iter().collect();
        // Stable: equal-length patterns keep table order
        ordered.sort_by_key(|rule| match rule.kind {
            PatternKind::Exact => (0, 0),
            PatternKind::Suffix => (1, usize::MAX - rule.pattern.len()),
        });

        Self {
            rules,
            family_names: ordered,
        }
    }

    /// Classify a host element
    ///
    /// # Arguments
    /// * `element` - Host element snapshot
    ///
    /// # Returns
    /// Candidate domain types in rule order; empty when no mapping is known
    pub fn classify(&self, element: &HostElement) -> Vec<DomainType> {
        if let Some(rule) = self.matching_rule(element) {
            return rule.result.to_vec();
        }

        if self.is_profile_candidate(element) {
            if let Some(profile) = self.classify_profile(element) {
                return vec![profile];
            }
        }

        Vec::new()
    }

    /// Find the element rule that claims an element
    pub fn matching_rule(&self, element: &HostElement) -> Option<&'static ClassificationRule> {
        self.rules.iter().find(|rule| rule.matches(element))
    }

    /// Classify a section profile by shape code, then by family name
    pub fn classify_profile(&self, element: &HostElement) -> Option<DomainType> {
        element
            .shape_code
            .and_then(profile_for_shape_code)
            .or_else(|| {
                element
                    .family_name
                    .as_deref()
                    .and_then(|name| self.classify_family_name(name))
            })
    }

    /// Classify a family name against the pattern table
    pub fn classify_family_name(&self, family_name: &str) -> Option<DomainType> {
        self.match_family_name(family_name).map(|rule| rule.profile)
    }

    /// Find the pattern that claims a family name
    pub fn match_family_name(&self, family_name: &str) -> Option<&'static FamilyNameRule> {
        self.family_names
            .iter()
            .copied()
            .find(|rule| rule.matches(family_name))
    }

    /// Host runtime types whose elements may classify to `domain_type`
    ///
    /// Ordered by first appearance in the rule table; profile types map to
    /// family symbols. Query evaluation enumerates candidates in this order.
    pub fn runtime_types_for(&self, domain_type: DomainType) -> Vec<RuntimeType> {
        let mut runtime_types: Vec<RuntimeType> = Vec::new();
        for rule in self.rules {
            if rule.result.iter().any(|t| t.is_assignable_to(domain_type)) {
                for runtime_type in rule.runtime_types {
                    if !runtime_types.contains(runtime_type) {
                        runtime_types.push(*runtime_type);
                    }
                }
            }
        }
        if domain_type.is_profile() && !runtime_types.contains(&R::FamilySymbol) {
            runtime_types.push(R::FamilySymbol);
        }
        runtime_types
    }

    /// Element rules in priority order
    pub fn rules(&self) -> &'static [ClassificationRule] {
        self.rules
    }

    fn is_profile_candidate(&self, element: &HostElement) -> bool {
        element.runtime_type == R::FamilySymbol
            && element
                .category
                .map(|category| category.is_structural_framing())
                .unwrap_or(false)
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}
