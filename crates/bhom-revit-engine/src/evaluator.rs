// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Query Evaluator - Bottom-up evaluation of query trees
//!
//! Each leaf produces the set of matching element ids, each annotated with
//! the leaf itself. Composites combine child results:
//!
//! - AND keeps ids present in every child and unions their annotations
//! - OR keeps ids present in any child and unions their annotations
//! - a composite without children matches nothing

use crate::classifier::TypeClassifier;
use crate::query::{Criterion, LeafId, Query, QueryNode};
use bhom_revit_model::{
    Comparison, DomainType, ElementCollector, ElementId, FilterRequest, HostElement,
    LogicalOperator, ParameterValue, Result,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

/// Leaves that matched one element
pub type MatchRecord = BTreeSet<LeafId>;

/// Evaluation result: matched element ids with their match records
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    matches: FxHashMap<ElementId, MatchRecord>,
}

impl QueryResult {
    /// Matched ids in ascending order
    pub fn ids(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.matches.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Leaves that matched an element
    pub fn matched_leaves(&self, id: ElementId) -> Option<&MatchRecord> {
        self.matches.get(&id)
    }

    /// Check if an element matched
    pub fn contains(&self, id: ElementId) -> bool {
        self.matches.contains_key(&id)
    }

    /// Number of matched elements
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Check if nothing matched
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterate over matches (no significant order)
    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &MatchRecord)> {
        self.matches.iter()
    }

    fn from_leaf<'e>(leaf: LeafId, elements: impl IntoIterator<Item = &'e HostElement>) -> Self {
        let matches = elements
            .into_iter()
            .map(|e| (e.id, BTreeSet::from([leaf])))
            .collect();
        Self { matches }
    }

    fn intersect(mut self, other: QueryResult) -> Self {
        let mut other = other.matches;
        self.matches.retain(|id, _| other.contains_key(id));
        for (id, record) in self.matches.iter_mut() {
            if let Some(theirs) = other.remove(id) {
                record.extend(theirs);
            }
        }
        self
    }

    fn union(mut self, other: QueryResult) -> Self {
        for (id, record) in other.matches {
            self.matches.entry(id).or_default().extend(record);
        }
        self
    }
}

/// Query evaluator over a live element collection
pub struct QueryEvaluator<'a> {
    classifier: &'a TypeClassifier,
    collector: &'a dyn ElementCollector,
    selection: Option<FxHashSet<ElementId>>,
}

impl<'a> QueryEvaluator<'a> {
    /// Create an evaluator
    ///
    /// # Arguments
    /// * `classifier` - Classifier used by type criteria
    /// * `collector` - Host element enumeration
    pub fn new(classifier: &'a TypeClassifier, collector: &'a dyn ElementCollector) -> Self {
        Self {
            classifier,
            collector,
            selection: None,
        }
    }

    /// Override the UI selection used by selection criteria
    pub fn with_selection(mut self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        self.selection = Some(ids.into_iter().collect());
        self
    }

    /// Evaluate a validated query
    pub fn evaluate(&self, query: &Query) -> QueryResult {
        self.evaluate_node(query, query.root())
    }

    /// Validate and evaluate a filter request
    pub fn evaluate_request(&self, request: &FilterRequest) -> Result<QueryResult> {
        let query = Query::from_request(request)?;
        Ok(self.evaluate(&query))
    }

    fn evaluate_node(&self, query: &Query, node: &QueryNode) -> QueryResult {
        match node {
            QueryNode::Leaf(id) => match query.criterion(*id) {
                Some(criterion) => {
                    let result = self.evaluate_leaf(*id, criterion);
                    log::trace!(
                        "Leaf {} ({}) matched {} elements",
                        id,
                        criterion.kind(),
                        result.len()
                    );
                    result
                }
                None => QueryResult::default(),
            },
            QueryNode::Composite { operator, children } => {
                let mut results = children.iter().map(|c| self.evaluate_node(query, c));
                let first = match results.next() {
                    Some(first) => first,
                    None => return QueryResult::default(),
                };
                match operator {
                    LogicalOperator::And => results.fold(first, QueryResult::intersect),
                    LogicalOperator::Or => results.fold(first, QueryResult::union),
                }
            }
        }
    }

    fn evaluate_leaf(&self, leaf: LeafId, criterion: &Criterion) -> QueryResult {
        match criterion {
            Criterion::Type(domain_type) => {
                QueryResult::from_leaf(leaf, self.elements_of_domain_type(*domain_type))
            }
            Criterion::Category(category) => {
                QueryResult::from_leaf(leaf, self.collector.elements_of_category(*category))
            }
            Criterion::Workset(name) => match self.collector.workset_id(name) {
                Some(workset) => {
                    QueryResult::from_leaf(leaf, self.collector.elements_in_worksets(&[workset]))
                }
                None => QueryResult::default(),
            },
            Criterion::Parameter {
                name,
                comparison,
                value,
                tolerance,
            } => {
                let matching = self.collector.all_elements().into_iter().filter(|e| {
                    e.parameter(name)
                        .map(|actual| parameter_matches(actual, *comparison, value, *tolerance))
                        .unwrap_or(false)
                });
                QueryResult::from_leaf(leaf, matching)
            }
            Criterion::ElementIds(ids) => {
                let found = ids.iter().filter_map(|id| self.collector.get(*id));
                QueryResult::from_leaf(leaf, found)
            }
            Criterion::UniqueIds(ids) => {
                let found = ids
                    .iter()
                    .filter_map(|uid| self.collector.get_by_unique_id(uid));
                QueryResult::from_leaf(leaf, found)
            }
            Criterion::Selection(false) => QueryResult::default(),
            Criterion::Selection(true) => {
                let selection: Vec<ElementId> = match &self.selection {
                    Some(ids) => ids.iter().copied().collect(),
                    None => self.collector.selection(),
                };
                let found = selection.into_iter().filter_map(|id| self.collector.get(id));
                QueryResult::from_leaf(leaf, found)
            }
            Criterion::FamilyType {
                family_name,
                type_name,
                case_sensitive,
            } => QueryResult::from_leaf(
                leaf,
                self.family_instances(family_name, type_name.as_deref(), *case_sensitive),
            ),
        }
    }

    /// Elements classifying to `domain_type`, enumerated per candidate runtime type
    fn elements_of_domain_type(&self, domain_type: DomainType) -> Vec<&'a HostElement> {
        self.classifier
            .runtime_types_for(domain_type)
            .into_iter()
            .flat_map(|runtime_type| self.collector.elements_of_type(runtime_type))
            .filter(|e| {
                self.classifier
                    .classify(e)
                    .iter()
                    .any(|t| t.is_assignable_to(domain_type))
            })
            .collect()
    }

    /// Instances typed by the element types of a family
    fn family_instances(
        &self,
        family_name: &str,
        type_name: Option<&str>,
        case_sensitive: bool,
    ) -> Vec<&'a HostElement> {
        let types: Vec<&HostElement> = self
            .collector
            .all_elements()
            .into_iter()
            .filter(|e| e.is_element_type())
            .filter(|e| names_match(e.family_name.as_deref(), family_name, case_sensitive))
            .filter(|e| {
                type_name
                    .map(|t| names_match(e.type_name.as_deref(), t, case_sensitive))
                    .unwrap_or(true)
            })
            .collect();

        let mut instances = Vec::new();
        for element_type in types {
            let candidates = match element_type.runtime_type.instance_type() {
                Some(instance_type) => self.collector.elements_of_type(instance_type),
                None => self.collector.all_elements(),
            };
            instances.extend(
                candidates
                    .into_iter()
                    .filter(|e| e.type_id == Some(element_type.id)),
            );
        }
        instances
    }
}

fn names_match(actual: Option<&str>, expected: &str, case_sensitive: bool) -> bool {
    match actual {
        Some(actual) if case_sensitive => actual == expected,
        Some(actual) => actual.eq_ignore_ascii_case(expected),
        None => false,
    }
}

/// Compare a host parameter value against a reference value
///
/// Numbers compare with tolerance (integers widen), text compares exactly or
/// lexically, booleans and element references only compare for equality.
/// Mismatched kinds never match.
pub fn parameter_matches(
    actual: &ParameterValue,
    comparison: Comparison,
    reference: &ParameterValue,
    tolerance: f64,
) -> bool {
    match (actual, reference) {
        (ParameterValue::Text(a), ParameterValue::Text(r)) => comparison.compare_text(a, r),
        (ParameterValue::Bool(a), ParameterValue::Bool(r)) => {
            comparison == Comparison::Equal && a == r
        }
        (ParameterValue::ElementId(a), ParameterValue::ElementId(r)) => {
            comparison == Comparison::Equal && a == r
        }
        _ => match (actual.as_f64(), reference.as_f64()) {
            (Some(a), Some(r)) => comparison.compare_numbers(a, r, tolerance),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ElementCollection;
    use crate::query::QueryBuilder;
    use bhom_revit_model::{BuiltInCategory, RuntimeType, WorksetId};

    fn wall(id: i32) -> HostElement {
        HostElement::new(id, format!("uid-{}", id), RuntimeType::Wall)
            .with_category(BuiltInCategory::Walls)
    }

    fn floor(id: i32) -> HostElement {
        HostElement::new(id, format!("uid-{}", id), RuntimeType::Floor)
            .with_category(BuiltInCategory::Floors)
    }

    fn ids(values: &[i32]) -> Vec<ElementId> {
        values.iter().map(|&v| ElementId(v)).collect()
    }

    /// Five-element model: walls {1,3}, floors {2,4,5}, element 2 marked A1
    fn scenario() -> ElementCollection {
        ElementCollection::new(vec![
            wall(1),
            floor(2).with_parameter("Mark", ParameterValue::text("A1")),
            wall(3).with_parameter("Mark", ParameterValue::text("B2")),
            floor(4),
            floor(5),
        ])
        .unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let classifier = TypeClassifier::new();
        let collection = scenario();
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let mut builder = QueryBuilder::new();
        let type_leaf = builder.leaf(Criterion::Type(DomainType::PanelPlanar)).unwrap();
        let mark_leaf = builder
            .leaf(Criterion::parameter(
                "Mark",
                Comparison::Equal,
                ParameterValue::text("A1"),
                0.0,
            ))
            .unwrap();
        let root = builder.or(vec![type_leaf.clone(), mark_leaf.clone()]);
        let query = builder.build(root).unwrap();

        let (type_id, mark_id) = match (type_leaf, mark_leaf) {
            (QueryNode::Leaf(a), QueryNode::Leaf(b)) => (a, b),
            _ => unreachable!(),
        };

        let result = evaluator.evaluate(&query);
        assert_eq!(result.ids(), ids(&[1, 2, 3]));
        assert_eq!(result.matched_leaves(ElementId(2)), Some(&BTreeSet::from([mark_id])));
        assert_eq!(result.matched_leaves(ElementId(1)), Some(&BTreeSet::from([type_id])));
        assert_eq!(result.matched_leaves(ElementId(3)), Some(&BTreeSet::from([type_id])));
    }

    #[test]
    fn test_and_or_algebra() {
        let classifier = TypeClassifier::new();
        let collection = scenario();
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let a = || FilterRequest::by_element_ids(ids(&[1, 2, 3]));
        let b = || FilterRequest::by_element_ids(ids(&[2, 3, 4]));

        let and = evaluator
            .evaluate_request(&FilterRequest::and(vec![a(), b()]))
            .unwrap();
        assert_eq!(and.ids(), ids(&[2, 3]));
        assert_eq!(and.matched_leaves(ElementId(2)).map(|r| r.len()), Some(2));

        let or = evaluator
            .evaluate_request(&FilterRequest::or(vec![a(), b()]))
            .unwrap();
        assert_eq!(or.ids(), ids(&[1, 2, 3, 4]));
        assert_eq!(or.matched_leaves(ElementId(1)).map(|r| r.len()), Some(1));
        assert_eq!(or.matched_leaves(ElementId(3)).map(|r| r.len()), Some(2));

        let empty_and = evaluator.evaluate_request(&FilterRequest::and(vec![])).unwrap();
        assert!(empty_and.is_empty());
        let empty_or = evaluator.evaluate_request(&FilterRequest::or(vec![])).unwrap();
        assert!(empty_or.is_empty());
    }

    #[test]
    fn test_parameter_tolerance_boundary() {
        let classifier = TypeClassifier::new();
        let collection = ElementCollection::new(vec![
            wall(1).with_parameter("Height", ParameterValue::Double(10.009)),
            wall(2).with_parameter("Height", ParameterValue::Double(10.02)),
            wall(3).with_parameter("Height", ParameterValue::Integer(10)),
            wall(4),
        ])
        .unwrap();
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let request = FilterRequest::parameter("Height", Comparison::Equal, ParameterValue::Double(10.0), 0.01);
        let result = evaluator.evaluate_request(&request).unwrap();
        assert_eq!(result.ids(), ids(&[1, 3]));
    }

    #[test]
    fn test_parameter_kind_mismatch() {
        let text = ParameterValue::text("10");
        let number = ParameterValue::Double(10.0);
        assert!(!parameter_matches(&text, Comparison::Equal, &number, 1.0));
        assert!(!parameter_matches(&number, Comparison::Equal, &text, 1.0));
        assert!(parameter_matches(
            &ParameterValue::Bool(true),
            Comparison::Equal,
            &ParameterValue::Bool(true),
            0.0
        ));
        assert!(parameter_matches(
            &ParameterValue::ElementId(ElementId(4)),
            Comparison::Equal,
            &ParameterValue::ElementId(ElementId(4)),
            0.0
        ));
    }

    #[test]
    fn test_category_and_type_filters() {
        let classifier = TypeClassifier::new();
        let collection = scenario();
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let floors = evaluator
            .evaluate_request(&FilterRequest::by_category("Floors"))
            .unwrap();
        assert_eq!(floors.ids(), ids(&[2, 4, 5]));

        let elements = evaluator
            .evaluate_request(&FilterRequest::by_type(DomainType::BuildingElement))
            .unwrap();
        assert_eq!(elements.ids(), ids(&[1, 2, 3, 4, 5]));

        let levels = evaluator
            .evaluate_request(&FilterRequest::by_type(DomainType::Level))
            .unwrap();
        assert!(levels.is_empty());
    }

    #[test]
    fn test_profile_type_filter() {
        let classifier = TypeClassifier::new();
        let collection = ElementCollection::new(vec![
            HostElement::new(10, "s1", RuntimeType::FamilySymbol)
                .with_category(BuiltInCategory::StructuralColumns)
                .with_family_name("UK_UC-UniversalColumns-Column"),
            HostElement::new(11, "s2", RuntimeType::FamilySymbol)
                .with_category(BuiltInCategory::StructuralFraming)
                .with_shape_code(14),
            HostElement::new(12, "s3", RuntimeType::FamilySymbol)
                .with_category(BuiltInCategory::Doors)
                .with_family_name("M_Single-Flush"),
        ])
        .unwrap();
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let isections = evaluator
            .evaluate_request(&FilterRequest::by_type(DomainType::ISectionProfile))
            .unwrap();
        assert_eq!(isections.ids(), ids(&[10]));

        let profiles = evaluator
            .evaluate_request(&FilterRequest::by_type(DomainType::Profile))
            .unwrap();
        assert_eq!(profiles.ids(), ids(&[10, 11]));
    }

    #[test]
    fn test_identifier_and_selection_filters() {
        let classifier = TypeClassifier::new();
        let collection = scenario().with_selection([ElementId(4), ElementId(99)]);
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let by_uid = evaluator
            .evaluate_request(&FilterRequest::by_unique_ids(["uid-5", "missing"]))
            .unwrap();
        assert_eq!(by_uid.ids(), ids(&[5]));

        let by_id = evaluator
            .evaluate_request(&FilterRequest::by_element_ids(ids(&[3, 42])))
            .unwrap();
        assert_eq!(by_id.ids(), ids(&[3]));

        let selected = evaluator.evaluate_request(&FilterRequest::selection()).unwrap();
        assert_eq!(selected.ids(), ids(&[4]));

        let overridden = QueryEvaluator::new(&classifier, &collection)
            .with_selection([ElementId(1)])
            .evaluate_request(&FilterRequest::selection())
            .unwrap();
        assert_eq!(overridden.ids(), ids(&[1]));

        let disabled = evaluator
            .evaluate_request(&FilterRequest::Selection {
                include_selected: false,
            })
            .unwrap();
        assert!(disabled.is_empty());
    }

    #[test]
    fn test_workset_filter() {
        let classifier = TypeClassifier::new();
        let collection = ElementCollection::new(vec![
            wall(1).with_workset(WorksetId(7)),
            wall(2).with_workset(WorksetId(8)),
        ])
        .unwrap()
        .with_workset(WorksetId(7), "Core");
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let core = evaluator.evaluate_request(&FilterRequest::by_workset("Core")).unwrap();
        assert_eq!(core.ids(), ids(&[1]));
        let missing = evaluator.evaluate_request(&FilterRequest::by_workset("Nope")).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_family_type_filter() {
        let classifier = TypeClassifier::new();
        let collection = ElementCollection::new(vec![
            HostElement::new(20, "t1", RuntimeType::FamilySymbol)
                .with_category(BuiltInCategory::Doors)
                .with_family_name("M_Single-Flush")
                .with_type_name("0915 x 2134mm"),
            HostElement::new(21, "t2", RuntimeType::FamilySymbol)
                .with_category(BuiltInCategory::Doors)
                .with_family_name("M_Single-Flush")
                .with_type_name("0762 x 2032mm"),
            HostElement::new(22, "i1", RuntimeType::FamilyInstance)
                .with_category(BuiltInCategory::Doors)
                .with_type_id(20),
            HostElement::new(23, "i2", RuntimeType::FamilyInstance)
                .with_category(BuiltInCategory::Doors)
                .with_type_id(21),
            HostElement::new(30, "wt", RuntimeType::WallType)
                .with_family_name("Basic Wall")
                .with_type_name("Generic - 200mm"),
            wall(31).with_type_id(30),
            HostElement::new(40, "rt", RuntimeType::RoofType)
                .with_category(BuiltInCategory::Roofs)
                .with_family_name("Basic Roof")
                .with_type_name("Warm Roof - Timber"),
            HostElement::new(41, "r1", RuntimeType::Roof)
                .with_category(BuiltInCategory::Roofs)
                .with_type_id(40),
            HostElement::new(42, "r2", RuntimeType::Roof)
                .with_category(BuiltInCategory::Roofs)
                .with_type_id(99),
        ])
        .unwrap();
        let evaluator = QueryEvaluator::new(&classifier, &collection);

        let family = evaluator
            .evaluate_request(&FilterRequest::by_family("M_Single-Flush", None))
            .unwrap();
        assert_eq!(family.ids(), ids(&[22, 23]));

        let one_type = evaluator
            .evaluate_request(&FilterRequest::by_family(
                "M_Single-Flush",
                Some("0762 x 2032mm".to_string()),
            ))
            .unwrap();
        assert_eq!(one_type.ids(), ids(&[23]));

        let case_insensitive = evaluator
            .evaluate_request(&FilterRequest::FamilyType {
                family_name: "basic wall".to_string(),
                type_name: None,
                case_sensitive: false,
            })
            .unwrap();
        assert_eq!(case_insensitive.ids(), ids(&[31]));

        let roofs = evaluator
            .evaluate_request(&FilterRequest::by_family(
                "Basic Roof",
                Some("Warm Roof - Timber".to_string()),
            ))
            .unwrap();
        assert_eq!(roofs.ids(), ids(&[41]));

        let case_sensitive = evaluator
            .evaluate_request(&FilterRequest::by_family("basic wall", None))
            .unwrap();
        assert!(case_sensitive.is_empty());
    }

    #[test]
    fn test_reproducible_across_runs() {
        let classifier = TypeClassifier::new();
        let collection = scenario();
        let request = FilterRequest::or(vec![
            FilterRequest::by_type(DomainType::BuildingElement),
            FilterRequest::by_category("Walls"),
        ]);
        let query = Query::from_request(&request).unwrap();
        let first = QueryEvaluator::new(&classifier, &collection).evaluate(&query);
        let second = QueryEvaluator::new(&classifier, &collection).evaluate(&query);
        assert_eq!(first, second);
        assert_eq!(first.ids(), ids(&[1, 2, 3, 4, 5]));
    }
}
