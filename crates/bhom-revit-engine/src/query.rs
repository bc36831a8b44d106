// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated query trees
//!
//! A [`Query`] is the evaluable form of a [`FilterRequest`]. Trees can only
//! be assembled through [`QueryBuilder`], which validates every criterion and
//! checks the tree shape when it is finished, so the evaluator never sees a
//! malformed node.

use bhom_revit_model::{
    AdapterError, BuiltInCategory, Comparison, DomainType, ElementId, FilterRequest,
    LogicalOperator, ParameterValue, Result,
};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_BUILDER: AtomicUsize = AtomicUsize::new(0);

/// Identity of a leaf within one query
///
/// Carries the identity of the builder that issued it, so a leaf cannot be
/// grafted into another builder's tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LeafId {
    builder: usize,
    index: usize,
}

impl LeafId {
    /// Position of the leaf in build order
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Leaf predicate
#[derive(Clone, Debug, PartialEq)]
pub enum Criterion {
    /// Elements classifying to a domain type
    Type(DomainType),
    /// Elements in a category
    Category(BuiltInCategory),
    /// Elements on a named workset
    Workset(String),
    /// Named parameter comparison
    Parameter {
        name: String,
        comparison: Comparison,
        value: ParameterValue,
        tolerance: f64,
    },
    /// Membership in an integer id set
    ElementIds(FxHashSet<ElementId>),
    /// Membership in a unique id set
    UniqueIds(FxHashSet<String>),
    /// Membership in the current UI selection (`false` matches nothing)
    Selection(bool),
    /// Instances of a family, optionally narrowed to one type name
    FamilyType {
        family_name: String,
        type_name: Option<String>,
        case_sensitive: bool,
    },
}

impl Criterion {
    /// Create a parameter criterion
    pub fn parameter(
        name: impl Into<String>,
        comparison: Comparison,
        value: ParameterValue,
        tolerance: f64,
    ) -> Self {
        Criterion::Parameter {
            name: name.into(),
            comparison,
            value,
            tolerance,
        }
    }

    /// Create an integer id criterion
    pub fn element_ids(ids: impl IntoIterator<Item = ElementId>) -> Self {
        Criterion::ElementIds(ids.into_iter().collect())
    }

    /// Create a unique id criterion
    pub fn unique_ids<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Criterion::UniqueIds(ids.into_iter().map(Into::into).collect())
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Criterion::Type(_) => "type",
            Criterion::Category(_) => "category",
            Criterion::Workset(_) => "workset",
            Criterion::Parameter { .. } => "parameter",
            Criterion::ElementIds(_) => "element_ids",
            Criterion::UniqueIds(_) => "unique_ids",
            Criterion::Selection(_) => "selection",
            Criterion::FamilyType { .. } => "family_type",
        }
    }

    /// Check the criterion can be evaluated
    pub fn validate(&self) -> Result<()> {
        match self {
            Criterion::Workset(name) if name.trim().is_empty() => {
                Err(AdapterError::malformed("workset request without a workset name"))
            }
            Criterion::FamilyType { family_name, .. } if family_name.trim().is_empty() => {
                Err(AdapterError::malformed("family request without a family name"))
            }
            Criterion::Parameter {
                name,
                comparison,
                value,
                tolerance,
            } => {
                if name.trim().is_empty() {
                    return Err(AdapterError::malformed("parameter request without a parameter name"));
                }
                if !tolerance.is_finite() || *tolerance < 0.0 {
                    return Err(AdapterError::InvalidTolerance {
                        parameter: name.clone(),
                        tolerance: *tolerance,
                    });
                }
                match value {
                    ParameterValue::Double(v) if !v.is_finite() => {
                        Err(AdapterError::invalid_value(name, "value is not a finite number"))
                    }
                    ParameterValue::Bool(_) | ParameterValue::ElementId(_)
                        if *comparison != Comparison::Equal =>
                    {
                        Err(AdapterError::invalid_value(
                            name,
                            format!("'{}' is not defined for {}", comparison, value),
                        ))
                    }
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Convert a leaf request into a criterion
    fn from_request(request: &FilterRequest) -> Result<Self> {
        let criterion = match request {
            FilterRequest::Type { domain_type } => Criterion::Type(*domain_type),
            FilterRequest::Category { category_name } => Criterion::Category(
                BuiltInCategory::parse(category_name)
                    .ok_or_else(|| AdapterError::UnknownCategory(category_name.clone()))?,
            ),
            FilterRequest::Workset { workset_name } => Criterion::Workset(workset_name.clone()),
            FilterRequest::Parameter {
                parameter_name,
                comparison,
                value,
                tolerance,
            } => Criterion::parameter(parameter_name.clone(), *comparison, value.clone(), *tolerance),
            FilterRequest::ElementIds { element_ids } => {
                Criterion::element_ids(element_ids.iter().copied())
            }
            FilterRequest::UniqueIds { unique_ids } => Criterion::unique_ids(unique_ids.iter().cloned()),
            FilterRequest::Selection { include_selected } => Criterion::Selection(*include_selected),
            FilterRequest::FamilyType {
                family_name,
                type_name,
                case_sensitive,
            } => Criterion::FamilyType {
                family_name: family_name.clone(),
                type_name: type_name.clone(),
                case_sensitive: *case_sensitive,
            },
            FilterRequest::LogicalAnd { .. } | FilterRequest::LogicalOr { .. } => {
                return Err(AdapterError::malformed("logical request used as a leaf"))
            }
        };
        Ok(criterion)
    }
}

/// Node of a query tree
#[derive(Clone, Debug, PartialEq)]
pub enum QueryNode {
    Leaf(LeafId),
    Composite {
        operator: LogicalOperator,
        children: Vec<QueryNode>,
    },
}

impl QueryNode {
    fn collect_leaves(&self, out: &mut Vec<LeafId>) {
        match self {
            QueryNode::Leaf(id) => out.push(*id),
            QueryNode::Composite { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Depth of the subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            QueryNode::Leaf(_) => 1,
            QueryNode::Composite { children, .. } => {
                1 + children.iter().map(QueryNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Assembles and validates query trees
///
/// # Example
///
/// ```ignore
/// let mut builder = QueryBuilder::new();
/// let walls = builder.leaf(Criterion::Type(DomainType::PanelPlanar))?;
/// let marked = builder.leaf(Criterion::parameter("Mark", Comparison::Equal, ParameterValue::text("A1"), 0.0))?;
/// let root = builder.or(vec![walls, marked]);
/// let query = builder.build(root)?;
/// ```
pub struct QueryBuilder {
    id: usize,
    leaves: Vec<Criterion>,
}

impl QueryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            id: NEXT_BUILDER.fetch_add(1, Ordering::Relaxed),
            leaves: Vec::new(),
        }
    }

    /// Register a validated leaf
    pub fn leaf(&mut self, criterion: Criterion) -> Result<QueryNode> {
        criterion.validate()?;
        let id = LeafId {
            builder: self.id,
            index: self.leaves.len(),
        };
        self.leaves.push(criterion);
        Ok(QueryNode::Leaf(id))
    }

    /// Combine nodes with AND
    pub fn and(&mut self, children: Vec<QueryNode>) -> QueryNode {
        QueryNode::Composite {
            operator: LogicalOperator::And,
            children,
        }
    }

    /// Combine nodes with OR
    pub fn or(&mut self, children: Vec<QueryNode>) -> QueryNode {
        QueryNode::Composite {
            operator: LogicalOperator::Or,
            children,
        }
    }

    /// Finish the tree
    ///
    /// Every registered leaf must appear in `root` exactly once.
    pub fn build(self, root: QueryNode) -> Result<Query> {
        let mut used = Vec::new();
        root.collect_leaves(&mut used);

        let mut seen = vec![false; self.leaves.len()];
        for id in &used {
            if id.builder != self.id {
                return Err(AdapterError::malformed(format!(
                    "leaf {} does not belong to this query",
                    id
                )));
            }
            match seen.get_mut(id.index) {
                None => {
                    return Err(AdapterError::malformed(format!(
                        "leaf {} does not belong to this query",
                        id
                    )))
                }
                Some(true) => {
                    return Err(AdapterError::malformed(format!("leaf {} used twice", id)))
                }
                Some(flag) => *flag = true,
            }
        }
        if let Some(unused) = seen.iter().position(|flag| !flag) {
            return Err(AdapterError::malformed(format!(
                "leaf #{} is not part of the tree",
                unused
            )));
        }

        Ok(Query {
            id: self.id,
            root,
            leaves: self.leaves,
        })
    }

    fn add_request(&mut self, request: &FilterRequest) -> Result<QueryNode> {
        match request {
            FilterRequest::LogicalAnd { requests } => {
                let children = self.add_requests(requests)?;
                Ok(self.and(children))
            }
            FilterRequest::LogicalOr { requests } => {
                let children = self.add_requests(requests)?;
                Ok(self.or(children))
            }
            leaf => {
                let criterion = Criterion::from_request(leaf)?;
                self.leaf(criterion)
            }
        }
    }

    fn add_requests(&mut self, requests: &[FilterRequest]) -> Result<Vec<QueryNode>> {
        requests.iter().map(|r| self.add_request(r)).collect()
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated, evaluable query
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    id: usize,
    root: QueryNode,
    leaves: Vec<Criterion>,
}

impl Query {
    /// Validate a filter request into a query
    pub fn from_request(request: &FilterRequest) -> Result<Self> {
        let mut builder = QueryBuilder::new();
        let root = builder.add_request(request)?;
        builder.build(root)
    }

    /// Parse and validate a JSON filter request
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_request(&FilterRequest::from_json(json)?)
    }

    /// Single-leaf query
    pub fn single(criterion: Criterion) -> Result<Self> {
        let mut builder = QueryBuilder::new();
        let root = builder.leaf(criterion)?;
        builder.build(root)
    }

    /// Root node
    pub fn root(&self) -> &QueryNode {
        &self.root
    }

    /// Criterion of a leaf
    pub fn criterion(&self, id: LeafId) -> Option<&Criterion> {
        if id.builder != self.id {
            return None;
        }
        self.leaves.get(id.index)
    }

    /// Leaves in build order
    pub fn leaves(&self) -> impl Iterator<Item = (LeafId, &Criterion)> {
        let builder = self.id;
        self.leaves
            .iter()
            .enumerate()
            .map(move |(index, c)| (LeafId { builder, index }, c))
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request() {
        let request = FilterRequest::or(vec![
            FilterRequest::by_type(DomainType::PanelPlanar),
            FilterRequest::and(vec![
                FilterRequest::by_category("Floors"),
                FilterRequest::parameter("Mark", Comparison::Equal, ParameterValue::text("A1"), 0.0),
            ]),
        ]);
        let query = Query::from_request(&request).unwrap();

        assert_eq!(query.leaf_count(), 3);
        assert_eq!(query.root().depth(), 3);
        let kinds: Vec<_> = query.leaves().map(|(_, c)| c.kind()).collect();
        assert_eq!(kinds, vec!["type", "category", "parameter"]);
        let (second, _) = query.leaves().nth(1).unwrap();
        assert_eq!(second.index(), 1);
        assert_eq!(
            query.criterion(second),
            Some(&Criterion::Category(BuiltInCategory::Floors))
        );
    }

    #[test]
    fn test_unknown_category_rejected() {
        let request = FilterRequest::and(vec![FilterRequest::by_category("Furniture")]);
        assert!(matches!(
            Query::from_request(&request),
            Err(AdapterError::UnknownCategory(name)) if name == "Furniture"
        ));
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let negative = Criterion::parameter("Length", Comparison::Equal, ParameterValue::Double(1.0), -0.1);
        assert!(matches!(
            Query::single(negative),
            Err(AdapterError::InvalidTolerance { .. })
        ));

        let nan = Criterion::parameter("Length", Comparison::Equal, ParameterValue::Double(1.0), f64::NAN);
        assert!(Query::single(nan).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let ordered_bool = Criterion::parameter("Structural", Comparison::Greater, ParameterValue::Bool(true), 0.0);
        assert!(matches!(
            Query::single(ordered_bool),
            Err(AdapterError::InvalidValue { .. })
        ));

        let infinite = Criterion::parameter("Area", Comparison::Less, ParameterValue::Double(f64::INFINITY), 0.0);
        assert!(Query::single(infinite).is_err());

        let unnamed = Criterion::parameter(" ", Comparison::Equal, ParameterValue::Integer(1), 0.0);
        assert!(matches!(
            Query::single(unnamed),
            Err(AdapterError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_foreign_leaf_rejected() {
        let mut other = QueryBuilder::new();
        let _ = other.leaf(Criterion::Selection(true)).unwrap();
        let foreign = other.leaf(Criterion::Selection(true)).unwrap();

        let builder = QueryBuilder::new();
        assert!(matches!(
            builder.build(foreign),
            Err(AdapterError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_foreign_leaf_in_range_rejected() {
        let mut other = QueryBuilder::new();
        let foreign = other.leaf(Criterion::Type(DomainType::Grid)).unwrap();

        let mut builder = QueryBuilder::new();
        let _own = builder.leaf(Criterion::Type(DomainType::Level)).unwrap();
        assert!(matches!(
            builder.build(foreign),
            Err(AdapterError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_criterion_of_other_query_is_absent() {
        let grids = Query::single(Criterion::Type(DomainType::Grid)).unwrap();
        let levels = Query::single(Criterion::Type(DomainType::Level)).unwrap();
        let (grid_leaf, _) = grids.leaves().next().unwrap();

        assert_eq!(grids.criterion(grid_leaf), Some(&Criterion::Type(DomainType::Grid)));
        assert_eq!(levels.criterion(grid_leaf), None);
    }

    #[test]
    fn test_shared_and_orphan_leaves_rejected() {
        let mut builder = QueryBuilder::new();
        let leaf = builder.leaf(Criterion::Type(DomainType::Level)).unwrap();
        let root = builder.and(vec![leaf.clone(), leaf]);
        assert!(builder.build(root).is_err());

        let mut builder = QueryBuilder::new();
        let kept = builder.leaf(Criterion::Type(DomainType::Level)).unwrap();
        let _orphan = builder.leaf(Criterion::Type(DomainType::Grid)).unwrap();
        assert!(builder.build(kept).is_err());
    }

    #[test]
    fn test_empty_composite_is_valid() {
        let query = Query::from_request(&FilterRequest::and(Vec::new())).unwrap();
        assert_eq!(query.leaf_count(), 0);
        assert_eq!(
            query.root(),
            &QueryNode::Composite {
                operator: LogicalOperator::And,
                children: Vec::new()
            }
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{ "request": "logical_and", "requests": [
            { "request": "category", "category_name": "OST_Walls" },
            { "request": "element_ids", "element_ids": [1, 2, 2] }
        ] }"#;
        let query = Query::from_json(json).unwrap();
        assert_eq!(query.leaf_count(), 2);
        let (second, _) = query.leaves().nth(1).unwrap();
        match query.criterion(second) {
            Some(Criterion::ElementIds(ids)) => assert_eq!(ids.len(), 2),
            other => panic!("unexpected criterion {:?}", other),
        }
        assert!(Query::from_json("{ \"request\": \"category\" }").is_err());
    }
}
