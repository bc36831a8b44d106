// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion Dispatcher - Routes host elements to per-type converters
//!
//! For each element the dispatcher:
//!
//! 1. builds the reference key (category scope + integer id)
//! 2. returns the cached list if the key is already resolved
//! 3. classifies the element and narrows mixed-use candidates by discipline
//! 4. runs the registered converter for every candidate type
//! 5. stamps host ids (and parameters, if enabled) onto the new objects
//! 6. caches the list, unless some converter failed
//!
//! Failures never abort a batch. They become session warnings, and the key
//! stays unresolved so a later call retries it.

use crate::cache::{ReferenceKey, ReferenceObjectCache};
use crate::identifiers::{copy_custom_data, stamp_identifiers};
use crate::session::Session;
use bhom_revit_model::{
    AdapterError, Discipline, DomainObject, DomainType, ElementCollector, HostElement,
    PullSettings, Result,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only view of the session handed to converters
pub struct ConversionContext<'s> {
    collector: &'s dyn ElementCollector,
    cache: &'s ReferenceObjectCache,
    settings: &'s PullSettings,
    discipline: Discipline,
}

impl<'s> ConversionContext<'s> {
    fn new(session: &'s Session<'_>) -> Self {
        Self {
            collector: session.collector(),
            cache: session.cache(),
            settings: session.pull_settings(),
            discipline: session.discipline(),
        }
    }

    /// Host element enumeration
    pub fn collector(&self) -> &'s dyn ElementCollector {
        self.collector
    }

    /// Look up an already converted object (e.g. a referenced type or level)
    pub fn find(&self, key: &ReferenceKey, domain_type: DomainType) -> Option<Arc<DomainObject>> {
        self.cache.find(key, domain_type)
    }

    /// Pull settings of the session
    pub fn settings(&self) -> &'s PullSettings {
        self.settings
    }

    /// Discipline of the session, after any session override
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }
}

/// Per-type conversion capability
///
/// Each converter turns host elements into objects of one or more domain
/// types. Field mapping lives entirely in the converter; the dispatcher only
/// routes, caches and tags.
pub trait ElementConverter {
    /// Convert an element into objects of `domain_type`
    ///
    /// # Arguments
    /// * `element` - Host element snapshot
    /// * `domain_type` - Target type chosen by the classifier
    /// * `context` - Session view for cross-reference lookups
    ///
    /// # Returns
    /// The produced objects, or an error if the element cannot be converted
    fn convert(
        &self,
        element: &HostElement,
        domain_type: DomainType,
        context: &ConversionContext<'_>,
    ) -> Result<Vec<DomainObject>>;

    /// Domain types this converter produces
    fn supported_types(&self) -> Vec<DomainType>;
}

/// Conversion dispatcher
pub struct ConversionDispatcher {
    /// Registered converters by domain type
    converters: HashMap<DomainType, Arc<dyn ElementConverter>>,
}

impl ConversionDispatcher {
    /// Create a dispatcher without converters
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter for all of its supported types
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register(&mut self, converter: Arc<dyn ElementConverter>) {
        for domain_type in converter.supported_types() {
            self.converters.insert(domain_type, Arc::clone(&converter));
        }
    }

    /// Check if a type has a registered converter
    pub fn has_converter(&self, domain_type: DomainType) -> bool {
        self.converters.contains_key(&domain_type)
    }

    /// Candidate types of an element after discipline resolution
    ///
    /// Single candidates are kept as they are. Mixed-use elements keep the
    /// candidates of the session discipline, or all of them if none apply.
    pub fn resolve_types(&self, session: &Session<'_>, element: &HostElement) -> Vec<DomainType> {
        let candidates = session.classifier().classify(element);
        if candidates.len() <= 1 {
            return candidates;
        }

        let discipline = session.discipline();
        let narrowed: Vec<DomainType> = candidates
            .iter()
            .copied()
            .filter(|t| t.applies_to(discipline))
            .collect();
        if narrowed.is_empty() {
            log::debug!(
                "No candidate of element {} applies to {}, keeping {:?}",
                element.id,
                discipline,
                candidates
            );
            candidates
        } else {
            log::debug!("Element {} resolved to {:?} for {}", element.id, narrowed, discipline);
            narrowed
        }
    }

    /// Convert one element
    ///
    /// # Returns
    /// The objects for the element; the cached list when the element was
    /// already converted in this session
    pub fn convert(&self, session: &mut Session<'_>, element: &HostElement) -> Vec<Arc<DomainObject>> {
        let key = ReferenceKey::for_element(element);
        if let Some(cached) = session.cache().get(&key) {
            log::debug!("Cache hit for {}", key);
            return cached.to_vec();
        }
        log::debug!("Cache miss for {}", key);

        let domain_types = self.resolve_types(session, element);
        if domain_types.is_empty() {
            log::debug!(
                "Element {} ({}) has no domain mapping, skipping",
                element.id,
                element.runtime_type
            );
            session.record_unclassified();
            session.cache_mut().store_all(key, Vec::new());
            return Vec::new();
        }

        let mut produced = Vec::new();
        let mut failures = Vec::new();
        {
            let context = ConversionContext::new(session);
            for domain_type in domain_types {
                match self.convert_as(element, domain_type, &context) {
                    Ok(objects) => produced.extend(objects),
                    Err(error) => failures.push(error),
                }
            }
        }

        let copy = session.pull_settings().copy_custom_data;
        let produced: Vec<Arc<DomainObject>> = produced
            .into_iter()
            .map(|mut object| {
                stamp_identifiers(&mut object, element);
                if copy {
                    copy_custom_data(&mut object, element);
                }
                Arc::new(object)
            })
            .collect();

        if failures.is_empty() {
            session
                .cache_mut()
                .store_all(key, produced.iter().map(Arc::clone));
        } else {
            for error in failures {
                session.warn(error.to_string());
            }
            log::debug!("Not caching {} after failed conversion", key);
        }

        produced
    }

    fn convert_as(
        &self,
        element: &HostElement,
        domain_type: DomainType,
        context: &ConversionContext<'_>,
    ) -> Result<Vec<DomainObject>> {
        let converter = self.converters.get(&domain_type).ok_or_else(|| {
            AdapterError::conversion(
                element.id,
                domain_type,
                AdapterError::MissingConverter(domain_type).to_string(),
            )
        })?;
        converter
            .convert(element, domain_type, context)
            .map_err(|error| match error {
                AdapterError::Conversion { .. } => error,
                other => AdapterError::conversion(element.id, domain_type, other.to_string()),
            })
    }
}

impl Default for ConversionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassificationRule, TypeClassifier};
    use crate::collection::ElementCollection;
    use bhom_revit_model::{
        BuiltInCategory, ElementId, ParameterValue, RuntimeType, ADAPTER_ID_KEY, ELEMENT_ID_KEY,
    };
    use std::cell::Cell;

    /// Converter stub counting its invocations
    struct CountingConverter {
        types: Vec<DomainType>,
        calls: Cell<usize>,
        fail: Cell<bool>,
    }

    impl CountingConverter {
        fn new(types: Vec<DomainType>) -> Arc<Self> {
            Arc::new(Self {
                types,
                calls: Cell::new(0),
                fail: Cell::new(false),
            })
        }
    }

    impl ElementConverter for CountingConverter {
        fn convert(
            &self,
            element: &HostElement,
            domain_type: DomainType,
            _context: &ConversionContext<'_>,
        ) -> Result<Vec<DomainObject>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(AdapterError::other("geometry could not be read"));
            }
            Ok(vec![DomainObject::new(domain_type, format!("Element {}", element.id))
                .with_custom_data("Mark", serde_json::json!("from converter"))])
        }

        fn supported_types(&self) -> Vec<DomainType> {
            self.types.clone()
        }
    }

    fn wall(id: i32) -> HostElement {
        HostElement::new(id, format!("uid-{}", id), RuntimeType::Wall)
            .with_category(BuiltInCategory::Walls)
            .with_parameter("Mark", ParameterValue::text("W1"))
            .with_parameter("Height", ParameterValue::Double(3.0))
    }

    fn dispatcher_with(converter: &Arc<CountingConverter>) -> ConversionDispatcher {
        let mut dispatcher = ConversionDispatcher::new();
        dispatcher.register(Arc::clone(converter) as Arc<dyn ElementConverter>);
        dispatcher
    }

    #[test]
    fn test_at_most_one_conversion() {
        let collection = ElementCollection::new(vec![wall(1)]).unwrap();
        let converter = CountingConverter::new(vec![DomainType::BuildingElement]);
        let dispatcher = dispatcher_with(&converter);
        let mut session = Session::new(&collection);

        let element = wall(1);
        let first = dispatcher.convert(&mut session, &element);
        let second = dispatcher.convert(&mut session, &element);
        let third = dispatcher.convert(&mut session, &element);

        assert_eq!(converter.calls.get(), 1);
        assert_eq!(first.len(), 1);
        for later in [&second, &third] {
            assert_eq!(later.len(), first.len());
            for (a, b) in first.iter().zip(later.iter()) {
                assert!(Arc::ptr_eq(a, b));
            }
        }
    }

    #[test]
    fn test_discipline_resolution() {
        let collection = ElementCollection::new(vec![wall(1)]).unwrap();
        let converter =
            CountingConverter::new(vec![DomainType::BuildingElement, DomainType::PanelPlanar]);
        let dispatcher = dispatcher_with(&converter);

        let session = Session::new(&collection);
        assert_eq!(
            dispatcher.resolve_types(&session, &wall(1)),
            vec![DomainType::BuildingElement]
        );

        let session = Session::new(&collection)
            .with_pull_settings(PullSettings::default().with_discipline(Discipline::Structural));
        assert_eq!(
            dispatcher.resolve_types(&session, &wall(1)),
            vec![DomainType::PanelPlanar]
        );

        // Single candidates are never filtered out
        let duct = HostElement::new(5, "duct-5", RuntimeType::Duct);
        assert_eq!(dispatcher.resolve_types(&session, &duct), vec![DomainType::Duct]);

        let session = Session::new(&collection)
            .with_pull_settings(PullSettings::default().with_discipline(Discipline::Structural))
            .with_discipline(Discipline::Architecture);
        assert_eq!(
            dispatcher.resolve_types(&session, &wall(1)),
            vec![DomainType::BuildingElement]
        );
    }

    /// Walls resolve to two environmental-only types
    const MIXED_RULES: &[ClassificationRule] = &[ClassificationRule {
        name: "mixed_wall",
        runtime_types: &[RuntimeType::Wall],
        categories: None,
        result: &[DomainType::Space, DomainType::Duct],
    }];

    fn mixed_session(collection: &ElementCollection, discipline: Discipline) -> Session<'_> {
        Session::new(collection)
            .with_classifier(TypeClassifier::with_tables(MIXED_RULES, &[]))
            .with_discipline(discipline)
    }

    #[test]
    fn test_discipline_without_match_keeps_all() {
        let collection = ElementCollection::new(vec![wall(1)]).unwrap();
        let dispatcher = ConversionDispatcher::new();

        let session = mixed_session(&collection, Discipline::Structural);
        assert_eq!(
            dispatcher.resolve_types(&session, &wall(1)),
            vec![DomainType::Space, DomainType::Duct]
        );
    }

    #[test]
    fn test_partial_failure_returns_successes() {
        let collection = ElementCollection::new(vec![wall(1)]).unwrap();
        let spaces = CountingConverter::new(vec![DomainType::Space]);
        let ducts = CountingConverter::new(vec![DomainType::Duct]);
        ducts.fail.set(true);
        let mut dispatcher = dispatcher_with(&spaces);
        dispatcher.register(Arc::clone(&ducts) as Arc<dyn ElementConverter>);
        let mut session = mixed_session(&collection, Discipline::Structural);
        let key = ReferenceKey::for_element(&wall(1));

        let first = dispatcher.convert(&mut session, &wall(1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].domain_type, DomainType::Space);
        assert_eq!(first[0].custom_data[ADAPTER_ID_KEY], serde_json::json!("uid-1"));
        assert_eq!(session.warnings().len(), 1);
        assert!(session.warnings()[0].contains("Duct"));
        assert!(!session.cache().contains(&key));

        ducts.fail.set(false);
        let second = dispatcher.convert(&mut session, &wall(1));
        let types: Vec<DomainType> = second.iter().map(|o| o.domain_type).collect();
        assert_eq!(types, vec![DomainType::Space, DomainType::Duct]);
        assert_eq!(spaces.calls.get(), 2);
        assert_eq!(ducts.calls.get(), 2);
        assert_eq!(session.cache().get(&key).map(|l| l.len()), Some(2));
        assert_eq!(session.warnings().len(), 1);
    }

    #[test]
    fn test_identifiers_and_custom_data() {
        let collection = ElementCollection::new(vec![wall(7)]).unwrap();
        let converter = CountingConverter::new(vec![DomainType::BuildingElement]);
        let dispatcher = dispatcher_with(&converter);

        let mut session = Session::new(&collection);
        let objects = dispatcher.convert(&mut session, &wall(7));
        let object = &objects[0];
        assert_eq!(object.custom_data[ADAPTER_ID_KEY], serde_json::json!("uid-7"));
        assert_eq!(object.custom_data[ELEMENT_ID_KEY], serde_json::json!(7));
        assert_eq!(object.custom_data["Mark"], serde_json::json!("from converter"));
        assert_eq!(object.custom_data["Height"], serde_json::json!(3.0));

        let mut session = Session::new(&collection)
            .with_pull_settings(PullSettings::default().with_copy_custom_data(false));
        let objects = dispatcher.convert(&mut session, &wall(7));
        assert!(!objects[0].custom_data.contains_key("Height"));
        assert!(objects[0].custom_data.contains_key(ADAPTER_ID_KEY));
    }

    #[test]
    fn test_failure_is_not_cached() {
        let collection = ElementCollection::new(vec![wall(1)]).unwrap();
        let converter = CountingConverter::new(vec![DomainType::BuildingElement]);
        converter.fail.set(true);
        let dispatcher = dispatcher_with(&converter);
        let mut session = Session::new(&collection);

        assert!(dispatcher.convert(&mut session, &wall(1)).is_empty());
        assert_eq!(session.warnings().len(), 1);
        assert!(session.warnings()[0].contains("geometry could not be read"));
        assert!(!session.cache().contains(&ReferenceKey::for_element(&wall(1))));

        // Retried on the next call
        converter.fail.set(false);
        assert_eq!(dispatcher.convert(&mut session, &wall(1)).len(), 1);
        assert_eq!(converter.calls.get(), 2);
        assert!(session.cache().contains(&ReferenceKey::for_element(&wall(1))));
    }

    #[test]
    fn test_missing_converter_warns() {
        let collection = ElementCollection::new(vec![]).unwrap();
        let dispatcher = ConversionDispatcher::new();
        let mut session = Session::new(&collection);
        let level = HostElement::new(3, "lvl-3", RuntimeType::Level).with_category(BuiltInCategory::Levels);

        assert!(dispatcher.convert(&mut session, &level).is_empty());
        assert_eq!(session.warnings().len(), 1);
        assert!(session.warnings()[0].contains("Level"));
        assert!(session.cache().is_empty());
    }

    #[test]
    fn test_unclassified_is_skipped() {
        let collection = ElementCollection::new(vec![]).unwrap();
        let converter = CountingConverter::new(DomainType::ALL.to_vec());
        let dispatcher = dispatcher_with(&converter);
        let mut session = Session::new(&collection);
        let room = HostElement::new(ElementId(4), "room", RuntimeType::Room);

        assert!(dispatcher.convert(&mut session, &room).is_empty());
        assert!(dispatcher.convert(&mut session, &room).is_empty());
        assert_eq!(converter.calls.get(), 0);
        assert_eq!(session.unclassified_count(), 1);
        assert!(session.warnings().is_empty());
    }

    #[test]
    fn test_context_finds_converted_objects() {
        struct ReferencingConverter;

        impl ElementConverter for ReferencingConverter {
            fn convert(
                &self,
                element: &HostElement,
                domain_type: DomainType,
                context: &ConversionContext<'_>,
            ) -> Result<Vec<DomainObject>> {
                if domain_type == DomainType::BuildingElementProperties {
                    let name = element.type_name.clone().unwrap_or_default();
                    return Ok(vec![DomainObject::new(domain_type, name)]);
                }
                let type_key = ReferenceKey::new(
                    crate::cache::ReferenceScope::Category(BuiltInCategory::Walls),
                    element.type_id.unwrap_or(ElementId::INVALID),
                );
                let property = context
                    .find(&type_key, DomainType::BuildingElementProperties)
                    .ok_or_else(|| AdapterError::other("wall type not converted yet"))?;
                Ok(vec![DomainObject::new(domain_type, property.name.clone())])
            }

            fn supported_types(&self) -> Vec<DomainType> {
                vec![DomainType::BuildingElement, DomainType::BuildingElementProperties]
            }
        }

        let wall_type = HostElement::new(100, "wt", RuntimeType::WallType)
            .with_category(BuiltInCategory::Walls)
            .with_type_name("Generic - 200mm");
        let instance = wall(1).with_type_id(100);
        let collection = ElementCollection::new(vec![wall_type.clone(), instance.clone()]).unwrap();
        let mut dispatcher = ConversionDispatcher::new();
        dispatcher.register(Arc::new(ReferencingConverter));
        let mut session = Session::new(&collection);

        // Wall type only resolves to properties in the environmental discipline
        let properties = dispatcher.convert(&mut session, &wall_type);
        assert_eq!(properties.len(), 1);
        let walls = dispatcher.convert(&mut session, &instance);
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].name, "Generic - 200mm");
    }
}
