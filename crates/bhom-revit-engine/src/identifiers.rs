// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host identifiers on domain objects
//!
//! Converted objects carry the host ids in reserved custom-data keys so a
//! later pull or push can find the element they came from.

use bhom_revit_model::{
    DomainObject, ElementCollector, ElementId, HostElement, PushSettings, ADAPTER_ID_KEY,
    ELEMENT_ID_KEY,
};

/// Write the host ids of `element` into the reserved keys
pub fn stamp_identifiers(object: &mut DomainObject, element: &HostElement) {
    object.custom_data.insert(
        ADAPTER_ID_KEY.to_string(),
        serde_json::Value::from(element.unique_id.clone()),
    );
    object
        .custom_data
        .insert(ELEMENT_ID_KEY.to_string(), serde_json::Value::from(element.id.0));
}

/// Copy host parameters into the custom-data bag
///
/// Keys already present (set by the converter, or reserved) are kept.
pub fn copy_custom_data(object: &mut DomainObject, element: &HostElement) {
    for parameter in &element.parameters {
        if is_reserved(&parameter.name) {
            continue;
        }
        object
            .custom_data
            .entry(parameter.name.clone())
            .or_insert_with(|| parameter.value.to_json());
    }
}

/// Check if a key is reserved for host identifiers
pub fn is_reserved(key: &str) -> bool {
    key == ADAPTER_ID_KEY || key == ELEMENT_ID_KEY
}

/// Host unique id stored on an object
pub fn unique_id(object: &DomainObject) -> Option<&str> {
    object.custom_data.get(ADAPTER_ID_KEY)?.as_str()
}

/// Host integer id stored on an object
///
/// The host's invalid-id sentinel reads back as `None`.
pub fn element_id(object: &DomainObject) -> Option<ElementId> {
    object
        .custom_data
        .get(ELEMENT_ID_KEY)?
        .as_i64()
        .and_then(|id| i32::try_from(id).ok())
        .map(ElementId)
        .filter(ElementId::is_valid)
}

/// Where a pushed object lands in the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushTarget {
    /// Overwrite an existing element
    Replace(ElementId),
    /// Create a new element
    Create,
}

/// Decide whether a pushed object replaces an element or creates one
///
/// The unique id is authoritative; integer ids are not stable across
/// sessions and are ignored here.
pub fn push_target(
    object: &DomainObject,
    collector: &dyn ElementCollector,
    settings: &PushSettings,
) -> PushTarget {
    if !settings.replace {
        return PushTarget::Create;
    }
    unique_id(object)
        .and_then(|uid| collector.get_by_unique_id(uid))
        .map(|element| PushTarget::Replace(element.id))
        .unwrap_or(PushTarget::Create)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ElementCollection;
    use approx::assert_relative_eq;
    use bhom_revit_model::{DomainType, ParameterValue, RuntimeType};

    fn level() -> HostElement {
        HostElement::new(311, "5a1f-0137", RuntimeType::Level)
            .with_parameter("Elevation", ParameterValue::Double(3.2))
            .with_parameter("Name", ParameterValue::text("Level 2"))
            .with_parameter(ADAPTER_ID_KEY, ParameterValue::text("spoofed"))
    }

    #[test]
    fn test_stamp_and_read_back() {
        let mut object = DomainObject::new(DomainType::Level, "Level 2");
        stamp_identifiers(&mut object, &level());

        assert_eq!(unique_id(&object), Some("5a1f-0137"));
        assert_eq!(element_id(&object), Some(ElementId(311)));

        let detached = DomainObject::new(DomainType::Level, "Detached")
            .with_custom_data(ELEMENT_ID_KEY, serde_json::json!(-1));
        assert_eq!(element_id(&detached), None);
    }

    #[test]
    fn test_copy_keeps_existing_keys() {
        let mut object = DomainObject::new(DomainType::Level, "Level 2")
            .with_custom_data("Name", serde_json::json!("From converter"));
        stamp_identifiers(&mut object, &level());
        copy_custom_data(&mut object, &level());

        assert_eq!(object.custom_data["Name"], serde_json::json!("From converter"));
        assert_relative_eq!(
            object.custom_data["Elevation"].as_f64().unwrap_or_default(),
            3.2
        );
        assert_eq!(unique_id(&object), Some("5a1f-0137"));
    }

    #[test]
    fn test_push_target() {
        let collection = ElementCollection::new(vec![level()]).unwrap();
        let mut object = DomainObject::new(DomainType::Level, "Level 2");
        assert_eq!(
            push_target(&object, &collection, &PushSettings::default()),
            PushTarget::Create
        );

        stamp_identifiers(&mut object, &level());
        assert_eq!(
            push_target(&object, &collection, &PushSettings::default()),
            PushTarget::Replace(ElementId(311))
        );
        assert_eq!(
            push_target(&object, &collection, &PushSettings::default().with_replace(false)),
            PushTarget::Create
        );

        let stale = DomainObject::new(DomainType::Level, "Gone")
            .with_custom_data(ADAPTER_ID_KEY, serde_json::json!("deleted-uid"));
        assert_eq!(
            push_target(&stale, &collection, &PushSettings::default()),
            PushTarget::Create
        );
    }
}
