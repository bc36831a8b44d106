// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference object cache
//!
//! Per-session store of the domain objects already produced for a host
//! element. The cache is passive: it never converts anything, and keeping
//! conversions to at most one per key is the dispatcher's job.

use bhom_revit_model::{BuiltInCategory, DomainObject, DomainType, ElementId, HostElement};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Discriminator keeping ids of different element kinds apart
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ReferenceScope {
    /// Elements of one built-in category
    Category(BuiltInCategory),
    /// Elements without a known category
    Uncategorized,
}

impl ReferenceScope {
    /// Scope of a host element
    pub fn of(element: &HostElement) -> Self {
        element
            .category
            .map(ReferenceScope::Category)
            .unwrap_or(ReferenceScope::Uncategorized)
    }
}

/// Host identifier part of a reference key
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ReferenceId {
    /// Integer id (stable within the session)
    Element(ElementId),
    /// String unique id (stable across sessions)
    Unique(String),
}

/// Cache key: scope plus host identifier
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ReferenceKey {
    pub scope: ReferenceScope,
    pub id: ReferenceId,
}

impl ReferenceKey {
    /// Create a key from an integer id
    pub fn new(scope: ReferenceScope, id: ElementId) -> Self {
        Self {
            scope,
            id: ReferenceId::Element(id),
        }
    }

    /// Create a key from a string unique id
    pub fn unique(scope: ReferenceScope, unique_id: impl Into<String>) -> Self {
        Self {
            scope,
            id: ReferenceId::Unique(unique_id.into()),
        }
    }

    /// Key of a host element (category scope, integer id)
    pub fn for_element(element: &HostElement) -> Self {
        Self::new(ReferenceScope::of(element), element.id)
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            ReferenceScope::Category(category) => category.ost_name(),
            ReferenceScope::Uncategorized => "<none>",
        };
        match &self.id {
            ReferenceId::Element(id) => write!(f, "{}#{}", scope, id),
            ReferenceId::Unique(uid) => write!(f, "{}@{}", scope, uid),
        }
    }
}

/// Mapping from reference key to produced domain objects
///
/// Objects are shared as `Arc`s so every lookup hands out the same
/// instances that were stored. The cache has no internal locking and is
/// deliberately `!Sync`; one session owns one cache.
pub struct ReferenceObjectCache {
    entries: FxHashMap<ReferenceKey, Vec<Arc<DomainObject>>>,
    _not_sync: PhantomData<Cell<()>>,
}

impl ReferenceObjectCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            _not_sync: PhantomData,
        }
    }

    /// Find the first cached object assignable to `domain_type`
    pub fn find(&self, key: &ReferenceKey, domain_type: DomainType) -> Option<Arc<DomainObject>> {
        self.entries
            .get(key)?
            .iter()
            .find(|object| object.is_a(domain_type))
            .map(Arc::clone)
    }

    /// Get the full list cached for a key
    pub fn get(&self, key: &ReferenceKey) -> Option<&[Arc<DomainObject>]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Append one object to the list at `key`
    ///
    /// Storing twice under the same key keeps both entries.
    pub fn store(&mut self, key: ReferenceKey, object: Arc<DomainObject>) {
        self.entries.entry(key).or_default().push(object);
    }

    /// Append objects to the list at `key`
    ///
    /// The entry is created even when `objects` is empty, which records the
    /// key as resolved to nothing.
    pub fn store_all(&mut self, key: ReferenceKey, objects: impl IntoIterator<Item = Arc<DomainObject>>) {
        self.entries.entry(key).or_default().extend(objects);
    }

    /// Check if a key has an entry (possibly empty)
    pub fn contains(&self, key: &ReferenceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of objects across all keys
    pub fn object_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ReferenceObjectCache {
    fn default() -> Self {
        Self::new()
    }
}
