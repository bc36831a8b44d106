// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion session
//!
//! Everything one pull or push needs is carried by an explicit [`Session`]:
//! the document's element collector, the classifier, the reference cache,
//! settings and the accumulated warnings. A session is created at the start
//! of a traversal and dropped at the end; its cache is never shared.

use crate::cache::ReferenceObjectCache;
use crate::classifier::TypeClassifier;
use bhom_revit_model::{AdapterSettings, Discipline, ElementCollector, PullSettings, PushSettings};

/// Conversion session context
pub struct Session<'a> {
    collector: &'a dyn ElementCollector,
    classifier: TypeClassifier,
    cache: ReferenceObjectCache,
    settings: AdapterSettings,
    discipline: Option<Discipline>,
    warnings: Vec<String>,
    unclassified: usize,
}

impl<'a> Session<'a> {
    /// Start a session over a document with default settings
    pub fn new(collector: &'a dyn ElementCollector) -> Self {
        Self {
            collector,
            classifier: TypeClassifier::new(),
            cache: ReferenceObjectCache::new(),
            settings: AdapterSettings::default(),
            discipline: None,
            warnings: Vec::new(),
            unclassified: 0,
        }
    }

    /// Use the given settings
    pub fn with_settings(mut self, settings: AdapterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use the given pull settings
    pub fn with_pull_settings(mut self, pull: PullSettings) -> Self {
        self.settings.pull = pull;
        self
    }

    /// Use the given push settings
    pub fn with_push_settings(mut self, push: PushSettings) -> Self {
        self.settings.push = push;
        self
    }

    /// Override the settings discipline for this session only
    pub fn with_discipline(mut self, discipline: Discipline) -> Self {
        self.discipline = Some(discipline);
        self
    }

    /// Use a custom classifier
    pub fn with_classifier(mut self, classifier: TypeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Host element enumeration
    pub fn collector(&self) -> &'a dyn ElementCollector {
        self.collector
    }

    /// Type classifier
    pub fn classifier(&self) -> &TypeClassifier {
        &self.classifier
    }

    /// Reference cache (read-only; only the dispatcher stores into it)
    pub fn cache(&self) -> &ReferenceObjectCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut ReferenceObjectCache {
        &mut self.cache
    }

    /// All settings
    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// Pull settings
    pub fn pull_settings(&self) -> &PullSettings {
        &self.settings.pull
    }

    /// Push settings
    pub fn push_settings(&self) -> &PushSettings {
        &self.settings.push
    }

    /// Discipline used to resolve mixed-use elements
    ///
    /// The session override wins over the pull settings.
    pub fn discipline(&self) -> Discipline {
        self.discipline.unwrap_or(self.settings.pull.discipline)
    }

    /// Record a non-fatal problem
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    /// Warnings accumulated so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drain accumulated warnings
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Number of elements skipped because no domain type applies
    pub fn unclassified_count(&self) -> usize {
        self.unclassified
    }

    pub(crate) fn record_unclassified(&mut self) {
        self.unclassified += 1;
    }
}
