//! Collection construction options
//!
//! All strategies are injected here, at construction. Nothing in the
//! crate patches shared state after a collection exists.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheReplacementPolicy, QueryCacheConfig, SubscriberCountProvider};
use crate::document::DocumentMethod;
use crate::reduce::{ActionRunner, ChangeClassifier, QueryRuntime};
use crate::schema::CollectionSchema;

/// Everything a collection handle is composed from
pub struct CollectionOptions {
    /// Collection name, stamped onto every log line
    pub name: String,
    /// Validated collection schema
    pub schema: CollectionSchema,
    /// Whether change events maintain cached windows incrementally
    pub event_reduce: bool,
    /// Query cache tunables
    pub cache: QueryCacheConfig,
    /// Change classifier for the incremental path
    pub classifier: Option<Arc<dyn ChangeClassifier>>,
    /// Action runner for the incremental path
    pub action_runner: Option<Arc<dyn ActionRunner>>,
    /// Replacement policy, the config-derived default when absent
    pub replacement_policy: Option<Arc<dyn CacheReplacementPolicy>>,
    /// Subscriber counting, the entry-local counter when absent
    pub subscriber_provider: Option<Arc<dyn SubscriberCountProvider>>,
    /// Comparator and matcher supplier, the built-in one when absent
    pub query_runtime: Option<Arc<dyn QueryRuntime>>,
    /// User-registered document methods
    pub document_methods: HashMap<String, DocumentMethod>,
}

impl CollectionOptions {
    /// Options with every strategy defaulted
    pub fn new(name: impl Into<String>, schema: CollectionSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            event_reduce: true,
            cache: QueryCacheConfig::default(),
            classifier: None,
            action_runner: None,
            replacement_policy: None,
            subscriber_provider: None,
            query_runtime: None,
            document_methods: HashMap::new(),
        }
    }

    /// Switches incremental result maintenance on or off
    pub fn with_event_reduce(mut self, enabled: bool) -> Self {
        self.event_reduce = enabled;
        self
    }

    /// Sets the query cache tunables
    pub fn with_cache_config(mut self, cache: QueryCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Wires the incremental path collaborators
    pub fn with_event_reduce_strategies(
        mut self,
        classifier: Arc<dyn ChangeClassifier>,
        action_runner: Arc<dyn ActionRunner>,
    ) -> Self {
        self.classifier = Some(classifier);
        self.action_runner = Some(action_runner);
        self
    }

    /// Replaces the default cache replacement policy
    pub fn with_replacement_policy(mut self, policy: Arc<dyn CacheReplacementPolicy>) -> Self {
        self.replacement_policy = Some(policy);
        self
    }

    /// Replaces the default subscriber counting
    pub fn with_subscriber_provider(
        mut self,
        provider: Arc<dyn SubscriberCountProvider>,
    ) -> Self {
        self.subscriber_provider = Some(provider);
        self
    }

    /// Replaces the built-in comparator and matcher supplier
    pub fn with_query_runtime(mut self, runtime: Arc<dyn QueryRuntime>) -> Self {
        self.query_runtime = Some(runtime);
        self
    }

    /// Registers a user document method
    pub fn with_document_method(
        mut self,
        name: impl Into<String>,
        method: DocumentMethod,
    ) -> Self {
        self.document_methods.insert(name.into(), method);
        self
    }
}

impl std::fmt::Debug for CollectionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionOptions")
            .field("name", &self.name)
            .field("event_reduce", &self.event_reduce)
            .field("cache", &self.cache)
            .field("has_classifier", &self.classifier.is_some())
            .field("has_action_runner", &self.action_runner.is_some())
            .field("document_methods", &self.document_methods.len())
            .finish_non_exhaustive()
    }
}
