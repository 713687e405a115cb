//! The collection handle
//!
//! A collection composes the query core: schema, document vtable,
//! query cache with its replacement trigger, and the event reduce
//! coordinator. Storage stays outside; the handle produces plans and
//! accepts executed result lists.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{
    AtomicSubscriberCount, CachedQuery, QueryCache, ReplacementTrigger,
};
use crate::document::DocumentVtable;
use crate::events::ChangeEvent;
use crate::observability::{Event, Logger};
use crate::planner::{self, QueryPlan};
use crate::query::{canonical_string, normalize, Query};
use crate::reduce::{
    DefaultQueryRuntime, EventReduceCoordinator, EventReduceOutcome, QueryParams, QueryRuntime,
    ResultSet,
};
use crate::schema::CollectionSchema;

use super::errors::{CollectionError, CollectionResult};
use super::options::CollectionOptions;

/// A live collection handle over the query core
pub struct Collection {
    name: String,
    schema: CollectionSchema,
    vtable: Arc<DocumentVtable>,
    cache: Arc<QueryCache>,
    trigger: ReplacementTrigger,
    coordinator: EventReduceCoordinator,
    runtime: Arc<dyn QueryRuntime>,
    logger: Logger,
    destroyed: AtomicBool,
}

impl Collection {
    /// Composes a collection from its options.
    ///
    /// Fails when a user document method carries a reserved name.
    pub fn create(options: CollectionOptions) -> CollectionResult<Self> {
        let CollectionOptions {
            name,
            schema,
            event_reduce,
            cache: cache_config,
            classifier,
            action_runner,
            replacement_policy,
            subscriber_provider,
            query_runtime,
            document_methods,
        } = options;

        let vtable = Arc::new(DocumentVtable::compose(&schema, document_methods)?);
        let logger = Logger::scoped(&name);
        let cache = Arc::new(QueryCache::new());
        let policy = replacement_policy
            .unwrap_or_else(|| Arc::new(cache_config.default_policy()));
        let subscribers = subscriber_provider
            .unwrap_or_else(|| Arc::new(AtomicSubscriberCount));
        let trigger = ReplacementTrigger::new(
            cache.clone(),
            policy,
            subscribers,
            logger.clone(),
            Duration::from_millis(cache_config.replacement_debounce_ms),
        );
        let coordinator =
            EventReduceCoordinator::new(event_reduce, classifier, action_runner, logger.clone());
        let runtime = query_runtime.unwrap_or_else(|| Arc::new(DefaultQueryRuntime));

        let version = schema.version.to_string();
        logger.event(Event::CollectionCreate, &[("version", &version)]);

        Ok(Self {
            name,
            schema,
            vtable,
            cache,
            trigger,
            coordinator,
            runtime,
            logger,
            destroyed: AtomicBool::new(false),
        })
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The active schema
    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    /// The composed document vtable
    pub fn vtable(&self) -> &Arc<DocumentVtable> {
        &self.vtable
    }

    /// The query cache
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Whether change events maintain cached windows incrementally
    pub fn event_reduce_enabled(&self) -> bool {
        self.coordinator.is_enabled()
    }

    /// Whether the handle was destroyed
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Normalizes a query and returns its shared cache entry.
    ///
    /// Two calls with equivalent queries return the same entry. Every
    /// new entry schedules a debounced replacement run.
    pub fn query(&self, query: &Query) -> CollectionResult<Arc<CachedQuery>> {
        self.ensure_alive()?;
        let normalized = normalize(query, &self.schema)?;
        let canonical = canonical_string(&normalized);

        let mut created = false;
        let cached = self.cache.get_or_create(&canonical, || {
            created = true;
            let params = match QueryParams::derive_with(
                self.runtime.as_ref(),
                &self.schema,
                &normalized,
            ) {
                Ok(params) => Some(Arc::new(params)),
                Err(err) => {
                    self.logger.event(
                        Event::MatcherUnsupported,
                        &[("code", err.code().code()), ("query", &canonical)],
                    );
                    None
                }
            };
            Arc::new(CachedQuery::new(normalized.clone(), &canonical, params))
        });

        if created {
            self.logger.event(Event::QueryNew, &[("query", &canonical)]);
            self.trigger.schedule();
        } else {
            cached.touch();
            self.logger
                .event(Event::QueryCacheHit, &[("query", &canonical)]);
        }
        Ok(cached)
    }

    /// Plans a query against the schema's indexes
    pub fn plan(&self, query: &Query) -> CollectionResult<QueryPlan> {
        self.ensure_alive()?;
        let normalized = normalize(query, &self.schema)?;
        Ok(planner::plan(&self.schema, &normalized)?)
    }

    /// Stores an executed result list on a cached query
    pub fn set_query_results(
        &self,
        cached: &CachedQuery,
        documents: Vec<Value>,
    ) -> CollectionResult<()> {
        self.ensure_alive()?;
        cached.set_results(ResultSet::from_documents(&self.schema.primary_key, documents));
        cached.mark_executed();
        Ok(())
    }

    /// Feeds committed change events into a cached query's window.
    ///
    /// Callers serialize batches per cached query; batches against
    /// distinct queries are independent.
    pub fn apply_change_events(
        &self,
        cached: &CachedQuery,
        events: &[ChangeEvent],
    ) -> CollectionResult<EventReduceOutcome> {
        self.ensure_alive()?;
        Ok(self.coordinator.update(cached, events))
    }

    /// Tears the handle down: cancels the pending replacement run and
    /// drops all cached queries. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.trigger.abort();
        self.cache.clear();
        self.logger.event(Event::CollectionDestroy, &[]);
    }

    fn ensure_alive(&self) -> CollectionResult<()> {
        if self.is_destroyed() {
            return Err(CollectionError::Destroyed(self.name.clone()));
        }
        Ok(())
    }
}

impl Drop for Collection {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("destroyed", &self.is_destroyed())
            .field("cached_queries", &self.cache.len())
            .finish_non_exhaustive()
    }
}
