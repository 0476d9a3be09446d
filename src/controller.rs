// File: src/controller.rs
//! Reconciliation driver: the single orchestrator of one run.
//!
//! For each tracked list: enrich the list's current raw items (concurrent
//! classification fan-out), group by completion date, merge into the tracker
//! store, prune reverted tasks inside the trailing window. Persist once at
//! the end. The store is owned exclusively by this controller for the
//! duration of the run; nothing is written to disk before the final persist.
use crate::classify::Classify;
use crate::config::Config;
use crate::context::AppContext;
use crate::enrich::enrich;
use crate::group::group;
use crate::model::{EnrichedTaskItem, RawTaskItem};
use crate::store::TrackerStore;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

// Lists are independent (disjoint store keys), so their enrichment pipelines
// run concurrently, bounded separately from the per-item classification pool.
const LIST_CONCURRENCY: usize = 4;

/// What one list's pipeline produced, for presentation.
#[derive(Debug)]
pub struct ListOutcome {
    pub list: String,
    pub items: Vec<EnrichedTaskItem>,
}

pub struct ReconcileController {
    pub store: TrackerStore,
    pub classifier: Arc<dyn Classify>,
    pub config: Config,
    pub ctx: Arc<dyn AppContext>,
}

impl ReconcileController {
    pub fn new(
        store: TrackerStore,
        classifier: Arc<dyn Classify>,
        config: Config,
        ctx: Arc<dyn AppContext>,
    ) -> Self {
        Self {
            store,
            classifier,
            config,
            ctx,
        }
    }

    /// Run one full reconciliation over the given raw items.
    ///
    /// Per-item classification failures are contained inside the worker pool;
    /// fatal failures (provider auth, store persist) propagate and leave the
    /// durable snapshot untouched.
    pub async fn run(
        &mut self,
        raw_items_by_list: HashMap<String, Vec<RawTaskItem>>,
    ) -> Result<Vec<ListOutcome>> {
        let limit = self.config.effective_concurrency();
        let classifier = self.classifier.clone();

        // Phase 1: network-bound enrichment, fanned out across lists.
        let futures = raw_items_by_list.into_iter().map(|(list, raw)| {
            let classifier = classifier.clone();
            async move {
                let enriched = enrich(raw.clone(), classifier, limit).await;
                (list, raw, enriched)
            }
        });

        let mut pipelines = stream::iter(futures).buffer_unordered(LIST_CONCURRENCY);
        let mut completed = Vec::new();
        while let Some((list, raw, enriched)) = pipelines.next().await {
            // An auth error from any list aborts the run before persist.
            let enriched = enriched?;
            completed.push((list, raw, enriched));
        }

        // Phase 2: merge + prune, one list at a time on the exclusively
        // owned store. A list with no raw items is a merge no-op, but prune
        // still runs.
        let mut outcomes = Vec::new();
        for (list, raw, enriched) in completed {
            let grouped = group(&enriched);
            self.store.merge(&list, grouped);
            self.store
                .prune(&list, &raw, self.config.prune_window_days);
            outcomes.push(ListOutcome {
                list,
                items: enriched,
            });
        }

        self.store
            .persist(self.ctx.as_ref(), self.config.mirror_url.as_deref())
            .await?;

        log::info!("reconciled {} list(s)", outcomes.len());
        Ok(outcomes)
    }
}
