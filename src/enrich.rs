// File: src/enrich.rs
//! Enrichment worker pool: concurrent classification fan-out over a batch of
//! raw task items.
use crate::classify::{Classify, ClassifyError};
use crate::model::{EnrichedTaskItem, RawTaskItem};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Annotate a batch of raw items with their normalized completion day and a
/// classification label.
///
/// One concurrent task per item, bounded by `limit` (network-bound fan-out,
/// see `Config::effective_concurrency`). Output order follows completion
/// order, not input order.
///
/// Items without a completion day skip the classification call entirely and
/// are re-emitted unclassified so they still feed the prune pass. A failed
/// classification is logged and the item re-emitted with
/// `classification = None` (the grouper drops it, so nothing half-labelled is
/// ever persisted and the task stays eligible next run). Auth errors abort
/// the whole batch: without credentials no run should reach persist.
pub async fn enrich(
    items: Vec<RawTaskItem>,
    classifier: Arc<dyn Classify>,
    limit: usize,
) -> Result<Vec<EnrichedTaskItem>, ClassifyError> {
    let limit = limit.max(1);

    let futures = items.into_iter().map(|item| {
        let classifier = classifier.clone();
        async move { enrich_one(item, classifier.as_ref()).await }
    });

    let mut stream = stream::iter(futures).buffer_unordered(limit);
    let mut enriched = Vec::new();

    while let Some(result) = stream.next().await {
        enriched.push(result?);
    }

    Ok(enriched)
}

async fn enrich_one(
    item: RawTaskItem,
    classifier: &dyn Classify,
) -> Result<EnrichedTaskItem, ClassifyError> {
    let completed = item.completion_day();

    if item.is_completed() && completed.is_none() {
        log::warn!(
            "task '{}' has an unparsable completion timestamp, treating as not complete",
            item.title
        );
    }

    let classification = if completed.is_some() {
        match classifier.classify(&item.title).await {
            Ok(c) => Some(c),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::warn!("classification failed for '{}': {}", item.title, e);
                None
            }
        }
    } else {
        None
    };

    Ok(EnrichedTaskItem {
        title: item.title,
        status: item.status,
        completed,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Classification;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Classifier stub: fails (recoverably) for titles in `fail`, counts calls.
    struct StubClassifier {
        fail: Vec<String>,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn new(fail: &[&str]) -> Self {
            Self {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Classify for StubClassifier {
        async fn classify(&self, task: &str) -> Result<Classification, ClassifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.iter().any(|t| t == task) {
                return Err(ClassifyError::Provider("stubbed failure".to_string()));
            }
            Ok(Classification {
                category: "Work".to_string(),
                difficulty: "EASY".to_string(),
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn completed_item(title: &str) -> RawTaskItem {
        RawTaskItem {
            title: title.to_string(),
            status: "completed".to_string(),
            completed_at: Some("2024-06-01T08:00:00.000Z".to_string()),
        }
    }

    fn open_item(title: &str) -> RawTaskItem {
        RawTaskItem {
            title: title.to_string(),
            status: "needsAction".to_string(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn incomplete_items_skip_the_classifier() {
        let stub = Arc::new(StubClassifier::new(&[]));
        let items = vec![open_item("Later"), completed_item("Done")];

        let enriched = enrich(items, stub.clone(), 4).await.expect("enrich");
        assert_eq!(enriched.len(), 2);
        // Only the completed item triggered a network call.
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        let open = enriched
            .iter()
            .find(|e| e.title == "Later")
            .expect("open item survives");
        assert!(open.completed.is_none());
        assert!(open.classification.is_none());
    }

    #[tokio::test]
    async fn per_item_failure_keeps_the_rest_of_the_batch() {
        let stub = Arc::new(StubClassifier::new(&["Flaky"]));
        let items = vec![
            completed_item("Flaky"),
            completed_item("Solid"),
            completed_item("Steady"),
        ];

        let enriched = enrich(items, stub, 4).await.expect("batch survives");
        assert_eq!(enriched.len(), 3);

        let classified: Vec<_> = enriched
            .iter()
            .filter(|e| e.classification.is_some())
            .collect();
        assert_eq!(classified.len(), 2);

        let flaky = enriched
            .iter()
            .find(|e| e.title == "Flaky")
            .expect("failed item re-emitted");
        assert!(flaky.classification.is_none());
        assert!(flaky.completed.is_some());
    }

    #[tokio::test]
    async fn auth_failure_aborts_the_batch() {
        struct AuthFail;

        #[async_trait]
        impl Classify for AuthFail {
            async fn classify(&self, _task: &str) -> Result<Classification, ClassifyError> {
                Err(ClassifyError::Auth("no credentials".to_string()))
            }
            fn name(&self) -> &str {
                "authfail"
            }
        }

        let items = vec![completed_item("A"), completed_item("B")];
        let err = enrich(items, Arc::new(AuthFail), 4)
            .await
            .expect_err("auth is fatal");
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let stub = Arc::new(StubClassifier::new(&[]));
        let enriched = enrich(Vec::new(), stub.clone(), 4).await.expect("enrich");
        assert!(enriched.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }
}
