// File: src/store.rs
// The durable tracker state: per-list, per-completion-date history of
// classified tasks. Loaded once per reconciliation run, mutated in memory
// through merge + prune, then persisted atomically.
use crate::context::AppContext;
use crate::model::{RawTaskItem, TrackerEntry, parse_tracker_date};
use crate::storage::LocalStorage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;

// Increment this when making breaking changes to the tracker document format.
const TRACKER_STORAGE_VERSION: u32 = 1;

/// Date-keyed buckets of tracker entries for one list. Keys are `%d-%m-%Y`
/// strings; they are compared only after parsing back to calendar dates.
pub type DateBuckets = BTreeMap<String, Vec<TrackerEntry>>;

/// The persisted tracker document and its in-memory operations.
///
/// One run owns exactly one value of this type: there is no partial-write
/// visibility. If the process dies before [`TrackerStore::persist`], the
/// previous on-disk snapshot stays the crash-consistent state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerStore {
    // If this field is missing in the JSON (hand-written file), it defaults to 0.
    #[serde(default)]
    version: u32,
    /// Names of the lists being tracked. Independent of `tracker`: a list may
    /// be tracked before any history exists for it.
    #[serde(default)]
    pub lists: Vec<String>,
    #[serde(default, rename = "Tracker")]
    pub tracker: BTreeMap<String, DateBuckets>,
}

impl TrackerStore {
    /// Read the tracker document from durable storage.
    ///
    /// A missing file yields an empty store; a present but unparsable file is
    /// fatal, because merge must start from a known-good baseline.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_tracker_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        LocalStorage::with_lock(&path, || {
            let json = fs::read_to_string(&path)?;
            let store: TrackerStore = serde_json::from_str(&json).map_err(|e| {
                anyhow::anyhow!("Tracker file '{}' is corrupt: {}", path.display(), e)
            })?;
            Ok(store)
        })
    }

    /// Start tracking a list. Returns false (and changes nothing) when the
    /// name is already tracked.
    pub fn add_list(&mut self, name: &str) -> bool {
        if self.lists.iter().any(|l| l == name) {
            return false;
        }
        self.lists.push(name.to_string());
        true
    }

    pub fn tracked_lists(&self) -> &[String] {
        &self.lists
    }

    /// Merge a grouped batch for one list into its history.
    ///
    /// Per date bucket, only entries whose title is not already present are
    /// appended, so merging the same batch twice is a no-op and a later
    /// classification never overwrites an earlier one.
    pub fn merge(&mut self, list: &str, date_groups: BTreeMap<String, Vec<TrackerEntry>>) {
        let buckets = self.tracker.entry(list.to_string()).or_default();
        for (date, entries) in date_groups {
            let bucket = buckets.entry(date).or_default();
            for entry in entries {
                if !bucket.iter().any(|e| e.title == entry.title) {
                    bucket.push(entry);
                }
            }
        }
    }

    /// Remove entries for tasks that reverted from complete to incomplete,
    /// restricted to a trailing window of `window_days` before the list's
    /// most recent recorded date.
    ///
    /// Dates older than the window are never touched, even if the source task
    /// reverted: correcting unbounded history would require retaining
    /// per-item identity forever. A bucket emptied by pruning loses its date
    /// key as well.
    pub fn prune(&mut self, list: &str, current_raw_items: &[RawTaskItem], window_days: u32) {
        let Some(buckets) = self.tracker.get_mut(list) else {
            return;
        };
        let Some(most_recent) = buckets.keys().filter_map(|k| parse_tracker_date(k)).max()
        else {
            return;
        };

        let reverted: HashSet<&str> = current_raw_items
            .iter()
            .filter(|item| !item.is_completed())
            .map(|item| item.title.as_str())
            .collect();
        if reverted.is_empty() {
            return;
        }

        let keys: Vec<String> = buckets.keys().cloned().collect();
        for key in keys {
            // Unparsable date keys (hand-edited files) are left alone.
            let Some(day) = parse_tracker_date(&key) else {
                continue;
            };
            let age = (most_recent - day).num_days();
            if age > i64::from(window_days) {
                continue;
            }
            let mut now_empty = false;
            if let Some(bucket) = buckets.get_mut(&key) {
                let before = bucket.len();
                bucket.retain(|entry| !reverted.contains(entry.title.as_str()));
                if bucket.len() < before {
                    log::info!(
                        "pruned {} reverted entries from {}/{}",
                        before - bucket.len(),
                        list,
                        key
                    );
                }
                now_empty = bucket.is_empty();
            }
            if now_empty {
                buckets.remove(&key);
            }
        }
    }

    /// Serialize the full store to durable local storage, then mirror it to
    /// the remote document endpoint when one is configured.
    ///
    /// The mirror push is a best-effort side effect of a successful local
    /// persist, never a precondition for it.
    pub async fn persist(&self, ctx: &dyn AppContext, mirror_url: Option<&str>) -> Result<()> {
        let mut snapshot = self.clone();
        snapshot.version = TRACKER_STORAGE_VERSION;
        let json = serde_json::to_string_pretty(&snapshot)?;

        let path = ctx.get_tracker_path()?;
        LocalStorage::with_lock(&path, || {
            LocalStorage::atomic_write(&path, &json)?;
            Ok(())
        })?;

        if let Some(url) = mirror_url {
            match mirror_push(url, &json).await {
                Ok(()) => log::info!("tracker mirrored to {}", url),
                Err(e) => log::warn!("tracker mirror push to {} failed: {}", url, e),
            }
        }

        Ok(())
    }
}

async fn mirror_push(url: &str, json: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .put(url)
        .header("Content-Type", "application/json")
        .body(json.to_string())
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("mirror endpoint answered HTTP {}", status.as_u16());
    }
    Ok(())
}
