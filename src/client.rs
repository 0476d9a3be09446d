// File: src/client.rs
//! Thin REST client for the external task provider (Google Tasks API shapes).
//!
//! Credential acquisition is external: this client is handed a ready bearer
//! token. Only two operations are consumed: list the user's task lists, and
//! list the tasks inside one list.
use crate::model::RawTaskItem;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// One task list as the provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskListRef {
    pub id: String,
    pub title: String,
}

#[derive(Deserialize)]
struct TaskListsPage {
    #[serde(default)]
    items: Vec<TaskListRef>,
}

#[derive(Deserialize)]
struct TasksPage {
    #[serde(default)]
    items: Vec<RawTask>,
}

#[derive(Deserialize)]
struct RawTask {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_status")]
    status: String,
    completed: Option<String>,
}

fn default_title() -> String {
    "No Title".to_string()
}

fn default_status() -> String {
    "unknown".to_string()
}

#[derive(Clone, Debug)]
pub struct TaskClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl TaskClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: "https://tasks.googleapis.com".into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| anyhow!("task provider request failed: {}", e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(anyhow!(
                "task provider authentication failed (HTTP {})",
                status.as_u16()
            ));
        }
        if !status.is_success() {
            return Err(anyhow!("task provider answered HTTP {}", status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("task provider response not parsable: {}", e))
    }

    pub async fn list_task_lists(&self) -> Result<Vec<TaskListRef>> {
        let url = format!("{}/tasks/v1/users/@me/lists?maxResults=10", self.base_url);
        let page: TaskListsPage = self.get_json(url).await?;
        Ok(page.items)
    }

    /// Hidden (completed) tasks are included: completion history is the
    /// entire point.
    pub async fn list_tasks(&self, list_id: &str) -> Result<Vec<RawTaskItem>> {
        let url = format!(
            "{}/tasks/v1/lists/{}/tasks?showHidden=true",
            self.base_url, list_id
        );
        let page: TasksPage = self.get_json(url).await?;
        Ok(page
            .items
            .into_iter()
            .map(|t| RawTaskItem {
                title: t.title,
                status: t.status,
                completed_at: t.completed,
            })
            .collect())
    }

    /// Fetch the raw items for every tracked list.
    ///
    /// Provider list titles are trimmed before matching, since the provider
    /// is title-case/whitespace sloppy. Tracked names with no matching
    /// provider list are returned separately so the caller can warn; they do
    /// not abort the run.
    pub async fn fetch_tracked(
        &self,
        tracked: &[String],
    ) -> Result<(HashMap<String, Vec<RawTaskItem>>, Vec<String>)> {
        let wanted: HashSet<&str> = tracked.iter().map(|s| s.as_str()).collect();
        let mut items_by_list = HashMap::new();

        for list in self.list_task_lists().await? {
            let title = list.title.trim().to_string();
            if wanted.contains(title.as_str()) {
                let items = self.list_tasks(&list.id).await?;
                items_by_list.insert(title, items);
            }
        }

        let missing = tracked
            .iter()
            .filter(|name| !items_by_list.contains_key(*name))
            .cloned()
            .collect();
        Ok((items_by_list, missing))
    }
}
