// File: tests/task_client.rs
use mockito::{Matcher, Server};
use suivi::client::TaskClient;

const LISTS_BODY: &str = r#"{
    "items": [
        { "id": "list-health", "title": " Health " },
        { "id": "list-chores", "title": "Chores" }
    ]
}"#;

const HEALTH_TASKS_BODY: &str = r#"{
    "items": [
        { "title": "Run", "status": "completed", "completed": "2024-06-01T08:00:00.000Z" },
        { "title": "Meditate", "status": "needsAction" },
        { "status": "needsAction" }
    ]
}"#;

#[tokio::test]
async fn lists_and_tasks_are_fetched_with_bearer_auth() {
    let mut server = Server::new_async().await;

    let lists_mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/tasks/v1/users/@me/lists".to_string()),
        )
        .match_header("Authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(LISTS_BODY)
        .create_async()
        .await;

    let tasks_mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/tasks/v1/lists/list-health/tasks\?showHidden=true".to_string()),
        )
        .match_header("Authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(HEALTH_TASKS_BODY)
        .create_async()
        .await;

    let client = TaskClient::new("tok-123").with_base_url(server.url());

    let lists = client.list_task_lists().await.expect("lists fetch");
    assert_eq!(lists.len(), 2);

    let tasks = client.list_tasks("list-health").await.expect("tasks fetch");
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].title, "Run");
    assert!(tasks[0].is_completed());
    assert!(!tasks[1].is_completed());
    // Titleless tasks get the provider's placeholder.
    assert_eq!(tasks[2].title, "No Title");

    lists_mock.assert_async().await;
    tasks_mock.assert_async().await;
}

#[tokio::test]
async fn fetch_tracked_trims_provider_titles() {
    let mut server = Server::new_async().await;
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/tasks/v1/users/@me/lists".to_string()),
        )
        .with_status(200)
        .with_body(LISTS_BODY)
        .create_async()
        .await;
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/tasks/v1/lists/list-health/tasks".to_string()),
        )
        .with_status(200)
        .with_body(HEALTH_TASKS_BODY)
        .create_async()
        .await;

    let client = TaskClient::new("tok-123").with_base_url(server.url());
    // " Health " at the provider must match the tracked name "Health";
    // "Gaming" is tracked but does not exist at the provider.
    let tracked = vec!["Health".to_string(), "Gaming".to_string()];
    let (items, missing) = client.fetch_tracked(&tracked).await.expect("fetch");

    assert_eq!(items.len(), 1);
    assert_eq!(items["Health"].len(), 3);
    assert_eq!(missing, vec!["Gaming".to_string()]);
}

#[tokio::test]
async fn untracked_lists_are_not_fetched() {
    let mut server = Server::new_async().await;
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/tasks/v1/users/@me/lists".to_string()),
        )
        .with_status(200)
        .with_body(LISTS_BODY)
        .create_async()
        .await;
    // No mock for the Chores tasks endpoint: fetching it would 501.
    let client = TaskClient::new("tok-123").with_base_url(server.url());
    let (items, missing) = client
        .fetch_tracked(&[])
        .await
        .expect("nothing tracked, nothing fetched");
    assert!(items.is_empty());
    assert!(missing.is_empty());
}

#[tokio::test]
async fn provider_auth_failure_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/tasks/v1/users/@me/lists".to_string()),
        )
        .with_status(401)
        .with_body(r#"{"error":{"message":"Invalid Credentials"}}"#)
        .create_async()
        .await;

    let client = TaskClient::new("expired").with_base_url(server.url());
    let err = client.list_task_lists().await.expect_err("401 propagates");
    assert!(err.to_string().contains("authentication failed"));
}

#[tokio::test]
async fn empty_list_page_yields_no_items() {
    let mut server = Server::new_async().await;
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/tasks/v1/lists/empty/tasks".to_string()),
        )
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = TaskClient::new("tok").with_base_url(server.url());
    let tasks = client.list_tasks("empty").await.expect("empty page");
    assert!(tasks.is_empty());
}
