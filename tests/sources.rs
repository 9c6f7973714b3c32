use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use portfolio_gantt::model::{EntityId, TimelineEntity};
use portfolio_gantt::source::{HttpTaskSource, InMemorySource, JsonDirSource, TaskSource};
use portfolio_gantt::TimelineError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves one canned response per connection, in order, then stops.
/// Returns the base URL and the request lines it saw.
async fn serve_responses(
    responses: Vec<(&'static str, &'static str)>,
) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut request_lines = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let text = String::from_utf8_lossy(&request);
            request_lines.push(text.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        request_lines
    });
    (format!("http://{}/api", addr), handle)
}

#[tokio::test]
async fn memory_source_returns_known_and_empty_lists() {
    let mut tasks = HashMap::new();
    tasks.insert(
        EntityId::from("p1"),
        vec![TimelineEntity::new("t1", "Scope", None, None)],
    );
    let source = InMemorySource::new(tasks);

    let found = source.fetch_tasks(&EntityId::from("p1")).await.unwrap();
    assert_eq!(found.len(), 1);
    let missing = source.fetch_tasks(&EntityId::from("nope")).await.unwrap();
    assert!(missing.is_empty());
}

#[tokio::test]
async fn json_dir_source_reads_task_records() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("proj-42.json"),
        r#"[
            {"id": "a", "title": "Survey", "status": "DONE", "startDate": "2024-05-02",
             "dueDate": "2024-05-09", "progress": 100, "parentId": null, "tags": []},
            {"id": "b", "title": "Report", "startDate": "2024-05-10", "dueDate": "2024-05-01",
             "progress": 10, "parentId": "a", "tags": ["milestone"]}
        ]"#,
    )
    .unwrap();
    let source = JsonDirSource::new(dir.path());

    let tasks = source.fetch_tasks(&EntityId::from("proj-42")).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].parent_id, Some(EntityId::from("a")));
    assert!(tasks[1].is_milestone());
    // Reversed dates are clamped on conversion.
    assert_eq!(tasks[1].end, tasks[1].start);
}

#[tokio::test]
async fn json_dir_source_treats_missing_file_as_no_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonDirSource::new(dir.path());
    let tasks = source.fetch_tasks(&EntityId::from("absent")).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn json_dir_source_reports_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.json"), "{\"oops\": ").unwrap();
    let source = JsonDirSource::new(dir.path());
    let err = source.fetch_tasks(&EntityId::from("bad")).await.unwrap_err();
    assert!(matches!(err, TimelineError::Json(_)));
}

#[tokio::test]
async fn json_dir_source_rejects_path_like_ids() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonDirSource::new(dir.path());
    for id in ["../etc/passwd", "a/b", "..", ""] {
        let err = source.fetch_tasks(&EntityId::from(id)).await.unwrap_err();
        assert!(matches!(err, TimelineError::InvalidInput(_)), "{id}");
    }
}

#[tokio::test]
async fn http_source_reports_status_then_maps_records() {
    let (base_url, server) = serve_responses(vec![
        ("503 Service Unavailable", "maintenance"),
        (
            "200 OK",
            r#"[{"id": "t1", "title": "Plan", "status": "ACTIVE",
                 "startDate": "2024-01-10T00:00:00.000Z", "dueDate": "2024-01-20",
                 "progress": 40, "parentId": null, "tags": ["milestone"]},
                {"id": "t2", "title": "Ship", "startDate": null, "dueDate": null,
                 "progress": 0, "parentId": "t1", "tags": []}]"#,
        ),
    ])
    .await;
    let source = HttpTaskSource::new(&base_url, Duration::from_secs(5)).unwrap();
    let project = EntityId::from("proj-7");

    let err = source.fetch_tasks(&project).await.unwrap_err();
    match err {
        TimelineError::ApiStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected an API status error, got {other:?}"),
    }

    let tasks = source.fetch_tasks(&project).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Plan");
    assert_eq!(
        tasks[0].dates(),
        Some((
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
        ))
    );
    assert_eq!(tasks[0].progress, 40);
    assert!(tasks[0].is_milestone());
    assert_eq!(tasks[1].parent_id, Some(EntityId::from("t1")));
    assert_eq!(tasks[1].dates(), None);

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 2);
    for line in requests {
        assert_eq!(line, "GET /api/projects/proj-7/tasks HTTP/1.1");
    }
}

#[tokio::test]
async fn http_source_rejects_a_non_array_body() {
    let (base_url, server) = serve_responses(vec![("200 OK", r#"{"error": "nope"}"#)]).await;
    let source = HttpTaskSource::new(&base_url, Duration::from_secs(5)).unwrap();
    let err = source.fetch_tasks(&EntityId::from("p")).await.unwrap_err();
    assert!(matches!(err, TimelineError::Http(_)), "{err:?}");
    server.await.unwrap();
}
