use super::*;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use chrono::{Duration, Utc};
use papershelf_common::config::DatabaseConfig;
use papershelf_common::db::NewPaper;
use serde_json::Value;
use std::path::Path;
use tower::ServiceExt;

struct TestApp {
    dir: tempfile::TempDir,
    router: Router,
    repository: Repository,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_watcher(true).await
    }

    async fn with_watcher(running: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("library");
        std::fs::create_dir(&library).unwrap();

        let mut config = AppConfig::default();
        config.database = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display()),
            ..Default::default()
        };
        config.library.folder = Some(library.display().to_string());

        let repository = Repository::open(&config.database).await.unwrap();
        let state = AppState {
            config: Arc::new(config),
            library: LibraryService::new(repository.clone()),
            watcher_running: Arc::new(AtomicBool::new(running)),
        };

        Self {
            dir,
            router: create_router(state),
            repository,
        }
    }

    fn library(&self) -> std::path::PathBuf {
        self.dir.path().join("library")
    }

    async fn seed(&self, id: &str, title: &str, authors: Option<&str>, age_days: i64) {
        self.repository
            .insert_paper(NewPaper {
                id: id.to_string(),
                filename: format!("{id}.pdf"),
                title: Some(title.to_string()),
                authors: authors.map(str::to_string),
                abstract_text: None,
                year: None,
                date_added: Utc::now() - Duration::days(age_days),
            })
            .await
            .unwrap();
    }

    async fn send(&self, method: &str, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::new().await;

    let response = app.send("GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");

    let response = app.send("GET", "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"]["status"], "up");
    assert_eq!(body["checks"]["watcher"]["status"], "enabled");
}

#[tokio::test]
async fn test_ready_reports_stopped_watcher() {
    // the folder exists, but no watcher was started for it
    let app = TestApp::with_watcher(false).await;
    assert!(app.library().is_dir());

    let response = app.send("GET", "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["watcher"]["status"], "disabled");
}

#[tokio::test]
async fn test_get_unknown_paper_is_404() {
    let app = TestApp::new().await;

    let response = app.send("GET", "/papers/nonexistent-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["detail"], "Paper not found");
}

#[tokio::test]
async fn test_get_paper_stamps_last_accessed() {
    let app = TestApp::new().await;
    app.seed("abc", "Neural Networks", Some("Ada"), 0).await;

    let response = app.send("GET", "/papers/abc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["title"], "Neural Networks");
    assert!(body["abstract"].is_null());
    assert!(!body["last_accessed"].is_null());
}

#[tokio::test]
async fn test_list_with_and_without_trailing_slash() {
    let app = TestApp::new().await;
    app.seed("a", "First", None, 2).await;
    app.seed("b", "Second", None, 1).await;

    for uri in ["/papers", "/papers/"] {
        let response = app.send("GET", uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_list_filters_are_conjunctive() {
    let app = TestApp::new().await;
    app.seed("tagged", "Neural Networks", None, 0).await;
    app.seed("untagged", "Neural Networks", None, 0).await;
    app.seed("other", "Graph Theory", Some("NEURAL group"), 0).await;

    let response = app.send("POST", "/tags/?name=ml&hue=200").await;
    assert_eq!(response.status(), StatusCode::OK);
    let tag_id = json_body(response).await["id"].as_i64().unwrap();

    for paper in ["tagged", "other"] {
        let response = app
            .send("PUT", &format!("/papers/{paper}/tags/{tag_id}"))
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = app
        .send("GET", &format!("/papers/?tag={tag_id}&query=neural%20net"))
        .await;
    assert_eq!(ids(&json_body(response).await), vec!["tagged"]);

    let response = app.send("GET", "/papers/?query=neural").await;
    let body = json_body(response).await;
    let mut found = ids(&body);
    found.sort();
    assert_eq!(found, vec!["other", "tagged", "untagged"]);
}

#[tokio::test]
async fn test_query_matches_non_ascii_case_insensitively() {
    let app = TestApp::new().await;
    app.seed("ueber", "Über Neural Networks", Some("Émile Zola"), 0).await;
    app.seed("plain", "Graph Theory", None, 0).await;

    // Über, über, ÉMILE
    for query in ["%C3%9Cber", "%C3%BCber", "%C3%89MILE"] {
        let response = app.send("GET", &format!("/papers/?query={query}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&json_body(response).await), vec!["ueber"], "query {query}");
    }
}

#[tokio::test]
async fn test_list_sorted_by_added() {
    let app = TestApp::new().await;
    app.seed("old", "Old", None, 30).await;
    app.seed("new", "New", None, 1).await;
    app.seed("mid", "Mid", None, 10).await;

    let response = app.send("GET", "/papers/?sort=added").await;
    assert_eq!(ids(&json_body(response).await), vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn test_list_sorted_by_access() {
    let app = TestApp::new().await;
    app.seed("a", "A", None, 0).await;
    app.seed("b", "B", None, 0).await;

    app.send("GET", "/papers/a").await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    app.send("GET", "/papers/b").await;

    let response = app.send("GET", "/papers/?sort=access").await;
    assert_eq!(ids(&json_body(response).await), vec!["b", "a"]);
}

#[tokio::test]
async fn test_pdf_missing_vs_paper_missing() {
    let app = TestApp::new().await;
    app.seed("abc", "On Disk", None, 0).await;

    let response = app.send("GET", "/papers/nope/pdf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["detail"], "Paper not found");

    let response = app.send("GET", "/papers/abc/pdf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["detail"], "PDF file missing");

    let paper = app.repository.find_paper_by_id("abc").await.unwrap().unwrap();
    assert!(paper.last_accessed.is_none());
}

#[tokio::test]
async fn test_pdf_is_served() {
    let app = TestApp::new().await;
    app.seed("abc", "On Disk", None, 0).await;
    let contents = b"%PDF-1.5 fake body".to_vec();
    std::fs::write(app.library().join("abc.pdf"), &contents).unwrap();

    let response = app.send("GET", "/papers/abc/pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), contents.as_slice());

    let paper = app.repository.find_paper_by_id("abc").await.unwrap().unwrap();
    assert!(paper.last_accessed.is_some());
}

#[tokio::test]
async fn test_duplicate_tag_conflicts() {
    let app = TestApp::new().await;

    let response = app.send("POST", "/tags?name=ml&hue=200").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["name"], "ml");
    assert_eq!(body["hue"], 200);

    let response = app.send("POST", "/tags?name=ml&hue=10").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(json_body(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("ml"));

    let response = app.send("GET", "/tags/").await;
    let tags = json_body(response).await;
    assert_eq!(tags.as_array().unwrap().len(), 1);
    assert_eq!(tags[0]["hue"], 200);
}

#[tokio::test]
async fn test_tag_name_validation() {
    let app = TestApp::new().await;

    let response = app.send("POST", "/tags?name=&hue=10").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let long = "x".repeat(65);
    let response = app
        .send("POST", &format!("/tags?name={long}&hue=10"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send("POST", "/tags?name=%20%20%20&hue=10").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tag_name_is_trimmed_before_length_check() {
    let app = TestApp::new().await;

    let name = "y".repeat(64);
    let response = app
        .send("POST", &format!("/tags?name=%20{name}%20%20&hue=10"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], name.as_str());
}

#[tokio::test]
async fn test_tag_lifecycle() {
    let app = TestApp::new().await;
    app.seed("abc", "Paper", None, 0).await;

    let tag = json_body(app.send("POST", "/tags?name=reading&hue=90").await).await;
    let tag_id = tag["id"].as_i64().unwrap();

    let response = app.send("PUT", &format!("/papers/abc/tags/{tag_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    // attaching again is harmless
    let response = app.send("PUT", &format!("/papers/abc/tags/{tag_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let tags = json_body(app.send("GET", "/papers/abc/tags").await).await;
    assert_eq!(tags.as_array().unwrap().len(), 1);

    let response = app.send("PUT", "/papers/abc/tags/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["detail"], "Tag not found");

    let response = app.send("DELETE", &format!("/tags/{tag_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let tags = json_body(app.send("GET", "/papers/abc/tags").await).await;
    assert!(tags.as_array().unwrap().is_empty());

    let response = app.send("DELETE", &format!("/tags/{tag_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_paper_keeps_file() {
    let app = TestApp::new().await;
    app.seed("abc", "Paper", None, 0).await;
    let file = app.library().join("abc.pdf");
    std::fs::write(&file, b"%PDF").unwrap();

    let response = app.send("DELETE", "/papers/abc").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(Path::new(&file).exists());

    let response = app.send("GET", "/papers/abc").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = TestApp::new().await;

    let response = app.send("GET", "/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = TestApp::new().await;

    let preflight = |origin: &'static str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/papers/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .router
        .clone()
        .oneshot(preflight("tauri://localhost"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "tauri://localhost"
    );

    let response = app
        .router
        .clone()
        .oneshot(preflight("http://evil.example"))
        .await
        .unwrap();
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
