use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Map as JsonMap, Value as JsonValue, json};
use sonde::HandlerId;
use sonde::mask::REDACTED;
use tower::ServiceExt;

use super::*;
use crate::access::TokenGate;
use crate::config::normalize_mount;
use crate::page::{Context, PageError, PageRequest};
use crate::pages::settings::SettingsPage;

const TOKEN: &str = "test-admin-token";

struct EchoPage;

#[async_trait]
impl DiagnosticPage for EchoPage {
    fn title(&self) -> &'static str {
        "Echo"
    }

    fn doc(&self) -> Option<&'static str> {
        Some("Echoes the request back")
    }

    async fn context(&self, request: &PageRequest) -> Result<Context, PageError> {
        let mut context = Context::new();
        context.insert("app_name".into(), request.app_name.clone().into());
        context.insert("slug".into(), request.slug.clone().into());
        context.insert("query".into(), request.query.clone().into());
        Ok(context)
    }
}

struct FailingPage;

#[async_trait]
impl DiagnosticPage for FailingPage {
    fn title(&self) -> &'static str {
        "Failing"
    }

    async fn context(&self, _request: &PageRequest) -> Result<Context, PageError> {
        Err(PageError::Other("database unreachable".into()))
    }
}

struct PanickingPage;

#[async_trait]
impl DiagnosticPage for PanickingPage {
    fn title(&self) -> &'static str {
        "Panicking"
    }

    async fn context(&self, _request: &PageRequest) -> Result<Context, PageError> {
        panic!("page bug");
    }
}

struct TeapotPage;

#[async_trait]
impl DiagnosticPage for TeapotPage {
    fn title(&self) -> &'static str {
        "Teapot"
    }

    async fn context(&self, _request: &PageRequest) -> Result<Context, PageError> {
        Ok(Context::new())
    }

    async fn handle(&self, _request: PageRequest) -> Result<Response, PageError> {
        Ok((StatusCode::IM_A_TEAPOT, "short and stout").into_response())
    }
}

fn config(mount: &str, settings: JsonValue) -> Config {
    Config {
        http_addr: "127.0.0.1:0".into(),
        mount: normalize_mount(mount),
        admin_token: Some(TOKEN.into()),
        static_root: None,
        settings: settings.as_object().cloned().unwrap_or_default(),
    }
}

fn discovered() -> Discovered {
    let mut discovered = Discovered::empty();
    let pages: [(&str, &str, Option<&str>, Arc<dyn DiagnosticPage>); 6] = [
        ("ops::diagnostic", "EchoPage", Some("Echo"), Arc::new(EchoPage)),
        ("ops::diagnostic", "FailingPage", Some("Failing"), Arc::new(FailingPage)),
        ("ops::diagnostic", "PanickingPage", Some("Panicking"), Arc::new(PanickingPage)),
        ("ops::diagnostic", "TeapotPage", Some("Teapot"), Arc::new(TeapotPage)),
        ("ops::diagnostic", "QuietPage", None, Arc::new(EchoPage)),
        ("billing::diagnostic", "SettingsPage", Some("Settings"), Arc::new(SettingsPage)),
    ];
    let slugs = ["echo", "failing", "panicking", "teapot", "quiet", "settings"];
    for ((module, name, link_name, page), slug) in pages.into_iter().zip(slugs) {
        discovered.register_page(HandlerId::new(module, name), slug, link_name, page);
    }
    discovered
}

fn router_with(discovered: Discovered, config: Config) -> Router {
    let gate = Arc::new(TokenGate::new(config.admin_token.clone()));
    build_router(AppState::new(discovered, gate, config))
}

fn router() -> Router {
    router_with(discovered(), config("/diagnostic", json!({})))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .expect("request")
}

fn get_json(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .expect("request")
}

async fn body_json(response: Response) -> JsonValue {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn assert_redirects_to_index(response: &Response, index: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some(index)
    );
}

#[tokio::test]
async fn requests_without_the_token_are_forbidden() {
    for uri in ["/diagnostic/", "/diagnostic/ops/echo/", "/diagnostic/ops/missing/"] {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = router().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    let request = Request::builder()
        .uri("/diagnostic/")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .expect("request");
    let response = router().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        json!({"error": "superuser privileges required"})
    );
}

#[tokio::test]
async fn index_lists_reachable_pages_sorted_by_key() {
    let response = router()
        .oneshot(get_json("/diagnostic/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["title"], "Diagnostic Page Registry");

    let keys: Vec<&str> = listing["entries"]
        .as_array()
        .expect("entries")
        .iter()
        .filter_map(|entry| entry["key"].as_str())
        .collect();
    // `ops-quiet` has no link name and is left out.
    assert_eq!(
        keys,
        ["billing-settings", "ops-echo", "ops-failing", "ops-panicking", "ops-teapot"]
    );

    let echo = &listing["entries"][1]["entry"];
    assert_eq!(echo["slug"], "echo");
    assert_eq!(echo["app_name"], "ops");
    assert_eq!(echo["link_name"], "Echo");
    assert_eq!(echo["doc"], "Echoes the request back");
}

#[tokio::test]
async fn index_renders_html_by_default() {
    let response = router().oneshot(get("/diagnostic/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Diagnostic Page Registry</h1>"));
    assert!(html.contains("<a href=\"/diagnostic/ops/echo/\">Echo</a>"));
    assert!(!html.contains("/diagnostic/ops/quiet/"));
}

#[tokio::test]
async fn index_is_also_served_without_trailing_slash() {
    let response = router().oneshot(get("/diagnostic")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn index_leaves_out_pages_whose_handler_is_gone() {
    let mut discovered = discovered();
    discovered
        .pages
        .remove(&HandlerId::new("ops::diagnostic", "EchoPage"));
    let router = router_with(discovered, config("/diagnostic", json!({})));

    let listing = body_json(
        router
            .oneshot(get_json("/diagnostic/"))
            .await
            .expect("response"),
    )
    .await;
    let keys: Vec<&str> = listing["entries"]
        .as_array()
        .expect("entries")
        .iter()
        .filter_map(|entry| entry["key"].as_str())
        .collect();
    assert!(!keys.contains(&"ops-echo"));
    assert!(keys.contains(&"ops-teapot"));
}

#[tokio::test]
async fn dispatch_reaches_the_registered_page() {
    let response = router()
        .oneshot(get_json("/diagnostic/ops/echo/?verbose=1&x=2"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "app_name": "ops",
            "slug": "echo",
            "query": "verbose=1&x=2",
            "page_title": "Echo",
        })
    );
}

#[tokio::test]
async fn dispatch_renders_html_by_default() {
    let response = router()
        .oneshot(get("/diagnostic/ops/echo/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Echo</h1>"));
    assert!(html.contains("<a href=\"/diagnostic/\">Diagnostic index</a>"));
}

#[tokio::test]
async fn dispatch_keeps_the_page_response() {
    let response = router()
        .oneshot(get("/diagnostic/ops/teapot/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body_text(response).await, "short and stout");
}

#[tokio::test]
async fn unregistered_pair_redirects_to_index() {
    let response = router()
        .oneshot(get("/diagnostic/ops/payroll/"))
        .await
        .expect("response");
    assert_redirects_to_index(&response, "/diagnostic/");
}

#[tokio::test]
async fn invalid_segments_redirect_to_index() {
    for uri in ["/diagnostic/o.ps/echo/", "/diagnostic/ops/ec%20ho/", "/diagnostic/ops/%FF/"] {
        let response = router().oneshot(get(uri)).await.expect("response");
        assert_redirects_to_index(&response, "/diagnostic/");
    }
}

#[tokio::test]
async fn removed_handler_redirects_to_index() {
    let mut discovered = discovered();
    discovered
        .pages
        .remove(&HandlerId::new("ops::diagnostic", "EchoPage"));
    let router = router_with(discovered, config("/diagnostic", json!({})));

    let response = router
        .oneshot(get("/diagnostic/ops/echo/"))
        .await
        .expect("response");
    assert_redirects_to_index(&response, "/diagnostic/");
}

#[tokio::test]
async fn failing_page_redirects_to_index() {
    let response = router()
        .oneshot(get("/diagnostic/ops/failing/"))
        .await
        .expect("response");
    assert_redirects_to_index(&response, "/diagnostic/");
}

#[tokio::test]
async fn panicking_page_redirects_to_index() {
    let response = router()
        .oneshot(get("/diagnostic/ops/panicking/"))
        .await
        .expect("response");
    assert_redirects_to_index(&response, "/diagnostic/");
}

#[tokio::test]
async fn root_mount_serves_both_routes() {
    let router = router_with(discovered(), config("/", json!({})));
    let response = router
        .clone()
        .oneshot(get("/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get("/ops/payroll/"))
        .await
        .expect("response");
    assert_redirects_to_index(&response, "/");
}

#[tokio::test]
async fn settings_page_masks_secrets() {
    let settings = json!({
        "DATABASE_URL": "postgres://app:hunter2@db:5432/app",
        "API_KEY": "k-123",
        "PASSWORD_HASHERS": ["argon2", "bcrypt"],
        "DEBUG": false,
        "lowercase": "not a setting",
    });
    let router = router_with(discovered(), config("/diagnostic", settings));
    let response = router
        .oneshot(get_json("/diagnostic/billing/settings/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let context = body_json(response).await;
    let settings: &JsonMap<String, JsonValue> =
        context["settings"].as_object().expect("settings object");
    assert_eq!(settings["DATABASE_URL"], "postgres://app:******@db:5432/app");
    assert_eq!(settings["API_KEY"], REDACTED);
    assert_eq!(settings["PASSWORD_HASHERS"], json!(["argon2", "bcrypt"]));
    assert_eq!(settings["DEBUG"], false);
    assert_eq!(settings["ADMIN_TOKEN"], REDACTED);
    assert_eq!(settings["MOUNT_PREFIX"], "/diagnostic");
    assert!(!settings.contains_key("lowercase"));
}
