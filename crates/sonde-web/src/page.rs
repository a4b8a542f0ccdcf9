use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Map as JsonMap, Value as JsonValue};
use sonde::{Documented, HandlerId};

use crate::config::Config;
use crate::render;
use crate::util::http::wants_json;

pub type Context = JsonMap<String, JsonValue>;

/// Everything a page sees of the request that reached it.
#[derive(Clone)]
pub struct PageRequest {
    pub app_name: String,
    pub slug: String,
    /// Raw query string, passed through untouched.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub config: Arc<Config>,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// An admin-only diagnostic view.
///
/// Most pages only build a [`Context`]; the default [`handle`] renders it as
/// HTML, or as JSON when the client sends `Accept: application/json`.
///
/// [`handle`]: DiagnosticPage::handle
#[async_trait]
pub trait DiagnosticPage: Send + Sync + 'static {
    fn title(&self) -> &'static str;

    fn doc(&self) -> Option<&'static str> {
        None
    }

    async fn context(&self, request: &PageRequest) -> Result<Context, PageError>;

    async fn handle(&self, request: PageRequest) -> Result<Response, PageError> {
        let context = self.context(&request).await?;
        Ok(render_context(self.title(), &request, context))
    }
}

impl Documented for dyn DiagnosticPage {
    fn doc(&self) -> Option<&str> {
        DiagnosticPage::doc(self)
    }
}

pub fn render_context(title: &str, request: &PageRequest, mut context: Context) -> Response {
    if wants_json(&request.headers) {
        context.insert("page_title".into(), title.into());
        Json(JsonValue::Object(context)).into_response()
    } else {
        Html(render::page(title, &request.config.index_path(), &context)).into_response()
    }
}

/// Static registration emitted by [`diagnostic!`](crate::diagnostic).
pub struct DiagnosticReg {
    pub name: &'static str,
    pub module: &'static str,
    pub slug: &'static str,
    pub link_name: &'static str,
    pub make: fn() -> Arc<dyn DiagnosticPage>,
}

inventory::collect!(DiagnosticReg);

impl DiagnosticReg {
    pub fn handler_id(&self) -> HandlerId {
        HandlerId::new(self.module, self.name)
    }
}

/// Announces a unit-struct page for startup discovery.
///
/// ```ignore
/// pub struct LedgerPage;
/// sonde_web::diagnostic!(LedgerPage, slug: "ledger", link_name: "Ledger");
/// ```
#[macro_export]
macro_rules! diagnostic {
    ($page:ident, slug: $slug:expr, link_name: $link_name:expr $(,)?) => {
        $crate::inventory::submit! {
            $crate::page::DiagnosticReg {
                name: stringify!($page),
                module: module_path!(),
                slug: $slug,
                link_name: $link_name,
                make: || -> ::std::sync::Arc<dyn $crate::page::DiagnosticPage> {
                    ::std::sync::Arc::new($page)
                },
            }
        }
    };
}
