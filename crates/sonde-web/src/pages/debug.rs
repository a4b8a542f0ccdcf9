use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::page::{Context, DiagnosticPage, PageError, PageRequest};
use crate::pages::code_running;

pub struct DebugPage;

crate::diagnostic!(DebugPage, slug: "debug", link_name: "Debug");

#[async_trait]
impl DiagnosticPage for DebugPage {
    fn title(&self) -> &'static str {
        "Debug Diagnostic"
    }

    fn doc(&self) -> Option<&'static str> {
        Some("Pretty-printed dump of the page rendering context")
    }

    async fn context(&self, request: &PageRequest) -> Result<Context, PageError> {
        let mut context = code_running::context().await;
        context.insert("app_name".into(), request.app_name.clone().into());
        context.insert("slug".into(), request.slug.clone().into());
        context.insert("query".into(), request.query.clone().into());
        let dump = serde_json::to_string_pretty(&JsonValue::Object(context.clone()))?;
        context.insert("debug_context".into(), dump.into());
        Ok(context)
    }
}
