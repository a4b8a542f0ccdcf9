use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sonde::mask::mask_map;

use crate::page::{Context, DiagnosticPage, PageError, PageRequest};
use crate::pages::code_running;

pub struct EnvironmentPage;

crate::diagnostic!(EnvironmentPage, slug: "environment", link_name: "Environment");

#[async_trait]
impl DiagnosticPage for EnvironmentPage {
    fn title(&self) -> &'static str {
        "Environment Diagnostic"
    }

    fn doc(&self) -> Option<&'static str> {
        Some("Show the OS environment")
    }

    async fn context(&self, _request: &PageRequest) -> Result<Context, PageError> {
        Ok(environment_context().await)
    }
}

/// Code-running details plus the masked process environment under `environ`.
pub async fn environment_context() -> Context {
    let mut context = code_running::context().await;
    context.insert("environ".into(), JsonValue::Object(masked_environment()));
    context
}

pub fn masked_environment() -> serde_json::Map<String, JsonValue> {
    mask_map(std::env::vars_os().map(|(key, value)| {
        (
            key.to_string_lossy().into_owned(),
            value.to_string_lossy().into_owned(),
        )
    }))
}
