use std::io::ErrorKind;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::page::{Context, DiagnosticPage, PageError, PageRequest};

pub const MANIFEST_FILE: &str = "staticfiles.json";

pub struct ManifestPage;

crate::diagnostic!(ManifestPage, slug: "manifest", link_name: "Static Manifest");

#[async_trait]
impl DiagnosticPage for ManifestPage {
    fn title(&self) -> &'static str {
        "Static Manifest Diagnostic"
    }

    fn doc(&self) -> Option<&'static str> {
        Some("Show the static asset manifest")
    }

    async fn context(&self, request: &PageRequest) -> Result<Context, PageError> {
        let settings = request.config.effective_settings();
        let mut context = Context::new();

        let staticfiles = match settings.get("STATIC_ROOT").and_then(JsonValue::as_str) {
            Some(root) if !root.is_empty() => format!("{root}/{MANIFEST_FILE}"),
            _ => String::new(),
        };
        context.insert("staticfiles".into(), staticfiles.clone().into());

        for (key, value) in &settings {
            let folded = key.to_lowercase();
            if folded.contains("static") {
                context.insert(folded, value.clone());
            }
        }
        context.insert(
            "staticfiles_storage".into(),
            settings
                .get("STORAGES")
                .and_then(|storages| storages.get("staticfiles"))
                .cloned()
                .unwrap_or(JsonValue::Null),
        );

        match tokio::fs::read_to_string(&staticfiles).await {
            Ok(text) => {
                let manifest: JsonValue = serde_json::from_str(&text)?;
                context.insert("manifest".into(), manifest);
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                context.insert("error".into(), format!("{error}: {staticfiles:?}").into());
            }
            Err(error) => return Err(error.into()),
        }
        Ok(context)
    }
}
