use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sonde::mask::mask_sensitive;

use crate::page::{Context, DiagnosticPage, PageError, PageRequest};
use crate::pages::code_running;

pub struct SettingsPage;

crate::diagnostic!(SettingsPage, slug: "settings", link_name: "Settings");

#[async_trait]
impl DiagnosticPage for SettingsPage {
    fn title(&self) -> &'static str {
        "Settings Diagnostic"
    }

    fn doc(&self) -> Option<&'static str> {
        Some("Server settings, with secrets masked")
    }

    async fn context(&self, request: &PageRequest) -> Result<Context, PageError> {
        let settings: Context = request
            .config
            .effective_settings()
            .into_iter()
            .filter(|(key, _)| is_setting_name(key))
            .map(|(key, value)| {
                let masked = mask_sensitive(&key, &value);
                (key, masked)
            })
            .collect();
        let mut context = code_running::context().await;
        context.insert("settings".into(), JsonValue::Object(settings));
        Ok(context)
    }
}

/// Only upper-case names count as settings.
fn is_setting_name(key: &str) -> bool {
    key.chars().any(char::is_uppercase) && !key.chars().any(char::is_lowercase)
}
