use async_trait::async_trait;

use crate::page::{Context, DiagnosticPage, PageError, PageRequest};
use crate::pages::environment::environment_context;

pub struct DevopsPage;

crate::diagnostic!(DevopsPage, slug: "devops", link_name: "Devops");

#[async_trait]
impl DiagnosticPage for DevopsPage {
    fn title(&self) -> &'static str {
        "DevOps Diagnostic"
    }

    fn doc(&self) -> Option<&'static str> {
        Some("Integration tests externally provided services and common functionality")
    }

    async fn context(&self, _request: &PageRequest) -> Result<Context, PageError> {
        Ok(environment_context().await)
    }
}
