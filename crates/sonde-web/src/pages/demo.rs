use async_trait::async_trait;

use crate::page::{Context, DiagnosticPage, PageError, PageRequest};

pub struct DemoPage;

crate::diagnostic!(DemoPage, slug: "demo", link_name: "Demo");

#[async_trait]
impl DiagnosticPage for DemoPage {
    fn title(&self) -> &'static str {
        "Demo Diagnostic"
    }

    fn doc(&self) -> Option<&'static str> {
        Some("Demo system settings and controls")
    }

    async fn context(&self, request: &PageRequest) -> Result<Context, PageError> {
        let demo = request
            .config
            .effective_settings()
            .remove("DEMO")
            .ok_or_else(|| PageError::Other("DEMO setting is not configured".into()))?;
        let mut context = Context::new();
        context.insert("demo".into(), demo);
        Ok(context)
    }
}
