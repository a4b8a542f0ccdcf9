use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as JsonValue};
use sonde::{HandlerId, HandlerTable, Registry};
use tracing::{debug, info};

use crate::page::{DiagnosticPage, DiagnosticReg};

/// Registry and handler table produced by startup discovery.
pub struct Discovered {
    pub registry: Registry,
    pub pages: HandlerTable<dyn DiagnosticPage>,
}

impl Discovered {
    pub fn empty() -> Self {
        Self {
            registry: Registry::new(),
            pages: HandlerTable::new(),
        }
    }

    /// Registers `page` under `id`. The page stays resolvable by id even
    /// when the registry drops the registration.
    pub fn register_page(
        &mut self,
        id: HandlerId,
        slug: &str,
        link_name: Option<&str>,
        page: Arc<dyn DiagnosticPage>,
    ) {
        let mut kwargs = JsonMap::new();
        kwargs.insert("slug".into(), JsonValue::String(slug.to_string()));
        if let Some(link_name) = link_name {
            kwargs.insert("link_name".into(), JsonValue::String(link_name.to_string()));
        }
        let page = self.registry.register(page, id.clone(), Vec::new(), kwargs);
        self.pages.insert(id, page);
    }
}

impl Default for Discovered {
    fn default() -> Self {
        Self::empty()
    }
}

/// Collects every page announced with [`diagnostic!`](crate::diagnostic).
///
/// Call once at startup, before serving. Announcements are visited in
/// `(module, name)` order so the first-registered-wins rule does not depend
/// on link order.
pub fn discover() -> Discovered {
    register_announced(inventory::iter::<DiagnosticReg>)
}

fn register_announced<'a>(
    announcements: impl IntoIterator<Item = &'a DiagnosticReg>,
) -> Discovered {
    let mut announced: Vec<&DiagnosticReg> = announcements.into_iter().collect();
    announced.sort_by_key(|reg| (reg.module, reg.name));

    let mut discovered = Discovered::empty();
    for reg in announced {
        debug!(
            module = reg.module,
            name = reg.name,
            slug = reg.slug,
            "discovered diagnostic"
        );
        discovered.register_page(
            reg.handler_id(),
            reg.slug,
            Some(reg.link_name),
            (reg.make)(),
        );
    }
    info!(pages = discovered.registry.len(), "diagnostic discovery complete");
    discovered
}
