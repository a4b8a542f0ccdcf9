use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::handler::HandlerId;
use crate::slug::{RegistryKey, is_slug, slugify};

/// Registration record for one diagnostic page. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub handler: HandlerId,
    pub app_name: Option<String>,
    /// Slugified form of the slug supplied at registration.
    pub slug: String,
    pub args: Vec<JsonValue>,
    pub kwargs: JsonMap<String, JsonValue>,
}

impl Registration {
    pub fn link_name(&self) -> Option<&str> {
        self.kwargs.get("link_name").and_then(JsonValue::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationRejected {
    #[error("registration of {0} has no string `slug` argument")]
    MissingSlug(HandlerId),
    #[error("slug {slug:?} of {handler} is not a valid slug (key {key})")]
    InvalidSlug {
        handler: HandlerId,
        slug: String,
        key: RegistryKey,
    },
    #[error("registration of {0} derives an empty registry key")]
    EmptyKey(HandlerId),
    #[error("registry key {key} is already taken; dropping {handler}")]
    Duplicate { handler: HandlerId, key: RegistryKey },
}

/// Mapping from [`RegistryKey`] to [`Registration`].
///
/// Populated once during startup discovery and shared read-only afterwards.
/// The first registration for a key wins; later ones are dropped.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<RegistryKey, Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` and returns the key it was stored under.
    ///
    /// `kwargs` must carry a string `slug`; `link_name` is read later by the
    /// index but is not required here.
    pub fn try_register(
        &mut self,
        handler: HandlerId,
        args: Vec<JsonValue>,
        kwargs: JsonMap<String, JsonValue>,
    ) -> Result<RegistryKey, RegistrationRejected> {
        let Some(slug) = kwargs.get("slug").and_then(JsonValue::as_str) else {
            return Err(RegistrationRejected::MissingSlug(handler));
        };
        let app_name = handler.app_name().map(str::to_string);
        let key = RegistryKey::derive(app_name.as_deref(), slug);

        if !is_slug(slug) {
            return Err(RegistrationRejected::InvalidSlug {
                handler,
                slug: slug.to_string(),
                key,
            });
        }
        if key.is_empty() {
            return Err(RegistrationRejected::EmptyKey(handler));
        }
        if self.entries.contains_key(&key) {
            return Err(RegistrationRejected::Duplicate { handler, key });
        }

        let slug = slugify(slug);
        self.entries.insert(
            key.clone(),
            Registration {
                handler,
                app_name,
                slug,
                args,
                kwargs,
            },
        );
        Ok(key)
    }

    /// Registers `id` as a side effect and hands `handler` back untouched.
    ///
    /// Rejections are logged at debug level and otherwise ignored.
    pub fn register<T>(
        &mut self,
        handler: T,
        id: HandlerId,
        args: Vec<JsonValue>,
        kwargs: JsonMap<String, JsonValue>,
    ) -> T {
        match self.try_register(id, args, kwargs) {
            Ok(key) => debug!(%key, "registered diagnostic"),
            Err(rejected) => debug!(%rejected, "unable to register diagnostic"),
        }
        handler
    }

    pub fn get(&self, key: &RegistryKey) -> Option<&Registration> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter_sorted(&self) -> Vec<(&RegistryKey, &Registration)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
