use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies a registered handler by the module that defines it and its
/// name within that module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId {
    pub owner_module: String,
    pub name: String,
}

impl HandlerId {
    pub fn new(owner_module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner_module: owner_module.into(),
            name: name.into(),
        }
    }

    /// Leading `::` segment of the owning module, or `None` when the module
    /// path is empty.
    pub fn app_name(&self) -> Option<&str> {
        self.owner_module
            .split("::")
            .next()
            .filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner_module, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("handler {0} is not available")]
    NotFound(HandlerId),
}

/// Turns a [`HandlerId`] into a live handler.
pub trait Resolver {
    type Handler: ?Sized;

    fn resolve(&self, id: &HandlerId) -> Result<Arc<Self::Handler>, ResolveError>;
}

/// Handlers that carry a documentation string for the index.
pub trait Documented {
    fn doc(&self) -> Option<&str>;
}

/// Typed handler lookup table.
pub struct HandlerTable<H: ?Sized> {
    handlers: HashMap<HandlerId, Arc<H>>,
}

impl<H: ?Sized> HandlerTable<H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Stores `handler` under `id`, returning the handler it replaced.
    pub fn insert(&mut self, id: HandlerId, handler: Arc<H>) -> Option<Arc<H>> {
        self.handlers.insert(id, handler)
    }

    pub fn remove(&mut self, id: &HandlerId) -> Option<Arc<H>> {
        self.handlers.remove(id)
    }

    pub fn contains(&self, id: &HandlerId) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: ?Sized> Default for HandlerTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> Resolver for HandlerTable<H> {
    type Handler = H;

    fn resolve(&self, id: &HandlerId) -> Result<Arc<H>, ResolveError> {
        self.handlers
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(id.clone()))
    }
}
