//! Diagnostic page registry for admin consoles.
//!
//! A diagnostic page is registered once, at startup, under an owning
//! application name and a slug. The [`Registry`] maps the derived
//! [`RegistryKey`] to a [`Registration`] record; a [`Resolver`] turns the
//! record's [`HandlerId`] back into a live handler when a request arrives or
//! when the index is built. Nothing here knows about HTTP: `sonde-web`
//! mounts the dispatcher and index routes on top.
//!
//! [`mask`] holds the redaction helpers pages use before displaying settings
//! or environment variables.

pub mod handler;
pub mod index;
pub mod mask;
pub mod registry;
pub mod slug;

pub use handler::{Documented, HandlerId, HandlerTable, ResolveError, Resolver};
pub use index::build_listing;
pub use registry::{Registration, RegistrationRejected, Registry};
pub use slug::{RegistryKey, is_slug, slugify, slugify_ascii};
