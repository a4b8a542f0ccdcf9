//! Authenticated diagnostic pages behind a single index.
//!
//! Pages implement [`page::DiagnosticPage`] and announce themselves with
//! [`diagnostic!`]. At startup [`discovery::discover`] collects every
//! announced page into a [`sonde::Registry`] plus a handler table, and
//! [`app::build_router`] mounts two routes under the configured prefix:
//!
//! - `GET {mount}/` lists every reachable page.
//! - `GET {mount}/{app_name}/{slug}/` dispatches to the page registered under
//!   that pair. Every failure redirects back to the index.
//!
//! Both routes sit behind the [`access::AccessGate`].

pub mod access;
pub mod app;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod index;
pub mod page;
pub mod pages;
pub mod render;
pub mod util;

#[doc(hidden)]
pub use inventory;
