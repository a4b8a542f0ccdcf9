use std::collections::BTreeMap;

use sonde_types::IndexEntry;
use tracing::debug;

use crate::handler::{Documented, Resolver};
use crate::registry::Registry;
use crate::slug::{RegistryKey, is_slug, slugify, slugify_ascii};

/// Builds the index listing from `registry`, keyed by registry key.
///
/// Entries are visited in key order. An entry is left out when its handler
/// no longer resolves, when its slug or ASCII-folded application name does
/// not survive re-slugification, or when it was registered without a
/// `link_name`.
pub fn build_listing<R>(registry: &Registry, resolver: &R) -> BTreeMap<String, IndexEntry>
where
    R: Resolver,
    R::Handler: Documented,
{
    let mut listing = BTreeMap::new();

    for (key, registration) in registry.iter_sorted() {
        let handler = match resolver.resolve(&registration.handler) {
            Ok(handler) => handler,
            Err(error) => {
                debug!(%key, %error, "leaving unresolvable diagnostic out of the index");
                continue;
            }
        };
        let Some(app_name) = registration.app_name.as_deref() else {
            continue;
        };

        let slug = slugify(&registration.slug);
        let app_name_slug = slugify_ascii(app_name);
        if !is_slug(&slug) || !is_slug(&app_name_slug) {
            continue;
        }
        let Some(link_name) = registration.link_name() else {
            continue;
        };

        debug!(app_name, %slug, "adding diagnostic to index");
        let listing_key = RegistryKey::derive(Some(app_name), &registration.slug);
        listing
            .entry(listing_key.to_string())
            .or_insert_with(|| IndexEntry {
                doc: handler.doc().map(str::to_string),
                slug,
                app_name: app_name_slug,
                link_name: link_name.to_string(),
            });
    }

    listing
}
