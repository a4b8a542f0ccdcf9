use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, RawQuery, State};
use axum::http::HeaderMap;
use axum::response::Response;
use sonde::{HandlerId, Registry, RegistryKey, Resolver, is_slug};
use tracing::{debug, error};

use crate::app::AppState;
use crate::page::PageRequest;
use crate::util::http::found;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("path segments {app_name:?}/{slug:?} are not valid slugs")]
    InvalidSegment { app_name: String, slug: String },
    #[error("no diagnostic registered under {0}")]
    Miss(RegistryKey),
    #[error("diagnostic {key} points at {handler}, which cannot be resolved")]
    Unresolvable { key: RegistryKey, handler: HandlerId },
}

/// Maps the two URL segments to the handler registered under them.
pub fn resolve_target<R>(
    registry: &Registry,
    resolver: &R,
    app_name: &str,
    slug: &str,
) -> Result<Arc<R::Handler>, DispatchError>
where
    R: Resolver + ?Sized,
{
    if !is_slug(app_name) || !is_slug(slug) {
        return Err(DispatchError::InvalidSegment {
            app_name: app_name.to_string(),
            slug: slug.to_string(),
        });
    }
    let key = RegistryKey::derive(Some(app_name), slug);
    debug!(%key, "retrieving diagnostic entry");
    let Some(registration) = registry.get(&key) else {
        return Err(DispatchError::Miss(key));
    };
    resolver
        .resolve(&registration.handler)
        .map_err(|_| DispatchError::Unresolvable {
            key,
            handler: registration.handler.clone(),
        })
}

/// `GET {mount}/{app_name}/{slug}/`
///
/// Every failure, from a malformed segment to a page that panics, ends in a
/// redirect to the index.
pub async fn dispatch(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let index_path = state.config.index_path();
    let (app_name, slug) = match path {
        Ok(Path(segments)) => segments,
        Err(rejection) => {
            debug!(%rejection, "diagnostic path rejected");
            return found(&index_path);
        }
    };
    debug!(%app_name, %slug, "dispatching diagnostic");

    let page = match resolve_target(&state.registry, &*state.pages, &app_name, &slug) {
        Ok(page) => page,
        Err(error @ DispatchError::Unresolvable { .. }) => {
            error!(%error, "diagnostic handler resolution failed");
            return found(&index_path);
        }
        Err(error) => {
            debug!(%error, "no diagnostic for request");
            return found(&index_path);
        }
    };

    let request = PageRequest {
        app_name,
        slug,
        query,
        headers,
        config: state.config.clone(),
    };
    // A spawned task turns a panicking page into a JoinError instead of a
    // dropped connection.
    match tokio::spawn(async move { page.handle(request).await }).await {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => {
            error!(%error, "rendering diagnostic page resulted in error");
            found(&index_path)
        }
        Err(error) => {
            error!(%error, "diagnostic page task failed");
            found(&index_path)
        }
    }
}
