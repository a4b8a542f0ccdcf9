use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use sonde::build_listing;
use sonde_types::{IndexListing, KeyedIndexEntry};

use crate::app::AppState;
use crate::render;
use crate::util::http::{json_ok, wants_json};

pub const INDEX_TITLE: &str = "Diagnostic Page Registry";

pub fn listing(state: &AppState) -> IndexListing {
    let entries = build_listing(&state.registry, &*state.pages)
        .into_iter()
        .map(|(key, entry)| KeyedIndexEntry { key, entry })
        .collect();
    IndexListing {
        title: INDEX_TITLE.to_string(),
        entries,
    }
}

/// `GET {mount}/`
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let listing = listing(&state);
    if wants_json(&headers) {
        json_ok(&listing)
    } else {
        Html(render::index(&listing, &state.config.index_path())).into_response()
    }
}
