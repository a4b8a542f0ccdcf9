use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::app::AppState;
use crate::util::http::json_error;

pub const TOKEN_HEADER: &str = "x-sonde-token";

/// Decides whether a request carries superuser privilege.
pub trait AccessGate: Send + Sync + 'static {
    fn allows(&self, headers: &HeaderMap) -> bool;
}

/// Grants access to requests presenting the configured admin token, either
/// as `Authorization: Bearer <token>` (scheme matched case-insensitively) or
/// in the `x-sonde-token` header.
/// Without a configured token nothing is allowed.
pub struct TokenGate {
    token: Option<String>,
}

impl TokenGate {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl AccessGate for TokenGate {
    fn allows(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return false;
        };
        presented_tokens(headers)
            .any(|token| bool::from(expected.as_bytes().ct_eq(token.as_bytes())))
    }
}

fn presented_tokens(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    let bearer = headers
        .get_all(header::AUTHORIZATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| {
            let (scheme, token) = value.trim_start().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(token)
        })
        .map(str::trim);
    let explicit = headers
        .get_all(TOKEN_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::trim);
    bearer.chain(explicit)
}

/// Route middleware rejecting unprivileged requests before any diagnostic
/// logic runs.
pub async fn require_superuser(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.gate.allows(request.headers()) {
        return next.run(request).await;
    }
    warn!(path = %request.uri().path(), "rejected unprivileged diagnostic request");
    json_error(StatusCode::FORBIDDEN, "superuser privileges required")
}
