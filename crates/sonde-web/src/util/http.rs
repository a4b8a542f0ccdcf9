use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use facet::Facet;
use sonde_types::ApiError;

pub fn json_ok<T>(value: &T) -> Response
where
    T: for<'facet> Facet<'facet>,
{
    json_with_status(StatusCode::OK, value)
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    json_with_status(
        status,
        &ApiError {
            error: message.into(),
        },
    )
}

pub fn json_with_status<T>(status: StatusCode, value: &T) -> Response
where
    T: for<'facet> Facet<'facet>,
{
    match facet_json::to_string(value) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("json encode error: {error}"),
        )
            .into_response(),
    }
}

/// `302 Found` pointing at `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// True when the client asked for JSON rather than HTML.
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("application/json"))
}
