use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::error::ApiError;

pub const CALLER_HEADER: &str = "x-whispr-id";

/// Self-asserted device id of the caller, from the `x-whispr-id` header or the
/// `userId` query parameter. Nothing verifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallerQuery {
    user_id: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A blank header counts as absent
        let from_header = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(non_blank);

        from_header
            .or_else(|| {
                Query::<CallerQuery>::try_from_uri(&parts.uri)
                    .ok()
                    .and_then(|Query(q)| q.user_id)
                    .as_deref()
                    .and_then(non_blank)
            })
            .map(CallerId)
            .ok_or(ApiError::MissingCaller)
    }
}

fn non_blank(id: &str) -> Option<String> {
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}
