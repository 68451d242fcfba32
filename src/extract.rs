// Request extractors whose rejections use the ledger's JSON error body
//
// axum's own extractors answer malformed input with a plain-text body.
// These wrap them so every failure a client sees has the same
// `{success, kind, error, temporary}` shape.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::LedgerError;

/// `axum::Json` with ledger-shaped rejections
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(LedgerError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with ledger-shaped rejections
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(LedgerError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` with ledger-shaped rejections
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(LedgerError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for LedgerError {
    fn from(rejection: JsonRejection) -> Self {
        LedgerError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for LedgerError {
    fn from(rejection: PathRejection) -> Self {
        LedgerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for LedgerError {
    fn from(rejection: QueryRejection) -> Self {
        LedgerError::BadRequest(rejection.body_text())
    }
}

