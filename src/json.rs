//! A JSON body extractor whose rejections are reported as [Error]s.

use axum::extract::FromRequest;

use crate::Error;

/// Works like [axum::Json], except a malformed body produces
/// [Error::InvalidRequestBody] so that clients always get a JSON error object.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
