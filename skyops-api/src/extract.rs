use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body whose rejection renders as an `invalid_data` error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string whose rejection renders as an `invalid_data` error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
