use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

pub const EDIT_SECRET_HEADER: &str = "x-edit-secret";

/// Guards mutating routes: the request must carry an edit secret the
/// configured authorizer accepts.
pub async fn require_edit_secret(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let credential = req
        .headers()
        .get(EDIT_SECRET_HEADER)
        .and_then(|h| h.to_str().ok());

    if !state.authorizer.authorize(credential) {
        tracing::warn!(
            "Rejected {} {}: missing or invalid edit secret",
            req.method(),
            req.uri().path()
        );
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}
