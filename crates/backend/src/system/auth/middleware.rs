use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::AuthError;
use crate::state::AppState;

/// Middleware that requires a valid bearer token. The verified principal is
/// stored in the request extensions for `CurrentUser`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let user = state.auth.authenticate(req.headers()).await?;

    // Add principal to request extensions for use in handlers
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
