// src/middleware/auth.rs
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::server::AppState;

/// Attaches an [`AuthContext`](crate::auth::AuthContext) to every request.
///
/// Does not reject anything: handlers that need a user call
/// `AuthContext::require_user`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = state.authenticator.authenticate(request.headers());
    request.extensions_mut().insert(auth);

    next.run(request).await
}
