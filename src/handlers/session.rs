// src/handlers/session.rs
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::error::Result;
use crate::middleware::{RequestId, RequestLogger};

/// GET /api/v1/whoami
pub async fn whoami(
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
    RequestLogger(logger): RequestLogger,
) -> Json<Value> {
    if let Some(logger) = &logger {
        logger.debug(
            "Resolved caller identity",
            json!({ "authSource": auth.auth_source }),
        );
    }

    Json(json!({
        "requestId": request_id.as_str(),
        "auth": auth,
    }))
}

/// GET /api/v1/private
pub async fn private_profile(
    Extension(auth): Extension<AuthContext>,
    RequestLogger(logger): RequestLogger,
) -> Result<Json<Value>> {
    let user_id = auth.require_user()?;

    if let Some(logger) = &logger {
        logger.info("Private profile served", json!({ "userId": user_id }));
    }

    Ok(Json(json!({
        "userId": user_id,
        "userName": auth.user_name,
    })))
}
