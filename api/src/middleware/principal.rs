use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use validator::Validate;

use models::schemas::player::Principal;

use crate::error::ApiError;

/// The gateway in front of this service verifies the caller and injects the
/// identity as plain headers. This is the single place where those headers
/// become a typed `Principal`; handlers never look at headers themselves.
pub async fn principal(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let headers = req.headers();

    let id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i32>().ok());
    let username = headers
        .get("x-username")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let principal = match (id, username) {
        (Some(id), Some(username)) => Principal { id, username },
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "missing or malformed identity headers",
            ));
        }
    };
    principal.validate()?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
