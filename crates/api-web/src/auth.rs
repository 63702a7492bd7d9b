//! Request authentication boundary.
//!
//! Session issuance and verification live outside this service; by the time
//! a request arrives, the fronting proxy has resolved the session and put
//! the subject id in `x-user-id`. This extractor only enforces presence.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    /// Auth subject id.
    pub id: String,
    /// Display name, when the proxy forwards one.
    pub name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|id| !id.is_empty())
            .ok_or(ApiError::Unauthenticated)?
            .to_string();

        let name = parts
            .headers
            .get("x-user-name")
            .and_then(|v| v.to_str().ok())
            .filter(|name| !name.is_empty())
            .unwrap_or("Creator")
            .to_string();

        Ok(Self { id, name })
    }
}
