//! Who is calling.
//!
//! The session token travels either in the `session` cookie set by the
//! institute's sign-in page or as an `Authorization: Bearer` header. Handlers
//! take a [`CurrentSession`] and call [`require_admin`] before any write; this
//! server-side check is the access boundary, the frontend's role gate only
//! hides controls.

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::StoreError;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use async_trait::async_trait;
use common::model::session::Session;
use futures_util::future::LocalBoxFuture;

pub const SESSION_COOKIE: &str = "session";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a session token; `None` when the token is unknown.
    async fn current_session(&self, token: &str) -> Result<Option<Session>, StoreError>;
}

/// The caller's session, `None` for anonymous visitors.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl FromRequest for CurrentSession {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = session_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let (Some(token), Some(state)) = (token, state) else {
                return Ok(CurrentSession(None));
            };
            let session = state.identity.current_session(&token).await?;
            Ok(CurrentSession(session))
        })
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(bearer) = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        let bearer = bearer.trim();
        if !bearer.is_empty() {
            return Some(bearer.to_string());
        }
    }
    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Turns the caller into an administrator session or a 401/403.
pub fn require_admin(session: CurrentSession) -> Result<Session, ApiError> {
    match session.0 {
        None => Err(ApiError::Unauthorized("Please sign in".to_string())),
        Some(s) if !s.is_admin() => Err(ApiError::Forbidden(
            "Administrator access required".to_string(),
        )),
        Some(s) => Ok(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use common::model::session::Role;

    fn session(role: Role) -> Session {
        Session {
            user_id: "u1".to_string(),
            email: "u1@institute.test".to_string(),
            role,
        }
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc"))
            .cookie(Cookie::new(SESSION_COOKIE, "cookie-token"))
            .to_http_request();
        assert_eq!(session_token(&req).as_deref(), Some("abc"));

        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "cookie-token"))
            .to_http_request();
        assert_eq!(session_token(&req).as_deref(), Some("cookie-token"));

        assert_eq!(session_token(&TestRequest::default().to_http_request()), None);
    }

    #[test]
    fn only_admins_pass() {
        assert!(matches!(
            require_admin(CurrentSession(None)),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            require_admin(CurrentSession(Some(session(Role::Student)))),
            Err(ApiError::Forbidden(_))
        ));
        assert!(require_admin(CurrentSession(Some(session(Role::Admin)))).is_ok());
    }
}
