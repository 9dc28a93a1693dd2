use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use careshare_db::now_timestamp;

use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, SessionSettings, db_call};

pub const SESSION_COOKIE: &str = "careshare_session";

/// Signed contents of the session cookie. `sid` names the server-side
/// session row; deleting that row revokes the cookie even before `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub sid: Uuid,
    pub exp: usize,
}

/// Identity resolved from a live session, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
    pub orphanage_id: Option<Uuid>,
}

impl CurrentUser {
    /// The orphanage this account manages.
    pub fn orphanage(&self) -> Result<Uuid, ApiError> {
        self.orphanage_id
            .ok_or(ApiError::Unauthorized { resource: "orphanage" })
    }
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    session_id: Uuid,
    expires_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let claims = SessionClaims {
        sub: user_id,
        sid: session_id,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Option<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn session_cookie(token: &str, settings: &SessionSettings) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        settings.ttl.num_seconds(),
        if settings.cookie_secure { "; Secure" } else { "" }
    )
}

pub fn clear_session_cookie(settings: &SessionSettings) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        SESSION_COOKIE,
        if settings.cookie_secure { "; Secure" } else { "" }
    )
}

/// Extract the session cookie value from the Cookie header(s).
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Resolve the session cookie against the sessions table.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = session_token(req.headers())
        .and_then(|token| decode_token(&state.session.secret, token))
        .ok_or(ApiError::Unauthenticated)?;

    let sid = claims.sid.to_string();
    let uid = claims.sub.to_string();
    let now = now_timestamp();
    let session = db_call(&state, move |db| db.get_session_user(&sid, &uid, &now))
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    req.extensions_mut().insert(CurrentUser {
        user_id: convert::id(&session.user_id),
        email: session.email,
        orphanage_id: session.orphanage_id.as_deref().map(convert::id),
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn settings() -> SessionSettings {
        SessionSettings {
            secret: "a-test-secret-that-is-long-enough-for-hs256".into(),
            ttl: chrono::Duration::hours(2),
            cookie_secure: true,
        }
    }

    #[test]
    fn token_round_trips_with_the_same_secret_only() {
        let user = Uuid::new_v4();
        let sid = Uuid::new_v4();
        let token = issue_token(
            &settings().secret,
            user,
            sid,
            Utc::now() + chrono::Duration::hours(1),
        )
        .unwrap();

        let claims = decode_token(&settings().secret, &token).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.sid, sid);
        assert!(decode_token("another-secret-entirely-different-value", &token).is_none());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue_token(
            &settings().secret,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now() - chrono::Duration::hours(1),
        )
        .unwrap();
        assert!(decode_token(&settings().secret, &token).is_none());
    }

    #[test]
    fn session_token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; careshare_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("careshare_session="));
        assert_eq!(session_token(&empty), None);
    }

    #[test]
    fn cookies_carry_expected_attributes() {
        let cookie = session_cookie("tok", &settings());
        assert!(cookie.starts_with("careshare_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=7200"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie(&settings()).contains("Max-Age=0"));
    }
}
