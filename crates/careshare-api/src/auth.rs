use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use careshare_db::models::{NewOrphanage, RegisterOutcome};
use careshare_db::now_timestamp;
use careshare_types::api::{FormDescriptor, LoginForm, RegisterForm};

use crate::convert;
use crate::error::ApiError;
use crate::forms;
use crate::middleware::{clear_session_cookie, decode_token, issue_token, session_cookie, session_token};
use crate::state::{AppState, blocking, db_call};

const MIN_PASSWORD_LEN: usize = 8;

/// Verified against when the email is unknown, so both login failures cost
/// one argon2 verification. Built by `prepare_dummy_hash` at startup.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    hash_password("careshare-unknown-account")
        .map_err(|e| error!("Dummy password hash unavailable: {:#}", e))
        .ok()
});

/// Build the dummy hash before the first login arrives.
pub fn prepare_dummy_hash() -> bool {
    LazyLock::force(&DUMMY_HASH).is_some()
}

pub async fn register_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post(
        "/register",
        &["email", "password", "name", "city", "address", "contact_email", "description"],
    ))
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    let email = forms::normalize_email(forms::email("email", &form.email)?);
    if form.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let name = forms::required("name", &form.name)?.to_string();
    let city = forms::required("city", &form.city)?.to_string();
    let address = forms::required("address", &form.address)?.to_string();
    let contact_email = forms::normalize_email(forms::email("contact_email", &form.contact_email)?);
    let description = form.description.trim().to_string();

    let password = form.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let outcome = db_call(&state, move |db| {
        db.register_orphanage(
            &email,
            &password_hash,
            &NewOrphanage {
                name: &name,
                city: &city,
                address: &address,
                contact_email: &contact_email,
                description: &description,
            },
        )
    })
    .await?;

    match outcome {
        RegisterOutcome::Registered { user_id, orphanage_id } => {
            info!("Registered orphanage {} for user {}", orphanage_id, user_id);
            Ok(Redirect::to("/login").into_response())
        }
        RegisterOutcome::EmailTaken => Err(ApiError::DuplicateEmail { field: "email" }),
        RegisterOutcome::ContactEmailTaken => Err(ApiError::DuplicateEmail { field: "contact email" }),
    }
}

pub async fn login_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/login", &["email", "password"]))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let email = forms::normalize_email(&form.email);
    let lookup = email.clone();
    let user = db_call(&state, move |db| db.get_user_by_email(&lookup)).await?;

    let password = form.password;
    let stored = user.as_ref().map(|u| u.password.clone());
    let verified = blocking(move || Ok(check_password(&password, stored.as_deref()))).await?;

    let Some(user) = user.filter(|_| verified) else {
        warn!("Failed login attempt for {}", email);
        return Err(ApiError::InvalidCredentials);
    };

    let user_id = convert::id(&user.id);
    let session_id = Uuid::new_v4();
    let expires_at = Utc::now() + state.session.ttl;
    let expires_raw = expires_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true);

    let sid = session_id.to_string();
    db_call(&state, move |db| {
        db.purge_expired_sessions(&now_timestamp())?;
        db.create_session(&sid, &user.id, &expires_raw)
    })
    .await?;

    let token = issue_token(&state.session.secret, user_id, session_id, expires_at)
        .map_err(ApiError::StorageUnavailable)?;

    info!("User {} logged in", user_id);
    Ok((
        [(header::SET_COOKIE, session_cookie(&token, &state.session))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// Revokes the server-side session, so the cookie stops working at once
/// even if a copy survives on the client.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(claims) = session_token(&headers).and_then(|t| decode_token(&state.session.secret, t)) {
        let sid = claims.sid.to_string();
        db_call(&state, move |db| db.delete_session(&sid)).await?;
        info!("User {} logged out", claims.sub);
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(&state.session))],
        Redirect::to("/"),
    )
        .into_response())
}

pub(crate) fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Verify against the stored hash, or burn the same work when there is none.
fn check_password(password: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => {
            match DUMMY_HASH.as_deref() {
                Some(dummy) => verify_password(password, dummy),
                None => hash_password(password).is_ok(),
            };
            false
        }
    }
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!hash.contains("correct horse"));
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn dummy_hash_is_ready_and_never_matches() {
        assert!(prepare_dummy_hash());
        let dummy = DUMMY_HASH.as_deref().unwrap();
        assert!(PasswordHash::new(dummy).is_ok());
        assert!(!check_password("careshare-unknown-account", None));
        assert!(!check_password("anything", None));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
