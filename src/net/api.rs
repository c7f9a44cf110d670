//! Auth endpoint helpers for the marketplace backend.
//!
//! Each helper unwraps the `{code, message, data, timestamp}` envelope and
//! returns the part callers care about. Errors are already normalized by the
//! transport.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde_json::Value;

use super::http::{ApiError, HttpTransport};
use super::types::{ApiResponse, AuthUser, CaptchaChallenge, LoginPayload, LoginResponse, RegisterPayload, Role};
use crate::router::routes::post_login_landing;

/// Outcome of [`sign_in`].
#[derive(Clone, Debug, PartialEq)]
pub struct SignIn {
    pub user: AuthUser,
    /// Path + query to navigate to next.
    pub landing: String,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Fetch a captcha challenge via `GET /auth/captcha`.
///
/// # Errors
///
/// Returns [`ApiError`] if the request fails.
pub async fn request_captcha(transport: &HttpTransport) -> Result<CaptchaChallenge, ApiError> {
    let envelope: ApiResponse<CaptchaChallenge> = transport.get("/auth/captcha", &[]).await?;
    Ok(envelope.data)
}

/// Authenticate via `POST /auth/login`. Does not touch the session.
///
/// # Errors
///
/// Returns [`ApiError`] if the request fails or the credentials/captcha are
/// rejected.
pub async fn login(transport: &HttpTransport, payload: &LoginPayload) -> Result<LoginResponse, ApiError> {
    let envelope: ApiResponse<LoginResponse> = transport.post("/auth/login", &[], Some(payload)).await?;
    Ok(envelope.data)
}

/// Log in, adopt the result into the session, and pick the landing route.
///
/// `redirect_hint` is the `redirect` query value the login page was opened
/// with, if any.
///
/// # Errors
///
/// Returns [`ApiError`] if the login request fails; the session is left
/// untouched in that case.
pub async fn sign_in(
    transport: &HttpTransport,
    payload: &LoginPayload,
    redirect_hint: Option<&str>,
) -> Result<SignIn, ApiError> {
    let response = login(transport, payload).await?;
    transport.session().lock().set_auth(&response);
    let landing = post_login_landing(redirect_hint, response.redirect_url.as_deref(), Some(response.user.role()));
    Ok(SignIn { user: response.user, landing })
}

/// Check a registration form the way the backend will.
///
/// # Errors
///
/// Returns a display message for the first problem found.
pub fn validate_registration(payload: &RegisterPayload) -> Result<(), &'static str> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err("Username and password are required.");
    }
    if payload.password != payload.confirm_password {
        return Err("Passwords do not match.");
    }
    match payload.user_type {
        Role::Consumer => Ok(()),
        Role::Supplier => {
            if payload.company_name.as_deref().is_none_or(|name| name.trim().is_empty()) {
                return Err("Company name is required for suppliers.");
            }
            Ok(())
        }
        Role::Admin | Role::Other(_) => Err("Only consumer or supplier accounts can be registered."),
    }
}

/// Create an account via `POST /auth/register`. Returns the server message.
///
/// # Errors
///
/// Returns [`RegisterError::Invalid`] before any request when the form is
/// invalid, or [`RegisterError::Api`] if the backend rejects it.
pub async fn register(transport: &HttpTransport, payload: &RegisterPayload) -> Result<String, RegisterError> {
    validate_registration(payload).map_err(RegisterError::Invalid)?;
    let envelope: ApiResponse<Option<Value>> = transport.post("/auth/register", &[], Some(payload)).await?;
    Ok(envelope.message)
}

/// Request a password-reset email via `POST /auth/forgot-password?email=`.
///
/// # Errors
///
/// Returns [`ApiError`] if the request fails or the email is unknown.
pub async fn request_password_reset(transport: &HttpTransport, email: &str) -> Result<String, ApiError> {
    let envelope: ApiResponse<String> =
        transport.post::<Value, _>("/auth/forgot-password", &[("email", email)], None).await?;
    Ok(envelope.data)
}
