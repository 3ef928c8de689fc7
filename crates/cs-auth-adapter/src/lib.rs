//! Email/password accounts with mandatory email verification, backed by the
//! Firebase Identity Toolkit REST API.

use anyhow::Context;
use cs_api_types::SessionUser;
use cs_backend_client::{AuthProvider, InMemorySession};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email address is already registered")]
    EmailExists,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password is too weak: {0}")]
    WeakPassword(String),
    #[error("email address has not been verified")]
    EmailNotVerified,
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("auth provider error: {0}")]
    Provider(String),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Reads `FIREBASE_API_KEY` and `FIREBASE_AUTH_BASE_URL` from the environment
/// when no override is given.
pub struct FirebaseAuthClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
    session: Arc<InMemorySession>,
}

// ── Identity Toolkit REST API types ──────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    id_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AccountInfo {
    fn into_session_user(self, id_token: &str) -> SessionUser {
        SessionUser {
            uid: self.local_id,
            display_name: self.display_name.filter(|name| !name.trim().is_empty()),
            email: self.email,
            email_verified: self.email_verified,
            id_token: Some(id_token.to_owned()),
        }
    }
}

/// Maps an Identity Toolkit error message such as
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
fn map_provider_error(message: &str) -> AuthError {
    let (code, detail) = match message.split_once(" : ") {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailExists,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "WEAK_PASSWORD" => AuthError::WeakPassword(detail.to_owned()),
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" => AuthError::NotSignedIn,
        _ => AuthError::Provider(message.to_owned()),
    }
}

fn check_credentials(email: &str, password: &str) -> AuthResult<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    if local.is_empty() || !domain.contains('.') {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl FirebaseAuthClient {
    pub fn new(api_key: Option<String>, session: Arc<InMemorySession>) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("FIREBASE_API_KEY").ok())
            .unwrap_or_default();
        let base_url = std::env::var("FIREBASE_AUTH_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());

        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> Arc<InMemorySession> {
        Arc::clone(&self.session)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{method}?key={}", self.base_url, self.api_key)
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> AuthResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("identity toolkit {method} transport"))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
                return Err(map_provider_error(&body.error.message));
            }
            return Err(AuthError::Provider(format!("HTTP {status}: {text}")));
        }

        let parsed = serde_json::from_str(&text)
            .with_context(|| format!("identity toolkit {method} parse"))?;
        Ok(parsed)
    }

    async fn lookup(&self, id_token: &str) -> AuthResult<SessionUser> {
        let response: LookupResponse = self.call("lookup", &LookupRequest { id_token }).await?;
        let account = response
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::NotSignedIn)?;
        Ok(account.into_session_user(id_token))
    }

    /// Creates the account and sends the verification email. The new user is
    /// not signed in until the address is verified.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<SessionUser> {
        check_credentials(email, password)?;

        let request = PasswordRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        let token: TokenResponse = self.call("signUp", &request).await?;

        if let Some(name) = display_name.map(str::trim).filter(|name| !name.is_empty()) {
            let update = ProfileUpdateRequest {
                id_token: &token.id_token,
                display_name: name,
                return_secure_token: false,
            };
            let _: serde_json::Value = self.call("update", &update).await?;
        }

        self.send_verification_email(&token.id_token).await?;
        info!(uid = %token.local_id, "account created, verification email sent");

        self.lookup(&token.id_token).await
    }

    /// Signs in and stores the user in the session. Unverified accounts are
    /// refused and leave the session untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<SessionUser> {
        let request = PasswordRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        let token: TokenResponse = self.call("signInWithPassword", &request).await?;
        let user = self.lookup(&token.id_token).await?;

        if !user.email_verified {
            warn!(uid = %user.uid, "sign-in refused for unverified email");
            return Err(AuthError::EmailNotVerified);
        }

        self.session.set_user(Some(user.clone()));
        Ok(user)
    }

    pub async fn send_verification_email(&self, id_token: &str) -> AuthResult<()> {
        let request = OobCodeRequest {
            request_type: "VERIFY_EMAIL",
            id_token,
        };
        let _: serde_json::Value = self.call("sendOobCode", &request).await?;
        Ok(())
    }

    /// Refreshes the signed-in user's profile and verification state.
    pub async fn reload(&self) -> AuthResult<SessionUser> {
        let current = self.session.current_user().ok_or(AuthError::NotSignedIn)?;
        let id_token = current.id_token.ok_or(AuthError::NotSignedIn)?;
        let user = self.lookup(&id_token).await?;
        self.session.set_user(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&self) {
        self.session.set_user(None);
    }
}

impl AuthProvider for FirebaseAuthClient {
    fn current_user(&self) -> Option<SessionUser> {
        self.session.current_user()
    }
}
