//! Signed-in user for the storefront.
//!
//! The user is kept in the shared `InMemorySession` that checkout reads and
//! mirrored to `localStorage` so a reload keeps the user signed in. Sign-in
//! and sign-up are exported to the page's own login forms.

use crate::storage;
use cs_api_types::SessionUser;
use cs_auth_adapter::{AuthError, FirebaseAuthClient};
use cs_backend_client::{AuthProvider, InMemorySession};
use std::cell::OnceCell;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

pub const SESSION_KEY: &str = "authUser";

thread_local! {
    static AUTH: OnceCell<Rc<FirebaseAuthClient>> = const { OnceCell::new() };
}

/// Restores the persisted user and installs the auth client. Returns the
/// session shared with the checkout flow.
pub fn install(api_key: Option<String>) -> Arc<InMemorySession> {
    let session = Arc::new(InMemorySession::default());
    if let Some(raw) = storage::local_get(SESSION_KEY) {
        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) if user.email_verified => session.set_user(Some(user)),
            Ok(_) => storage::local_remove(SESSION_KEY),
            Err(err) => {
                gloo_console::warn!(format!("dropping unreadable session: {err}"));
                storage::local_remove(SESSION_KEY);
            }
        }
    }

    let client = Rc::new(FirebaseAuthClient::new(api_key, Arc::clone(&session)));
    AUTH.with(|cell| {
        let _ = cell.set(client);
    });
    session
}

fn client() -> Result<Rc<FirebaseAuthClient>, JsValue> {
    AUTH.with(|cell| cell.get().cloned())
        .ok_or_else(|| JsValue::from_str("storefront is not initialised"))
}

fn persist(user: Option<&SessionUser>) {
    match user.map(serde_json::to_string) {
        Some(Ok(raw)) => storage::local_set(SESSION_KEY, &raw),
        Some(Err(err)) => gloo_console::warn!(format!("session not persisted: {err}")),
        None => storage::local_remove(SESSION_KEY),
    }
}

/// Public view handed back to the page; the id token stays on the Rust side.
fn to_js(user: &SessionUser) -> Result<JsValue, JsValue> {
    let public = SessionUser {
        id_token: None,
        ..user.clone()
    };
    serde_wasm_bindgen::to_value(&public).map_err(JsValue::from)
}

fn auth_err(err: AuthError) -> JsValue {
    match err {
        AuthError::Transport(err) => {
            gloo_console::error!(format!("{err:#}"));
            JsValue::from_str("Could not reach the sign-in service. Please try again.")
        }
        other => JsValue::from_str(&other.to_string()),
    }
}

#[wasm_bindgen(js_name = signIn)]
pub async fn sign_in(email: String, password: String) -> Result<JsValue, JsValue> {
    let client = client()?;
    let user = client.sign_in(&email, &password).await.map_err(auth_err)?;
    persist(Some(&user));
    to_js(&user)
}

/// Creates the account and sends the verification email. The user must
/// verify before `signIn` succeeds.
#[wasm_bindgen(js_name = signUp)]
pub async fn sign_up(
    email: String,
    password: String,
    display_name: Option<String>,
) -> Result<JsValue, JsValue> {
    let client = client()?;
    let user = client
        .sign_up(&email, &password, display_name.as_deref())
        .await
        .map_err(auth_err)?;
    to_js(&user)
}

#[wasm_bindgen(js_name = resendVerification)]
pub async fn resend_verification() -> Result<(), JsValue> {
    let client = client()?;
    let token = client
        .current_user()
        .and_then(|user| user.id_token)
        .ok_or_else(|| auth_err(AuthError::NotSignedIn))?;
    client.send_verification_email(&token).await.map_err(auth_err)
}

#[wasm_bindgen(js_name = refreshUser)]
pub async fn refresh_user() -> Result<JsValue, JsValue> {
    let client = client()?;
    let user = client.reload().await.map_err(auth_err)?;
    persist(Some(&user));
    to_js(&user)
}

#[wasm_bindgen(js_name = signOut)]
pub fn sign_out() -> Result<(), JsValue> {
    client()?.sign_out();
    persist(None);
    Ok(())
}

#[wasm_bindgen(js_name = currentUser)]
pub fn current_user() -> Result<JsValue, JsValue> {
    match client()?.current_user() {
        Some(user) => to_js(&user),
        None => Ok(JsValue::NULL),
    }
}
