//! CourseStore checkout page.
//!
//! Browser host for `cs-checkout-core`: binds the page, restores the signed-in
//! user and mounts the checkout flow with `localStorage` draft storage, the
//! Cloudinary receipt uploader and the Firestore order store.

pub mod checkout;
pub mod config;
pub mod dom;
pub mod events;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;

use cs_api_types::CheckoutNavigation;
use cs_checkout_core::CheckoutFlow;
use cs_cloudinary::CloudinaryUploader;
use cs_firestore::FirestoreOrderStore;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init()
}

/// Cart hand-off from the cart page. Routers that wrap their own state keep
/// ours under `usr`.
fn navigation_state() -> CheckoutNavigation {
    let Ok(state) = gloo_utils::window().history().and_then(|h| h.state()) else {
        return CheckoutNavigation::default();
    };
    let inner = js_sys::Reflect::get(&state, &JsValue::from_str("usr"))
        .ok()
        .filter(|usr| usr.is_object());
    let state = inner.unwrap_or(state);
    if state.is_null() || state.is_undefined() {
        return CheckoutNavigation::default();
    }

    serde_wasm_bindgen::from_value(state).unwrap_or_else(|err| {
        gloo_console::warn!(format!("ignoring navigation state: {err}"));
        CheckoutNavigation::default()
    })
}

fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let cfg = config::StorefrontConfig::from_root(&els.root);
    let missing = cfg.missing();
    if !missing.is_empty() {
        gloo_console::warn!(format!("checkout root is missing {}", missing.join(", ")));
    }

    let session = session::install(cfg.firebase_api_key.clone());

    let mut uploader = CloudinaryUploader::new(cfg.cloud_name, cfg.upload_preset);
    if let Some(base_url) = cfg.cloudinary_base_url.as_deref() {
        uploader = uploader.with_base_url(base_url);
    }
    let orders = FirestoreOrderStore::new(cfg.project_id, cfg.firestore_base_url);

    let flow = CheckoutFlow::mount(
        storage::LocalStorageDraft,
        uploader,
        orders,
        session,
        &navigation_state(),
    );
    if let Some(address) = flow.address() {
        checkout::fill_address_form(&els, address);
    }
    render::render(&els, &flow);
    state::install(flow);

    events::bind_events(&els)?;
    Ok(())
}
