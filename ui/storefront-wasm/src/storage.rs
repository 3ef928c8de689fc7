//! `localStorage` backend for the checkout draft.

use anyhow::{Result, anyhow};
use cs_draft_store::DraftStorage;
use wasm_bindgen::JsValue;

fn js_err(context: &str, err: JsValue) -> anyhow::Error {
    anyhow!("{context}: {}", err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn local_storage() -> Result<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    window
        .local_storage()
        .map_err(|err| js_err("localStorage access", err))?
        .ok_or_else(|| anyhow!("localStorage unavailable"))
}

/// Draft storage over the browser's `localStorage`. Private browsing modes
/// that refuse storage surface as errors, which the draft layer swallows.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageDraft;

impl DraftStorage for LocalStorageDraft {
    fn get(&self, key: &str) -> Result<Option<String>> {
        local_storage()?
            .get_item(key)
            .map_err(|err| js_err("localStorage get", err))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        local_storage()?
            .set_item(key, value)
            .map_err(|err| js_err("localStorage set", err))
    }

    fn remove(&self, key: &str) -> Result<()> {
        local_storage()?
            .remove_item(key)
            .map_err(|err| js_err("localStorage remove", err))
    }
}

pub fn local_get(key: &str) -> Option<String> {
    LocalStorageDraft.get(key).ok().flatten()
}

pub fn local_set(key: &str, value: &str) {
    if let Err(err) = LocalStorageDraft.set(key, value) {
        gloo_console::warn!(format!("{err:#}"));
    }
}

pub fn local_remove(key: &str) {
    if let Err(err) = LocalStorageDraft.remove(key) {
        gloo_console::warn!(format!("{err:#}"));
    }
}
