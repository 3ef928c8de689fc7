//! Event binding.
//!
//! Wires the checkout page listeners. Async handlers are spawned via
//! `wasm_bindgen_futures::spawn_local`.

use crate::checkout;
use crate::dom::Elements;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Helper: attach an async listener that receives the bound elements.
macro_rules! on_event_async {
    ($el:expr, $event:literal, $els:expr, $handler:path) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Helper: attach a sync listener.
macro_rules! on_event {
    ($el:expr, $event:literal, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::Event)>);
        $el.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all checkout listeners. Call once after the flow is mounted.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    // ── Address ──
    {
        let els2 = els.clone();
        on_event!(els.address_form, "submit", move |event: web_sys::Event| {
            checkout::on_address_submit(&els2, &event);
        });
    }
    {
        let els2 = els.clone();
        on_event!(els.edit_address_btn, "click", move |_: web_sys::Event| {
            checkout::on_edit_address(&els2);
        });
    }

    // ── Payment methods ──
    for input in &els.method_inputs {
        let els2 = els.clone();
        on_event!(input, "change", move |event: web_sys::Event| {
            let target = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
            if let Some(input) = target {
                checkout::on_method_change(&els2, &input);
            }
        });
    }
    on_event_async!(els.pay_now_btn, "click", els, checkout::on_pay_now);

    // ── Confirmation modal ──
    on_event_async!(els.receipt_input, "change", els, checkout::on_receipt_change);
    {
        let els2 = els.clone();
        on_event!(els.transaction_input, "input", move |_: web_sys::Event| {
            checkout::on_transaction_input(&els2);
        });
    }
    on_event_async!(els.submit_btn, "click", els, checkout::on_submit);
    {
        let els2 = els.clone();
        on_event!(els.cancel_btn, "click", move |_: web_sys::Event| {
            checkout::on_cancel(&els2);
        });
    }

    Ok(())
}
