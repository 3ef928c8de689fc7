//! Checkout page actions: address form, method choice, the confirmation modal
//! and navigation away from the page.

use crate::dom::{self, Elements};
use crate::render;
use crate::state;
use cs_api_types::{Address, PaymentMethod, ReceiptFile};
use cs_checkout_core::{AddressField, AddressForm, CheckoutError, ModalState, Route};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::JsFuture;

const WARNING_VISIBLE_MS: u32 = 3_000;

// ── Navigation ──

fn encode(value: &str) -> String {
    js_sys::encode_uri_component(value).into()
}

pub fn route_url(route: &Route) -> String {
    match route {
        Route::Cart => "/cart".to_owned(),
        Route::PaymentSuccess { method, order_id } => format!(
            "/payment-success?method={}&orderId={}",
            encode(method.label()),
            encode(order_id)
        ),
    }
}

pub fn navigate(route: &Route) {
    let url = route_url(route);
    if let Err(err) = gloo_utils::window().location().set_href(&url) {
        gloo_console::error!("navigation failed", err);
    }
}

// ── Address step ──

fn read_address_form(els: &Elements) -> AddressForm {
    let mut form = AddressForm {
        floor: dom::get_input_value(&els.floor_input),
        ..AddressForm::default()
    };
    for input in &els.address_fields {
        let value = dom::get_input_value(&input.input);
        match input.field {
            AddressField::FullName => form.full_name = value,
            AddressField::Phone => form.phone = value,
            AddressField::City => form.city = value,
            AddressField::Area => form.area = value,
            AddressField::Address => form.address = value,
        }
    }
    form
}

pub fn fill_address_form(els: &Elements, address: &Address) {
    let form = AddressForm::from(address);
    for input in &els.address_fields {
        let value = match input.field {
            AddressField::FullName => &form.full_name,
            AddressField::Phone => &form.phone,
            AddressField::City => &form.city,
            AddressField::Area => &form.area,
            AddressField::Address => &form.address,
        };
        dom::set_input_value(&input.input, value);
    }
    dom::set_input_value(&els.floor_input, &form.floor);
}

pub fn on_address_submit(els: &Elements, event: &web_sys::Event) {
    event.prevent_default();
    let form = read_address_form(els);

    let rejected = state::with_mut(|flow| {
        let outcome = flow
            .submit_address(&form, |address| {
                gloo_console::log!("billing address saved for", address.city.as_str());
            })
            .map(|_| ())
            .err();
        render::render(els, flow);
        outcome
    })
    .flatten();

    render::render_address_errors(els, rejected.as_ref());
}

pub fn on_edit_address(els: &Elements) {
    state::with_mut(|flow| {
        flow.edit_address();
        render::render(els, flow);
    });
}

// ── Payment step ──

pub fn on_method_change(els: &Elements, input: &web_sys::HtmlInputElement) {
    let Some(method) = PaymentMethod::from_label(&input.value()) else {
        gloo_console::warn!("unknown payment method", input.value());
        return;
    };
    render::hide_warning(els);
    state::with_mut(|flow| {
        flow.select_method(method);
        render::render(els, flow);
    });
}

pub async fn on_pay_now(els: &Elements) {
    let opened = state::with_mut(|flow| {
        let opened = flow.pay_now().map(|_| ());
        render::render(els, flow);
        opened
    });

    match opened {
        Some(Ok(())) => render::hide_warning(els),
        Some(Err(err)) => {
            render::show_warning(els, &err.to_string());
            TimeoutFuture::new(WARNING_VISIBLE_MS).await;
            render::hide_warning(els);
        }
        None => {}
    }
}

// ── Confirmation modal ──

async fn read_receipt(file: &web_sys::File) -> Result<ReceiptFile, wasm_bindgen::JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(ReceiptFile::new(file.name(), file.type_(), bytes))
}

pub async fn on_receipt_change(els: &Elements) {
    let Some(file) = els.receipt_input.files().and_then(|files| files.get(0)) else {
        state::with_mut(|flow| {
            if let Some(modal) = flow.confirmation_mut() {
                modal.clear_receipt();
                render::render_modal(els, modal);
            }
        });
        return;
    };

    // Screen the declared type and size before copying the file into wasm memory.
    let screened = state::with_mut(|flow| {
        let modal = flow.confirmation_mut()?;
        let size = file.size() as usize;
        let verdict = modal.check_receipt_metadata(&file.type_(), size);
        render::render_modal(els, modal);
        Some(verdict)
    })
    .flatten();
    match screened {
        Some(Ok(())) => {}
        Some(Err(_)) => {
            dom::set_input_value(&els.receipt_input, "");
            return;
        }
        None => return,
    }

    let receipt = match read_receipt(&file).await {
        Ok(receipt) => receipt,
        Err(err) => {
            gloo_console::error!("could not read receipt file", err);
            return;
        }
    };

    state::with_mut(|flow| {
        if let Some(modal) = flow.confirmation_mut() {
            if modal.select_receipt(receipt).is_err() {
                dom::set_input_value(&els.receipt_input, "");
            }
            render::render_modal(els, modal);
        }
    });
}

pub fn on_transaction_input(els: &Elements) {
    let value = dom::get_input_value(&els.transaction_input);
    state::with_mut(|flow| {
        if let Some(modal) = flow.confirmation_mut() {
            modal.set_transaction_id(&value);
            render::render_modal(els, modal);
        }
    });
}

/// Submits the open modal. The flow stays borrowed until the order write
/// settles, so clicks arriving meanwhile are ignored.
#[allow(clippy::await_holding_refcell_ref)]
pub async fn on_submit(els: &Elements) {
    let Some(handle) = state::handle() else {
        return;
    };
    let Ok(mut flow) = handle.try_borrow_mut() else {
        return;
    };

    let pending = match flow.confirmation() {
        Some(modal) if modal.can_submit() && modal.shows_receipt_input() => ModalState::Uploading,
        Some(modal) if modal.can_submit() => ModalState::Submitting,
        _ => ModalState::Idle,
    };
    if pending != ModalState::Idle {
        render::render_submit_button(els, &pending, false);
        dom::set_text(&els.modal_error, "");
    }

    let result = flow.submit_order().await;
    match result {
        Ok(route) => {
            drop(flow);
            navigate(&route);
        }
        Err(CheckoutError::SubmissionFailed) => render::render(els, &flow),
        Err(err) => {
            render::render(els, &flow);
            dom::set_text(&els.modal_error, &err.to_string());
        }
    }
}

pub fn on_cancel(els: &Elements) {
    let route = state::with_mut(|flow| {
        let route = flow.cancel_confirmation();
        render::render(els, flow);
        route
    });
    if let Some(route) = route {
        navigate(&route);
    }
}
