//! Paints the checkout page from the flow state.

use crate::dom::{self, Elements};
use crate::state::Flow;
use cs_api_types::Address;
use cs_checkout_core::{
    AddressErrors, CheckoutStep, HydratedCart, ModalState, PaymentConfirmation,
};

pub fn format_money(amount: f64) -> String {
    format!("{amount:.2} EGP")
}

pub fn render(els: &Elements, flow: &Flow) {
    let step = flow.step();
    dom::set_visible(&els.address_step, step == CheckoutStep::Address);
    dom::set_visible(&els.payment_step, step != CheckoutStep::Address);

    render_summary(els, flow.cart());
    render_address_summary(els, flow.address());

    for input in &els.method_inputs {
        let checked = flow
            .selection()
            .selected()
            .is_some_and(|method| method.label() == input.value());
        input.set_checked(checked);
    }

    match flow.confirmation() {
        Some(modal) => render_modal(els, modal),
        None => dom::set_visible(&els.modal, false),
    }
}

fn render_summary(els: &Elements, cart: &HydratedCart) {
    els.summary_items.set_inner_html("");
    for item in &cart.items {
        let Ok(row) = dom::create_element("li") else {
            continue;
        };
        dom::set_text(
            &row,
            &format!(
                "{} x{} · {}",
                item.title,
                item.quantity,
                format_money(item.line_total())
            ),
        );
        let _ = els.summary_items.append_child(&row);
    }

    let count = cart.item_count();
    dom::set_text(
        &els.summary_count,
        &format!("{count} {}", if count == 1 { "course" } else { "courses" }),
    );
    dom::set_text(&els.summary_total, &format_money(cart.total));
}

fn render_address_summary(els: &Elements, address: Option<&Address>) {
    let text = address
        .map(|a| {
            let floor = a
                .floor
                .as_deref()
                .map(|floor| format!(", floor {floor}"))
                .unwrap_or_default();
            format!(
                "{} · {} · {}{floor}, {}, {}",
                a.full_name, a.phone, a.address, a.area, a.city
            )
        })
        .unwrap_or_default();
    dom::set_text(&els.address_summary, &text);
}

pub fn render_address_errors(els: &Elements, errors: Option<&AddressErrors>) {
    for field in &els.address_fields {
        let message = errors.and_then(|e| e.get(field.field)).unwrap_or("");
        dom::set_text(&field.error, message);
        dom::toggle_class(&field.input, "invalid", !message.is_empty());
    }
}

pub fn render_modal(els: &Elements, modal: &PaymentConfirmation) {
    dom::set_visible(&els.modal, true);
    dom::set_text(&els.modal_title, &format!("Pay with {}", modal.method()));
    dom::set_text(&els.modal_instructions, modal.instructions());
    dom::set_visible(&els.receipt_section, modal.shows_receipt_input());

    let receipt_error = modal
        .receipt_error()
        .map(ToString::to_string)
        .unwrap_or_default();
    dom::set_text(&els.receipt_error, &receipt_error);
    dom::set_text(
        &els.transaction_error,
        modal.transaction_id_error().unwrap_or(""),
    );

    let failure = match modal.state() {
        ModalState::Failed { message } => message.as_str(),
        _ => "",
    };
    dom::set_text(&els.modal_error, failure);

    render_submit_button(els, modal.state(), modal.can_submit());
}

pub fn render_submit_button(els: &Elements, state: &ModalState, enabled: bool) {
    let label = match state {
        ModalState::Validating => "Checking…",
        ModalState::Uploading => "Uploading receipt…",
        ModalState::Submitting => "Placing order…",
        ModalState::Failed { .. } => "Try again",
        ModalState::Idle | ModalState::Success => "Confirm payment",
    };
    dom::set_text(&els.submit_btn, label);
    els.submit_btn.set_disabled(!enabled);
}

pub fn show_warning(els: &Elements, message: &str) {
    dom::set_text(&els.payment_warning, message);
    dom::set_visible(&els.payment_warning, true);
}

pub fn hide_warning(els: &Elements) {
    dom::set_visible(&els.payment_warning, false);
}
