//! DOM element bindings.
//!
//! All checkout page elements are resolved once at startup. To add new UI
//! elements, add a field here and bind it in `Elements::bind()`.

use cs_checkout_core::AddressField;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement};

// ── Helpers ──

pub fn by_id(id: &str) -> Option<Element> {
    gloo_utils::document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

fn require<T: JsCast>(id: &str) -> Result<T, JsValue> {
    by_id_typed::<T>(id).ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Ok(nodes) = gloo_utils::document().query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value()
}

pub fn set_input_value(el: &HtmlInputElement, val: &str) {
    el.set_value(val);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_visible(el: &Element, visible: bool) {
    toggle_class(el, "hidden", !visible);
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    gloo_utils::document().create_element(tag)
}

// ── Elements struct ──

/// Inputs and error slot for one address field.
#[derive(Clone)]
pub struct FieldElements {
    pub field: AddressField,
    pub input: HtmlInputElement,
    pub error: Element,
}

/// All DOM element references used by the checkout page.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    pub root: HtmlElement,

    // Address step
    pub address_step: Element,
    pub address_form: HtmlFormElement,
    pub address_fields: Vec<FieldElements>,
    pub floor_input: HtmlInputElement,
    pub address_summary: Element,
    pub edit_address_btn: HtmlButtonElement,

    // Payment step
    pub payment_step: Element,
    pub method_inputs: Vec<HtmlInputElement>,
    pub pay_now_btn: HtmlButtonElement,
    pub payment_warning: Element,

    // Order summary
    pub summary_items: Element,
    pub summary_count: Element,
    pub summary_total: Element,

    // Confirmation modal
    pub modal: Element,
    pub modal_title: Element,
    pub modal_instructions: Element,
    pub receipt_section: Element,
    pub receipt_input: HtmlInputElement,
    pub receipt_error: Element,
    pub transaction_input: HtmlInputElement,
    pub transaction_error: Element,
    pub modal_error: Element,
    pub submit_btn: HtmlButtonElement,
    pub cancel_btn: HtmlButtonElement,
}

impl Elements {
    pub fn bind() -> Result<Elements, JsValue> {
        let address_fields = AddressField::ALL
            .into_iter()
            .map(|field| {
                Ok(FieldElements {
                    field,
                    input: require(field.as_str())?,
                    error: require(&format!("{}Error", field.as_str()))?,
                })
            })
            .collect::<Result<Vec<_>, JsValue>>()?;

        let method_inputs = query_all("input[name='paymentMethod']")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlInputElement>().ok())
            .collect();

        Ok(Elements {
            root: require("checkoutRoot")?,

            address_step: require("addressStep")?,
            address_form: require("addressForm")?,
            address_fields,
            floor_input: require("floor")?,
            address_summary: require("addressSummary")?,
            edit_address_btn: require("editAddressBtn")?,

            payment_step: require("paymentStep")?,
            method_inputs,
            pay_now_btn: require("payNowBtn")?,
            payment_warning: require("paymentWarning")?,

            summary_items: require("summaryItems")?,
            summary_count: require("summaryCount")?,
            summary_total: require("summaryTotal")?,

            modal: require("paymentModal")?,
            modal_title: require("modalTitle")?,
            modal_instructions: require("modalInstructions")?,
            receipt_section: require("receiptSection")?,
            receipt_input: require("receiptInput")?,
            receipt_error: require("receiptError")?,
            transaction_input: require("transactionInput")?,
            transaction_error: require("transactionError")?,
            modal_error: require("modalError")?,
            submit_btn: require("submitPaymentBtn")?,
            cancel_btn: require("cancelPaymentBtn")?,
        })
    }
}
