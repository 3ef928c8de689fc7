use cs_api_types::PaymentMethod;

use crate::error::CheckoutError;

/// Single-choice payment method picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodSelection {
    selected: Option<PaymentMethod>,
}

impl MethodSelection {
    pub fn options(&self) -> [PaymentMethod; 3] {
        PaymentMethod::ALL
    }

    pub fn select(&mut self, method: PaymentMethod) {
        self.selected = Some(method);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<PaymentMethod> {
        self.selected
    }

    pub fn is_selected(&self, method: PaymentMethod) -> bool {
        self.selected == Some(method)
    }

    /// "Pay Now": the chosen method, or a warning when nothing is chosen.
    pub fn pay_now(&self) -> Result<PaymentMethod, CheckoutError> {
        self.selected.ok_or(CheckoutError::NoPaymentMethod)
    }
}
