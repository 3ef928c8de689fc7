//! Payment confirmation modal.
//!
//! Holds the receipt and transaction id the user entered for the chosen
//! method and tracks where a submission attempt is:
//!
//! ```text
//! Idle -> Validating -> Uploading -> Submitting -> Success
//!              |             \            \
//!              v              `-----------`--> Failed -> (retry) Validating
//!             Idle (nothing to submit)
//! ```
//!
//! Uploading is skipped when there is no receipt to send.

use cs_api_types::{PaymentMethod, ReceiptFile};

use crate::error::CheckoutError;
use crate::validation::{
    ReceiptError, validate_file, validate_receipt_metadata, validate_transaction_id,
};

pub const TRANSACTION_ID_HINT: &str =
    "Transaction ID must be 6 to 20 digits and cannot start with 0.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Idle,
    Validating,
    Uploading,
    Submitting,
    Success,
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    method: PaymentMethod,
    receipt: Option<ReceiptFile>,
    receipt_error: Option<ReceiptError>,
    transaction_id: String,
    state: ModalState,
    loading: bool,
}

impl PaymentConfirmation {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            receipt: None,
            receipt_error: None,
            transaction_id: String::new(),
            state: ModalState::Idle,
            loading: false,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the receipt and transaction id inputs are shown.
    pub fn shows_receipt_input(&self) -> bool {
        self.method.requires_receipt()
    }

    pub fn instructions(&self) -> &'static str {
        match self.method {
            PaymentMethod::Cash => {
                "Pay the order total in cash when our representative contacts you. No receipt is needed."
            }
            PaymentMethod::Instapay => {
                "Send the order total through Instapay, then upload a screenshot of the transfer."
            }
            PaymentMethod::VodafoneCash => {
                "Transfer the order total from your Vodafone Cash wallet, then upload a screenshot of the confirmation."
            }
        }
    }

    /// Validates and keeps the file. A rejected file also discards any file
    /// accepted earlier.
    pub fn select_receipt(&mut self, file: ReceiptFile) -> Result<(), ReceiptError> {
        match validate_file(&file) {
            Ok(()) => {
                self.receipt = Some(file);
                self.receipt_error = None;
                Ok(())
            }
            Err(err) => {
                self.receipt = None;
                self.receipt_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Screens a file by its declared type and size before its bytes are
    /// read. A rejection is recorded exactly like one from `select_receipt`.
    pub fn check_receipt_metadata(
        &mut self,
        content_type: &str,
        size: usize,
    ) -> Result<(), ReceiptError> {
        validate_receipt_metadata(content_type, size).inspect_err(|err| {
            self.receipt = None;
            self.receipt_error = Some(err.clone());
        })
    }

    pub fn clear_receipt(&mut self) {
        self.receipt = None;
        self.receipt_error = None;
    }

    pub fn receipt(&self) -> Option<&ReceiptFile> {
        self.receipt.as_ref()
    }

    pub fn receipt_error(&self) -> Option<&ReceiptError> {
        self.receipt_error.as_ref()
    }

    pub fn set_transaction_id(&mut self, value: &str) {
        self.transaction_id = value.trim().to_owned();
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Inline hint for a malformed id. Informational only; it never blocks
    /// submission.
    pub fn transaction_id_error(&self) -> Option<&'static str> {
        if self.transaction_id.is_empty() || validate_transaction_id(&self.transaction_id) {
            None
        } else {
            Some(TRANSACTION_ID_HINT)
        }
    }

    /// Cash needs nothing more; every other method needs an accepted receipt.
    pub fn is_valid(&self) -> bool {
        !self.method.requires_receipt() || self.receipt.is_some()
    }

    /// Submit control is enabled only when this holds.
    pub fn can_submit(&self) -> bool {
        self.is_valid() && !self.loading
    }

    pub(crate) fn receipt_for_upload(&self) -> Option<&ReceiptFile> {
        if self.method.requires_receipt() {
            self.receipt.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn order_transaction_id(&self) -> String {
        if self.method.requires_receipt() {
            self.transaction_id.clone()
        } else {
            String::new()
        }
    }

    pub(crate) fn begin_submission(&mut self) -> Result<(), CheckoutError> {
        if self.loading {
            return Err(CheckoutError::SubmissionInProgress);
        }

        self.state = ModalState::Validating;
        if !self.is_valid() {
            self.state = ModalState::Idle;
            return Err(CheckoutError::ReceiptRequired);
        }

        self.loading = true;
        Ok(())
    }

    pub(crate) fn advance(&mut self, state: ModalState) {
        self.state = state;
    }

    pub(crate) fn succeed(&mut self) {
        self.loading = false;
        self.state = ModalState::Success;
    }

    pub(crate) fn fail(&mut self, message: &str) {
        self.loading = false;
        self.state = ModalState::Failed {
            message: message.to_owned(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MAX_RECEIPT_BYTES;

    fn png(size: usize) -> ReceiptFile {
        ReceiptFile::new("receipt.png", "image/png", vec![0; size])
    }

    #[test]
    fn cash_is_valid_without_a_receipt() {
        let modal = PaymentConfirmation::new(PaymentMethod::Cash);
        assert!(!modal.shows_receipt_input());
        assert!(modal.is_valid());
        assert!(modal.can_submit());
    }

    #[test]
    fn instapay_needs_a_receipt() {
        let mut modal = PaymentConfirmation::new(PaymentMethod::Instapay);
        assert!(modal.shows_receipt_input());
        assert!(!modal.is_valid());
        assert!(!modal.can_submit());

        modal.select_receipt(png(1024)).unwrap();
        assert!(modal.is_valid());
    }

    #[test]
    fn rejected_file_clears_the_accepted_one() {
        let mut modal = PaymentConfirmation::new(PaymentMethod::VodafoneCash);
        modal.select_receipt(png(1024)).unwrap();

        let err = modal
            .select_receipt(png(MAX_RECEIPT_BYTES + 1))
            .unwrap_err();

        assert!(matches!(err, ReceiptError::TooLarge(_)));
        assert!(modal.receipt().is_none());
        assert_eq!(modal.receipt_error(), Some(&err));
        assert!(!modal.is_valid());

        modal.select_receipt(png(10)).unwrap();
        assert!(modal.receipt_error().is_none());
    }

    #[test]
    fn oversized_declared_file_is_rejected_before_reading() {
        let mut modal = PaymentConfirmation::new(PaymentMethod::Instapay);
        modal.select_receipt(png(1024)).unwrap();
        modal.check_receipt_metadata("image/png", 1024).unwrap();
        assert!(modal.receipt().is_some());

        let err = modal
            .check_receipt_metadata("image/png", 4 * 1024 * 1024 * 1024 - 1)
            .unwrap_err();

        assert!(matches!(err, ReceiptError::TooLarge(_)));
        assert!(modal.receipt().is_none());
        assert_eq!(modal.receipt_error(), Some(&err));
        assert!(!modal.can_submit());
    }

    #[test]
    fn malformed_transaction_id_is_flagged_but_not_blocking() {
        let mut modal = PaymentConfirmation::new(PaymentMethod::Instapay);
        modal.select_receipt(png(10)).unwrap();

        modal.set_transaction_id("01234");
        assert_eq!(modal.transaction_id_error(), Some(TRANSACTION_ID_HINT));
        assert!(modal.can_submit());

        modal.set_transaction_id(" 198765 ");
        assert_eq!(modal.transaction_id(), "198765");
        assert_eq!(modal.transaction_id_error(), None);

        modal.set_transaction_id("");
        assert_eq!(modal.transaction_id_error(), None);
    }

    #[test]
    fn begin_submission_guards_validity_and_double_submit() {
        let mut modal = PaymentConfirmation::new(PaymentMethod::Instapay);
        assert_eq!(modal.begin_submission(), Err(CheckoutError::ReceiptRequired));
        assert_eq!(modal.state(), &ModalState::Idle);
        assert!(!modal.is_loading());

        modal.select_receipt(png(10)).unwrap();
        modal.begin_submission().unwrap();
        assert_eq!(modal.state(), &ModalState::Validating);
        assert!(!modal.can_submit());
        assert_eq!(
            modal.begin_submission(),
            Err(CheckoutError::SubmissionInProgress)
        );

        modal.fail("boom");
        assert!(modal.can_submit());
        assert!(matches!(modal.state(), ModalState::Failed { .. }));
        assert!(modal.receipt().is_some());
    }

    #[test]
    fn cash_never_uploads_or_records_a_transaction_id() {
        let mut modal = PaymentConfirmation::new(PaymentMethod::Cash);
        modal.set_transaction_id("198765");
        assert!(modal.receipt_for_upload().is_none());
        assert_eq!(modal.order_transaction_id(), "");
    }
}
