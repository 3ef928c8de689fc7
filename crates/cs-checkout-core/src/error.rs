use thiserror::Error;

/// Shown to the user for any upload or document write failure.
pub const SUBMISSION_FAILED_MESSAGE: &str = "Order submission failed. Please try again.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Please complete your billing address first.")]
    AddressRequired,
    #[error("Please select a payment method.")]
    NoPaymentMethod,
    #[error("Please upload a valid payment receipt.")]
    ReceiptRequired,
    #[error("Payment confirmation is not open.")]
    ConfirmationClosed,
    #[error("Your order is already being submitted.")]
    SubmissionInProgress,
    #[error("{}", SUBMISSION_FAILED_MESSAGE)]
    SubmissionFailed,
}
