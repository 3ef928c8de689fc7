//! Checkout flow for the course storefront.
//!
//! Address capture, cart hydration, payment method selection, the payment
//! confirmation modal and order submission. Hosted services are reached
//! through the ports in `cs-backend-client`; the in-progress draft lives in a
//! `cs-draft-store` backend.

pub mod address;
pub mod confirmation;
pub mod error;
pub mod flow;
pub mod hydration;
pub mod payment;
pub mod submission;
pub mod validation;

pub use address::{AddressErrors, AddressField, AddressForm, capture_address};
pub use confirmation::{ModalState, PaymentConfirmation};
pub use error::{CheckoutError, SUBMISSION_FAILED_MESSAGE};
pub use flow::{CheckoutFlow, CheckoutStep, Route};
pub use hydration::{HydratedCart, hydrate_cart};
pub use payment::MethodSelection;
pub use submission::{SubmittedOrder, build_order};
pub use validation::{
    ReceiptError, validate_file, validate_receipt_metadata, validate_transaction_id,
};
