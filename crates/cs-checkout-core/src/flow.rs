use cs_api_types::{Address, CheckoutNavigation, PaymentMethod};
use cs_backend_client::{AuthProvider, ImageHost, OrderStore};
use cs_draft_store::{CheckoutDraft, DraftStorage};
use tracing::{info, warn};

use crate::address::{AddressErrors, AddressForm, capture_address};
use crate::confirmation::PaymentConfirmation;
use crate::error::{CheckoutError, SUBMISSION_FAILED_MESSAGE};
use crate::hydration::{HydratedCart, hydrate_cart};
use crate::payment::MethodSelection;
use crate::submission::{SubmittedOrder, place_order};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    Address,
    Payment,
    Confirmation,
    Complete,
}

/// Where the host should navigate after a flow action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Cart,
    PaymentSuccess {
        method: PaymentMethod,
        order_id: String,
    },
}

/// Session-scoped checkout controller.
///
/// Owns the draft and the ports for one visit to the checkout page. Assumes a
/// single active checkout per browser profile: two tabs writing the same draft
/// keys overwrite each other.
pub struct CheckoutFlow<S, I, O, A> {
    draft: CheckoutDraft<S>,
    image_host: I,
    orders: O,
    auth: A,
    cart: HydratedCart,
    address: Option<Address>,
    selection: MethodSelection,
    confirmation: Option<PaymentConfirmation>,
    placed: Option<SubmittedOrder>,
    step: CheckoutStep,
}

impl<S, I, O, A> CheckoutFlow<S, I, O, A>
where
    S: DraftStorage,
    I: ImageHost,
    O: OrderStore,
    A: AuthProvider,
{
    /// Hydrates the cart and restores a previously captured address.
    pub fn mount(
        storage: S,
        image_host: I,
        orders: O,
        auth: A,
        navigation: &CheckoutNavigation,
    ) -> Self {
        let draft = CheckoutDraft::new(storage);
        let cart = hydrate_cart(navigation, &draft);
        let address = draft
            .address()
            .filter(|saved| AddressForm::from(saved).to_address().is_ok());
        let step = if address.is_some() {
            CheckoutStep::Payment
        } else {
            CheckoutStep::Address
        };

        Self {
            draft,
            image_host,
            orders,
            auth,
            cart,
            address,
            selection: MethodSelection::default(),
            confirmation: None,
            placed: None,
            step,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn cart(&self) -> &HydratedCart {
        &self.cart
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn draft(&self) -> &CheckoutDraft<S> {
        &self.draft
    }

    pub fn selection(&self) -> &MethodSelection {
        &self.selection
    }

    pub fn confirmation(&self) -> Option<&PaymentConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn confirmation_mut(&mut self) -> Option<&mut PaymentConfirmation> {
        self.confirmation.as_mut()
    }

    pub fn placed_order(&self) -> Option<&SubmittedOrder> {
        self.placed.as_ref()
    }

    pub fn submit_address<F>(
        &mut self,
        form: &AddressForm,
        on_complete: F,
    ) -> Result<&Address, AddressErrors>
    where
        F: FnOnce(&Address),
    {
        let address = capture_address(form, &self.draft, on_complete)?;
        self.step = CheckoutStep::Payment;
        Ok(&*self.address.insert(address))
    }

    /// Back to the address form. Only the persisted address is dropped.
    pub fn edit_address(&mut self) {
        self.draft.clear_address();
        self.address = None;
        self.confirmation = None;
        self.step = CheckoutStep::Address;
    }

    pub fn select_method(&mut self, method: PaymentMethod) {
        self.selection.select(method);
    }

    /// Opens the confirmation modal for the selected method.
    pub fn pay_now(&mut self) -> Result<&mut PaymentConfirmation, CheckoutError> {
        if self.address.is_none() {
            return Err(CheckoutError::AddressRequired);
        }
        let method = self.selection.pay_now()?;
        self.step = CheckoutStep::Confirmation;
        Ok(self.confirmation.insert(PaymentConfirmation::new(method)))
    }

    /// Closes the modal without submitting. The draft is left as is.
    pub fn cancel_confirmation(&mut self) -> Route {
        self.confirmation = None;
        if self.step == CheckoutStep::Confirmation {
            self.step = CheckoutStep::Payment;
        }
        Route::Cart
    }

    /// Runs one submission attempt from the open modal.
    ///
    /// On failure the modal stays open with its inputs and shows the generic
    /// retry message; the cause is only logged.
    pub async fn submit_order(&mut self) -> Result<Route, CheckoutError> {
        let Some(confirmation) = self.confirmation.as_mut() else {
            return Err(CheckoutError::ConfirmationClosed);
        };
        confirmation.begin_submission()?;

        let user = self.auth.current_user();
        let result = place_order(
            &self.image_host,
            &self.orders,
            user.as_ref(),
            confirmation,
            &self.cart,
            self.address.as_ref(),
        )
        .await;

        match result {
            Ok(submitted) => {
                confirmation.succeed();
                info!(
                    order_id = %submitted.order_id,
                    method = %submitted.order.payment_method,
                    total = submitted.order.total,
                    "order submitted"
                );
                let route = Route::PaymentSuccess {
                    method: submitted.order.payment_method,
                    order_id: submitted.order_id.clone(),
                };
                self.draft.clear_cart();
                self.confirmation = None;
                self.placed = Some(submitted);
                self.step = CheckoutStep::Complete;
                Ok(route)
            }
            Err(err) => {
                warn!(error = ?err, "order submission failed");
                confirmation.fail(SUBMISSION_FAILED_MESSAGE);
                Err(CheckoutError::SubmissionFailed)
            }
        }
    }
}
