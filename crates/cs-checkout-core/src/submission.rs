use anyhow::{Context, Result};
use cs_api_types::{
    Address, GUEST_CUSTOMER_NAME, GUEST_USER_ID, Order, OrderStatus, PaymentMethod, SessionUser,
};
use cs_backend_client::{ImageHost, OrderStore};
use tracing::debug;

use crate::confirmation::{ModalState, PaymentConfirmation};
use crate::hydration::HydratedCart;

#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedOrder {
    pub order_id: String,
    pub order: Order,
}

/// Assembles the `pending` order record.
///
/// Signed-in users are recorded by uid; the customer name falls back from the
/// profile display name to the billing name. Without a session the order is
/// attributed to the guest identity.
pub fn build_order(
    user: Option<&SessionUser>,
    method: PaymentMethod,
    cart: &HydratedCart,
    address: Option<&Address>,
    transaction_id: String,
    receipt_url: String,
) -> Order {
    let (user_id, customer_name) = match user {
        Some(user) => {
            let name = user
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .or_else(|| address.map(|a| a.full_name.as_str()))
                .unwrap_or(GUEST_CUSTOMER_NAME);
            (user.uid.clone(), name.to_owned())
        }
        None => (GUEST_USER_ID.to_owned(), GUEST_CUSTOMER_NAME.to_owned()),
    };

    Order {
        user_id,
        customer_name,
        payment_method: method,
        total: cart.total,
        cart_items: cart.items.clone(),
        course_ids: cart.course_ids(),
        address: address.cloned(),
        status: OrderStatus::Pending,
        transaction_id,
        receipt_url,
    }
}

/// Uploads the receipt when there is one, then writes the order. The modal
/// state follows along; a failed write leaves any uploaded receipt in place.
pub(crate) async fn place_order<I, O>(
    image_host: &I,
    orders: &O,
    user: Option<&SessionUser>,
    confirmation: &mut PaymentConfirmation,
    cart: &HydratedCart,
    address: Option<&Address>,
) -> Result<SubmittedOrder>
where
    I: ImageHost + ?Sized,
    O: OrderStore + ?Sized,
{
    if confirmation.receipt_for_upload().is_some() {
        confirmation.advance(ModalState::Uploading);
    }
    let receipt_url = match confirmation.receipt_for_upload() {
        Some(file) => {
            let url = image_host
                .upload_image(file)
                .await
                .context("receipt upload")?;
            debug!(file = %file.name, "receipt stored");
            url
        }
        None => String::new(),
    };

    confirmation.advance(ModalState::Submitting);
    let order = build_order(
        user,
        confirmation.method(),
        cart,
        address,
        confirmation.order_transaction_id(),
        receipt_url,
    );
    let order_id = orders
        .create_order(&order, user)
        .await
        .context("order write")?;

    Ok(SubmittedOrder { order_id, order })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_api_types::CartItem;

    fn cart() -> HydratedCart {
        HydratedCart {
            items: vec![CartItem::new("c1", "Intro", 100.0, 2)],
            total: 200.0,
        }
    }

    fn address() -> Address {
        Address {
            full_name: "Mona Adel".to_owned(),
            phone: "01012345678".to_owned(),
            city: "Cairo".to_owned(),
            area: "Maadi".to_owned(),
            address: "Road nine".to_owned(),
            floor: None,
        }
    }

    #[test]
    fn guest_orders_use_the_sentinel_identity() {
        let order = build_order(
            None,
            PaymentMethod::Cash,
            &cart(),
            Some(&address()),
            String::new(),
            String::new(),
        );

        assert_eq!(order.user_id, GUEST_USER_ID);
        assert_eq!(order.customer_name, GUEST_CUSTOMER_NAME);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.course_ids, vec!["c1".to_owned()]);
        assert_eq!(order.total, 200.0);
    }

    #[test]
    fn signed_in_orders_prefer_display_name_then_billing_name() {
        let mut user = SessionUser {
            uid: "u1".to_owned(),
            display_name: Some("Mona A.".to_owned()),
            ..SessionUser::default()
        };
        let order = build_order(
            Some(&user),
            PaymentMethod::Instapay,
            &cart(),
            Some(&address()),
            "198765".to_owned(),
            "https://img/r.png".to_owned(),
        );
        assert_eq!(order.user_id, "u1");
        assert_eq!(order.customer_name, "Mona A.");

        user.display_name = Some("  ".to_owned());
        let order = build_order(
            Some(&user),
            PaymentMethod::Instapay,
            &cart(),
            Some(&address()),
            String::new(),
            String::new(),
        );
        assert_eq!(order.customer_name, "Mona Adel");
    }
}
