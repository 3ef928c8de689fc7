use cs_api_types::{CartItem, CheckoutNavigation};
use cs_draft_store::{CheckoutDraft, DraftStorage};
use tracing::{debug, warn};

/// Cart snapshot the checkout works from. Never mutated after hydration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydratedCart {
    pub items: Vec<CartItem>,
    pub total: f64,
}

impl HydratedCart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn course_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}

/// Resolves the cart and total on checkout entry.
///
/// A non-empty cart handed over by navigation wins and is re-persisted
/// together with its total, replacing whatever the draft held. Otherwise the
/// persisted draft is used, and an empty cart with a zero total when there is
/// none. Items are never merged across sources.
pub fn hydrate_cart<S: DraftStorage>(
    navigation: &CheckoutNavigation,
    draft: &CheckoutDraft<S>,
) -> HydratedCart {
    let fresh = navigation
        .cart_items
        .as_deref()
        .filter(|items| !items.is_empty());

    let cart = match fresh {
        Some(items) => {
            let items: Vec<CartItem> = items.iter().cloned().map(CartItem::normalized).collect();
            let total = navigation.total.unwrap_or(0.0);
            draft.save_cart(&items, total);
            debug!(items = items.len(), total, "checkout cart taken from navigation");
            HydratedCart { items, total }
        }
        None => {
            let items = draft
                .cart()
                .unwrap_or_default()
                .into_iter()
                .map(CartItem::normalized)
                .collect();
            let total = navigation.total.or_else(|| draft.total()).unwrap_or(0.0);
            HydratedCart { items, total }
        }
    };

    if !cart.is_empty() && (cart.subtotal() - cart.total).abs() > 0.005 {
        warn!(
            subtotal = cart.subtotal(),
            total = cart.total,
            "checkout total does not match cart contents"
        );
    }

    cart
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_draft_store::{CHECKOUT_CART_KEY, InMemoryDraftStorage};

    fn stale_draft(storage: &InMemoryDraftStorage) -> CheckoutDraft<&InMemoryDraftStorage> {
        let draft = CheckoutDraft::new(storage);
        draft.save_cart(&[CartItem::new("old", "Old course", 50.0, 1)], 50.0);
        draft
    }

    #[test]
    fn navigation_cart_wins_and_is_persisted() {
        let storage = InMemoryDraftStorage::default();
        let draft = stale_draft(&storage);
        let navigation = CheckoutNavigation {
            cart_items: Some(vec![
                CartItem::new("c1", "Intro", 100.0, 2),
                CartItem::new("c2", "Advanced", 150.0, 0),
            ]),
            total: Some(350.0),
        };

        let cart = hydrate_cart(&navigation, &draft);

        assert_eq!(cart.course_ids(), vec!["c1".to_owned(), "c2".to_owned()]);
        assert_eq!(cart.items[1].quantity, 1);
        assert_eq!(cart.total, 350.0);
        assert_eq!(draft.cart(), Some(cart.items.clone()));
        assert_eq!(draft.total(), Some(350.0));
    }

    #[test]
    fn navigation_cart_without_total_persists_zero() {
        let storage = InMemoryDraftStorage::default();
        let draft = stale_draft(&storage);
        let navigation = CheckoutNavigation {
            cart_items: Some(vec![CartItem::new("c1", "Intro", 100.0, 1)]),
            total: None,
        };

        let cart = hydrate_cart(&navigation, &draft);

        assert_eq!(cart.total, 0.0);
        assert_eq!(draft.total(), Some(0.0));
    }

    #[test]
    fn empty_navigation_falls_back_to_draft() {
        let storage = InMemoryDraftStorage::default();
        let draft = stale_draft(&storage);
        let navigation = CheckoutNavigation {
            cart_items: Some(Vec::new()),
            total: None,
        };

        let cart = hydrate_cart(&navigation, &draft);

        assert_eq!(cart.course_ids(), vec!["old".to_owned()]);
        assert_eq!(cart.total, 50.0);
    }

    #[test]
    fn navigation_total_alone_does_not_rewrite_the_draft() {
        let storage = InMemoryDraftStorage::default();
        let draft = stale_draft(&storage);
        let navigation = CheckoutNavigation {
            cart_items: None,
            total: Some(75.0),
        };

        let cart = hydrate_cart(&navigation, &draft);

        assert_eq!(cart.total, 75.0);
        assert_eq!(draft.total(), Some(50.0));
    }

    #[test]
    fn nothing_anywhere_gives_empty_cart() {
        let storage = InMemoryDraftStorage::default();
        let draft = CheckoutDraft::new(&storage);

        let cart = hydrate_cart(&CheckoutNavigation::default(), &draft);

        assert!(cart.is_empty());
        assert_eq!(cart.total, 0.0);
        assert!(!storage.contains(CHECKOUT_CART_KEY));
    }

    #[test]
    fn persisted_items_missing_quantity_are_normalized() {
        let storage = InMemoryDraftStorage::default();
        cs_draft_store::DraftStorage::set(
            &storage,
            CHECKOUT_CART_KEY,
            r#"[{"id":"c1","title":"Intro","price":100}]"#,
        )
        .unwrap();
        let draft = CheckoutDraft::new(&storage);

        let cart = hydrate_cart(&CheckoutNavigation::default(), &draft);

        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal(), 100.0);
    }

    #[test]
    fn navigation_cart_with_fractional_quantity_replaces_stale_draft() {
        let storage = InMemoryDraftStorage::default();
        let draft = stale_draft(&storage);
        let navigation: CheckoutNavigation = serde_json::from_str(
            r#"{"cartItems":[{"id":"c1","title":"Intro","price":100,"quantity":1.5}],"total":150}"#,
        )
        .unwrap();

        let cart = hydrate_cart(&navigation, &draft);

        assert_eq!(cart.course_ids(), vec!["c1".to_owned()]);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total, 150.0);
        assert_eq!(draft.cart().map(|items| items.len()), Some(1));
        assert_eq!(draft.total(), Some(150.0));
    }

    #[test]
    fn persisted_cart_with_negative_and_string_quantities_is_kept() {
        let storage = InMemoryDraftStorage::default();
        cs_draft_store::DraftStorage::set(
            &storage,
            CHECKOUT_CART_KEY,
            r#"[{"id":"c1","title":"Intro","price":100,"quantity":-1},
                {"id":"c2","title":"Advanced","price":50,"quantity":"3"}]"#,
        )
        .unwrap();
        let draft = CheckoutDraft::new(&storage);

        let cart = hydrate_cart(&CheckoutNavigation::default(), &draft);

        assert_eq!(cart.course_ids(), vec!["c1".to_owned(), "c2".to_owned()]);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), 250.0);
    }
}
