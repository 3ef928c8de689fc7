//! Global application state.
//!
//! Uses `thread_local!` storage (WASM is single-threaded). The checkout flow is
//! shared behind `Rc<RefCell<..>>`; a handler that finds it already borrowed
//! (a submission is awaiting the network) is dropped.

use crate::storage::LocalStorageDraft;
use cs_backend_client::InMemorySession;
use cs_checkout_core::CheckoutFlow;
use cs_cloudinary::CloudinaryUploader;
use cs_firestore::FirestoreOrderStore;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

pub type Flow =
    CheckoutFlow<LocalStorageDraft, CloudinaryUploader, FirestoreOrderStore, Arc<InMemorySession>>;

pub type FlowHandle = Rc<RefCell<Flow>>;

thread_local! {
    static FLOW: OnceCell<FlowHandle> = const { OnceCell::new() };
}

pub fn install(flow: Flow) {
    FLOW.with(|cell| {
        let _ = cell.set(Rc::new(RefCell::new(flow)));
    });
}

pub fn handle() -> Option<FlowHandle> {
    FLOW.with(|cell| cell.get().cloned())
}

/// Run a closure with mutable access to the flow. Returns `None` when the
/// flow is not mounted or is busy.
pub fn with_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Flow) -> R,
{
    let handle = handle()?;
    let mut flow = handle.try_borrow_mut().ok()?;
    Some(f(&mut flow))
}

