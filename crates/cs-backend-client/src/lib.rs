//! Ports to the hosted services the checkout talks to, plus in-memory
//! implementations used by tests and local previews.
//!
//! The storefront runs on a single browser thread, so the async ports are
//! declared `?Send`.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use cs_api_types::{Order, ReceiptFile, SessionUser};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Image hosting endpoint for payment receipts.
#[async_trait(?Send)]
pub trait ImageHost {
    /// Uploads the file and returns its public HTTPS URL.
    async fn upload_image(&self, file: &ReceiptFile) -> Result<String>;
}

/// Document store holding the `Orders` collection.
#[async_trait(?Send)]
pub trait OrderStore {
    /// Appends the order with a server-assigned `createdAt` and returns the
    /// new document id.
    async fn create_order(&self, order: &Order, session: Option<&SessionUser>) -> Result<String>;
}

/// Current signed-in user, if any.
pub trait AuthProvider {
    fn current_user(&self) -> Option<SessionUser>;
}

#[async_trait(?Send)]
impl<T: ImageHost + ?Sized> ImageHost for Arc<T> {
    async fn upload_image(&self, file: &ReceiptFile) -> Result<String> {
        (**self).upload_image(file).await
    }
}

#[async_trait(?Send)]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn create_order(&self, order: &Order, session: Option<&SessionUser>) -> Result<String> {
        (**self).create_order(order, session).await
    }
}

impl<T: AuthProvider + ?Sized> AuthProvider for Arc<T> {
    fn current_user(&self) -> Option<SessionUser> {
        (**self).current_user()
    }
}

#[derive(Default)]
pub struct InMemoryImageHost {
    uploads: RwLock<Vec<String>>,
    unavailable: AtomicBool,
}

impl InMemoryImageHost {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Names of the files uploaded so far.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait(?Send)]
impl ImageHost for InMemoryImageHost {
    async fn upload_image(&self, file: &ReceiptFile) -> Result<String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("image host unavailable"));
        }

        let mut guard = self
            .uploads
            .write()
            .map_err(|_| anyhow!("upload log lock poisoned"))?;
        guard.push(file.name.clone());
        Ok(format!(
            "https://images.local/receipts/{}-{}",
            Uuid::new_v4(),
            file.name
        ))
    }
}

#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: String,
    pub order: Order,
    pub created_at_epoch_ms: u128,
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<StoredOrder>>,
    unavailable: AtomicBool,
}

impl InMemoryOrderStore {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn orders(&self) -> Vec<StoredOrder> {
        self.orders
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait(?Send)]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: &Order, _session: Option<&SessionUser>) -> Result<String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("document store unavailable"));
        }

        let created_at_epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| anyhow!("time error: {err}"))?
            .as_millis();
        let id = Uuid::new_v4().to_string();

        let mut guard = self
            .orders
            .write()
            .map_err(|_| anyhow!("order store lock poisoned"))?;
        guard.push(StoredOrder {
            id: id.clone(),
            order: order.clone(),
            created_at_epoch_ms,
        });
        Ok(id)
    }
}

/// Session holder filled in by whichever sign-in flow the host uses.
#[derive(Default)]
pub struct InMemorySession {
    user: RwLock<Option<SessionUser>>,
}

impl InMemorySession {
    pub fn signed_in(user: SessionUser) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn set_user(&self, user: Option<SessionUser>) {
        if let Ok(mut guard) = self.user.write() {
            *guard = user;
        }
    }
}

impl AuthProvider for InMemorySession {
    fn current_user(&self) -> Option<SessionUser> {
        self.user.read().ok().and_then(|guard| guard.clone())
    }
}
