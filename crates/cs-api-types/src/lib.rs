use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const GUEST_USER_ID: &str = "guest";
pub const GUEST_CUSTOMER_NAME: &str = "Guest";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Instapay,
    #[serde(rename = "Vodafone Cash")]
    VodafoneCash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [Self::Cash, Self::Instapay, Self::VodafoneCash];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Instapay => "Instapay",
            Self::VodafoneCash => "Vodafone Cash",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.label() == label)
    }

    /// Every method except cash needs a proof-of-payment image.
    pub fn requires_receipt(self) -> bool {
        !matches!(self, Self::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub area: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_default")]
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl CartItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            quantity,
            extra: serde_json::Map::new(),
        }
    }

    pub fn normalized(mut self) -> Self {
        self.quantity = self.quantity.max(1);
        self
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

fn default_quantity() -> u32 {
    1
}

/// Quantities arrive from JavaScript state and browser storage: any number or
/// numeric string is rounded and clamped to at least 1; anything else is 1.
fn quantity_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(quantity_from_json).unwrap_or(1))
}

fn quantity_from_json(value: &Value) -> Option<u32> {
    let quantity = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !quantity.is_finite() {
        return None;
    }
    Some(quantity.round().clamp(1.0, f64::from(u32::MAX)) as u32)
}

/// Decodes cart items one by one, dropping the entries that are not items.
pub fn parse_cart_items(values: Vec<Value>) -> Vec<CartItem> {
    values
        .into_iter()
        .filter_map(|value| serde_json::from_value::<CartItem>(value).ok())
        .map(CartItem::normalized)
        .collect()
}

fn lenient_cart_items<'de, D>(deserializer: D) -> Result<Option<Vec<CartItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.map(parse_cart_items))
}

/// State handed to the checkout page by the cart view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutNavigation {
    #[serde(default, deserialize_with = "lenient_cart_items")]
    pub cart_items: Option<Vec<CartItem>>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// A file picked by the user as proof of payment.
#[derive(Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for ReceiptFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

/// Order record written to the `Orders` collection. `createdAt` is assigned by
/// the document store at write time and is not part of this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub user_id: String,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub total: f64,
    pub cart_items: Vec<CartItem>,
    pub course_ids: Vec<String>,
    pub address: Option<Address>,
    pub status: OrderStatus,
    pub transaction_id: String,
    pub receipt_url: String,
}
