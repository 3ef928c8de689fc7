use anyhow::{Context, Result};
use async_trait::async_trait;
use cs_api_types::{Order, SessionUser};
use cs_backend_client::OrderStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;
use uuid::Uuid;

pub const ORDERS_COLLECTION: &str = "Orders";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

/// Firestore REST adapter for the `Orders` collection.
///
/// Reads `FIRESTORE_PROJECT_ID` and `FIRESTORE_BASE_URL` from the environment
/// at construction time. Point the base URL at the emulator for local runs.
pub struct FirestoreOrderStore {
    base_url: String,
    project_id: String,
    http: reqwest::Client,
}

impl FirestoreOrderStore {
    pub fn new(project_id: Option<String>, base_url: Option<String>) -> Self {
        let project_id = project_id
            .or_else(|| std::env::var("FIRESTORE_PROJECT_ID").ok())
            .unwrap_or_default();
        let base_url = base_url
            .or_else(|| std::env::var("FIRESTORE_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            project_id,
            http: reqwest::Client::new(),
        }
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.project_id)
    }

    fn commit_url(&self) -> String {
        format!("{}/v1/{}/documents:commit", self.base_url, self.database_path())
    }

    fn document_name(&self, collection: &str, document_id: &str) -> String {
        format!("{}/documents/{collection}/{document_id}", self.database_path())
    }

    fn commit_request(&self, document_id: &str, order: &Order) -> Result<CommitRequest> {
        let Value::Object(map) = serde_json::to_value(order).context("encode order")? else {
            anyhow::bail!("order did not encode to an object");
        };

        Ok(CommitRequest {
            writes: vec![Write {
                update: Document {
                    name: self.document_name(ORDERS_COLLECTION, document_id),
                    fields: encode_fields(&map),
                },
                current_document: Precondition { exists: false },
                update_transforms: vec![FieldTransform {
                    field_path: CREATED_AT_FIELD.to_owned(),
                    set_to_server_value: "REQUEST_TIME".to_owned(),
                }],
            }],
        })
    }
}

// ── Firestore REST API types ─────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CommitRequest {
    writes: Vec<Write>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Write {
    update: Document,
    current_document: Precondition,
    update_transforms: Vec<FieldTransform>,
}

#[derive(Debug, Serialize)]
struct Document {
    name: String,
    fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct Precondition {
    exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldTransform {
    field_path: String,
    set_to_server_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    commit_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    message: String,
}

/// Converts a JSON value to Firestore's typed value representation.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                json!({ "integerValue": int.to_string() })
            } else if let Some(int) = number.as_u64() {
                json!({ "integerValue": int.to_string() })
            } else {
                json!({ "doubleValue": number.as_f64() })
            }
        }
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), to_firestore_value(value)))
        .collect()
}

#[async_trait(?Send)]
impl OrderStore for FirestoreOrderStore {
    async fn create_order(&self, order: &Order, session: Option<&SessionUser>) -> Result<String> {
        if self.project_id.is_empty() {
            anyhow::bail!("firestore project id must be configured");
        }

        let document_id = Uuid::new_v4().simple().to_string();
        let body = self.commit_request(&document_id, order)?;

        let mut request = self.http.post(self.commit_url()).json(&body);
        if let Some(token) = session.and_then(|user| user.id_token.as_deref()) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("firestore create_order transport")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&text) {
                anyhow::bail!("firestore create_order HTTP {status}: {}", err.error.message);
            }
            anyhow::bail!("firestore create_order HTTP {status}: {text}");
        }

        let commit: CommitResponse =
            serde_json::from_str(&text).context("firestore create_order parse")?;
        info!(
            document_id = %document_id,
            commit_time = commit.commit_time.as_deref().unwrap_or("unknown"),
            "order document created"
        );

        Ok(document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_api_types::{Address, CartItem, OrderStatus, PaymentMethod};

    fn order() -> Order {
        Order {
            user_id: "u1".to_owned(),
            customer_name: "Mona Adel".to_owned(),
            payment_method: PaymentMethod::VodafoneCash,
            total: 200.0,
            cart_items: vec![CartItem::new("c1", "Intro", 100.0, 2)],
            course_ids: vec!["c1".to_owned()],
            address: Some(Address {
                full_name: "Mona Adel".to_owned(),
                phone: "01012345678".to_owned(),
                city: "Cairo".to_owned(),
                area: "Maadi".to_owned(),
                address: "Road nine".to_owned(),
                floor: None,
            }),
            status: OrderStatus::Pending,
            transaction_id: "198765".to_owned(),
            receipt_url: "https://res.cloudinary.com/demo/r.png".to_owned(),
        }
    }

    #[test]
    fn encodes_scalars_with_firestore_tags() {
        assert_eq!(to_firestore_value(&json!(null)), json!({ "nullValue": null }));
        assert_eq!(to_firestore_value(&json!(true)), json!({ "booleanValue": true }));
        assert_eq!(to_firestore_value(&json!(2)), json!({ "integerValue": "2" }));
        assert_eq!(to_firestore_value(&json!(200.5)), json!({ "doubleValue": 200.5 }));
        assert_eq!(to_firestore_value(&json!("c1")), json!({ "stringValue": "c1" }));
    }

    #[test]
    fn encodes_nested_arrays_and_maps() {
        let encoded = to_firestore_value(&json!({ "ids": ["c1"], "meta": { "n": 1 } }));
        assert_eq!(
            encoded,
            json!({
                "mapValue": { "fields": {
                    "ids": { "arrayValue": { "values": [{ "stringValue": "c1" }] } },
                    "meta": { "mapValue": { "fields": { "n": { "integerValue": "1" } } } }
                } }
            })
        );
    }

    #[test]
    fn commit_request_creates_document_with_server_timestamp() -> anyhow::Result<()> {
        let store = FirestoreOrderStore::new(
            Some("course-store".to_owned()),
            Some("http://localhost:8081/".to_owned()),
        );
        assert_eq!(
            store.commit_url(),
            "http://localhost:8081/v1/projects/course-store/databases/(default)/documents:commit"
        );

        let body = serde_json::to_value(store.commit_request("abc123", &order())?)?;
        let write = &body["writes"][0];

        assert_eq!(
            write["update"]["name"],
            "projects/course-store/databases/(default)/documents/Orders/abc123"
        );
        assert_eq!(write["currentDocument"]["exists"], false);
        assert_eq!(write["updateTransforms"][0]["fieldPath"], "createdAt");
        assert_eq!(write["updateTransforms"][0]["setToServerValue"], "REQUEST_TIME");

        let fields = &write["update"]["fields"];
        assert_eq!(fields["status"]["stringValue"], "pending");
        assert_eq!(fields["paymentMethod"]["stringValue"], "Vodafone Cash");
        assert_eq!(fields["total"]["doubleValue"], 200.0);
        assert_eq!(fields["transactionId"]["stringValue"], "198765");
        assert_eq!(
            fields["courseIds"]["arrayValue"]["values"][0]["stringValue"],
            "c1"
        );
        assert!(fields.get("createdAt").is_none());
        Ok(())
    }
}
