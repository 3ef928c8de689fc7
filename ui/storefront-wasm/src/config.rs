//! Service settings read from `data-*` attributes on the checkout root.
//!
//! ```html
//! <main id="checkoutRoot"
//!       data-cloud-name="demo"
//!       data-upload-preset="receipts"
//!       data-project-id="course-store"
//!       data-firebase-api-key="...">
//! ```
//!
//! Missing attributes fall through to the adapters' own defaults.

use web_sys::Element;

#[derive(Debug, Clone, Default)]
pub struct StorefrontConfig {
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
    pub cloudinary_base_url: Option<String>,
    pub project_id: Option<String>,
    pub firestore_base_url: Option<String>,
    pub firebase_api_key: Option<String>,
}

fn data_attr(root: &Element, name: &str) -> Option<String> {
    root.get_attribute(&format!("data-{name}"))
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl StorefrontConfig {
    pub fn from_root(root: &Element) -> Self {
        Self {
            cloud_name: data_attr(root, "cloud-name"),
            upload_preset: data_attr(root, "upload-preset"),
            cloudinary_base_url: data_attr(root, "cloudinary-base-url"),
            project_id: data_attr(root, "project-id"),
            firestore_base_url: data_attr(root, "firestore-base-url"),
            firebase_api_key: data_attr(root, "firebase-api-key"),
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("data-cloud-name", &self.cloud_name),
            ("data-upload-preset", &self.upload_preset),
            ("data-project-id", &self.project_id),
            ("data-firebase-api-key", &self.firebase_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}
