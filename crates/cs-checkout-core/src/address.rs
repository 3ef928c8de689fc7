//! Billing address capture.

use cs_api_types::Address;
use cs_draft_store::{CheckoutDraft, DraftStorage};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationErrors};

use crate::validation::{LETTERS_AND_SPACES, PHONE, STREET_ADDRESS};

/// Raw values as typed into the address form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    #[validate(
        length(min = 1, message = "Full name is required."),
        regex(
            path = "LETTERS_AND_SPACES",
            message = "Full name can only contain letters and spaces."
        )
    )]
    pub full_name: String,
    #[validate(
        length(min = 1, message = "Phone number is required."),
        regex(path = "PHONE", message = "Phone number must be 10 or 11 digits.")
    )]
    pub phone: String,
    #[validate(
        length(min = 1, message = "City is required."),
        regex(
            path = "LETTERS_AND_SPACES",
            message = "City can only contain letters and spaces."
        )
    )]
    pub city: String,
    #[validate(
        length(min = 1, message = "Area is required."),
        regex(
            path = "LETTERS_AND_SPACES",
            message = "Area can only contain letters and spaces."
        )
    )]
    pub area: String,
    #[validate(
        length(min = 1, message = "Address is required."),
        regex(
            path = "STREET_ADDRESS",
            message = "Address can only contain letters, spaces, commas, periods and hyphens."
        )
    )]
    pub address: String,
    #[serde(default)]
    pub floor: String,
}

impl From<&Address> for AddressForm {
    fn from(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            city: address.city.clone(),
            area: address.area.clone(),
            address: address.address.clone(),
            floor: address.floor.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressField {
    FullName,
    Phone,
    City,
    Area,
    Address,
}

impl AddressField {
    pub const ALL: [AddressField; 5] = [
        Self::FullName,
        Self::Phone,
        Self::City,
        Self::Area,
        Self::Address,
    ];

    /// Form field name, also used as the element id by the browser host.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Phone => "phone",
            Self::City => "city",
            Self::Area => "area",
            Self::Address => "address",
        }
    }

    /// Struct field name as reported by `ValidationErrors`.
    fn key(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Phone => "phone",
            Self::City => "city",
            Self::Area => "area",
            Self::Address => "address",
        }
    }
}

/// Per-field messages from a rejected address. Only the first failing rule
/// of each field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressErrors {
    errors: BTreeMap<AddressField, Cow<'static, str>>,
}

impl AddressErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: AddressField) -> Option<&str> {
        self.errors.get(&field).map(|message| &**message)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressField, &str)> + '_ {
        self.errors
            .iter()
            .map(|(field, message)| (*field, &**message))
    }
}

impl From<ValidationErrors> for AddressErrors {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors.field_errors();
        let errors = AddressField::ALL
            .into_iter()
            .filter_map(|field| {
                let first = fields.get(field.key())?.first()?;
                let message = first
                    .message
                    .clone()
                    .unwrap_or_else(|| first.code.clone());
                Some((field, message))
            })
            .collect();
        Self { errors }
    }
}

impl fmt::Display for AddressErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.values().map(|message| &**message).collect();
        f.write_str(&messages.join(" "))
    }
}

impl std::error::Error for AddressErrors {}

impl AddressForm {
    pub fn trimmed(&self) -> AddressForm {
        AddressForm {
            full_name: self.full_name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            city: self.city.trim().to_owned(),
            area: self.area.trim().to_owned(),
            address: self.address.trim().to_owned(),
            floor: self.floor.trim().to_owned(),
        }
    }

    /// Trims every field and checks it; returns the address on success.
    pub fn to_address(&self) -> Result<Address, AddressErrors> {
        let form = self.trimmed();
        form.validate()?;

        Ok(Address {
            full_name: form.full_name,
            phone: form.phone,
            city: form.city,
            area: form.area,
            address: form.address,
            floor: (!form.floor.is_empty()).then_some(form.floor),
        })
    }
}

/// Validates the form, persists the address as the latest draft value and
/// hands it to `on_complete`. Nothing is written when validation fails.
pub fn capture_address<S, F>(
    form: &AddressForm,
    draft: &CheckoutDraft<S>,
    on_complete: F,
) -> Result<Address, AddressErrors>
where
    S: DraftStorage,
    F: FnOnce(&Address),
{
    let address = form.to_address()?;
    draft.save_address(&address);
    on_complete(&address);
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_draft_store::{CHECKOUT_ADDRESS_KEY, InMemoryDraftStorage};

    fn valid_form() -> AddressForm {
        AddressForm {
            full_name: "Mona Adel".to_owned(),
            phone: "01012345678".to_owned(),
            city: "Cairo".to_owned(),
            area: "Nasr City".to_owned(),
            address: "Abbas El-Akkad St., Block B".to_owned(),
            floor: String::new(),
        }
    }

    #[test]
    fn valid_form_is_trimmed_and_floor_is_optional() {
        let mut form = valid_form();
        form.full_name = "  Mona Adel ".to_owned();
        form.floor = "  ".to_owned();

        let address = form.to_address().unwrap();
        assert_eq!(address.full_name, "Mona Adel");
        assert_eq!(address.floor, None);

        form.floor = "3rd, apt #5".to_owned();
        assert_eq!(form.to_address().unwrap().floor.as_deref(), Some("3rd, apt #5"));
    }

    #[test]
    fn letters_outside_ascii_are_accepted() {
        let mut form = valid_form();
        form.full_name = "منى عادل".to_owned();
        form.city = "القاهرة".to_owned();
        assert!(form.to_address().is_ok());
    }

    #[test]
    fn every_missing_field_is_reported() {
        let errors = AddressForm::default().to_address().unwrap_err();
        assert_eq!(errors.len(), 5);
        for field in AddressField::ALL {
            assert!(errors.get(field).unwrap().ends_with("is required."));
        }
    }

    #[test]
    fn pattern_failures_are_reported_per_field() {
        let with = |edit: fn(&mut AddressForm)| {
            let mut form = valid_form();
            edit(&mut form);
            form
        };
        let cases = [
            (AddressField::FullName, with(|f| f.full_name = "Mona2".into())),
            (AddressField::Phone, with(|f| f.phone = "123456789".into())),
            (AddressField::Phone, with(|f| f.phone = "010123456789".into())),
            (AddressField::Phone, with(|f| f.phone = "01012-45678".into())),
            (AddressField::City, with(|f| f.city = "Cairo!".into())),
            (AddressField::Area, with(|f| f.area = "Area 51".into())),
            (AddressField::Address, with(|f| f.address = "12 Nile St".into())),
        ];

        for (field, form) in cases {
            let errors = form.to_address().unwrap_err();
            assert_eq!(errors.len(), 1, "{form:?}");
            assert!(errors.get(field).is_some(), "{form:?}");
        }
    }

    #[test]
    fn required_message_wins_over_pattern_message() {
        let form = AddressForm {
            phone: "   ".to_owned(),
            ..valid_form()
        };
        let errors = form.to_address().unwrap_err();
        assert_eq!(errors.get(AddressField::Phone), Some("Phone number is required."));
        assert_eq!(errors.to_string(), "Phone number is required.");
    }

    #[test]
    fn ten_digit_phone_is_accepted() {
        let form = AddressForm {
            phone: "0123456789".into(),
            ..valid_form()
        };
        assert!(form.to_address().is_ok());
    }

    #[test]
    fn capture_persists_and_notifies_on_success() {
        let storage = InMemoryDraftStorage::default();
        let draft = CheckoutDraft::new(&storage);
        let mut notified = None;

        let address =
            capture_address(&valid_form(), &draft, |a| notified = Some(a.clone())).unwrap();

        assert_eq!(notified, Some(address.clone()));
        assert_eq!(draft.address(), Some(address));
    }

    #[test]
    fn rejected_address_writes_nothing() {
        let storage = InMemoryDraftStorage::default();
        let draft = CheckoutDraft::new(&storage);
        let mut called = false;

        let form = AddressForm {
            phone: String::new(),
            ..valid_form()
        };
        let errors = capture_address(&form, &draft, |_| called = true).unwrap_err();

        assert!(errors.get(AddressField::Phone).is_some());
        assert!(!called);
        assert!(!storage.contains(CHECKOUT_ADDRESS_KEY));
    }
}
