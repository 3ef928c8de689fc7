use cs_api_types::ReceiptFile;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;
pub const ACCEPTED_RECEIPT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

static TRANSACTION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5,19}$").expect("transaction id pattern"));
pub(crate) static LETTERS_AND_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s]+$").expect("name pattern"));
pub(crate) static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10,11}$").expect("phone pattern"));
pub(crate) static STREET_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s,.\-]+$").expect("address pattern"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("Only JPG and PNG images are accepted.")]
    UnsupportedType(String),
    #[error("The receipt must be 5MB or smaller.")]
    TooLarge(usize),
}

/// Accepts JPEG/PNG receipts up to 5MB, judged by the declared content type.
pub fn validate_file(file: &ReceiptFile) -> Result<(), ReceiptError> {
    validate_receipt_metadata(&file.content_type, file.size())
}

/// Same checks as [`validate_file`] on a file's declared type and size, for
/// hosts that must reject a file before reading its contents.
pub fn validate_receipt_metadata(content_type: &str, size: usize) -> Result<(), ReceiptError> {
    if !ACCEPTED_RECEIPT_TYPES.contains(&content_type) {
        return Err(ReceiptError::UnsupportedType(content_type.to_owned()));
    }
    if size > MAX_RECEIPT_BYTES {
        return Err(ReceiptError::TooLarge(size));
    }
    Ok(())
}

/// 6–20 digits, first digit nonzero.
pub fn validate_transaction_id(value: &str) -> bool {
    TRANSACTION_ID.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, size: usize) -> ReceiptFile {
        ReceiptFile::new("receipt", content_type, vec![0; size])
    }

    #[test]
    fn accepts_jpeg_and_png_up_to_the_limit() {
        for content_type in ACCEPTED_RECEIPT_TYPES {
            assert_eq!(validate_file(&file(content_type, 1024)), Ok(()));
        }
        assert_eq!(validate_file(&file("image/png", MAX_RECEIPT_BYTES)), Ok(()));
        assert_eq!(validate_file(&file("image/png", 0)), Ok(()));
    }

    #[test]
    fn metadata_is_checked_without_file_contents() {
        assert_eq!(validate_receipt_metadata("image/png", MAX_RECEIPT_BYTES), Ok(()));
        assert_eq!(
            validate_receipt_metadata("image/png", 3 * 1024 * 1024 * 1024),
            Err(ReceiptError::TooLarge(3 * 1024 * 1024 * 1024))
        );
        assert_eq!(
            validate_receipt_metadata("application/pdf", 10),
            Err(ReceiptError::UnsupportedType("application/pdf".to_owned()))
        );
    }

    #[test]
    fn rejects_other_types_and_oversized_files() {
        assert_eq!(
            validate_file(&file("application/pdf", 10)),
            Err(ReceiptError::UnsupportedType("application/pdf".to_owned()))
        );
        assert!(validate_file(&file("image/gif", 10)).is_err());
        assert!(validate_file(&file("", 10)).is_err());
        assert_eq!(
            validate_file(&file("image/jpeg", 5_242_881)),
            Err(ReceiptError::TooLarge(5_242_881))
        );
    }

    #[test]
    fn transaction_id_format() {
        assert!(validate_transaction_id("123456"));
        assert!(validate_transaction_id("198765"));
        assert!(validate_transaction_id("12345678901234567890"));

        assert!(!validate_transaction_id("0123456"));
        assert!(!validate_transaction_id("12345"));
        assert!(!validate_transaction_id("123456789012345678901"));
        assert!(!validate_transaction_id("12345a"));
        assert!(!validate_transaction_id(""));
        assert!(!validate_transaction_id("123456\n"));
    }
}
