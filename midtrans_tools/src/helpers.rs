use sha2::{Digest, Sha512};

use crate::MidtransApiError;

/// Computes the signature Midtrans attaches to status notifications:
/// `SHA-512(order_id + status_code + gross_amount + server_key)`, hex-encoded.
pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parses a Midtrans decimal amount string ("20000.00") into whole currency units.
/// Fractional rupiah are not a thing, so a non-zero fraction is rejected.
pub fn parse_gross_amount(amount: &str) -> Result<i64, MidtransApiError> {
    let invalid = || MidtransApiError::InvalidCurrencyAmount(amount.to_string());
    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if !fraction.is_empty() && fraction.chars().any(|c| c != '0') {
        return Err(invalid());
    }
    whole.parse::<i64>().map_err(|_| invalid())
}
