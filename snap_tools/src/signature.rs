use sha2::{Digest, Sha512};

use crate::SnapNotification;

/// `hex(SHA-512(order_id + status_code + gross_amount + server_key))`, the provider's notification signature.
pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checks the notification's `signature_key`. A notification without the signed fields is not authentic.
pub fn verify_signature(notification: &SnapNotification, server_key: &str) -> bool {
    let (Some(status_code), Some(gross_amount), Some(signature)) =
        (&notification.status_code, &notification.gross_amount, &notification.signature_key)
    else {
        return false;
    };
    let expected = notification_signature(&notification.order_id, status_code, gross_amount, server_key);
    expected.eq_ignore_ascii_case(signature)
}
