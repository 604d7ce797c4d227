use hmac::{digest::InvalidLength, Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lower-case hex HMAC-SHA256 of `payload` keyed with `secret`.
///
/// The payload must be the exact bytes received on the wire.
pub fn compute_signature(secret: &str, payload: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a provided hex signature against the raw payload.
///
/// `provided` is the header value as received, so non-UTF-8 input simply
/// fails to match. Returns `Ok(false)` on any mismatch, including length.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    provided: &[u8],
) -> Result<bool, InvalidLength> {
    let expected = compute_signature(secret, payload)?;
    let is_valid = constant_time_eq(expected.as_bytes(), provided);

    if !is_valid {
        debug!(
            provided_len = provided.len(),
            "Webhook signature verification failed"
        );
    }

    Ok(is_valid)
}

/// Length check first, then a constant-time comparison of equal-length inputs.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}
