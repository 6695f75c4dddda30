//! `Stripe-Signature` verification.

use domainforge_error::{BillingError, BillingErrorKind};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Signing timestamp (unix seconds)
    pub timestamp: i64,
    /// Hex-encoded `v1` signatures
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parse `t=<unix>,v1=<hex>[,v1=<hex>…]`. Unknown schemes are ignored.
    ///
    /// # Errors
    ///
    /// Fails when the timestamp or every `v1` entry is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use domainforge_billing::SignatureHeader;
    ///
    /// let header = SignatureHeader::parse("t=1700000000,v1=abcd,v0=ignored").unwrap();
    /// assert_eq!(header.timestamp, 1700000000);
    /// assert_eq!(header.signatures, vec!["abcd"]);
    /// ```
    pub fn parse(header: &str) -> Result<Self, BillingError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                "v1" => signatures.push(value.to_string()),
                _ => {}
            }
        }

        match timestamp {
            Some(timestamp) if !signatures.is_empty() => Ok(Self {
                timestamp,
                signatures,
            }),
            _ => Err(BillingError::new(BillingErrorKind::InvalidSignature)),
        }
    }
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, BillingError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::new(BillingErrorKind::MissingSignature))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produce a header value for `payload`, as Stripe would.
///
/// # Errors
///
/// Fails only if the secret cannot key an HMAC.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, BillingError> {
    let signature = hex::encode(mac_for(secret, timestamp, payload)?.finalize().into_bytes());
    Ok(format!("t={},v1={}", timestamp, signature))
}

/// Check a signature header against `payload` at time `now`.
///
/// # Errors
///
/// - Missing-signature error when the header or the secret is empty
/// - Invalid-signature error for a malformed header, a stale timestamp or a
///   signature mismatch
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), BillingError> {
    if header.trim().is_empty() || secret.is_empty() {
        return Err(BillingError::new(BillingErrorKind::MissingSignature));
    }

    let parsed = SignatureHeader::parse(header)?;
    if now.abs_diff(parsed.timestamp) > tolerance_secs.unsigned_abs() {
        debug!(timestamp = parsed.timestamp, now, "Webhook timestamp outside tolerance");
        return Err(BillingError::new(BillingErrorKind::InvalidSignature));
    }

    let mac = mac_for(secret, parsed.timestamp, payload)?;
    let matched = parsed
        .signatures
        .iter()
        .filter_map(|s| hex::decode(s).ok())
        .any(|expected| mac.clone().verify_slice(&expected).is_ok());

    if matched {
        Ok(())
    } else {
        Err(BillingError::new(BillingErrorKind::InvalidSignature))
    }
}
