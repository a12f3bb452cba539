//! Payment-webhook signature verification.
//!
//! The payment provider signs each webhook delivery with a header of
//! the form `t=<unix seconds>,v1=<hex hmac-sha256>`, where the MAC is
//! computed over `"{t}.{raw body}"` with a shared secret. Verification
//! checks the MAC in constant time and rejects stale timestamps to
//! blunt replay.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted clock skew between the signature timestamp and now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Parsed `t=...,v1=...` header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, CoreError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse().map_err(|_| {
                    CoreError::Validation("Webhook signature timestamp is not an integer".into())
                })?);
            }
            Some(("v1", value)) => signatures.push(value.to_string()),
            _ => {} // Unknown schemes are ignored, per provider docs.
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| CoreError::Validation("Webhook signature header missing 't='".into()))?;
    if signatures.is_empty() {
        return Err(CoreError::Validation(
            "Webhook signature header missing 'v1='".into(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Verify a webhook payload against its signature header.
///
/// `now_unix` is injected so verification is deterministic in tests.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now_unix: i64,
) -> Result<(), CoreError> {
    let parsed = parse_header(header)?;

    if (now_unix - parsed.timestamp).abs() > tolerance_secs {
        return Err(CoreError::Validation(
            "Webhook signature timestamp outside tolerance".into(),
        ));
    }

    let expected = compute_signature(payload, parsed.timestamp, secret);
    let matched = parsed.signatures.iter().any(|candidate| {
        // Constant-time comparison via the Mac verifier.
        hex::decode(candidate)
            .ok()
            .map(|bytes| {
                let mut mac = mac_for(payload, parsed.timestamp, secret);
                mac.verify_slice(&bytes).is_ok()
            })
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        tracing::warn!(
            timestamp = parsed.timestamp,
            expected = %expected,
            "Webhook signature mismatch"
        );
        Err(CoreError::Validation(
            "Webhook signature does not match payload".into(),
        ))
    }
}

/// Compute the hex signature for `"{timestamp}.{payload}"`.
///
/// Exposed so tests (and local tooling) can sign synthetic events.
pub fn compute_signature(payload: &[u8], timestamp: i64, secret: &str) -> String {
    let mac = mac_for(payload, timestamp, secret);
    hex::encode(mac.finalize().into_bytes())
}

fn mac_for(payload: &[u8], timestamp: i64, secret: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}
