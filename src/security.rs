use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older (or newer) than this are rejected as replays.
const MAX_TIMESTAMP_SKEW_SECS: u64 = 5 * 60;

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing API keys, webhook secrets, and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing header: {0}")]
    MissingHeader(&'static str),
    #[error("invalid request timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("request timestamp is too old ({age}s)")]
    Expired { age: u64 },
    #[error("signature mismatch")]
    Mismatch,
}

/// Compute the `v0=` signature Slack sends for `timestamp` and `body`.
pub fn slack_signature(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a Slack request signature (v0 scheme).
///
/// `now` is the current unix time in seconds.
pub fn verify_slack_signature(
    headers: &HeaderMap,
    body: &[u8],
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
    let signature = header_str(headers, SIGNATURE_HEADER)?;

    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;

    let age = now.abs_diff(ts);
    if age > MAX_TIMESTAMP_SKEW_SECS {
        return Err(SignatureError::Expired { age });
    }

    let expected = slack_signature(secret, timestamp, body);
    if constant_time_compare(&expected, signature) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(SignatureError::MissingHeader(name))
}

/// Anonymous identifier for one user's reaction to one message.
///
/// First 16 bytes of `sha256("{user}|{message_ts}|{emoji}")`, hex encoded
/// (32 characters). The user id itself is never stored.
pub fn reaction_hash(user_id: &str, message_ts: &str, emoji: &str) -> String {
    let digest = Sha256::digest(format!("{}|{}|{}", user_id, message_ts, emoji).as_bytes());
    hex::encode(&digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

    fn signed_headers(timestamp: &str, signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, timestamp.parse().unwrap());
        headers.insert(SIGNATURE_HEADER, signature.parse().unwrap());
        headers
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    // ==================== Slack Signature Tests ====================

    #[test]
    fn test_slack_documented_example() {
        // Example request from Slack's "Verifying requests" guide
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        let signature = slack_signature(SECRET, "1531420618", body);
        assert_eq!(
            signature,
            "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503"
        );
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let body = b"{\"type\":\"event_callback\"}";
        let signature = slack_signature(SECRET, "1700000000", body);
        let headers = signed_headers("1700000000", &signature);

        assert_eq!(
            verify_slack_signature(&headers, body, SECRET, 1700000100),
            Ok(())
        );
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let signature = slack_signature(SECRET, "1700000000", b"original");
        let headers = signed_headers("1700000000", &signature);

        assert_eq!(
            verify_slack_signature(&headers, b"tampered", SECRET, 1700000000),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signature = slack_signature("other-secret", "1700000000", b"body");
        let headers = signed_headers("1700000000", &signature);

        assert_eq!(
            verify_slack_signature(&headers, b"body", SECRET, 1700000000),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_verify_rejects_stale_timestamp() {
        let signature = slack_signature(SECRET, "1700000000", b"body");
        let headers = signed_headers("1700000000", &signature);

        assert_eq!(
            verify_slack_signature(&headers, b"body", SECRET, 1700000000 + 301),
            Err(SignatureError::Expired { age: 301 })
        );
    }

    #[test]
    fn test_verify_rejects_future_timestamp() {
        let signature = slack_signature(SECRET, "1700001000", b"body");
        let headers = signed_headers("1700001000", &signature);

        assert!(matches!(
            verify_slack_signature(&headers, b"body", SECRET, 1700000000),
            Err(SignatureError::Expired { .. })
        ));
    }

    #[test]
    fn test_verify_requires_headers() {
        let headers = HeaderMap::new();
        assert_eq!(
            verify_slack_signature(&headers, b"body", SECRET, 0),
            Err(SignatureError::MissingHeader(TIMESTAMP_HEADER))
        );

        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, "1700000000".parse().unwrap());
        assert_eq!(
            verify_slack_signature(&headers, b"body", SECRET, 1700000000),
            Err(SignatureError::MissingHeader(SIGNATURE_HEADER))
        );
    }

    #[test]
    fn test_verify_rejects_garbage_timestamp() {
        let headers = signed_headers("yesterday", "v0=abc");
        assert_eq!(
            verify_slack_signature(&headers, b"body", SECRET, 0),
            Err(SignatureError::InvalidTimestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn test_verify_rejects_extreme_timestamp() {
        let headers = signed_headers(&i64::MIN.to_string(), "v0=abc");
        assert!(matches!(
            verify_slack_signature(&headers, b"body", SECRET, 1_700_000_000),
            Err(SignatureError::Expired { .. })
        ));

        let headers = signed_headers(&i64::MAX.to_string(), "v0=abc");
        assert!(matches!(
            verify_slack_signature(&headers, b"body", SECRET, -1_700_000_000),
            Err(SignatureError::Expired { .. })
        ));
    }

    // ==================== Reaction Hash Tests ====================

    #[test]
    fn test_reaction_hash_is_32_hex_chars() {
        let hash = reaction_hash("U12345678", "1700000000.000100", "thumbsup");
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_reaction_hash_distinguishes_inputs() {
        let base = reaction_hash("U1", "1.0", "hug");
        assert_eq!(base, reaction_hash("U1", "1.0", "hug"));
        assert_ne!(base, reaction_hash("U2", "1.0", "hug"));
        assert_ne!(base, reaction_hash("U1", "1.1", "hug"));
        assert_ne!(base, reaction_hash("U1", "1.0", "flex"));
    }
}
