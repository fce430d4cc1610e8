//! HMAC signature verification over a sorted, URL-form-encoded parameter
//! list (spec §6's wire format). Grounded on `vaya-payment::webhook`'s
//! `WebhookHandler::verify_signature` — same `hmac`/`sha2`/`hex` stack,
//! same HMAC-over-canonical-string shape — but generalized from Stripe's
//! `t=...,v1=...` timestamp-prefixed header to this spec's sorted
//! query-string canonicalization, and switched from a manual `==` compare
//! to `Mac::verify_slice`'s constant-time comparison, which is what spec
//! §4.3 step 1 asks for.

use cineslot_types::enums::SignatureAlgorithm;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use std::collections::BTreeMap;

/// Builds the canonical string to sign/verify: `key=value` pairs, sorted
/// alphabetically by key (a `BTreeMap` already iterates in that order),
/// joined with `&`, x-www-form-urlencoded. The signature field itself is
/// never part of `params` passed here — callers strip it before calling.
pub fn canonicalize(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Signs `params` under `secret` with the given algorithm, returning the
/// lowercase hex digest — used both to verify inbound callbacks and to
/// build the outbound redirect URL for `CreateIntent`.
pub fn sign(params: &BTreeMap<String, String>, secret: &str, algorithm: SignatureAlgorithm) -> String {
    let data = canonicalize(params);
    match algorithm {
        SignatureAlgorithm::HmacSha512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes())
                .expect("HMAC accepts a key of any length");
            mac.update(data.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        SignatureAlgorithm::HmacSha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
                .expect("HMAC accepts a key of any length");
            mac.update(data.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
    }
}

/// Verifies `signature_hex` against `params` using constant-time
/// comparison. Returns `false` on any malformed input rather than
/// propagating an error — an unverifiable signature and an invalid one are
/// both just "not verified" to the caller (spec §4.3 step 1).
pub fn verify(
    params: &BTreeMap<String, String>,
    secret: &str,
    algorithm: SignatureAlgorithm,
    signature_hex: &str,
) -> bool {
    let Ok(signature_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let data = canonicalize(params);

    match algorithm {
        SignatureAlgorithm::HmacSha512 => {
            let Ok(mut mac) = Hmac::<Sha512>::new_from_slice(secret.as_bytes()) else {
                return false;
            };
            mac.update(data.as_bytes());
            mac.verify_slice(&signature_bytes).is_ok()
        }
        SignatureAlgorithm::HmacSha256 => {
            let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
                return false;
            };
            mac.update(data.as_bytes());
            mac.verify_slice(&signature_bytes).is_ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BTreeMap<String, String> {
        let mut p = BTreeMap::new();
        p.insert("amount".to_string(), "150000".to_string());
        p.insert("order_reference".to_string(), "abc-123".to_string());
        p.insert("tmn_code".to_string(), "TESTCODE".to_string());
        p
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let p = params();
        let sig = sign(&p, "secret", SignatureAlgorithm::HmacSha512);
        assert!(verify(&p, "secret", SignatureAlgorithm::HmacSha512, &sig));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let p = params();
        let sig = sign(&p, "secret", SignatureAlgorithm::HmacSha512);
        assert!(!verify(&p, "other-secret", SignatureAlgorithm::HmacSha512, &sig));
    }

    #[test]
    fn single_byte_mutation_fails_verification() {
        let p = params();
        let mut sig = sign(&p, "secret", SignatureAlgorithm::HmacSha256);
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify(&p, "secret", SignatureAlgorithm::HmacSha256, &sig));
    }

    #[test]
    fn canonicalization_is_order_independent_of_insertion() {
        let mut a = BTreeMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        assert_eq!(canonicalize(&a), "a=1&b=2");
    }
}
