//! QR-code payload (spec §6): a compact JSON blob embedded in the printed
//! or in-app ticket, scanned at the gate by `POST /bookings/verify-qr`.
//! Validity is purely time-bounded — 30 days from the stamped timestamp —
//! there is no per-payload signature in scope here, matching the spec's
//! "considered valid up to 30 days after timestamp" wording (the booking
//! row itself, looked up by `booking_id`, is the source of truth for
//! whether the ticket is still good; this is just a freshness bound on the
//! QR blob).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use cineslot_types::{AppError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrPayload {
    pub booking_id: Uuid,
    pub booking_code: String,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub seats: Vec<String>,
    pub total_price_minor: i32,
    pub timestamp: DateTime<Utc>,
}

impl QrPayload {
    /// Base64url-encodes the payload's JSON for embedding in a QR code.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| AppError::Internal(format!("qr payload encode: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| AppError::Validation("malformed QR payload".to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| AppError::Validation("malformed QR payload".to_string()))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.timestamp + Duration::days(VALIDITY_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QrPayload {
        QrPayload {
            booking_id: Uuid::new_v4(),
            booking_code: "ABCD1234".to_string(),
            user_id: Uuid::new_v4(),
            showtime_id: Uuid::new_v4(),
            seats: vec!["A1".to_string(), "A2".to_string()],
            total_price_minor: 20000,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_roundtrip() {
        let payload = sample();
        let encoded = payload.encode().unwrap();
        let decoded = QrPayload::decode(&encoded).unwrap();
        assert_eq!(payload, decoded);
    }

    #[test]
    fn test_expiry_window() {
        let mut payload = sample();
        payload.timestamp = Utc::now() - Duration::days(31);
        assert!(payload.is_expired_at(Utc::now()));

        payload.timestamp = Utc::now() - Duration::days(29);
        assert!(!payload.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_decode_garbage_is_validation_error() {
        let err = QrPayload::decode("not-valid-base64!!").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
