//! Validation for the `status` query filter on `GET /bookings` (spec §6),
//! independent of `BookingStatus::FromStr` (which is deliberately permissive
//! for storage round-tripping and must not reject an unrecognized value).

/// Valid booking status values
pub const VALID_BOOKING_STATUSES: &[&str] = &["pending", "confirmed", "cancelled"];

/// Validates that a value is one of the allowed values.
pub fn validate_enum_value(value: &str, valid_values: &[&str], field_name: &str) -> Result<(), String> {
    if valid_values.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        ))
    }
}

pub fn validate_booking_status(status: &str) -> Result<(), String> {
    validate_enum_value(status, VALID_BOOKING_STATUSES, "booking status")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_booking_status() {
        assert!(validate_booking_status("pending").is_ok());
        assert!(validate_booking_status("confirmed").is_ok());
        assert!(validate_booking_status("invalid").is_err());
    }
}
