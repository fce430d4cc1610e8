//! Order-reference wire format (spec §6): `{bookingId}-{unixMillis}`. The
//! booking id is a UUID and already contains hyphens, so parsing splits on
//! the *last* `-` rather than the first — the millisecond suffix never
//! contains one.

use chrono::Utc;
use uuid::Uuid;

pub fn build(booking_id: Uuid, unix_millis: i64) -> String {
    format!("{booking_id}-{unix_millis}")
}

pub fn build_now(booking_id: Uuid) -> String {
    build(booking_id, Utc::now().timestamp_millis())
}

pub fn parse(order_reference: &str) -> Option<(Uuid, i64)> {
    let (id_part, millis_part) = order_reference.rsplit_once('-')?;
    let booking_id = Uuid::parse_str(id_part).ok()?;
    let millis = millis_part.parse::<i64>().ok()?;
    Some((booking_id, millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_build_and_parse() {
        let id = Uuid::new_v4();
        let reference = build(id, 1_700_000_000_000);
        let (parsed_id, millis) = parse(&reference).unwrap();
        assert_eq!(parsed_id, id);
        assert_eq!(millis, 1_700_000_000_000);
    }

    #[test]
    fn rejects_malformed_reference() {
        assert!(parse("not-a-valid-reference").is_none());
        assert!(parse("").is_none());
    }
}
