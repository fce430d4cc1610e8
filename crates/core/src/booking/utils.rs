use rand::Rng;

const CODE_LEN: usize = 8;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a purely random 8-character uppercase-alphanumeric booking
/// code. Uniqueness is not this function's job — the caller retries on
/// collision against the unique index (spec §4.2's "rejection sampling"
/// algorithm), generalized from the teacher's `LB-XXXXX` 5-char suffix
/// format to the spec's plain 8-char code.
pub fn generate_booking_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_booking_code_shape() {
        let code = generate_booking_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_booking_code_varies() {
        let a = generate_booking_code();
        let b = generate_booking_code();
        // Not a hard guarantee, but with 36^8 possibilities a collision
        // across two calls would be an astronomically unlucky test flake.
        assert_ne!(a, b);
    }
}
