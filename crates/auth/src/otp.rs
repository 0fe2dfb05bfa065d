//! OTP code and username generation.

use rand::Rng;

/// Length of auto-generated usernames.
const USERNAME_LEN: usize = 10;

/// Generates a 5-digit OTP code.
///
/// The code is stored on the user record until verified; requesting a new
/// one overwrites the pending code. There is deliberately no expiry or
/// attempt limit.
pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    rng.random_range(10_000..=99_999).to_string()
}

/// Generates a random alphanumeric username for first-time registrations.
pub fn generate_username() -> String {
    let mut rng = rand::rng();
    (0..USERNAME_LEN)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_shape() {
        for _ in 0..100 {
            let code = generate_otp();
            assert_eq!(code.len(), 5);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.chars().next(), Some('0'));
        }
    }

    #[test]
    fn test_username_shape() {
        let username = generate_username();
        assert_eq!(username.len(), USERNAME_LEN);
        assert!(username.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
