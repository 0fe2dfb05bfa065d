//! Opaque bearer token generation.

use rand::Rng;

/// Number of random bytes behind a token (40 hex chars once encoded).
const TOKEN_BYTES: usize = 20;

/// Generates a fresh opaque bearer token.
///
/// The token is only a candidate: the store keeps the first token ever
/// issued for a user and ignores later candidates, so repeated logins
/// reuse the same credential.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..TOKEN_BYTES).map(|_| rng.random::<u8>()).collect();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_distinct() {
        assert_ne!(generate_token(), generate_token());
    }
}
