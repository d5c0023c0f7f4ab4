//! Opaque session tokens and their keyed storage digest.
//!
//! A session token is 16 bytes from the operating-system CSPRNG, hex-encoded.
//! The raw value exists only in the client's cookie and, briefly, in memory.
//! The database stores [`digest_token`] of it, so a leaked table cannot be
//! replayed as cookies.

use std::fmt;

use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};

/// Bytes of entropy per token.
pub const TOKEN_BYTES: usize = 16;

/// Length of the hex-encoded token string.
pub const TOKEN_HEX_LEN: usize = TOKEN_BYTES * 2;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The presented value is not a well-formed session token.
    #[error("malformed session token")]
    Malformed,

    /// The OS random source failed. Never retried.
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),
}

/// A raw session token as handed to (or received from) the client.
///
/// `Debug` is redacted so the value cannot end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mint a fresh token from the OS CSPRNG.
    pub fn generate() -> Result<Self, TokenError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::EntropyUnavailable(e.to_string()))?;
        Ok(Self(hex_encode(&bytes)))
    }

    /// Accept a client-presented token only if it has the exact shape we mint.
    ///
    /// Rejecting junk here spares a database round trip.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        if raw.len() != TOKEN_HEX_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TokenError::Malformed);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Keyed digest of this token under `secret`.
    pub fn digest(&self, secret: &str) -> String {
        digest_token(&self.0, secret)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Lowercase hex of `SHA256(token ‖ secret)`.
///
/// This is the only form in which a token is ever persisted or compared.
pub fn digest_token(token: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn generated_token_has_expected_shape() {
        let token = SessionToken::generate().expect("OS RNG should be available");
        assert_eq!(token.as_str().len(), TOKEN_HEX_LEN);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(token.as_str(), token.as_str().to_ascii_lowercase());
    }

    #[test]
    fn generated_tokens_are_distinct() {
        let a = SessionToken::generate().unwrap();
        let b = SessionToken::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_token_parses_back() {
        let token = SessionToken::generate().unwrap();
        let parsed = SessionToken::parse(token.as_str()).expect("own tokens must parse");
        assert_eq!(parsed, token);
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        assert_matches!(SessionToken::parse(""), Err(TokenError::Malformed));
        assert_matches!(SessionToken::parse("abc123"), Err(TokenError::Malformed));
        assert_matches!(
            SessionToken::parse("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"),
            Err(TokenError::Malformed)
        );
        assert_matches!(
            SessionToken::parse(&"a".repeat(TOKEN_HEX_LEN + 1)),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn parse_normalizes_case() {
        let upper = "ABCDEF0123456789ABCDEF0123456789";
        let token = SessionToken::parse(upper).unwrap();
        assert_eq!(token.as_str(), "abcdef0123456789abcdef0123456789");
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = SessionToken::generate().unwrap();
        let rendered = format!("{token:?}");
        assert!(!rendered.contains(token.as_str()));
    }

    #[test]
    fn digest_is_deterministic() {
        let a = digest_token("token", "secret");
        let b = digest_token("token", "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn digest_differs_per_token() {
        assert_ne!(digest_token("token-a", "secret"), digest_token("token-b", "secret"));
    }

    #[test]
    fn digest_differs_per_secret() {
        assert_ne!(digest_token("token", "secret-a"), digest_token("token", "secret-b"));
    }

    #[test]
    fn digest_matches_sha256_of_concatenation() {
        // SHA-256("abc") with an empty secret.
        assert_eq!(
            digest_token("abc", ""),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest_token("ab", "c"), digest_token("abc", ""));
    }
}
