//! Signed-token codec: tamper-evident wrapping of opaque session tokens.
//!
//! The wire form is `<opaque>.<base64url(tag)>` where the tag is an
//! HMAC-SHA256 over the opaque token. The MAC key is derived from the
//! process-wide secret plus a codec-specific salt, so session token
//! signatures are not interchangeable with any other signed value the
//! secret may serve.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::RngExt;
use sha2::{Digest, Sha256};

use tavern_core::config::auth::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Length of the generated opaque token (alphanumeric characters).
pub const OPAQUE_TOKEN_LENGTH: usize = 32;

/// Generate a fresh opaque session token.
///
/// 32 alphanumeric characters, around 190 bits of entropy. The token is
/// only ever transmitted in signed form.
pub fn generate_opaque_token() -> String {
    let mut rng = rand::rng();
    (0..OPAQUE_TOKEN_LENGTH)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

/// Signs opaque tokens and verifies signed ones.
#[derive(Clone)]
pub struct TokenCodec {
    /// Derived MAC key. The configured secret never leaves construction.
    key: [u8; 32],
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from an explicit secret and salt.
    pub fn new(secret: &str, salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.update(b"/");
        hasher.update(salt.as_bytes());
        Self {
            key: hasher.finalize().into(),
        }
    }

    /// Create a codec from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.secret, &config.token_salt)
    }

    /// Produce the signed wire form of an opaque token. Deterministic.
    pub fn sign(&self, opaque: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(opaque.as_bytes());
        let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{opaque}.{tag}")
    }

    /// Recover the opaque token from a signed one.
    ///
    /// Returns `None` for anything malformed or carrying a wrong tag.
    /// Comparison is constant-time. Callers treat `None` exactly like an
    /// absent credential.
    pub fn verify(&self, signed: &str) -> Option<String> {
        let (opaque, tag) = signed.split_once('.')?;
        if opaque.is_empty() {
            return None;
        }
        let tag = URL_SAFE_NO_PAD.decode(tag).ok()?;
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(opaque.as_bytes());
        mac.verify_slice(&tag).ok()?;
        Some(opaque.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", "session-token")
    }

    #[test]
    fn sign_verify_round_trip() {
        let codec = codec();
        let opaque = generate_opaque_token();
        let signed = codec.sign(&opaque);
        assert_eq!(codec.verify(&signed), Some(opaque));
    }

    #[test]
    fn sign_is_deterministic() {
        let codec = codec();
        assert_eq!(codec.sign("abc"), codec.sign("abc"));
    }

    #[test]
    fn any_single_byte_flip_is_rejected() {
        let codec = codec();
        let signed = codec.sign(&generate_opaque_token());
        let bytes = signed.as_bytes();
        for i in 0..bytes.len() {
            let mut tampered = bytes.to_vec();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8_lossy(&tampered).into_owned();
            assert_eq!(codec.verify(&tampered), None, "byte {i} accepted");
        }
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let codec = codec();
        for input in ["", ".", "no-separator", ".tagonly", "opaque.", "opaque.!!!"] {
            assert_eq!(codec.verify(input), None, "{input:?} accepted");
        }
    }

    #[test]
    fn different_salt_means_different_signature() {
        let a = TokenCodec::new("secret", "session-token");
        let b = TokenCodec::new("secret", "other-component");
        let signed = a.sign("opaque");
        assert_eq!(b.verify(&signed), None);
    }

    #[test]
    fn different_secret_means_different_signature() {
        let a = TokenCodec::new("secret-a", "session-token");
        let b = TokenCodec::new("secret-b", "session-token");
        let signed = a.sign("opaque");
        assert_eq!(b.verify(&signed), None);
    }

    #[test]
    fn opaque_tokens_are_unique_and_sized() {
        let a = generate_opaque_token();
        let b = generate_opaque_token();
        assert_eq!(a.len(), OPAQUE_TOKEN_LENGTH);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
