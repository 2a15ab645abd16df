//! HMAC-SHA256 deep-link signatures.
//!
//! The signed message is `nick ++ email ++ password ++ nonce` with no
//! separator, where `password` is the base64-decoded plaintext. The
//! signature travels as lowercase hex of the full 32-byte tag.

use ring::{digest, hmac};
use tracing::debug;

use crate::error::{ShareError, ShareResult};

/// Shared secret used to sign and verify deep links.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Build the exact byte sequence covered by the MAC.
pub fn signing_context(nick: &str, email: &str, password: &str, nonce: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(nick.len() + email.len() + password.len() + nonce.len());
    data.extend_from_slice(nick.as_bytes());
    data.extend_from_slice(email.as_bytes());
    data.extend_from_slice(password.as_bytes());
    data.extend_from_slice(nonce.as_bytes());
    data
}

/// Signs and verifies deep links under one key.
pub struct Verifier {
    key: hmac::Key,
}

impl Verifier {
    pub fn new(key: &SigningKey) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, &key.0),
        }
    }

    /// Lowercase hex HMAC-SHA256 of the signing context.
    pub fn sign(&self, nick: &str, email: &str, password: &str, nonce: &str) -> String {
        let data = signing_context(nick, email, password, nonce);
        hex::encode(hmac::sign(&self.key, &data))
    }

    /// Check `signature_hex` against the signing context.
    ///
    /// Hex input is accepted in either case. The whole 32-byte tag must
    /// match; shorter or longer signatures are rejected.
    pub fn verify(
        &self,
        nick: &str,
        email: &str,
        password: &str,
        nonce: &str,
        signature_hex: &str,
    ) -> ShareResult<()> {
        let tag = hex::decode(signature_hex).map_err(|e| {
            debug!(error = %e, "signature is not valid hex");
            ShareError::SignatureMismatch
        })?;

        if tag.len() != digest::SHA256_OUTPUT_LEN {
            debug!(len = tag.len(), "signature has wrong length");
            return Err(ShareError::SignatureMismatch);
        }

        let data = signing_context(nick, email, password, nonce);
        hmac::verify(&self.key, &data, &tag).map_err(|_| ShareError::SignatureMismatch)
    }
}
