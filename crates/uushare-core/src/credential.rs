//! Password field decoding and the transient credential it yields.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ShareResult;

/// Identity and credential carried by one deep link.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub nick: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("nick", &self.nick)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decode a standard-alphabet, padded base64 password to UTF-8 text.
pub fn decode_password(encoded: &str) -> ShareResult<String> {
    let bytes = STANDARD.decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode raw password bytes for the wire.
pub fn encode_password(password: impl AsRef<[u8]>) -> String {
    STANDARD.encode(password)
}
