//! Deep-link payload decoding.
//!
//! Wire formats:
//! - legacy: `uushare:<nick>;<email>;<passwordB64>`
//! - signed: `uushare:<nick>;<email>;<passwordB64>;<nonce>;<signatureHex>`
//!
//! Fields are positional. The mode is chosen by field count alone.

use crate::error::{ShareError, ShareResult};

/// Scheme prefix registered with the operating system.
pub const SCHEME_PREFIX: &str = "uushare:";

/// Field separator inside the payload.
pub const FIELD_DELIMITER: char = ';';

/// Minimum field count for an unsigned payload.
pub const LEGACY_FIELDS: usize = 3;

/// Minimum field count for a signed payload.
pub const SIGNED_FIELDS: usize = 5;

/// Remove every occurrence of the scheme prefix.
pub fn strip_scheme(raw: &str) -> String {
    raw.replace(SCHEME_PREFIX, "")
}

/// Strip the scheme prefix and split on `;`.
///
/// Performs no trimming, case folding or length validation.
pub fn decode(raw: &str) -> PayloadFields {
    let stripped = strip_scheme(raw);
    PayloadFields(stripped.split(FIELD_DELIMITER).map(str::to_string).collect())
}

/// Ordered fields of a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFields(Vec<String>);

impl PayloadFields {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Mode implied by the field count, or `None` if too short for either.
    pub fn mode(&self) -> Option<Mode> {
        match self.0.len() {
            n if n >= SIGNED_FIELDS => Some(Mode::Signed),
            n if n >= LEGACY_FIELDS => Some(Mode::Legacy),
            _ => None,
        }
    }

    /// Validate the field count and bind fields to their protocol roles.
    pub fn into_deep_link(self) -> ShareResult<DeepLink> {
        let mode = self.mode().ok_or(ShareError::MalformedPayload {
            found: self.0.len(),
            required: LEGACY_FIELDS,
        })?;

        let mut fields = self.0.into_iter();
        // Length was checked above; each `next()` is present.
        let mut take = || fields.next().unwrap_or_default();
        let nick = take();
        let email = take();
        let password_b64 = take();
        let signature = match mode {
            Mode::Signed => {
                let nonce = take();
                let signature_hex = take();
                Some(SignedPart {
                    nonce,
                    signature_hex,
                })
            }
            Mode::Legacy => None,
        };

        Ok(DeepLink {
            nick,
            email,
            password_b64,
            signature,
        })
    }
}

/// Protocol mode of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Three or four fields, no integrity check.
    Legacy,
    /// Five or more fields, HMAC-SHA256 signed.
    Signed,
}

/// Nonce and signature of a signed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPart {
    pub nonce: String,
    pub signature_hex: String,
}

/// A payload with its fields bound to protocol roles.
///
/// The password is still base64 here; see [`crate::credential`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub nick: String,
    pub email: String,
    pub password_b64: String,
    pub signature: Option<SignedPart>,
}

impl DeepLink {
    pub fn mode(&self) -> Mode {
        if self.signature.is_some() {
            Mode::Signed
        } else {
            Mode::Legacy
        }
    }

    /// Parse a raw OS argument into a role-bound payload.
    pub fn parse(raw: &str) -> ShareResult<Self> {
        decode(raw).into_deep_link()
    }

    /// Render back to wire form, prefix included.
    pub fn to_uri(&self) -> String {
        let mut fields = vec![
            self.nick.as_str(),
            self.email.as_str(),
            self.password_b64.as_str(),
        ];
        if let Some(signed) = &self.signature {
            fields.push(&signed.nonce);
            fields.push(&signed.signature_hex);
        }
        format!("{SCHEME_PREFIX}{}", fields.join(";"))
    }
}
