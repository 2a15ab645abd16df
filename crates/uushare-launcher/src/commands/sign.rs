//! `uushare-launcher sign`: build a signed deep link with the configured key.

use anyhow::{Context, Result};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uushare_core::{encode_password, DeepLink, Verifier};
use uushare_core::payload::{SignedPart, FIELD_DELIMITER, SCHEME_PREFIX};

use crate::config::{Config, KEY_ENV};

/// Print a signed `uushare:` link.
///
/// The nonce defaults to the current Unix time in seconds.
pub fn run(cfg: &Config, nick: &str, email: &str, password: &str, nonce: Option<&str>) -> Result<()> {
    let key = cfg
        .signing_key()
        .with_context(|| format!("no signing key: set {KEY_ENV} or [security].key"))?;

    let nonce = match nonce {
        Some(n) => n.to_string(),
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the Unix epoch")?
            .as_secs()
            .to_string(),
    };

    for (name, value) in [("nick", nick), ("email", email), ("nonce", nonce.as_str())] {
        check_field(name, value)?;
    }

    let signature_hex = Verifier::new(&key).sign(nick, email, password, &nonce);
    let link = DeepLink {
        nick: nick.to_string(),
        email: email.to_string(),
        password_b64: encode_password(password),
        signature: Some(SignedPart {
            nonce,
            signature_hex,
        }),
    };

    info!(nick, "link signed");
    println!("{}", link.to_uri());
    Ok(())
}

/// Reject text the decoder would split on or strip out.
fn check_field(name: &str, value: &str) -> Result<()> {
    if value.contains(FIELD_DELIMITER) {
        anyhow::bail!("{name} must not contain '{FIELD_DELIMITER}'");
    }
    if value.contains(SCHEME_PREFIX) {
        anyhow::bail!("{name} must not contain '{SCHEME_PREFIX}'");
    }
    Ok(())
}
