//! One pass from raw deep link to running client.
//!
//! decode → (verify) → normalize → patch settings → launch.
//! Every check runs before the first file is written.

use tracing::{debug, info, warn};

use crate::credential::{decode_password, Credential};
use crate::error::{ShareError, ShareResult};
use crate::launch::{Companion, Spawner};
use crate::patcher::{self, SettingsPaths};
use crate::payload::{DeepLink, Mode};
use crate::signature::Verifier;

/// Acceptance rules for incoming links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Accept three-field links that carry no signature.
    pub allow_unsigned: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allow_unsigned: true,
        }
    }
}

/// Check a parsed link and produce its credential.
///
/// Pure apart from logging. `verifier` is required for signed links.
pub fn authenticate(
    link: &DeepLink,
    verifier: Option<&Verifier>,
    policy: Policy,
) -> ShareResult<Credential> {
    let password = match (&link.signature, verifier) {
        (Some(signed), Some(verifier)) => {
            let password = decode_password(&link.password_b64)?;
            verifier
                .verify(
                    &link.nick,
                    &link.email,
                    &password,
                    &signed.nonce,
                    &signed.signature_hex,
                )
                .inspect_err(|_| warn!(nick = %link.nick, "signature rejected"))?;
            debug!(nonce = %signed.nonce, "signature verified");
            password
        }
        (Some(_), None) => return Err(ShareError::MissingKey),
        (None, _) if !policy.allow_unsigned => return Err(ShareError::UnsignedRejected),
        (None, _) => {
            debug!("unsigned link accepted");
            decode_password(&link.password_b64)?
        }
    };

    Ok(Credential {
        nick: link.nick.clone(),
        email: link.email.clone(),
        password,
    })
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub mode: Mode,
    pub credential: Credential,
    pub launched: bool,
}

/// Applies deep links to an installed client.
pub struct DeepLinkHandler<S> {
    verifier: Option<Verifier>,
    policy: Policy,
    settings: SettingsPaths,
    companion: Option<Companion>,
    spawner: S,
}

impl<S: Spawner> DeepLinkHandler<S> {
    pub fn new(settings: SettingsPaths, spawner: S) -> Self {
        Self {
            verifier: None,
            policy: Policy::default(),
            settings,
            companion: None,
            spawner,
        }
    }

    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Client to start after patching. Without one nothing is launched.
    pub fn with_companion(mut self, companion: Companion) -> Self {
        self.companion = Some(companion);
        self
    }

    /// Run the whole pass for one raw OS argument.
    pub fn handle(&self, raw: &str) -> ShareResult<Outcome> {
        let link = DeepLink::parse(raw)?;
        let mode = link.mode();
        debug!(?mode, "payload decoded");

        let credential = authenticate(&link, self.verifier.as_ref(), self.policy)?;
        info!(nick = %credential.nick, email = %credential.email, ?mode, "link accepted");

        patcher::apply(&self.settings, &credential)?;

        let launched = match &self.companion {
            Some(companion) => {
                self.spawner.spawn(companion)?;
                true
            }
            None => {
                debug!("launch skipped");
                false
            }
        };

        Ok(Outcome {
            mode,
            credential,
            launched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::encode_password;
    use crate::signature::SigningKey;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    const SETTINGS: &str = "<DCPlusPlus><Settings><Nick type=\"string\">x</Nick>\
        <EMail type=\"string\">y</EMail></Settings></DCPlusPlus>";
    const FAVORITES: &str =
        "<Favorites><Hubs><Hub Name=\"uuShare\" Nick=\"\" Email=\"\" Password=\"\"/></Hubs></Favorites>";

    #[derive(Default)]
    struct RecordingSpawner {
        spawned: RefCell<Vec<Companion>>,
    }

    impl Spawner for &RecordingSpawner {
        fn spawn(&self, companion: &Companion) -> ShareResult<()> {
            self.spawned.borrow_mut().push(companion.clone());
            Ok(())
        }
    }

    fn key() -> SigningKey {
        SigningKey::new("pipeline-secret")
    }

    fn signed_link(nick: &str, email: &str, password: &str, nonce: &str) -> String {
        let sig = Verifier::new(&key()).sign(nick, email, password, nonce);
        format!(
            "uushare:{nick};{email};{};{nonce};{sig}",
            encode_password(password)
        )
    }

    fn install(dir: &Path) -> SettingsPaths {
        let paths = SettingsPaths::under(dir);
        fs::create_dir_all(paths.global.parent().unwrap()).unwrap();
        fs::write(&paths.global, SETTINGS).unwrap();
        fs::write(&paths.favorites, FAVORITES).unwrap();
        paths
    }

    fn handler<'a>(
        dir: &Path,
        spawner: &'a RecordingSpawner,
    ) -> DeepLinkHandler<&'a RecordingSpawner> {
        DeepLinkHandler::new(install(dir), spawner)
            .with_verifier(Verifier::new(&key()))
            .with_companion(Companion::new(dir, "ApexDC.exe"))
    }

    fn untouched(dir: &Path) -> bool {
        let paths = SettingsPaths::under(dir);
        fs::read_to_string(paths.global).unwrap() == SETTINGS
            && fs::read_to_string(paths.favorites).unwrap() == FAVORITES
    }

    #[test]
    fn legacy_link_patches_and_launches() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let outcome = handler(dir.path(), &spawner)
            .handle("uushare:alice;alice@example.com;cGFzczEyMw==")
            .unwrap();

        assert_eq!(outcome.mode, Mode::Legacy);
        assert_eq!(outcome.credential.nick, "alice");
        assert_eq!(outcome.credential.email, "alice@example.com");
        assert_eq!(outcome.credential.password, "pass123");
        assert!(outcome.launched);
        assert_eq!(spawner.spawned.borrow().len(), 1);
        assert!(!untouched(dir.path()));
    }

    #[test]
    fn short_link_aborts_before_writes() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let err = handler(dir.path(), &spawner)
            .handle("uushare:alice;alice@example.com")
            .unwrap_err();

        assert!(matches!(err, ShareError::MalformedPayload { .. }));
        assert!(spawner.spawned.borrow().is_empty());
        assert!(untouched(dir.path()));
    }

    #[test]
    fn signed_link_patches_and_launches() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let raw = signed_link("alice", "alice@example.com", "pass123", "nonce1");
        let outcome = handler(dir.path(), &spawner).handle(&raw).unwrap();

        assert_eq!(outcome.mode, Mode::Signed);
        assert_eq!(outcome.credential.password, "pass123");
        assert_eq!(spawner.spawned.borrow().len(), 1);
    }

    #[test]
    fn tampered_email_aborts_before_writes() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let raw = signed_link("alice", "alice@example.com", "pass123", "nonce1")
            .replace("alice@example.com", "bob@example.com");
        let err = handler(dir.path(), &spawner).handle(&raw).unwrap_err();

        assert!(matches!(err, ShareError::SignatureMismatch));
        assert!(spawner.spawned.borrow().is_empty());
        assert!(untouched(dir.path()));
    }

    #[test]
    fn signed_link_without_key_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let handler = DeepLinkHandler::new(install(dir.path()), &spawner);
        let raw = signed_link("alice", "alice@example.com", "pass123", "nonce1");

        assert!(matches!(handler.handle(&raw), Err(ShareError::MissingKey)));
        assert!(untouched(dir.path()));
    }

    #[test]
    fn unsigned_rejected_by_policy() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let err = handler(dir.path(), &spawner)
            .with_policy(Policy {
                allow_unsigned: false,
            })
            .handle("uushare:alice;alice@example.com;cGFzczEyMw==")
            .unwrap_err();

        assert!(matches!(err, ShareError::UnsignedRejected));
        assert!(untouched(dir.path()));
    }

    #[test]
    fn bad_password_encoding_aborts_before_writes() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let err = handler(dir.path(), &spawner)
            .handle("uushare:alice;alice@example.com;%%%")
            .unwrap_err();

        assert!(matches!(err, ShareError::CredentialDecode(_)));
        assert!(err.is_input_error());
        assert!(untouched(dir.path()));
    }

    #[test]
    fn without_companion_nothing_launches() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = RecordingSpawner::default();
        let outcome = DeepLinkHandler::new(install(dir.path()), &spawner)
            .handle("uushare:alice;alice@example.com;cGFzczEyMw==")
            .unwrap();

        assert!(!outcome.launched);
        assert!(spawner.spawned.borrow().is_empty());
    }

    #[test]
    fn signature_over_raw_base64_is_rejected() {
        let verifier = Verifier::new(&key());
        let b64 = encode_password("pass123");
        let sig = verifier.sign("alice", "alice@example.com", &b64, "nonce1");
        let link =
            DeepLink::parse(&format!("uushare:alice;alice@example.com;{b64};nonce1;{sig}")).unwrap();

        assert!(authenticate(&link, Some(&verifier), Policy::default()).is_err());
    }
}
