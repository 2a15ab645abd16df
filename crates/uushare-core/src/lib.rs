//! uushare-core: deep-link protocol library for the uuShare launcher.
//!
//! Decodes `uushare:` links, verifies their HMAC-SHA256 signature, decodes
//! the password, writes the identity into the client's settings documents
//! and starts the client.

pub mod credential;
pub mod document;
pub mod error;
pub mod launch;
pub mod patcher;
pub mod payload;
pub mod pipeline;
pub mod signature;

// Re-export commonly used items at crate root.
pub use credential::{decode_password, encode_password, Credential};
pub use document::{Document, NodePath, XmlDocument};
pub use error::{ShareError, ShareResult};
pub use launch::{default_executable_name, Companion, ProcessSpawner, Spawner};
pub use patcher::SettingsPaths;
pub use payload::{decode, DeepLink, Mode, PayloadFields, SCHEME_PREFIX};
pub use pipeline::{authenticate, DeepLinkHandler, Outcome, Policy};
pub use signature::{signing_context, SigningKey, Verifier};
