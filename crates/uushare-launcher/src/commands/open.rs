//! `uushare-launcher <link>`: the protocol-handler entry point.
//!
//! Applies the link to the client settings and starts the client. Returns
//! the process exit code.

use anyhow::Result;
use std::path::Path;
use tracing::{error, info};
use uushare_core::{payload, DeepLinkHandler, ProcessSpawner, Verifier};

use crate::config::Config;
use crate::console;

/// Handle one deep link.
pub fn run(link: &str, cfg: &Config, launcher_dir: &Path, no_launch: bool) -> Result<i32> {
    console::starting(&payload::strip_scheme(link));

    let base_dir = cfg.base_dir(launcher_dir);
    info!(base_dir = %base_dir.display(), "handling deep link");

    let key = cfg.signing_key();
    let mut handler = DeepLinkHandler::new(cfg.settings_paths(&base_dir), ProcessSpawner)
        .with_policy(cfg.policy(key.as_ref()));
    if let Some(key) = &key {
        handler = handler.with_verifier(Verifier::new(key));
    }
    if !no_launch {
        handler = handler.with_companion(cfg.companion(&base_dir));
    }

    match handler.handle(link) {
        Ok(outcome) => {
            console::accepted(&outcome);
            Ok(0)
        }
        Err(e) => {
            error!(error = %e, input = e.is_input_error(), "deep link not applied");
            console::failed(&e);
            Ok(1)
        }
    }
}
