//! Operator-facing console lines.
//!
//! These go to stdout and are the only output a user normally sees when
//! the OS runs the launcher. Diagnostics go through `tracing` to stderr.

use uushare_core::{Outcome, ShareError};

/// Line printed for a failed run.
pub fn failure_line(err: &ShareError) -> String {
    match err {
        ShareError::MissingInput => "No arguments passed.".to_string(),
        ShareError::MalformedPayload { .. } => "Invalid arguments.".to_string(),
        ShareError::SignatureMismatch | ShareError::UnsignedRejected => {
            "Invalid signature.".to_string()
        }
        ShareError::MissingKey => "Signed link received but no signing key is configured.".to_string(),
        ShareError::CredentialDecode(_) => "Invalid password encoding.".to_string(),
        ShareError::DocumentParse(_)
        | ShareError::NodeNotFound(_)
        | ShareError::DocumentWrite(_)
        | ShareError::Persistence { .. } => format!("Failed to update settings: {err}"),
        ShareError::Launch { .. } => format!("Failed to start uuShare: {err}"),
    }
}

pub fn starting(stripped_payload: &str) {
    println!("Starting uuShare with:");
    println!("{stripped_payload}");
}

pub fn accepted(outcome: &Outcome) {
    println!("Nick:\t{}", outcome.credential.nick);
    println!("E-mail:\t{}", outcome.credential.email);
}

pub fn failed(err: &ShareError) {
    println!("{}", failure_line(err));
}
