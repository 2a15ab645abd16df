//! Applies a credential to the client's two settings documents.
//!
//! - `DCPlusPlus.xml`: text of `Settings/Nick` and `Settings/EMail`.
//! - `Favorites.xml`: `Nick`, `Email` and `Password` attributes of the
//!   first favorite hub.
//!
//! Both documents are patched in memory and staged to temporary files next
//! to their targets before either target is replaced.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::credential::Credential;
use crate::document::{Document, NodePath, XmlDocument};
use crate::error::{ShareError, ShareResult};

pub const GLOBAL_NICK: NodePath = NodePath::new("DCPlusPlus/Settings/Nick");
pub const GLOBAL_EMAIL: NodePath = NodePath::new("DCPlusPlus/Settings/EMail");
pub const FAVORITE_HUB: NodePath = NodePath::new("Favorites/Hubs/Hub");

pub const HUB_NICK: &str = "Nick";
pub const HUB_EMAIL: &str = "Email";
pub const HUB_PASSWORD: &str = "Password";

/// Write nick and e-mail into the global settings document.
pub fn patch_global(doc: &mut impl Document, credential: &Credential) -> ShareResult<()> {
    doc.set_text(GLOBAL_NICK, &credential.nick)?;
    doc.set_text(GLOBAL_EMAIL, &credential.email)?;
    Ok(())
}

/// Write nick, e-mail and password into the first favorite hub.
///
/// Fails if there is no hub entry. With several entries the first one is
/// patched and a warning is logged.
pub fn patch_favorites(doc: &mut impl Document, credential: &Credential) -> ShareResult<()> {
    match doc.count(FAVORITE_HUB) {
        0 => return Err(ShareError::NodeNotFound(FAVORITE_HUB.to_string())),
        1 => {}
        n => warn!(hubs = n, "several favorite hubs, patching the first"),
    }
    doc.set_attribute(FAVORITE_HUB, HUB_NICK, &credential.nick)?;
    doc.set_attribute(FAVORITE_HUB, HUB_EMAIL, &credential.email)?;
    doc.set_attribute(FAVORITE_HUB, HUB_PASSWORD, &credential.password)?;
    Ok(())
}

/// Locations of the two settings documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPaths {
    pub global: PathBuf,
    pub favorites: PathBuf,
}

impl SettingsPaths {
    /// Default layout under the client's install directory.
    pub fn under(base_dir: &Path) -> Self {
        let settings = base_dir.join("Settings");
        Self {
            global: settings.join("DCPlusPlus.xml"),
            favorites: settings.join("Favorites.xml"),
        }
    }
}

/// Load, patch and save both documents.
///
/// Nothing on disk changes unless both documents load, patch and stage
/// cleanly. The final renames happen back to back; a failure between them
/// leaves the global settings updated and the favorites untouched.
pub fn apply(paths: &SettingsPaths, credential: &Credential) -> ShareResult<()> {
    let mut global = XmlDocument::load(&paths.global)?;
    patch_global(&mut global, credential)?;

    let mut favorites = XmlDocument::load(&paths.favorites)?;
    patch_favorites(&mut favorites, credential)?;

    let staged_global = stage(&paths.global, &global)?;
    let staged_favorites = stage(&paths.favorites, &favorites)?;

    commit(staged_global, &paths.global)?;
    info!(path = %paths.global.display(), "global settings updated");
    commit(staged_favorites, &paths.favorites)?;
    info!(path = %paths.favorites.display(), "favorites updated");

    Ok(())
}

fn stage(target: &Path, doc: &XmlDocument) -> ShareResult<NamedTempFile> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let bytes = doc.to_bytes()?;
    let mut file = NamedTempFile::new_in(dir).map_err(|e| ShareError::persistence(dir, e))?;
    file.write_all(&bytes)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| ShareError::persistence(file.path(), e))?;
    debug!(target = %target.display(), staged = %file.path().display(), "document staged");
    Ok(file)
}

fn commit(staged: NamedTempFile, target: &Path) -> ShareResult<()> {
    staged
        .persist(target)
        .map_err(|e| ShareError::persistence(target, e.error))?;
    Ok(())
}
