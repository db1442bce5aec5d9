//! Filesystem loading
//!
//! Stores JSON files as documents, one file per key.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::client::Client;
use crate::codec::JsonReply;
use crate::commands::{JsonCommands, SetOptions};
use crate::error::{JsonKvError, Result};
use crate::transport::Transport;

/// Parse `file` as JSON and store it at `path` in `key`
pub fn set_file<T: Transport>(
    client: &mut Client<T>,
    key: &str,
    path: Option<&str>,
    file: &Path,
    options: SetOptions,
) -> Result<JsonReply> {
    let content = fs::read(file)?;
    let value: Value = serde_json::from_slice(&content)?;
    client.set(key, path, &value, options)
}

/// Store every file under `root` at `path`, keyed by file path minus extension
///
/// Returns each visited file and whether it was stored. Files that are not
/// valid JSON map to `false`; any other failure stops the walk.
pub fn set_path<T: Transport>(
    client: &mut Client<T>,
    path: Option<&str>,
    root: &Path,
    options: SetOptions,
) -> Result<BTreeMap<PathBuf, bool>> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut outcome = BTreeMap::new();
    for file in files {
        let key = file.with_extension("").to_string_lossy().into_owned();
        let stored = match set_file(client, &key, path, &file, options) {
            Ok(_) => true,
            Err(JsonKvError::Encoding(e)) => {
                tracing::warn!("Skipping {}: {}", file.display(), e);
                false
            }
            Err(e) => return Err(e),
        };
        outcome.insert(file, stored);
    }

    tracing::info!("Loaded {} files from {}", outcome.len(), root.display());
    Ok(outcome)
}

/// Symlinked files are loaded; symlinked directories are not followed
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_symlink() && !path.is_file() {
            tracing::debug!("Skipping symlink {}", path.display());
        } else {
            files.push(path);
        }
    }
    Ok(())
}
