//! JSON metadata snapshots of the registries
//!
//! The registries live in memory; a snapshot is an explicit export that a
//! later process can import. Keys are sorted so snapshots diff cleanly.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::errors::*;
use crate::domain::model::{Clip, Identified, Reel};
use crate::ports::Repository;

/// Both registries in one document
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegistryState {
    #[serde(default)]
    pub clips: BTreeMap<String, Clip>,
    #[serde(default)]
    pub reels: BTreeMap<String, Reel>,
}

/// Id-keyed copy of a registry
pub fn collect<T: Identified + Clone>(repo: &dyn Repository<T>) -> BTreeMap<String, T> {
    repo.list()
        .into_iter()
        .map(|entity| (entity.id().to_string(), entity))
        .collect()
}

/// Insert every entry, replacing entities with the same id
pub fn restore<T: Identified + Clone>(repo: &dyn Repository<T>, entries: BTreeMap<String, T>) -> usize {
    let count = entries.len();
    for (_, entity) in entries {
        repo.insert(entity);
    }
    count
}

/// Pretty-print `value` to `path`, creating parent directories
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DomainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::io(format!("creating {}", parent.display()), e))?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| DomainError::io("encoding metadata", std::io::Error::other(e)))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| DomainError::io(format!("writing {}", path.display()), e))?;
    info!("Saved metadata to {}", path.display());
    Ok(())
}

/// Read a snapshot; a missing file is logged and yields `None`
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DomainError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Metadata file not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(DomainError::io(format!("reading {}", path.display()), e)),
    };
    serde_json::from_str(&content).map(Some).map_err(|e| {
        DomainError::io(
            format!("parsing {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}
