//! Persistence contract for the committed avatar configuration.

use crate::avatar::AvatarConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies the initial committed avatar and receives every saved one.
pub trait AvatarStore {
    /// `Ok(None)` means nothing has been stored yet.
    fn load(&mut self) -> Result<Option<AvatarConfig>>;
    fn save(&mut self, config: &AvatarConfig) -> Result<()>;
}

impl<S: AvatarStore + ?Sized> AvatarStore for Box<S> {
    fn load(&mut self) -> Result<Option<AvatarConfig>> {
        (**self).load()
    }

    fn save(&mut self, config: &AvatarConfig) -> Result<()> {
        (**self).save(config)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAvatarStore {
    stored: Option<AvatarConfig>,
    saves: usize,
}

impl MemoryAvatarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AvatarConfig) -> Self {
        Self { stored: Some(config), saves: 0 }
    }

    pub fn stored(&self) -> Option<&AvatarConfig> {
        self.stored.as_ref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl AvatarStore for MemoryAvatarStore {
    fn load(&mut self) -> Result<Option<AvatarConfig>> {
        Ok(self.stored.clone())
    }

    fn save(&mut self, config: &AvatarConfig) -> Result<()> {
        self.stored = Some(config.clone());
        self.saves += 1;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct AvatarFile {
    version: u32,
    avatar: AvatarConfig,
}

const AVATAR_FILE_VERSION: u32 = 1;

/// Stores the avatar as pretty JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonAvatarStore {
    path: PathBuf,
}

impl JsonAvatarStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AvatarStore for JsonAvatarStore {
    fn load(&mut self) -> Result<Option<AvatarConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path).with_context(|| format!("Reading avatar store {}", self.path.display()))?;
        let file: AvatarFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("Parsing avatar store {}", self.path.display()))?;
        if file.version != AVATAR_FILE_VERSION {
            log::warn!("[store] {} has version {}, reading anyway", self.path.display(), file.version);
        }
        log::info!("[store] loaded avatar from {}", self.path.display());
        Ok(Some(file.avatar))
    }

    fn save(&mut self, config: &AvatarConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating avatar store directory {}", parent.display()))?;
            }
        }
        let file = AvatarFile { version: AVATAR_FILE_VERSION, avatar: config.clone() };
        let json = serde_json::to_string_pretty(&file).context("Serializing avatar config")?;
        fs::write(&self.path, json).with_context(|| format!("Writing avatar store {}", self.path.display()))?;
        log::info!("[store] saved avatar to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::{Accessory, HairStyle};

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryAvatarStore::new();
        assert!(store.load().expect("load").is_none());
        let mut config = AvatarConfig::default();
        config.hair_style = HairStyle::Bald;
        store.save(&config).expect("save");
        assert_eq!(store.load().expect("load"), Some(config));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn json_store_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("profiles").join("avatar.json");
        let mut store = JsonAvatarStore::new(&path);
        assert!(store.load().expect("load missing").is_none());

        let mut config = AvatarConfig::default();
        config.toggle_accessory(Accessory::Watch);
        store.save(&config).expect("save");
        assert!(path.exists());

        let mut reopened = JsonAvatarStore::new(&path);
        assert_eq!(reopened.load().expect("load"), Some(config));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("avatar.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(JsonAvatarStore::new(path).load().is_err());
    }
}
