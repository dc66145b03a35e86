use crate::config::RosterFileConfig;
use crate::creature::CreatureProfile;
use crate::power::{PowerDefinition, PowerId};
use crate::RosterError;
use std::collections::HashMap;
use std::path::Path;

/// Registry of creature profiles, loaded from TOML or JSON files
#[derive(Debug, Default, Clone)]
pub struct Roster {
    creatures: HashMap<String, CreatureProfile>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all roster files from a directory (recursively)
    pub fn load(dir: &Path) -> Result<Self, RosterError> {
        let mut roster = Self::new();
        roster.load_dir(dir)?;
        tracing::debug!(
            dir = %dir.display(),
            creatures = roster.creatures.len(),
            "Loaded roster"
        );
        Ok(roster)
    }

    /// Parse a roster from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, RosterError> {
        let config: RosterFileConfig = toml::from_str(content).map_err(|e| RosterError::Parse {
            error: e,
            path: "<string>".into(),
        })?;
        let mut roster = Self::new();
        roster.insert_config(config, Path::new("<string>"))?;
        Ok(roster)
    }

    fn load_dir(&mut self, dir: &Path) -> Result<(), RosterError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| RosterError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        // Sorted so duplicate detection reports the same file on every platform
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RosterError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_dir(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "toml" || ext == "json") {
                self.load_file(&path)?;
            }
        }

        Ok(())
    }

    /// Load a single roster file
    pub fn load_file(&mut self, path: &Path) -> Result<(), RosterError> {
        let content = std::fs::read_to_string(path).map_err(|e| RosterError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        let config: RosterFileConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| RosterError::Json {
                error: e,
                path: path.to_path_buf(),
            })?
        } else {
            toml::from_str(&content).map_err(|e| RosterError::Parse {
                error: e,
                path: path.to_path_buf(),
            })?
        };

        self.insert_config(config, path)
    }

    fn insert_config(&mut self, config: RosterFileConfig, path: &Path) -> Result<(), RosterError> {
        for creature in config.creatures {
            let profile = creature
                .into_profile()
                .map_err(|message| RosterError::Validation {
                    message,
                    path: path.to_path_buf(),
                })?;
            if self.creatures.contains_key(&profile.id) {
                return Err(RosterError::Validation {
                    message: format!("Duplicate creature id '{}'", profile.id),
                    path: path.to_path_buf(),
                });
            }
            self.creatures.insert(profile.id.clone(), profile);
        }
        Ok(())
    }

    /// Get a creature by ID
    pub fn get(&self, id: &str) -> Option<&CreatureProfile> {
        self.creatures.get(id)
    }

    /// Check if a creature exists
    pub fn contains(&self, id: &str) -> bool {
        self.creatures.contains_key(id)
    }

    /// List all creature IDs
    pub fn creature_ids(&self) -> impl Iterator<Item = &str> {
        self.creatures.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Look up a power on a creature; `None` if either is unknown
    pub fn power(&self, creature_id: &str, power_id: &PowerId) -> Option<&PowerDefinition> {
        self.get(creature_id).and_then(|c| c.power(power_id))
    }
}
