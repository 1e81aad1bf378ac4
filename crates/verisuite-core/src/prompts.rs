//! Versioned system-prompt library.
//!
//! Prompts live in a directory as `<name>-<version>.txt` files, e.g.
//! `assistant-v1.txt`, `assistant-v2.txt`. When no version is requested the
//! latest one (greatest version string) is resolved, and the resolved
//! version is recorded on the run for attribution.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EvalError, Result};

/// Directory-backed library of versioned system prompts.
pub struct PromptLibrary {
    dir: PathBuf,
}

impl PromptLibrary {
    /// Open a library over `dir`. An absent directory is an empty library.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Map of prompt name to its sorted version list.
    fn catalog(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut catalog: BTreeMap<String, Vec<String>> = BTreeMap::new();
        if !self.dir.exists() {
            return Ok(catalog);
        }

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // `<name>-<version>`: the version is the segment after the last dash.
            if let Some((name, version)) = stem.rsplit_once('-') {
                catalog
                    .entry(name.to_string())
                    .or_default()
                    .push(version.to_string());
            }
        }

        for versions in catalog.values_mut() {
            versions.sort();
        }
        Ok(catalog)
    }

    /// Sorted names of all prompts in the library.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.catalog()?.into_keys().collect())
    }

    /// Sorted versions available for a prompt name.
    pub fn versions(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.catalog()?.remove(name).unwrap_or_default())
    }

    /// Load a specific prompt version, trimmed.
    pub fn load(&self, name: &str, version: &str) -> Result<String> {
        let path = self.dir.join(format!("{name}-{version}.txt"));
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EvalError::PromptNotFound {
                    name: name.to_string(),
                    version: version.to_string(),
                }
            } else {
                EvalError::Io(e)
            }
        })?;
        Ok(content.trim().to_string())
    }

    /// Resolve a prompt to `(content, resolved_version)`. With no explicit
    /// version the latest one is used.
    pub fn resolve(&self, name: &str, version: Option<&str>) -> Result<(String, String)> {
        let version = match version {
            Some(v) => v.to_string(),
            None => self
                .versions(name)?
                .pop()
                .ok_or_else(|| EvalError::PromptNotFound {
                    name: name.to_string(),
                    version: "latest".to_string(),
                })?,
        };
        let content = self.load(name, &version)?;
        Ok((content, version))
    }
}
