// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use crate::error::ConfigError;
use crate::interpolate::resolve_interpolations;
use crate::loader::{load_file, load_str};
use crate::merge::merge;
use crate::overrides::parse_override;
use crate::path::assign_path;
use crate::value::Value;
use crate::yaml::to_yaml_string;

mod access;
mod conversion;

/// A fully composed, fully resolved configuration tree.
///
/// Construction runs the whole pipeline: document loading, `defaults`
/// composition, override application, and interpolation resolution. After
/// that the tree is read-only.
pub struct Config {
    root: Value,
}

impl Config {
    /// Parse a configuration from a string and resolve its interpolations.
    ///
    /// `defaults` composition needs a real file to resolve includes against,
    /// so it only happens in [`Config::from_file`] and [`Config::load`].
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut root = load_str(content, "<string>")?;
        resolve_interpolations(&mut root)?;
        Ok(Self { root })
    }

    /// Load a configuration file, compose its `defaults`, and resolve
    /// interpolations.
    ///
    /// # Example
    /// ```ignore
    /// let config = Config::from_file("config.yaml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut root = load_file(path.as_ref())?;
        resolve_interpolations(&mut root)?;
        Ok(Self { root })
    }

    /// The full pipeline: merge composed files in order, apply override
    /// expressions, then resolve interpolations.
    pub fn load<P: AsRef<Path>>(files: &[P], overrides: &[String]) -> Result<Self, ConfigError> {
        let mut root = Value::mapping();
        for file in files {
            let composed = load_file(file.as_ref())?;
            merge(&mut root, &composed);
        }
        for expression in overrides {
            let parsed = parse_override(expression)?;
            assign_path(&mut root, &parsed.path, parsed.value, parsed.require_new)?;
        }
        resolve_interpolations(&mut root)?;
        Ok(Self { root })
    }

    /// The resolved root of the tree.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Render the resolved tree as block-style YAML.
    pub fn to_yaml(&self) -> String {
        to_yaml_string(&self.root)
    }

    /// Render the resolved tree as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        crate::export::to_json_string(&self.root)
    }
}
