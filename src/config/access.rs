use super::*;

use crate::path::{find_path, parse_path};

impl Config {
    /// Get a typed value using dot notation.
    ///
    /// # Examples
    /// ```no_run
    /// # use strata_cfg::Config;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = Config::from_file("config.yaml")?;
    /// let host: String = config.get("server.host")?;
    /// let port: u16 = config.get("server.port")?;
    /// let debug: bool = config.get("debug")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the path doesn't exist or the value can't be
    /// converted to `T`.
    pub fn get<T>(&self, path: &str) -> Result<T, ConfigError>
    where
        T: TryFrom<Value, Error = ConfigError>,
    {
        let value = self.get_value(path)?;
        T::try_from(value.clone())
    }

    /// Get an optional typed value - returns `None` if the path doesn't
    /// exist.
    pub fn get_optional<T>(&self, path: &str) -> Result<Option<T>, ConfigError>
    where
        T: TryFrom<Value, Error = ConfigError>,
    {
        match self.get_value(path) {
            Ok(value) => Ok(Some(T::try_from(value.clone())?)),
            Err(ConfigError::MissingPath { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a value with a fallback default.
    ///
    /// # Examples
    /// ```no_run
    /// # use strata_cfg::Config;
    /// # let config = Config::from_file("config.yaml").unwrap();
    /// let timeout = config.get_or("server.timeout", 30_i64);
    /// let debug = config.get_or("debug", false);
    /// ```
    pub fn get_or<T>(&self, path: &str, default: T) -> T
    where
        T: TryFrom<Value, Error = ConfigError>,
    {
        self.get(path).unwrap_or(default)
    }

    /// Check whether a configuration path exists.
    pub fn has(&self, path: &str) -> bool {
        self.get_value(path).is_ok()
    }

    /// All keys of the mapping at `path`, in document order.
    pub fn keys(&self, path: &str) -> Result<Vec<String>, ConfigError> {
        let value = self.get_value(path)?;
        match value {
            Value::Mapping(map) => Ok(map.keys().cloned().collect()),
            other => Err(ConfigError::TypeMismatch {
                expected: "mapping".to_string(),
                found: other.type_name().to_string(),
                hint: Some(format!("'{}' has no keys; only mappings do", path)),
                code: Some(410),
            }),
        }
    }

    /// Raw node lookup; the empty path returns the root.
    pub fn get_value(&self, path: &str) -> Result<&Value, ConfigError> {
        if path.trim().is_empty() {
            return Ok(&self.root);
        }
        let segments = parse_path(path)?;
        find_path(&self.root, &segments).ok_or_else(|| ConfigError::MissingPath {
            segment: path.to_string(),
            hint: Some("Check that the path exists in your config".into()),
            code: Some(201),
        })
    }
}
