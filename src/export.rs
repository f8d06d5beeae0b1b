// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use crate::error::ConfigError;
use crate::value::Value;
use crate::yaml::parse_file;

/// Export a value tree to pretty-printed JSON.
///
/// Mapping entries keep their insertion order; ints and floats map to JSON
/// numbers, null to JSON null.
pub fn to_json_string(value: &Value) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(value).map_err(|e| ConfigError::Runtime {
        message: format!("JSON export failed: {}", e),
        hint: None,
        code: Some(700),
    })
}

/// Read, parse, and export a YAML file as JSON in one call.
pub fn export_yaml_file(path: &Path) -> Result<String, ConfigError> {
    let value = parse_file(path)?;
    to_json_string(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;

    #[test]
    fn test_export_scalars() {
        let root = load_str("name: demo\ncount: 3\nratio: 0.5\non: true\nnothing: null\n", "<test>")
            .unwrap();
        let json = to_json_string(&root).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["name"], "demo");
        assert_eq!(parsed["count"], 3);
        assert_eq!(parsed["ratio"], 0.5);
        assert_eq!(parsed["on"], true);
        assert!(parsed["nothing"].is_null());
    }

    #[test]
    fn test_export_preserves_key_order() {
        let root = load_str("zebra: 1\nalpha: 2\nmiddle: 3\n", "<test>").unwrap();
        let json = to_json_string(&root).unwrap();
        let zebra = json.find("zebra").unwrap();
        let alpha = json.find("alpha").unwrap();
        let middle = json.find("middle").unwrap();
        assert!(zebra < alpha && alpha < middle);
    }

    #[test]
    fn test_export_nested_structures() {
        let root = load_str("outer:\n  list:\n    - 1\n    - two\n", "<test>").unwrap();
        let json = to_json_string(&root).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["outer"]["list"][0], 1);
        assert_eq!(parsed["outer"]["list"][1], "two");
    }
}
