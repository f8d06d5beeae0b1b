// Author: Dustin Pilgrim
// License: MIT

//! Document loading and `defaults` composition.
//!
//! A document's `defaults` sequence names other documents to load and merge
//! beneath it, in declared order, before the document's own keys are applied
//! on top. Entries are include paths (optionally `?`-prefixed to tolerate a
//! missing file) or `{group: name}` pairs that merge `group/name.yaml` under
//! the `group` path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::merge::merge;
use crate::path::{assign_path, find_path_mut, parse_path};
use crate::value::Value;
use crate::yaml::{parse_document, parse_file};

struct DefaultEntry {
    include_path: PathBuf,
    target_path: Option<Vec<String>>,
    optional: bool,
}

/// Parse a document from a string. No `defaults` composition happens here;
/// includes can only be resolved relative to a real file.
pub fn load_str(content: &str, name: &str) -> Result<Value, ConfigError> {
    parse_document(content, name)
}

/// Load a document from disk and compose its `defaults` recursively.
pub fn load_file(path: &Path) -> Result<Value, ConfigError> {
    let mut stack = HashSet::new();
    load_with_includes(path, &mut stack)
}

/// Expand `~/` against the home directory and apply the default extension.
fn resolve_include_path(raw: &str, base_dir: &Path) -> Result<PathBuf, ConfigError> {
    let mut candidate = if let Some(rest) = raw.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| ConfigError::FileError {
            message: "could not determine home directory for ~ expansion".to_string(),
            path: raw.to_string(),
            hint: Some("Set HOME or use an absolute path".into()),
            code: Some(300),
        })?;
        home.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if candidate.extension().is_none() {
        candidate.set_extension("yaml");
    }
    if candidate.is_relative() {
        candidate = base_dir.join(candidate);
    }
    Ok(candidate)
}

fn strip_optional_marker(text: &str) -> (bool, &str) {
    match text.strip_prefix('?') {
        Some(rest) => (true, rest.trim()),
        None => (false, text.trim()),
    }
}

fn entry_error(message: String) -> ConfigError {
    ConfigError::TypeMismatch {
        expected: "defaults entry (string or single-key mapping)".to_string(),
        found: message,
        hint: Some("Write entries like 'shared', '?optional', or '{group: name}'".into()),
        code: Some(305),
    }
}

fn parse_default_entry(entry: &Value, base_dir: &Path) -> Result<DefaultEntry, ConfigError> {
    match entry {
        Value::String(text) => {
            let (optional, raw) = strip_optional_marker(text);
            let include_path = resolve_include_path(raw, base_dir)?;
            Ok(DefaultEntry {
                include_path,
                target_path: None,
                optional,
            })
        }
        Value::Mapping(map) => {
            let (group, name) = match map.iter().next() {
                Some(pair) if map.len() == 1 => pair,
                _ => {
                    return Err(entry_error(format!(
                        "mapping with {} keys (exactly one expected)",
                        map.len()
                    )));
                }
            };
            let Value::String(name) = name else {
                return Err(entry_error(format!(
                    "mapping value of type {}",
                    name.type_name()
                )));
            };
            let (optional, group) = strip_optional_marker(group);
            let target_path = parse_path(group)?;
            let raw = Path::new(group).join(name);
            let include_path = resolve_include_path(&raw.to_string_lossy(), base_dir)?;
            Ok(DefaultEntry {
                include_path,
                target_path: Some(target_path),
                optional,
            })
        }
        other => Err(entry_error(format!("{} node", other.type_name()))),
    }
}

/// Canonical form used for recursion detection; falls back to an absolute
/// path while the file does not exist yet.
fn normalize_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn load_with_includes(path: &Path, stack: &mut HashSet<PathBuf>) -> Result<Value, ConfigError> {
    let normalized = normalize_path(path);
    if !stack.insert(normalized.clone()) {
        return Err(ConfigError::RecursiveInclude {
            path: normalized.display().to_string(),
            hint: None,
            code: Some(303),
        });
    }

    let result = compose_document(&normalized, stack);
    stack.remove(&normalized);
    result
}

fn compose_document(path: &Path, stack: &mut HashSet<PathBuf>) -> Result<Value, ConfigError> {
    let mut root = parse_file(path)?;

    let Value::Mapping(root_map) = &mut root else {
        // Non-mapping documents pass through unchanged.
        return Ok(root);
    };

    let mut result = Value::mapping();
    if let Some(defaults_node) = root_map.shift_remove("defaults") {
        let Value::Sequence(defaults) = defaults_node else {
            return Err(ConfigError::TypeMismatch {
                expected: "sequence".to_string(),
                found: defaults_node.type_name().to_string(),
                hint: Some("'defaults' lists documents to compose".into()),
                code: Some(304),
            });
        };

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        for entry in &defaults {
            if matches!(entry, Value::String(text) if text == "_self_") {
                continue;
            }
            let spec = parse_default_entry(entry, base_dir)?;
            if !spec.include_path.exists() {
                if spec.optional {
                    debug!(path = %spec.include_path.display(), "skipping optional include");
                    continue;
                }
                return Err(ConfigError::IncludeNotFound {
                    path: spec.include_path.display().to_string(),
                    hint: Some("Prefix the entry with '?' if the include is optional".into()),
                    code: Some(302),
                });
            }

            debug!(path = %spec.include_path.display(), "composing include");
            let child = load_with_includes(&spec.include_path, stack)?;
            match &spec.target_path {
                Some(target) => match find_path_mut(&mut result, target) {
                    Some(existing) => merge(existing, &child),
                    None => assign_path(&mut result, target, child, true)?,
                },
                None => merge(&mut result, &child),
            }
        }
    }

    merge(&mut result, &root);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::find_path;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
        find_path(root, &parse_path(path).unwrap())
    }

    #[test]
    fn test_load_str_parses_without_composition() {
        let root = load_str("a: 1\n", "<test>").unwrap();
        assert_eq!(lookup(&root, "a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_grouped_defaults_compose_in_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "db/postgres.yaml", "driver: postgresql\nport: 5432\n");
        write(&dir, "model/resnet.yaml", "layers: 50\n");
        let root_path = write(
            &dir,
            "config.yaml",
            "defaults:\n  - db: postgres\n  - model: resnet\ntrainer:\n  batch_size: 16\n",
        );

        let root = load_file(&root_path).unwrap();
        assert_eq!(
            lookup(&root, "db.driver"),
            Some(&Value::String("postgresql".into()))
        );
        assert_eq!(lookup(&root, "db.port"), Some(&Value::Int(5432)));
        assert_eq!(lookup(&root, "model.layers"), Some(&Value::Int(50)));
        assert_eq!(lookup(&root, "trainer.batch_size"), Some(&Value::Int(16)));
        // The metadata key itself never survives composition.
        assert_eq!(lookup(&root, "defaults"), None);
    }

    #[test]
    fn test_root_document_wins_over_includes() {
        let dir = TempDir::new().unwrap();
        write(&dir, "shared.yaml", "port: 80\nextra: kept\n");
        let root_path = write(&dir, "config.yaml", "defaults:\n  - shared\nport: 8080\n");

        let root = load_file(&root_path).unwrap();
        assert_eq!(lookup(&root, "port"), Some(&Value::Int(8080)));
        assert_eq!(lookup(&root, "extra"), Some(&Value::String("kept".into())));
    }

    #[test]
    fn test_later_includes_override_earlier() {
        let dir = TempDir::new().unwrap();
        write(&dir, "first.yaml", "key: first\nonly_first: 1\n");
        write(&dir, "second.yaml", "key: second\n");
        let root_path = write(
            &dir,
            "config.yaml",
            "defaults:\n  - first\n  - second\n",
        );

        let root = load_file(&root_path).unwrap();
        assert_eq!(lookup(&root, "key"), Some(&Value::String("second".into())));
        assert_eq!(lookup(&root, "only_first"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_optional_include_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root_path = write(
            &dir,
            "config.yaml",
            "defaults:\n  - \"?nonexistent\"\na: 1\n",
        );

        let root = load_file(&root_path).unwrap();
        assert_eq!(lookup(&root, "a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_required_include_missing_fails() {
        let dir = TempDir::new().unwrap();
        let root_path = write(&dir, "config.yaml", "defaults:\n  - nonexistent\n");

        let err = load_file(&root_path).unwrap_err();
        assert!(matches!(err, ConfigError::IncludeNotFound { .. }));
    }

    #[test]
    fn test_self_marker_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "shared.yaml", "a: 1\n");
        let root_path = write(
            &dir,
            "config.yaml",
            "defaults:\n  - _self_\n  - shared\nb: 2\n",
        );

        let root = load_file(&root_path).unwrap();
        assert_eq!(lookup(&root, "a"), Some(&Value::Int(1)));
        assert_eq!(lookup(&root, "b"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_nested_defaults_compose_recursively() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.yaml", "level: base\ndepth: 2\n");
        write(&dir, "mid.yaml", "defaults:\n  - base\nlevel: mid\n");
        let root_path = write(&dir, "config.yaml", "defaults:\n  - mid\nname: top\n");

        let root = load_file(&root_path).unwrap();
        assert_eq!(lookup(&root, "level"), Some(&Value::String("mid".into())));
        assert_eq!(lookup(&root, "depth"), Some(&Value::Int(2)));
        assert_eq!(lookup(&root, "name"), Some(&Value::String("top".into())));
    }

    #[test]
    fn test_recursive_include_detected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "defaults:\n  - b\n");
        write(&dir, "b.yaml", "defaults:\n  - a\n");
        let root_path = dir.path().join("a.yaml");

        let err = load_file(&root_path).unwrap_err();
        assert!(matches!(err, ConfigError::RecursiveInclude { .. }));
    }

    #[test]
    fn test_self_include_detected() {
        let dir = TempDir::new().unwrap();
        let root_path = write(&dir, "a.yaml", "defaults:\n  - a\n");

        let err = load_file(&root_path).unwrap_err();
        assert!(matches!(err, ConfigError::RecursiveInclude { .. }));
    }

    #[test]
    fn test_defaults_must_be_a_sequence() {
        let dir = TempDir::new().unwrap();
        let root_path = write(&dir, "config.yaml", "defaults: not_a_list\n");

        let err = load_file(&root_path).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn test_group_merges_into_existing_target() {
        let dir = TempDir::new().unwrap();
        write(&dir, "db/postgres.yaml", "port: 5432\n");
        write(&dir, "db/tuned.yaml", "pool: 10\n");
        let root_path = write(
            &dir,
            "config.yaml",
            "defaults:\n  - db: postgres\n  - db: tuned\n",
        );

        let root = load_file(&root_path).unwrap();
        assert_eq!(lookup(&root, "db.port"), Some(&Value::Int(5432)));
        assert_eq!(lookup(&root, "db.pool"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_non_mapping_document_passes_through() {
        let dir = TempDir::new().unwrap();
        let root_path = write(&dir, "list.yaml", "- 1\n- 2\n");

        let root = load_file(&root_path).unwrap();
        assert_eq!(
            root,
            Value::Sequence(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_unreadable_file_is_a_file_error() {
        let err = load_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileError { .. }));
    }
}
