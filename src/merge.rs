use crate::value::Value;

/// Merge `source` into `dest`.
///
/// Mappings extend key by key; every other combination replaces `dest`
/// wholesale. An explicit null in `source` is a destructive override, not a
/// no-op. Sequences are never merged element-wise.
pub fn merge(dest: &mut Value, source: &Value) {
    if source.is_null() {
        *dest = Value::Null;
        return;
    }

    if dest.is_null() {
        *dest = source.clone();
        return;
    }

    if let (Value::Mapping(dest_map), Value::Mapping(source_map)) = (&mut *dest, source) {
        for (key, source_value) in source_map {
            match dest_map.get_mut(key) {
                Some(dest_value) => merge(dest_value, source_value),
                None => {
                    dest_map.insert(key.clone(), source_value.clone());
                }
            }
        }
        return;
    }

    // Replace destination with source when types differ or are non-map
    // containers.
    *dest = source.clone();
}

/// Non-destructive form of [`merge`]: returns `base` with `overlay` applied.
pub fn merged(base: &Value, overlay: &Value) -> Value {
    let mut result = base.clone();
    merge(&mut result, overlay);
    result
}
