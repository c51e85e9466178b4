//! Layering of YAML configuration values.
//!
//! A discovered `.envtrace.yml` is the base and an explicitly requested
//! config file is laid over it.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences and scalars in the overlay replace the base value
//! - `null` in the overlay deletes the key from the base

use serde_yaml::{Mapping, Value};

/// Lay `overlay` over `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let (Value::Mapping(base_map), Value::Mapping(overlay_map)) = (base, overlay) else {
        return overlay.clone();
    };

    let mut merged = base_map.clone();
    for (key, value) in overlay_map {
        if value.is_null() {
            merged.remove(key);
            continue;
        }
        let layered = match base_map.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), layered);
    }
    Value::Mapping(merged)
}

/// Merge config layers in order; the last layer has the highest priority.
pub fn merge_configs(layers: &[Value]) -> Value {
    layers
        .iter()
        .fold(Value::Mapping(Mapping::new()), |merged, layer| {
            deep_merge(&merged, layer)
        })
}
