//! JSON merge for layered configuration.

use serde_json::Value;

/// Merge `layer` into `base`.
///
/// Objects merge key by key; any other value replaces the base value.
/// A key present in `locks` with a non-object value is frozen and the layer
/// cannot change it. Object-valued locks are descended into.
pub(super) fn overlay(base: &mut Value, layer: &Value, locks: Option<&Value>) {
    match (base, layer) {
        (Value::Object(base_map), Value::Object(layer_map)) => {
            let lock_map = match locks {
                Some(Value::Object(map)) => Some(map),
                Some(_) => return,
                None => None,
            };
            for (key, value) in layer_map {
                let lock = lock_map.and_then(|map| map.get(key));
                match lock {
                    Some(Value::Object(_)) => {
                        let slot = base_map
                            .entry(key.clone())
                            .or_insert_with(|| Value::Object(serde_json::Map::new()));
                        overlay(slot, value, lock);
                    }
                    Some(_) => {}
                    None => match base_map.get_mut(key) {
                        Some(slot) => overlay(slot, value, None),
                        None => {
                            base_map.insert(key.clone(), value.clone());
                        }
                    },
                }
            }
        }
        (slot, value) => {
            if locks.is_none() {
                *slot = value.clone();
            }
        }
    }
}
