//! JSON encoding of catalog records.
//!
//! Records carry their `id` as a struct field, while documents carry it as their
//! key. Encoding strips the field; decoding puts the key back.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::StoreError;

pub fn encode<T: Serialize>(record: &T) -> Result<JsonValue, StoreError> {
    let mut value = serde_json::to_value(record)
        .map_err(|e| StoreError::Serialization(format!("encode failed: {e}")))?;
    match value.as_object_mut() {
        Some(map) => {
            map.remove("id");
            Ok(value)
        }
        None => Err(StoreError::Serialization(
            "records must encode to JSON objects".to_string(),
        )),
    }
}

pub fn decode<T: DeserializeOwned>(id: &str, mut document: JsonValue) -> Result<T, StoreError> {
    match document.as_object_mut() {
        Some(map) => {
            map.insert("id".to_string(), JsonValue::String(id.to_string()));
        }
        None => {
            return Err(StoreError::Serialization(format!(
                "document '{id}' is not a JSON object"
            )));
        }
    }
    serde_json::from_value(document)
        .map_err(|e| StoreError::Serialization(format!("decode of '{id}' failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_catalog::Category;

    #[test]
    fn id_lives_in_the_key() {
        let doc = json!({"name": "Tiles"});
        let category: Category = decode("c1", doc).unwrap();
        assert_eq!(category.id.as_str(), "c1");

        let encoded = encode(&category).unwrap();
        assert_eq!(encoded, json!({"name": "Tiles"}));
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(
            decode::<Category>("c1", json!(3)),
            Err(StoreError::Serialization(_))
        ));
    }
}
