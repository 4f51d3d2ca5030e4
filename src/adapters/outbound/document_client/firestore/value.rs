//! Conversion between plain JSON and Firestore's typed value encoding.

use crate::ports::outbound::document_client::{DocumentError, Fields};
use serde_json::{json, Map, Number, Value};

#[must_use]
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64().unwrap_or_default() }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(values) => {
            json!({ "arrayValue": { "values": values.iter().map(encode).collect::<Vec<_>>() } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

#[must_use]
pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode(value)))
        .collect()
}

pub fn decode(value: &Value) -> Result<Value, DocumentError> {
    let Some((kind, inner)) = value.as_object().and_then(|typed| typed.iter().next()) else {
        return Err(malformed("value", value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed(kind, inner)),
        "integerValue" => {
            let integer = match inner {
                Value::String(text) => text.parse::<i64>().ok(),
                Value::Number(number) => number.as_i64(),
                _ => None,
            };
            integer
                .map(Value::from)
                .ok_or_else(|| malformed(kind, inner))
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| malformed(kind, inner)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|text| Value::String(text.to_string()))
            .ok_or_else(|| malformed(kind, inner)),
        "arrayValue" => match inner.get("values") {
            None => Ok(Value::Array(Vec::new())),
            Some(Value::Array(values)) => values
                .iter()
                .map(decode)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some(other) => Err(malformed(kind, other)),
        },
        "mapValue" => match inner.get("fields") {
            None => Ok(Value::Object(Map::new())),
            Some(fields) => decode_fields(fields).map(Value::Object),
        },
        "geoPointValue" => Ok(inner.clone()),
        _ => Err(malformed(kind, inner)),
    }
}

pub fn decode_fields(fields: &Value) -> Result<Fields, DocumentError> {
    let Some(fields) = fields.as_object() else {
        return Err(malformed("fields", fields));
    };
    fields
        .iter()
        .map(|(name, value)| decode(value).map(|value| (name.clone(), value)))
        .collect()
}

fn malformed(kind: &str, value: &Value) -> DocumentError {
    DocumentError::Malformed(format!("{kind}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_travel_as_strings() {
        assert_eq!(encode(&json!(7)), json!({"integerValue": "7"}));
        assert_eq!(decode(&json!({"integerValue": "7"})).unwrap(), json!(7));
    }

    #[test]
    fn test_floats_stay_doubles() {
        assert_eq!(encode(&json!(4.5)), json!({"doubleValue": 4.5}));
        assert_eq!(decode(&json!({"doubleValue": 4.0})).unwrap(), json!(4.0));
    }

    #[test]
    fn test_card_shaped_document() {
        let document = json!({
            "name": "Card Mock",
            "types": ["Legendary", "Creature"],
            "costs": [],
            "numberCost": 4.5,
            "orderExternal": 3,
            "artist": null,
            "set": {"id": "s1", "alias": "stm"},
        });
        let Value::Object(fields) = document.clone() else {
            unreachable!()
        };

        let encoded = Value::Object(encode_fields(&fields));
        assert_eq!(encoded["types"]["arrayValue"]["values"][1], json!({"stringValue": "Creature"}));
        assert_eq!(encoded["set"]["mapValue"]["fields"]["alias"], json!({"stringValue": "stm"}));

        assert_eq!(Value::Object(decode_fields(&encoded).unwrap()), document);
    }

    #[test]
    fn test_backend_only_shapes() {
        assert_eq!(decode(&json!({"arrayValue": {}})).unwrap(), json!([]));
        assert_eq!(decode(&json!({"mapValue": {}})).unwrap(), json!({}));
        assert_eq!(
            decode(&json!({"timestampValue": "2024-05-01T12:00:00Z"})).unwrap(),
            json!("2024-05-01T12:00:00Z")
        );
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        assert!(matches!(
            decode(&json!({"mysteryValue": 1})),
            Err(DocumentError::Malformed(_))
        ));
        assert!(decode(&json!("bare")).is_err());
    }
}
