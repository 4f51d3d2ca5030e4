use crate::domain::object::Object as FreeForm;
use crate::domain::Timestamp;
use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};

/// RFC 3339 instant. Accepts string or byte-string input; zero renders as null.
#[Scalar(name = "Timestamp")]
impl ScalarType for Timestamp {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(text) => Timestamp::parse(text).map_err(InputValueError::custom),
            Value::Binary(bytes) => Timestamp::parse_bytes(bytes).map_err(InputValueError::custom),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    /// Checked during validation so a bad literal never reaches a resolver.
    fn is_valid(value: &Value) -> bool {
        match value {
            Value::String(text) => Timestamp::parse(text).is_ok(),
            Value::Binary(bytes) => Timestamp::parse_bytes(bytes).is_ok(),
            _ => false,
        }
    }

    fn to_value(&self) -> Value {
        if self.is_zero() {
            Value::Null
        } else {
            Value::String(self.to_rfc3339())
        }
    }
}

/// Free-form string-keyed map. Accepts an object literal, or JSON in a string or byte-string.
#[Scalar(name = "Object")]
impl ScalarType for FreeForm {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::String(text) => FreeForm::from_json_str(&text).map_err(InputValueError::custom),
            Value::Binary(bytes) => FreeForm::from_json_bytes(&bytes).map_err(InputValueError::custom),
            Value::Object(_) => match value.into_json() {
                Ok(serde_json::Value::Object(map)) => Ok(FreeForm::from(map)),
                Ok(other) => Err(InputValueError::custom(format!("expected an object, got {other}"))),
                Err(why) => Err(InputValueError::custom(why)),
            },
            other => Err(InputValueError::expected_type(other)),
        }
    }

    fn is_valid(value: &Value) -> bool {
        match value {
            Value::String(_) | Value::Binary(_) | Value::Object(_) => {
                <FreeForm as ScalarType>::parse(value.clone()).is_ok()
            }
            _ => false,
        }
    }

    fn to_value(&self) -> Value {
        Value::from_json(serde_json::Value::Object(self.as_map().clone())).unwrap_or(Value::Null)
    }
}
