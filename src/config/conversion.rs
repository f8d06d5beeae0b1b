// Author: Dustin Pilgrim
// License: MIT

use crate::{ConfigError, Value};

fn conversion_error(expected: &str, value: &Value, code: u32) -> ConfigError {
    ConfigError::TypeMismatch {
        expected: expected.to_string(),
        found: value.type_name().to_string(),
        hint: Some(format!("Use a {} value in your config", expected)),
        code: Some(code),
    }
}

fn range_error(target: &str, number: i64, code: u32) -> ConfigError {
    ConfigError::TypeMismatch {
        expected: target.to_string(),
        found: "int".to_string(),
        hint: Some(format!("{} is out of range for {}", number, target)),
        code: Some(code),
    }
}

impl TryFrom<Value> for String {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(conversion_error("string", &other, 401)),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(conversion_error("bool", &other, 408)),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(conversion_error("int", &other, 402)),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => i32::try_from(i).map_err(|_| range_error("i32", i, 403)),
            other => Err(conversion_error("int", &other, 402)),
        }
    }
}

impl TryFrom<Value> for u16 {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => u16::try_from(i).map_err(|_| range_error("u16", i, 404)),
            other => Err(conversion_error("int", &other, 402)),
        }
    }
}

impl TryFrom<Value> for u32 {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => u32::try_from(i).map_err(|_| range_error("u32", i, 405)),
            other => Err(conversion_error("int", &other, 402)),
        }
    }
}

impl TryFrom<Value> for u64 {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => u64::try_from(i).map_err(|_| range_error("u64", i, 406)),
            other => Err(conversion_error("int", &other, 402)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(conversion_error("float", &other, 407)),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        f64::try_from(value).map(|f| f as f32)
    }
}

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value, Error = ConfigError>,
{
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Sequence(seq) => {
                let mut result = Vec::with_capacity(seq.len());
                for item in seq {
                    result.push(T::try_from(item)?);
                }
                Ok(result)
            }
            other => Err(conversion_error("sequence", &other, 409)),
        }
    }
}

impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = ConfigError>,
{
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            v => Ok(Some(T::try_from(v)?)),
        }
    }
}
