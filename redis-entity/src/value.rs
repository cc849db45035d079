use crate::Error;

/// 命令参数与应答的统一表示
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Okay,
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Int(value as i64)
    }
}

fn decode_err(expected: &'static str, got: &Value) -> Error {
    Error::Decode {
        expected,
        got: format!("{got:?}"),
    }
}

/// 从应答里解出类型化的结果
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, Error>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value)
    }
}

impl FromValue for () {
    fn from_value(_value: Value) -> Result<Self, Error> {
        Ok(())
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Nil => Ok(false),
            Value::Okay => Ok(true),
            Value::Int(n) => Ok(n != 0),
            other => Err(decode_err("bool", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Int(n) => Ok(n),
            Value::Text(s) => s.parse().map_err(|_| decode_err("i64", &Value::Text(s))),
            Value::Bytes(b) => {
                let s = String::from_utf8(b)?;
                s.parse().map_err(|_| decode_err("i64", &Value::Text(s)))
            }
            other => Err(decode_err("i64", &other)),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, Error> {
        let n = i64::from_value(value)?;
        u64::try_from(n).map_err(|_| decode_err("u64", &Value::Int(n)))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Int(n) => Ok(n as f64),
            Value::Text(s) => s.parse().map_err(|_| decode_err("f64", &Value::Text(s))),
            Value::Bytes(b) => {
                let s = String::from_utf8(b)?;
                s.parse().map_err(|_| decode_err("f64", &Value::Text(s)))
            }
            other => Err(decode_err("f64", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => Ok(String::from_utf8(b)?),
            Value::Int(n) => Ok(n.to_string()),
            other => Err(decode_err("string", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Nil => Ok(None),
            other => Ok(Some(T::from_value(other)?)),
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Nil => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(String::from_value).collect(),
            other => Err(decode_err("array of strings", &other)),
        }
    }
}

impl FromValue for Vec<(String, String)> {
    fn from_value(value: Value) -> Result<Self, Error> {
        // HGETALL 的应答是打平的 field/value 对
        let items = match value {
            Value::Nil => return Ok(Vec::new()),
            Value::Array(items) => items,
            other => return Err(decode_err("array of pairs", &other)),
        };
        if items.len() % 2 != 0 {
            return Err(decode_err("array of pairs", &Value::Array(items)));
        }

        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            pairs.push((String::from_value(field)?, String::from_value(value)?));
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scalars() {
        assert!(bool::from_value(Value::Okay).unwrap());
        assert!(!bool::from_value(Value::Int(0)).unwrap());
        assert_eq!(i64::from_value(Value::Bytes(b"42".to_vec())).unwrap(), 42);
        assert_eq!(f64::from_value(Value::Text("1.5".into())).unwrap(), 1.5);
        assert_eq!(
            String::from_value(Value::Bytes(b"john".to_vec())).unwrap(),
            "john"
        );
    }

    #[test]
    fn decodes_options_and_collections() {
        assert_eq!(Option::<String>::from_value(Value::Nil).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::Text("x".into())).unwrap(),
            Some("x".to_string())
        );

        let flat = Value::Array(vec![
            Value::Bytes(b"name".to_vec()),
            Value::Bytes(b"john".to_vec()),
        ]);
        assert_eq!(
            Vec::<(String, String)>::from_value(flat).unwrap(),
            vec![("name".to_string(), "john".to_string())]
        );
    }

    #[test]
    fn rejects_mismatched_replies() {
        let err = u64::from_value(Value::Int(-1)).unwrap_err();
        assert!(matches!(err, Error::Decode { expected: "u64", .. }));

        let err = Vec::<String>::from_value(Value::Int(3)).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
