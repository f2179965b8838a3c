use std::fmt;

/// Represents different types allowed as region attribute values
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
}

impl Value {
    /// Checks if the value carries nothing worth reporting: a string
    /// consisting of whitespace only or a non-finite number
    pub fn is_blank(&self) -> bool {
        match self {
            Value::String(s) => s.trim().is_empty(),
            Value::Float(f) => !f.is_finite(),
            Value::Integer(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s.trim()),
            Value::Float(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}
