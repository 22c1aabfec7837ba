use serde::{de::{DeserializeOwned, Error as _}, Deserialize, Deserializer};
use serde_json::Value;

/// A policy category that is either switched off or on with parameters.
///
/// In a policy document `false` disables the category, `true` enables it with
/// its default parameters and an object enables it with the given parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle<T> {
    Disabled,
    Enabled(T),
}

impl<T> Toggle<T> {
    pub fn disabled() -> Self { Toggle::Disabled }

    pub fn enabled() -> Self where T: Default { Toggle::Enabled(T::default()) }

    pub fn is_enabled(&self) -> bool { matches!(self, Toggle::Enabled(_)) }

    pub fn as_enabled(&self) -> Option<&T> {
        match self {
            Toggle::Enabled(params) => Some(params),
            Toggle::Disabled => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Toggle<T>
where
    T: DeserializeOwned + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(false) => Ok(Toggle::Disabled),
            Value::Bool(true) => Ok(Toggle::enabled()),
            params @ Value::Object(_) => serde_json::from_value(params).map(Toggle::Enabled).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected `true`, `false` or a parameter object, found {}", kind(&other)))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
