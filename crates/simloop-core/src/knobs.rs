//! Named parameter knobs: the scalar top-level fields of a model's parameters,
//! listed for sliders and toggles and patched by name.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// What kind of control a knob maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnobKind {
    /// Continuous slider.
    Number,
    /// Stepped slider or count field.
    Integer,
    /// Checkbox.
    Toggle,
    /// One of a fixed set of named modes.
    Choice,
}

impl KnobKind {
    /// The control for a serialized field, or `None` for structured values.
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self::Integer),
            Value::Number(_) => Some(Self::Number),
            Value::Bool(_) => Some(Self::Toggle),
            Value::String(_) => Some(Self::Choice),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Convert slider/text input into the JSON shape this knob stores.
    pub fn coerce(self, name: &str, input: &Value) -> Result<Value, KnobError> {
        let invalid = || KnobError::InvalidValue {
            name: name.to_owned(),
            kind: self,
            value: input.to_string(),
        };
        match (self, input) {
            (Self::Number, Value::Number(_)) => Ok(input.clone()),
            (Self::Number, Value::String(s)) => {
                let v: f64 = s.trim().parse().map_err(|_| invalid())?;
                finite_number(name, v)
            }
            (Self::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(input.clone()),
            // Sliders report whole numbers as floats.
            (Self::Integer, Value::Number(n)) => match n.as_f64() {
                Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(Value::from(v as i64)),
                _ => Err(invalid()),
            },
            (Self::Integer, Value::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| s.parse::<u64>().map(Value::from))
                    .map_err(|_| invalid())
            }
            (Self::Toggle, Value::Bool(_)) => Ok(input.clone()),
            (Self::Toggle, Value::Number(n)) => match n.as_u64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(invalid()),
            },
            (Self::Toggle, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            // The parameter enum rejects names it does not know.
            (Self::Choice, Value::String(s)) => Ok(Value::String(s.trim().to_owned())),
            _ => Err(invalid()),
        }
    }
}

fn finite_number(name: &str, v: f64) -> Result<Value, KnobError> {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| KnobError::NonFinite(name.to_owned()))
}

/// One adjustable parameter with its current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnobEntry {
    pub name: String,
    pub kind: KnobKind,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request to set one knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnobUpdate {
    pub name: String,
    pub value: Value,
}

impl KnobUpdate {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse `name=value`; the value is read as JSON with a raw string fallback.
    pub fn parse(input: &str) -> Result<Self, KnobError> {
        let Some((name, raw)) = input.split_once('=') else {
            return Err(KnobError::Malformed(format!(
                "expected name=value, got '{input}'"
            )));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(KnobError::Malformed("empty knob name".into()));
        }
        let raw = raw.trim();
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
        Ok(Self::new(name, value))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KnobError {
    #[error("{0}")]
    Malformed(String),
    #[error("unknown knob: {0}")]
    Unknown(String),
    #[error("{0} is not an adjustable knob")]
    NotAdjustable(String),
    #[error("cannot set {kind:?} knob {name} to {value}")]
    InvalidValue {
        name: String,
        kind: KnobKind,
        value: String,
    },
    #[error("{0} must be a finite number")]
    NonFinite(String),
    #[error("{0}")]
    Rejected(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

fn to_object<P: Serialize>(params: &P) -> Result<Map<String, Value>, KnobError> {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(KnobError::Serialization(
            "parameters must serialize to an object".into(),
        )),
        Err(err) => Err(KnobError::Serialization(err.to_string())),
    }
}

/// Scalar fields of `params`, sorted by name and described from `docs`.
pub fn list_knobs<P: Serialize>(
    params: &P,
    docs: &[(&str, &str)],
) -> Result<Vec<KnobEntry>, KnobError> {
    let fields = to_object(params)?;
    Ok(fields
        .into_iter()
        .filter_map(|(name, value)| {
            let kind = KnobKind::of(&value)?;
            let description = docs
                .iter()
                .find(|(doc, _)| *doc == name)
                .map(|(_, text)| (*text).to_owned());
            Some(KnobEntry {
                name,
                kind,
                value,
                description,
            })
        })
        .collect())
}

/// Apply `updates` together, returning the re-validated parameters.
pub fn apply_updates<P>(params: &P, updates: &[KnobUpdate]) -> Result<P, KnobError>
where
    P: Serialize + DeserializeOwned,
{
    let mut fields = to_object(params)?;
    for update in updates {
        let current = fields
            .get(&update.name)
            .ok_or_else(|| KnobError::Unknown(update.name.clone()))?;
        let kind = KnobKind::of(current)
            .ok_or_else(|| KnobError::NotAdjustable(update.name.clone()))?;
        let value = kind.coerce(&update.name, &update.value)?;
        fields.insert(update.name.clone(), value);
    }
    params_from_value(Value::Object(fields))
}

/// Deserialize parameters from a JSON object that may omit fields.
pub fn params_from_value<P>(value: Value) -> Result<P, KnobError>
where
    P: Serialize + DeserializeOwned,
{
    let supplied: Vec<String> = value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    let params: P = serde_path_to_error::deserialize(value).map_err(
        |err: serde_path_to_error::Error<serde_json::Error>| {
            KnobError::Rejected(format!("{} at {}", err.inner(), err.path()))
        },
    )?;
    let supplied: Vec<&str> = supplied.iter().map(String::as_str).collect();
    ensure_finite(&params, &supplied)?;
    Ok(params)
}

/// Numbers that overflow their field (1e39 into an `f32`) serialize back as null.
fn ensure_finite<P: Serialize>(params: &P, names: &[&str]) -> Result<(), KnobError> {
    let fields = to_object(params)?;
    match names
        .iter()
        .find(|name| matches!(fields.get(**name), Some(Value::Null)))
    {
        Some(name) => Err(KnobError::NonFinite((*name).to_owned())),
        None => Ok(()),
    }
}
