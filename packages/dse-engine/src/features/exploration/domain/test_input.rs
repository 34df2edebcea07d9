//! Concrete test inputs and model patching
//!
//! A test input is a set of named primitive slots. Each slot is the origin of
//! the symbolic variable with the same name. Patching copies solver values
//! into the slots, converting to the slot's declared type.

use crate::features::symbolic::domain::{Model, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Declared primitive type of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotType::Boolean => "boolean",
            SlotType::Byte => "byte",
            SlotType::Char => "char",
            SlotType::Short => "short",
            SlotType::Int => "int",
            SlotType::Long => "long",
            SlotType::Float => "float",
            SlotType::Double => "double",
            SlotType::String => "string",
        };
        f.write_str(name)
    }
}

/// Slot value tagged with its primitive type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PrimitiveValue {
    Boolean(bool),
    Byte(i8),
    /// UTF-16 code unit
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl PrimitiveValue {
    pub fn slot_type(&self) -> SlotType {
        match self {
            PrimitiveValue::Boolean(_) => SlotType::Boolean,
            PrimitiveValue::Byte(_) => SlotType::Byte,
            PrimitiveValue::Char(_) => SlotType::Char,
            PrimitiveValue::Short(_) => SlotType::Short,
            PrimitiveValue::Int(_) => SlotType::Int,
            PrimitiveValue::Long(_) => SlotType::Long,
            PrimitiveValue::Float(_) => SlotType::Float,
            PrimitiveValue::Double(_) => SlotType::Double,
            PrimitiveValue::String(_) => SlotType::String,
        }
    }

    /// Convert a model value into `slot`'s type
    ///
    /// Integers narrow by two's-complement truncation, booleans are `value > 0`,
    /// reals truncate toward zero into integral slots, and a string fills a
    /// char slot with its first UTF-16 unit.
    pub fn convert(slot: SlotType, value: &Value) -> Option<PrimitiveValue> {
        let converted = match (slot, value) {
            (SlotType::String, Value::Str(s)) => PrimitiveValue::String(s.clone()),
            (SlotType::Char, Value::Str(s)) => PrimitiveValue::Char(s.encode_utf16().next()?),
            (_, Value::Str(_)) | (SlotType::String, _) => return None,

            (SlotType::Float, v) => PrimitiveValue::Float(v.to_real() as f32),
            (SlotType::Double, v) => PrimitiveValue::Double(v.to_real()),
            (SlotType::Boolean, Value::Real(r)) => PrimitiveValue::Boolean(*r > 0.0),

            (integral, v) => {
                let n = v.to_int();
                match integral {
                    SlotType::Boolean => PrimitiveValue::Boolean(n > 0),
                    SlotType::Byte => PrimitiveValue::Byte(n as i8),
                    SlotType::Char => PrimitiveValue::Char(n as u16),
                    SlotType::Short => PrimitiveValue::Short(n as i16),
                    SlotType::Int => PrimitiveValue::Int(n as i32),
                    _ => PrimitiveValue::Long(n),
                }
            }
        };
        Some(converted)
    }

    /// Symbolic view of this slot's value
    pub fn to_value(&self) -> Value {
        match self {
            PrimitiveValue::Boolean(b) => Value::Int(i64::from(*b)),
            PrimitiveValue::Byte(v) => Value::Int((*v).into()),
            PrimitiveValue::Char(v) => Value::Int((*v).into()),
            PrimitiveValue::Short(v) => Value::Int((*v).into()),
            PrimitiveValue::Int(v) => Value::Int((*v).into()),
            PrimitiveValue::Long(v) => Value::Int(*v),
            PrimitiveValue::Float(v) => Value::Real((*v).into()),
            PrimitiveValue::Double(v) => Value::Real(*v),
            PrimitiveValue::String(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Char(c) => match char::from_u32(u32::from(*c)) {
                Some(ch) => write!(f, "'{}'", ch.escape_default()),
                None => write!(f, "'\\u{:04x}'", c),
            },
            PrimitiveValue::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

/// Why a model could not be applied to an input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("model is empty")]
    EmptyModel,

    #[error("no input slot named '{0}'")]
    MissingSlot(String),

    #[error("value {value} does not fit {slot} slot '{name}'")]
    IncompatibleValue {
        name: String,
        slot: SlotType,
        value: Value,
    },
}

/// Concrete input of one test execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestInput {
    #[serde(default)]
    pub name: String,
    pub slots: BTreeMap<String, PrimitiveValue>,
}

impl TestInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: BTreeMap::new(),
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: PrimitiveValue) -> Self {
        self.slots.insert(name.into(), value);
        self
    }

    pub fn slot(&self, name: &str) -> Option<&PrimitiveValue> {
        self.slots.get(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Copy of this input with every model entry written into its slot
    pub fn patched(&self, model: &Model) -> Result<TestInput, PatchError> {
        if model.is_empty() {
            return Err(PatchError::EmptyModel);
        }
        let mut out = self.clone();
        for (name, value) in model.iter() {
            let slot = out
                .slots
                .get_mut(name)
                .ok_or_else(|| PatchError::MissingSlot(name.clone()))?;
            let slot_type = slot.slot_type();
            *slot = PrimitiveValue::convert(slot_type, value).ok_or_else(|| {
                PatchError::IncompatibleValue {
                    name: name.clone(),
                    slot: slot_type,
                    value: value.clone(),
                }
            })?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(entries: &[(&str, Value)]) -> Model {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_narrowing_by_truncation() {
        assert_eq!(
            PrimitiveValue::convert(SlotType::Byte, &Value::Int(300)),
            Some(PrimitiveValue::Byte(44))
        );
        assert_eq!(
            PrimitiveValue::convert(SlotType::Short, &Value::Int(-40_000)),
            Some(PrimitiveValue::Short(25_536))
        );
        assert_eq!(
            PrimitiveValue::convert(SlotType::Char, &Value::Int(65)),
            Some(PrimitiveValue::Char(65))
        );
    }

    #[test]
    fn test_boolean_threshold() {
        assert_eq!(
            PrimitiveValue::convert(SlotType::Boolean, &Value::Int(0)),
            Some(PrimitiveValue::Boolean(false))
        );
        assert_eq!(
            PrimitiveValue::convert(SlotType::Boolean, &Value::Int(7)),
            Some(PrimitiveValue::Boolean(true))
        );
        assert_eq!(
            PrimitiveValue::convert(SlotType::Boolean, &Value::Int(-1)),
            Some(PrimitiveValue::Boolean(false))
        );
    }

    #[test]
    fn test_reals_and_strings() {
        assert_eq!(
            PrimitiveValue::convert(SlotType::Int, &Value::Real(-2.9)),
            Some(PrimitiveValue::Int(-2))
        );
        assert_eq!(
            PrimitiveValue::convert(SlotType::Double, &Value::Int(3)),
            Some(PrimitiveValue::Double(3.0))
        );
        assert_eq!(
            PrimitiveValue::convert(SlotType::Char, &Value::Str("xyz".into())),
            Some(PrimitiveValue::Char(u16::from(b'x')))
        );
        assert_eq!(PrimitiveValue::convert(SlotType::Char, &Value::Str(String::new())), None);
        assert_eq!(PrimitiveValue::convert(SlotType::Int, &Value::Str("5".into())), None);
        assert_eq!(PrimitiveValue::convert(SlotType::String, &Value::Int(5)), None);
    }

    #[test]
    fn test_patch_leaves_original_untouched() {
        let input = TestInput::new("t")
            .with_slot("x", PrimitiveValue::Int(-3))
            .with_slot("s", PrimitiveValue::String("a".into()));
        let patched = input.patched(&model(&[("x", Value::Int(6))])).unwrap();
        assert_eq!(patched.slot("x"), Some(&PrimitiveValue::Int(6)));
        assert_eq!(patched.slot("s"), Some(&PrimitiveValue::String("a".into())));
        assert_eq!(input.slot("x"), Some(&PrimitiveValue::Int(-3)));
    }

    #[test]
    fn test_patch_errors() {
        let input = TestInput::new("t").with_slot("x", PrimitiveValue::Int(0));
        assert_eq!(input.patched(&Model::new()), Err(PatchError::EmptyModel));
        assert_eq!(
            input.patched(&model(&[("y", Value::Int(1))])),
            Err(PatchError::MissingSlot("y".into()))
        );
        assert!(matches!(
            input.patched(&model(&[("x", Value::Str("no".into()))])),
            Err(PatchError::IncompatibleValue { .. })
        ));
    }

    #[test]
    fn test_serde_shape() {
        let input = TestInput::new("t").with_slot("c", PrimitiveValue::Char(97));
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(json, r#"{"name":"t","slots":{"c":{"type":"char","value":97}}}"#);
        let back: TestInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
    }
}
