// Copyright 2025 The Overlay Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Weak value coercion.
//!
//! [`weak_assign`] copies a dynamically-typed source value into a destination
//! slot whose declared kind is known from the schema. Numeric destinations
//! accept any numeric source plus base-10 strings; integers narrow by
//! two's-complement truncation of the 64-bit value and floats truncate
//! toward zero when assigned to integers. No range checking is performed.
//! Non-numeric destinations accept only a source of the exact same kind.

use std::fmt;

use serde_json::Value;

use super::schema::FieldKind;

/// Dynamic kind of an incoming override value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    SignedInt,
    UnsignedInt,
    Float,
    String,
    Bool,
    Null,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a JSON value. Numbers that fit in `i64` are signed, numbers
    /// that only fit in `u64` are unsigned, everything else numeric is float.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(n) => {
                if n.is_i64() {
                    ValueKind::SignedInt
                } else if n.is_u64() {
                    ValueKind::UnsignedInt
                } else {
                    ValueKind::Float
                }
            }
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Null => ValueKind::Null,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::SignedInt => "int",
            ValueKind::UnsignedInt => "uint",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Null => "null",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Failure to assign a source value to a destination field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoerceError {
    #[error("wrong type {src}, expected value of type {dst}")]
    TypeMismatch { src: ValueKind, dst: FieldKind },

    #[error("not settable")]
    NotSettable,
}

impl CoerceError {
    fn mismatch(src: &Value, dst: FieldKind) -> Self {
        CoerceError::TypeMismatch {
            src: ValueKind::of(src),
            dst,
        }
    }
}

/// Copy `src` into `dst`, weakly coercing numeric values to `kind`.
///
/// On failure `dst` is left unchanged.
pub fn weak_assign(src: &Value, dst: &mut Value, kind: FieldKind) -> Result<(), CoerceError> {
    if kind.is_signed_int() {
        let wide = signed_source(src, kind)?;
        *dst = Value::from(truncate_signed(wide, kind));
        return Ok(());
    }
    if kind.is_unsigned_int() {
        let wide = unsigned_source(src, kind)?;
        *dst = Value::from(truncate_unsigned(wide, kind));
        return Ok(());
    }
    if kind.is_float() {
        let wide = float_source(src, kind)?;
        let narrowed = if kind == FieldKind::F32 {
            f64::from(wide as f32)
        } else {
            wide
        };
        // from_f64 rejects non-finite values, which can only arrive here via
        // string parses like "NaN" or "inf".
        match serde_json::Number::from_f64(narrowed) {
            Some(n) => {
                *dst = Value::Number(n);
                return Ok(());
            }
            None => return Err(CoerceError::mismatch(src, kind)),
        }
    }
    match kind {
        FieldKind::String => match src {
            Value::String(_) => {
                *dst = src.clone();
                Ok(())
            }
            _ => Err(CoerceError::mismatch(src, kind)),
        },
        FieldKind::Bool => match src {
            Value::Bool(_) => {
                *dst = src.clone();
                Ok(())
            }
            _ => Err(CoerceError::mismatch(src, kind)),
        },
        // Opaque slots accept only a source of the same dynamic kind as the
        // value they currently hold.
        FieldKind::Opaque => {
            if ValueKind::of(src) == ValueKind::of(dst) {
                *dst = src.clone();
                Ok(())
            } else {
                Err(CoerceError::mismatch(src, kind))
            }
        }
        // Numeric kinds were handled above.
        _ => Err(CoerceError::mismatch(src, kind)),
    }
}

/// Widen `src` to `i64` for a signed integer destination.
fn signed_source(src: &Value, dst: FieldKind) -> Result<i64, CoerceError> {
    match src {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(u) = n.as_u64() {
                Ok(u as i64)
            } else {
                // Remaining numbers are always representable as f64.
                Ok(n.as_f64().unwrap_or_default() as i64)
            }
        }
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| CoerceError::mismatch(src, dst)),
        _ => Err(CoerceError::mismatch(src, dst)),
    }
}

/// Widen `src` to `u64` for an unsigned integer destination.
fn unsigned_source(src: &Value, dst: FieldKind) -> Result<u64, CoerceError> {
    match src {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i as u64)
            } else if let Some(u) = n.as_u64() {
                Ok(u)
            } else {
                Ok(n.as_f64().unwrap_or_default() as u64)
            }
        }
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|_| CoerceError::mismatch(src, dst)),
        _ => Err(CoerceError::mismatch(src, dst)),
    }
}

/// Widen `src` to `f64` for a floating point destination.
fn float_source(src: &Value, dst: FieldKind) -> Result<f64, CoerceError> {
    match src {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i as f64)
            } else if let Some(u) = n.as_u64() {
                Ok(u as f64)
            } else {
                Ok(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| CoerceError::mismatch(src, dst)),
        _ => Err(CoerceError::mismatch(src, dst)),
    }
}

fn truncate_signed(wide: i64, kind: FieldKind) -> i64 {
    match kind {
        FieldKind::I8 => wide as i8 as i64,
        FieldKind::I16 => wide as i16 as i64,
        FieldKind::I32 => wide as i32 as i64,
        FieldKind::Isize => wide as isize as i64,
        _ => wide,
    }
}

fn truncate_unsigned(wide: u64, kind: FieldKind) -> u64 {
    match kind {
        FieldKind::U8 => wide as u8 as u64,
        FieldKind::U16 => wide as u16 as u64,
        FieldKind::U32 => wide as u32 as u64,
        FieldKind::Usize => wide as usize as u64,
        _ => wide,
    }
}
