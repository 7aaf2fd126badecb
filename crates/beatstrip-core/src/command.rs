//! Command-channel payloads exchanged between the analysis and lighting
//! halves, and the output messages the lighting half emits.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Closed payload variant carried by commands and output messages.
///
/// All access is pattern matched through the typed accessors; a shape
/// mismatch surfaces as [`CoreError::PayloadMismatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PayloadValue {
    /// 64-bit float
    Double(f64),
    /// Boolean flag
    Bool(bool),
    /// UTF-8 string (palette ids, file names, diagnostics)
    String(String),
    /// 32-bit integer (effect ids)
    Int(i32),
    /// Float list
    VecDouble(Vec<f64>),
    /// Integer list (palette color indices)
    VecInt(Vec<i32>),
    /// Raw bytes (packed LED frames)
    Bytes(Vec<u8>),
}

impl PayloadValue {
    /// Short shape name used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PayloadValue::Double(_) => "double",
            PayloadValue::Bool(_) => "bool",
            PayloadValue::String(_) => "string",
            PayloadValue::Int(_) => "int",
            PayloadValue::VecDouble(_) => "vec<double>",
            PayloadValue::VecInt(_) => "vec<int>",
            PayloadValue::Bytes(_) => "bytes",
        }
    }

    fn mismatch(&self, expected: &'static str) -> CoreError {
        CoreError::PayloadMismatch {
            expected,
            got: self.kind(),
        }
    }

    /// Extract a double.
    pub fn as_double(&self) -> Result<f64> {
        match self {
            PayloadValue::Double(v) => Ok(*v),
            other => Err(other.mismatch("double")),
        }
    }

    /// Extract a bool.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            PayloadValue::Bool(v) => Ok(*v),
            other => Err(other.mismatch("bool")),
        }
    }

    /// Extract a string slice.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            PayloadValue::String(v) => Ok(v),
            other => Err(other.mismatch("string")),
        }
    }

    /// Extract an integer.
    pub fn as_int(&self) -> Result<i32> {
        match self {
            PayloadValue::Int(v) => Ok(*v),
            other => Err(other.mismatch("int")),
        }
    }

    /// Extract a float list.
    pub fn as_vec_double(&self) -> Result<&[f64]> {
        match self {
            PayloadValue::VecDouble(v) => Ok(v),
            other => Err(other.mismatch("vec<double>")),
        }
    }

    /// Extract an integer list.
    pub fn as_vec_int(&self) -> Result<&[i32]> {
        match self {
            PayloadValue::VecInt(v) => Ok(v),
            other => Err(other.mismatch("vec<int>")),
        }
    }

    /// Extract raw bytes.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            PayloadValue::Bytes(v) => Ok(v),
            other => Err(other.mismatch("bytes")),
        }
    }
}

/// An address-tagged command consumed by the lighting block.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Slash-separated target address, e.g. `/scene/1/change_palette`.
    pub address: String,
    /// Typed payload.
    pub payload: PayloadValue,
}

impl Command {
    /// Create a command.
    pub fn new(address: impl Into<String>, payload: PayloadValue) -> Self {
        Self {
            address: address.into(),
            payload,
        }
    }
}

/// An address-tagged message emitted by the lighting block: packed LED
/// frames (`/light/serial/{group}`) and diagnostics
/// (`/scene/{sid}/load_error`).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputMessage {
    /// Destination address.
    pub address: String,
    /// Typed payload.
    pub payload: PayloadValue,
}

impl OutputMessage {
    /// Create an output message.
    pub fn new(address: impl Into<String>, payload: PayloadValue) -> Self {
        Self {
            address: address.into(),
            payload,
        }
    }
}
