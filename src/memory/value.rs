//! Runtime value representation
//!
//! This module defines the [`Value`] enum stored in heap blocks. Values are
//! tagged, so the inspection layer can tell a null link from an uninitialized
//! one and a scalar from an aggregate without guessing.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 32-bit signed integer
//! - [`Value::Char`]: 8-bit signed character
//! - [`Value::Pointer`]: 64-bit memory address
//! - [`Value::Null`]: Null pointer (address 0)
//! - [`Value::Struct`]: Struct with named fields
//! - [`Value::Array`]: Fixed-size array of values
//! - [`Value::Uninitialized`]: Marker for uninitialized memory

use rustc_hash::FxHashMap;
use std::fmt;

/// Values held in inspected memory
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i32),
    Char(i8),
    Pointer(Address),
    Null,
    Struct(FxHashMap<String, Value>), // Field name -> field value
    Array(Vec<Value>),
    #[default]
    Uninitialized, // Special marker for uninitialized memory
}

/// Memory address type (64-bit)
pub type Address = u64;

impl Value {
    /// Build a struct value from `(name, value)` pairs
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Struct(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Pointer to `addr`, or `Null` for address 0
    pub fn pointer(addr: Address) -> Self {
        if addr == 0 {
            Value::Null
        } else {
            Value::Pointer(addr)
        }
    }

    /// Check if this value is initialized
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Value::Uninitialized)
    }

    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the pointer value, returns None if not a Pointer or Null
    pub fn as_pointer(&self) -> Option<Address> {
        match self {
            Value::Pointer(addr) => Some(*addr),
            Value::Null => Some(0),
            _ => None,
        }
    }

    /// Short description of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Char(_) => "char",
            Value::Pointer(_) => "pointer",
            Value::Null => "NULL",
            Value::Struct(_) => "struct",
            Value::Array(_) => "array",
            Value::Uninitialized => "uninitialized",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Char(c) => {
                let byte = *c as u8;
                if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "'{}'", byte as char)
                } else {
                    write!(f, "'\\x{:02x}'", byte)
                }
            }
            Value::Pointer(0) | Value::Null => write!(f, "NULL"),
            Value::Pointer(addr) => write!(f, "0x{:08x}", addr),
            Value::Struct(fields) => {
                let mut names: Vec<&String> = fields.keys().collect();
                names.sort();
                write!(f, "{{")?;
                for (i, name) in names.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {} = {}", name, fields[name])?;
                }
                write!(f, " }}")
            }
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, val) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if i >= 3 {
                        write!(f, "...")?;
                        break;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            Value::Uninitialized => write!(f, "[uninit]"),
        }
    }
}
