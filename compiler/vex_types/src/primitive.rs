//! Primitive type kinds.

use std::fmt;

use crate::TypeId;

/// Built-in scalar and special types.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
pub enum Primitive {
    Bool = 0,
    Byte = 1,
    Int = 2,
    UInt = 3,
    Long = 4,
    ULong = 5,
    Char = 6,
    String = 7,
    Void = 8,
    Any = 9,
}

impl Primitive {
    pub const ALL: [Primitive; 10] = [
        Primitive::Bool,
        Primitive::Byte,
        Primitive::Int,
        Primitive::UInt,
        Primitive::Long,
        Primitive::ULong,
        Primitive::Char,
        Primitive::String,
        Primitive::Void,
        Primitive::Any,
    ];

    /// Surface-syntax keyword.
    pub const fn keyword(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::Int => "int",
            Primitive::UInt => "uint",
            Primitive::Long => "long",
            Primitive::ULong => "ulong",
            Primitive::Char => "char",
            Primitive::String => "string",
            Primitive::Void => "void",
            Primitive::Any => "any",
        }
    }

    /// Pre-interned handle for this primitive.
    pub const fn id(self) -> TypeId {
        TypeId::from_raw(self as u32)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
