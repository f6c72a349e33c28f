//! Type table handle.

use std::fmt;

/// Index of an interned type in a [`TypeTable`](crate::TypeTable).
///
/// Handles are stable for the table's lifetime. The ten primitives are
/// pre-interned at fixed indices matching [`Primitive`](crate::Primitive)
/// declaration order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const BOOL: Self = Self(0);
    pub const BYTE: Self = Self(1);
    pub const INT: Self = Self(2);
    pub const UINT: Self = Self(3);
    pub const LONG: Self = Self(4);
    pub const ULONG: Self = Self(5);
    pub const CHAR: Self = Self(6);
    pub const STRING: Self = Self(7);
    pub const VOID: Self = Self(8);
    pub const ANY: Self = Self(9);

    /// First index handed out for non-primitive types.
    pub const FIRST_DYNAMIC: u32 = 10;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}
