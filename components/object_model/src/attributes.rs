//! Property attribute flags

use std::ops::BitOr;

/// Attribute flags attached to a stored field.
///
/// # Examples
///
/// ```
/// use object_model::PropertyAttributes;
///
/// let attrs = PropertyAttributes::READ_ONLY | PropertyAttributes::DONT_ENUM;
/// assert!(attrs.contains(PropertyAttributes::READ_ONLY));
/// assert!(!attrs.contains(PropertyAttributes::DONT_DELETE));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PropertyAttributes(u8);

impl PropertyAttributes {
    /// Plain writable, enumerable, deletable field
    pub const NONE: Self = Self(0);
    /// Assignments are refused
    pub const READ_ONLY: Self = Self(1);
    /// Hidden from key enumeration
    pub const DONT_ENUM: Self = Self(1 << 1);
    /// Deletion is refused
    pub const DONT_DELETE: Self = Self(1 << 2);
    /// Host-internal field, never enumerated
    pub const INTERNAL: Self = Self(1 << 3);

    /// Raw flag bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the field shows up in key enumeration
    pub const fn is_enumerable(self) -> bool {
        self.0 & (Self::DONT_ENUM.0 | Self::INTERNAL.0) == 0
    }
}

impl BitOr for PropertyAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
