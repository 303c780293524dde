//! Boolean convention layered over string-valued player variables.

pub const TRUE_VALUE: &str = "1";
pub const FALSE_VALUE: &str = "0";

/// What a stored variable looked like when read as a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredBool {
    Set(bool),
    /// Nothing stored (or the read failed)
    Missing,
    /// Stored, but neither `"0"` nor `"1"`
    Malformed(String),
}

impl StoredBool {
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some(TRUE_VALUE) => Self::Set(true),
            Some(FALSE_VALUE) => Self::Set(false),
            Some(other) => Self::Malformed(other.to_string()),
            None => Self::Missing,
        }
    }

    /// Missing and malformed values count as false.
    pub fn value(&self) -> bool {
        matches!(self, Self::Set(true))
    }
}

pub fn encode_bool(value: bool) -> &'static str {
    if value {
        TRUE_VALUE
    } else {
        FALSE_VALUE
    }
}
