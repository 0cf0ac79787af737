//! Credential identifiers: the national ID number and the bar-council letter ID.
//!
//! Both are validated newtypes. The only way to build one is [`NationalId::parse`]
//! or [`LetterId::parse`], and serde routes through the same check, so a value
//! of either type always satisfies its literal pattern.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FormatError;

/// Which of the two submitted identifiers a message or error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    NationalId,
    LetterId,
}

impl Field {
    /// Human-readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Field::NationalId => "National ID",
            Field::LetterId => "Letter ID",
        }
    }

    /// A well-formed example value, quoted in format errors.
    pub fn example(&self) -> &'static str {
        match self {
            Field::NationalId => "12345-1234567-1",
            Field::LetterId => "LTR-12345",
        }
    }

    /// The other identifier of the pair.
    pub fn other(&self) -> Field {
        match self {
            Field::NationalId => Field::LetterId,
            Field::LetterId => Field::NationalId,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A national identity number in `DDDDD-DDDDDDD-D` form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalId(String);

impl NationalId {
    /// Digit-group lengths, separated by `-`.
    pub const GROUPS: [usize; 3] = [5, 7, 1];

    /// Total length including separators.
    pub const LEN: usize = 15;

    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        if Self::is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(FormatError::Malformed(Field::NationalId))
        }
    }

    /// Check `raw` against the pattern without allocating.
    pub fn is_well_formed(raw: &str) -> bool {
        if raw.len() != Self::LEN {
            return false;
        }
        let mut groups = raw.split('-');
        for expected in Self::GROUPS {
            match groups.next() {
                Some(group) if group.len() == expected && all_digits(group) => {}
                _ => return false,
            }
        }
        groups.next().is_none()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A bar-council letter reference in `LTR-DDDDD` form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LetterId(String);

impl LetterId {
    /// Literal prefix every letter ID starts with.
    pub const PREFIX: &'static str = "LTR-";

    /// Number of digits after the prefix.
    pub const DIGITS: usize = 5;

    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        if Self::is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(FormatError::Malformed(Field::LetterId))
        }
    }

    pub fn is_well_formed(raw: &str) -> bool {
        raw.strip_prefix(Self::PREFIX)
            .is_some_and(|digits| digits.len() == Self::DIGITS && all_digits(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// `char::is_numeric` would admit digits from other scripts.
fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

macro_rules! string_newtype_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = FormatError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = FormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

string_newtype_impls!(NationalId);
string_newtype_impls!(LetterId);
