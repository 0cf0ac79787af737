//! Verification input and its fail-fast validation.

use barcheck_types::{Field, FormatError, LetterId, NationalId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::VerificationError;

/// A verification submission as received from the boundary.
///
/// Fields are optional because the payload is untrusted; a missing field is
/// a format failure, not a deserialization failure. Non-string values are
/// kept in their JSON text form so they fail the format checks by field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub letter_id: Option<String>,
}

impl VerificationInput {
    pub fn new(national_id: impl Into<String>, letter_id: impl Into<String>) -> Self {
        Self {
            national_id: Some(national_id.into()),
            letter_id: Some(letter_id.into()),
        }
    }
}

/// Validate a submission. The first failing check wins:
///
/// 1. a supplied national ID must match its pattern;
/// 2. a supplied letter ID must match its pattern;
/// 3. both fields must be present and well formed together.
///
/// An empty string counts as "not supplied" for checks 1 and 2 and is then
/// reported as malformed by check 3.
pub fn validate_input(input: &VerificationInput) -> Result<(NationalId, LetterId), VerificationError> {
    if let Some(raw) = supplied(&input.national_id) {
        if !NationalId::is_well_formed(raw) {
            return Err(FormatError::Malformed(Field::NationalId).into());
        }
    }
    if let Some(raw) = supplied(&input.letter_id) {
        if !LetterId::is_well_formed(raw) {
            return Err(FormatError::Malformed(Field::LetterId).into());
        }
    }

    let national_id = input
        .national_id
        .as_deref()
        .ok_or(FormatError::Missing(Field::NationalId))
        .and_then(NationalId::parse)?;
    let letter_id = input
        .letter_id
        .as_deref()
        .ok_or(FormatError::Missing(Field::LetterId))
        .and_then(LetterId::parse)?;

    Ok((national_id, letter_id))
}

fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// `null` reads as absent; any other non-string becomes its JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
