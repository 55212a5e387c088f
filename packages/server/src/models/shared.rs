use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Acknowledgement returned by create, update and delete endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Song created")]
    pub message: String,
    /// ID of the affected record.
    #[schema(example = 42)]
    pub id: i32,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>, id: i32) -> Self {
        Self {
            message: message.into(),
            id,
        }
    }
}

/// Validate a required text field after trimming (1..=max Unicode characters).
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Validate an optional text field's length (at most `max` Unicode characters).
pub fn validate_optional(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    if let Some(value) = value
        && value.chars().count() > max
    {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Remove duplicate IDs while keeping first-seen order.
pub fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Serde helper treating an empty or blank string as an absent value.
///
/// HTML forms submit `""` for untouched inputs; those mean "no value".
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
