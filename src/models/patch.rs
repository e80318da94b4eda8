//! Serde helpers for three-state partial-update fields.

use serde::{Deserialize, Deserializer};

/// Deserialize a present key into `Some(..)`, keeping `null` as `Some(None)`.
///
/// Use together with `#[serde(default)]` so that an absent key stays `None`:
///
/// ```ignore
/// #[serde(default, deserialize_with = "patch::present")]
/// pub description: Option<Option<String>>,
/// ```
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolve a nullable field against its stored value.
pub fn apply<T>(field: Option<Option<T>>, existing: Option<T>) -> Option<T> {
    match field {
        Some(value) => value,
        None => existing,
    }
}

/// Resolve a non-nullable field against its stored value.
///
/// An explicit `null` keeps the stored value; inputs reject it before they
/// reach the store (see [`is_null`]).
pub fn apply_required<T>(field: Option<Option<T>>, existing: T) -> T {
    match field {
        Some(Some(value)) => value,
        _ => existing,
    }
}

/// Whether the key was sent as an explicit `null`.
pub fn is_null<T>(field: &Option<Option<T>>) -> bool {
    matches!(field, Some(None))
}
