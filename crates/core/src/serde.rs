//! Serde helper functions for patch payloads.
//!
//! Update payloads need to tell "leave this field alone" apart from "clear this
//! field". The first is a missing key, the second an explicit `null`.

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable field so that an explicit `null` becomes `Some(None)`.
///
/// Use together with `#[serde(default)]` so a missing key stays `None`.
pub fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
