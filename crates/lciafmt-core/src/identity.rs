//! Deterministic identifiers derived from semantic keys
//!
//! Entities without a natural identifier get a name-based UUID computed from
//! an ordered tuple of key components. The components are trimmed, lower-cased
//! and joined with `/` before hashing, so the same flow written by different
//! runs (or different tools using the same convention) gets the same id.

use uuid::Uuid;

/// Derive a stable 36-character identifier from the given key components.
///
/// Blank components stay as empty path segments, so the position of every
/// component is part of the key.
pub fn make_uuid<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = as_path(parts);
    Uuid::new_v3(&Uuid::NAMESPACE_OID, path.as_bytes())
        .hyphenated()
        .to_string()
}

fn as_path<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("/")
}

/// True when the value carries a usable natural identifier
pub fn is_non_empty_str(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Return the supplied identifier, or derive one from the key components
pub fn id_or_derived<I, S>(natural: Option<&str>, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match natural {
        Some(id) if is_non_empty_str(Some(id)) => id.trim().to_string(),
        _ => make_uuid(parts),
    }
}
