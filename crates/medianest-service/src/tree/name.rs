//! Folder name sanitization and slug derivation.

use medianest_core::error::AppError;
use medianest_core::result::AppResult;
use medianest_entity::folder::SYSTEM_SLUG;

/// Slug used when a name contains nothing sluggable.
const FALLBACK_SLUG: &str = "folder";

/// Clean up a user-supplied folder name.
///
/// Control characters are dropped, whitespace runs collapse to a single
/// space and the result is trimmed. Fails when nothing is left or the name
/// exceeds `max_len` characters.
pub fn sanitize_name(raw: &str, max_len: usize) -> AppResult<String> {
    let cleaned = raw
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    let len = cleaned.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "Folder name is {len} characters long, the maximum is {max_len}"
        )));
    }
    Ok(cleaned)
}

/// Derive the base slug of a name: lowercase alphanumerics joined by `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Pick a slug for `name` that `taken` does not report as used.
///
/// The reserved system slug is never handed out here; collisions get
/// `-2`, `-3`, ... suffixes.
pub fn unique_slug(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = slugify(name);
    let blocked = |candidate: &str| candidate == SYSTEM_SLUG || taken(candidate);
    if !blocked(&base) {
        return base;
    }
    (2u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !blocked(candidate))
        .unwrap_or(base)
}
