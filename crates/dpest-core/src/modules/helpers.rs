//! Naming and path helpers shared by the generator modules.

use crate::domain::{DpestError, DpestResult, Suffix};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Rewrites an overview variable label into a PEST-legal observation name:
/// alphanumeric runs joined by single underscores, capped at `max` chars.
pub fn sanitize_variable_name(raw: &str, max: usize) -> String {
    let mut sanitized = String::new();
    let mut pending_separator = false;
    for character in raw.chars() {
        if character.is_ascii_alphanumeric() {
            if pending_separator && !sanitized.is_empty() {
                sanitized.push('_');
            }
            pending_separator = false;
            sanitized.push(character);
        } else {
            pending_separator = true;
        }
    }
    truncate_chars(&sanitized, max)
        .trim_end_matches('_')
        .to_string()
}

/// Appends the suffix tag, shortening the base so the result stays inside
/// `max` characters.
pub fn apply_suffix(name: &str, suffix: Option<&Suffix>, max: usize) -> String {
    match suffix {
        None => truncate_chars(name, max).to_string(),
        Some(suffix) => {
            let tag = suffix.tag();
            let room = max.saturating_sub(tag.chars().count());
            let base = truncate_chars(name, room).trim_end_matches('_');
            format!("{base}{tag}")
        }
    }
}

/// Deduplicates an observation name within one generation call by replacing
/// the tail with a counter, the same resolution rule the template
/// identifiers use.
pub fn unique_observation_name(candidate: &str, max: usize, used: &mut BTreeSet<String>) -> String {
    let mut name = truncate_chars(candidate, max).to_string();
    let mut counter: u64 = 0;
    while used.contains(&name) {
        let suffix = counter.to_string();
        let keep = max.saturating_sub(suffix.chars().count());
        name = format!("{}{}", truncate_chars(candidate, keep), suffix);
        counter += 1;
    }
    used.insert(name.clone());
    name
}

/// Output directory resolution: an explicit directory wins, otherwise
/// artifacts land beside the source file.
pub fn resolve_output_dir(output_dir: Option<&Path>, source: &Path) -> DpestResult<PathBuf> {
    match output_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => source
            .parent()
            .map(Path::to_path_buf)
            .filter(|parent| !parent.as_os_str().is_empty())
            .ok_or_else(|| {
                DpestError::validation(
                    "INPUT.OUTPUT_DIR",
                    format!(
                        "cannot derive an output directory from '{}'; pass one explicitly",
                        source.display()
                    ),
                )
            }),
    }
}

/// Checks a source path ends with the expected extension (case-insensitive)
/// and returns its stem for building output names.
pub fn validated_stem<'a>(path: &'a Path, extension: &str) -> DpestResult<&'a str> {
    let matches = path
        .extension()
        .and_then(|actual| actual.to_str())
        .is_some_and(|actual| actual.eq_ignore_ascii_case(extension));
    if !matches {
        return Err(DpestError::validation(
            "INPUT.FILE_EXTENSION",
            format!(
                "'{}' does not carry the expected .{} extension",
                path.display(),
                extension
            ),
        ));
    }
    path.file_stem().and_then(|stem| stem.to_str()).ok_or_else(|| {
        DpestError::validation(
            "INPUT.FILE_NAME",
            format!("'{}' has no usable file name", path.display()),
        )
    })
}

fn truncate_chars(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((offset, _)) => &raw[..offset],
        None => raw,
    }
}
